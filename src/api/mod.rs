pub mod http;

pub use http::{
    create_router, get_health, get_transactions, ApiServer, AppState, ErrorResponse,
    HealthResponse,
};
