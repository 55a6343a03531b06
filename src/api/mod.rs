//! HTTP/REST surface of the gateway.

pub mod error;
pub mod handlers;
mod routes;
mod state;

pub use error::{ApiError, ApiResult};
pub use routes::{create_router, MAX_BODY_SIZE};
pub use state::AppState;
