//! Contest ingest API: upload validation and orchestration, voting,
//! rankings, and bearer-token auth.

pub mod auth;
pub mod config;
pub mod dto;
pub mod error;
pub mod handlers;
pub mod maintenance;
pub mod middleware;
pub mod password;
pub mod routes;
pub mod services;
pub mod session;
pub mod state;

pub use config::{ApiConfig, JwtConfig};
pub use error::{ApiError, ApiResult};
pub use routes::create_router;
pub use state::AppState;
