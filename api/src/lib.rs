// Library exports for testing and external use

pub mod config;
pub mod dto;
pub mod error;
pub mod middleware;
pub mod routes;
pub mod state;
pub mod telemetry;

pub use error::{ApiError, TokenExtractionError};
pub use middleware::{AuthenticatedUser, JwtAuthentication, MaybeUser};
pub use state::AppState;
