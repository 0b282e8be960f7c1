//! Request and response bodies of the demo routes

use serde::{Deserialize, Serialize};
use validator::Validate;

/// Body of `POST /sign-up`
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(length(min = 1, max = 64, message = "Username must be 1 to 64 characters."))]
    pub username: String,

    #[validate(length(min = 8, max = 128, message = "Password must be 8 to 128 characters."))]
    pub password: String,
}

/// Body of `POST /login`
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(length(min = 1, message = "Username is required."))]
    pub username: String,

    #[validate(length(min = 1, message = "Password is required."))]
    pub password: String,
}

/// Claims issued to a logged-in user
#[derive(Debug, Clone, Serialize)]
pub struct SessionClaims {
    pub user_id: String,
    pub username: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenResponse {
    pub token: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileResponse {
    pub user_id: Option<String>,
    pub username: Option<String>,
}

/// First validation message of a failed request body
pub fn first_validation_message(errors: &validator::ValidationErrors) -> String {
    errors
        .field_errors()
        .values()
        .flat_map(|errors| errors.iter())
        .find_map(|error| error.message.as_ref().map(|message| message.to_string()))
        .unwrap_or_else(|| "Invalid request body.".to_string())
}
