use actix_web::{web, HttpRequest, HttpResponse};
use tracing::info;
use validator::Validate;

use crate::dto::{
    first_validation_message, LoginRequest, MessageResponse, RegisterRequest, SessionClaims,
    TokenResponse,
};
use crate::error::ApiError;
use crate::middleware::AuthenticatedUser;
use crate::state::AppState;

/// Handler for POST /sign-up
///
/// # Response
///
/// ## Success (201 Created)
/// ```json
/// { "message": "User created" }
/// ```
///
/// ## Errors
/// - 400 Bad Request: Username or password fails validation
/// - 409 Conflict: Username already registered
pub async fn sign_up(
    req: HttpRequest,
    state: web::Data<AppState>,
    body: web::Json<RegisterRequest>,
) -> Result<HttpResponse, actix_web::Error> {
    body.validate()
        .map_err(|e| ApiError::Validation(first_validation_message(&e)).into_actix(&req))?;

    let account = state
        .accounts
        .register(&body.username, &body.password)
        .await
        .ok_or_else(|| ApiError::UsernameTaken.into_actix(&req))?;

    info!(user_id = %account.id, "Account registered");
    Ok(HttpResponse::Created().json(MessageResponse::new("User created")))
}

/// Handler for POST /login
///
/// Issues a token carrying the account id and username, valid for the
/// configured default lifetime.
///
/// # Response
///
/// ## Success (200 OK)
/// ```json
/// { "token": "<token>" }
/// ```
///
/// ## Errors
/// - 400 Bad Request: Missing username or password
/// - 401 Unauthorized: Unknown username or wrong password
/// - 500 Internal Server Error: Token could not be stored
pub async fn login(
    req: HttpRequest,
    state: web::Data<AppState>,
    body: web::Json<LoginRequest>,
) -> Result<HttpResponse, actix_web::Error> {
    body.validate()
        .map_err(|e| ApiError::Validation(first_validation_message(&e)).into_actix(&req))?;

    let account = state
        .accounts
        .verify(&body.username, &body.password)
        .await
        .ok_or_else(|| ApiError::InvalidLogin.into_actix(&req))?;

    let claims = SessionClaims {
        user_id: account.id.to_string(),
        username: account.username,
    };
    let token = state
        .manager
        .create_token(&claims, None)
        .await
        .map_err(|e| ApiError::from(e).into_actix(&req))?;

    Ok(HttpResponse::Ok().json(TokenResponse { token }))
}

/// Handler for POST /logout
///
/// Revokes the token the request was authenticated with.
///
/// ## Errors
/// - 401 Unauthorized: Missing, invalid or already revoked token
/// - 500 Internal Server Error: Token record could not be deleted
pub async fn logout(
    req: HttpRequest,
    state: web::Data<AppState>,
    user: AuthenticatedUser,
) -> Result<HttpResponse, actix_web::Error> {
    state
        .manager
        .invalidate_token(&user.token)
        .await
        .map_err(|e| ApiError::from(e).into_actix(&req))?;

    Ok(HttpResponse::Ok().json(MessageResponse::new("Logged out")))
}
