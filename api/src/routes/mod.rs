//! Demo routes
//!
//! - `POST /sign-up` - register an account
//! - `POST /login` - exchange credentials for a token
//! - `GET /profile-info` - the authenticated user's profile
//! - `POST /logout` - revoke the presented token
//! - `GET /health` - liveness and storage backend

pub mod auth;
pub mod health;
pub mod profile;

use actix_web::web;

/// Paths reachable without a token
pub const PUBLIC_PATHS: [&str; 3] = ["/sign-up", "/login", "/health"];

/// Register every demo route
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/sign-up", web::post().to(auth::sign_up))
        .route("/login", web::post().to(auth::login))
        .route("/logout", web::post().to(auth::logout))
        .route("/profile-info", web::get().to(profile::profile_info))
        .route("/health", web::get().to(health::health_check));
}
