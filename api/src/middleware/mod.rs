pub mod auth;

pub use auth::{
    extract_token, parse_authorization, AuthenticatedUser, JwtAuthentication,
    JwtAuthenticationMiddleware, MaybeUser,
};
