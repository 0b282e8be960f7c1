//! Bearer-token authentication middleware for protecting API endpoints.
//!
//! The token is read from the `Authorization` header, or failing that from
//! an `Authorization` cookie, and must use the `Bearer` scheme. It is
//! resolved through the [`TokenLifecycleManager`]; on success the [`User`]
//! is stored in the request extensions for the [`AuthenticatedUser`] and
//! [`MaybeUser`] extractors.
//!
//! A token that verifies but has no cache record (revoked or unknown) is
//! not rejected here: the request continues without a user, and routes
//! that need one reject it through [`AuthenticatedUser`].

use std::future::{ready, Ready};
use std::ops::Deref;
use std::rc::Rc;
use std::sync::Arc;

use actix_web::{
    body::EitherBody,
    dev::{forward_ready, Payload, Service, ServiceRequest, ServiceResponse, Transform},
    http::header::AUTHORIZATION,
    Error, FromRequest, HttpMessage, HttpRequest,
};
use futures_util::future::LocalBoxFuture;
use tk_core::services::token::fingerprint;
use tk_core::{TokenLifecycleManager, User};
use tracing::{debug, warn};

use crate::error::{ApiError, TokenExtractionError};

/// Header and cookie name carrying the credentials
pub const AUTHORIZATION_COOKIE: &str = "Authorization";

/// Authentication middleware factory
#[derive(Clone)]
pub struct JwtAuthentication {
    manager: Arc<TokenLifecycleManager>,
    exclude_paths: Arc<[String]>,
}

impl JwtAuthentication {
    /// Creates middleware authenticating every request through `manager`
    pub fn new(manager: Arc<TokenLifecycleManager>) -> Self {
        Self {
            manager,
            exclude_paths: Arc::from(Vec::new()),
        }
    }

    /// Skip authentication for requests whose path contains any of `paths`
    ///
    /// Fragments are trimmed; blank ones are ignored since they would match
    /// every path.
    pub fn exclude<I, P>(mut self, paths: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<String>,
    {
        let mut exclude_paths = self.exclude_paths.to_vec();
        exclude_paths.extend(
            paths
                .into_iter()
                .map(Into::into)
                .map(|path: String| path.trim().to_string())
                .filter(|path| !path.is_empty()),
        );
        self.exclude_paths = Arc::from(exclude_paths);
        self
    }
}

impl<S, B> Transform<S, ServiceRequest> for JwtAuthentication
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = JwtAuthenticationMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(JwtAuthenticationMiddleware {
            service: Rc::new(service),
            manager: Arc::clone(&self.manager),
            exclude_paths: Arc::clone(&self.exclude_paths),
        }))
    }
}

/// Authentication middleware service
pub struct JwtAuthenticationMiddleware<S> {
    service: Rc<S>,
    manager: Arc<TokenLifecycleManager>,
    exclude_paths: Arc<[String]>,
}

impl<S> JwtAuthenticationMiddleware<S> {
    fn is_excluded(&self, path: &str) -> bool {
        self.exclude_paths
            .iter()
            .any(|excluded| path.contains(excluded.as_str()))
    }
}

impl<S, B> Service<ServiceRequest> for JwtAuthenticationMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = Rc::clone(&self.service);
        let manager = Arc::clone(&self.manager);
        let excluded = self.is_excluded(req.path());

        Box::pin(async move {
            if excluded {
                return service.call(req).await.map(ServiceResponse::map_into_left_body);
            }

            let outcome = match extract_token(&req) {
                Ok(token) => manager
                    .authenticate(&token)
                    .await
                    .map_err(ApiError::from)
                    .map(|user| (token, user)),
                Err(e) => Err(ApiError::from(e)),
            };

            match outcome {
                Ok((token, user)) => {
                    match user {
                        Some(user) => {
                            req.extensions_mut().insert(user);
                        }
                        None => debug!(token = %fingerprint(&token), "Token has no cache record"),
                    }
                    service.call(req).await.map(ServiceResponse::map_into_left_body)
                }
                Err(error) => {
                    let status = error.status();
                    if status.is_server_error() {
                        warn!(path = %req.path(), error = %error, "Authentication failed");
                    } else {
                        debug!(path = %req.path(), status = status.as_u16(), error = %error, "Request rejected");
                    }
                    let response = error.to_response(req.request());
                    Ok(req.into_response(response).map_into_right_body())
                }
            }
        })
    }
}

/// Extracts the bearer token from the `Authorization` header or cookie
pub fn extract_token(req: &ServiceRequest) -> Result<String, TokenExtractionError> {
    let header = req
        .headers()
        .get(AUTHORIZATION)
        .map(|value| value.to_str().map_err(|_| TokenExtractionError::Unparsable))
        .transpose()?
        .map(str::trim)
        .filter(|value| !value.is_empty());

    let raw = match header {
        Some(value) => value.to_string(),
        None => req
            .cookie(AUTHORIZATION_COOKIE)
            .map(|cookie| cookie.value().to_string())
            .ok_or(TokenExtractionError::Missing)?,
    };

    parse_authorization(&raw)
}

/// Splits `"<scheme> <token>"`, requiring the `Bearer` scheme (any case)
pub fn parse_authorization(value: &str) -> Result<String, TokenExtractionError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(TokenExtractionError::Missing);
    }

    let (scheme, token) = value.split_once(' ').unwrap_or((value, ""));
    if !scheme.eq_ignore_ascii_case("bearer") {
        return Err(TokenExtractionError::InvalidScheme);
    }

    Ok(token.trim().to_string())
}

/// Extractor for a request that must carry an authenticated user
#[derive(Debug, Clone)]
pub struct AuthenticatedUser(pub User);

impl Deref for AuthenticatedUser {
    type Target = User;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl FromRequest for AuthenticatedUser {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        let user = req.extensions().get::<User>().cloned();
        ready(
            user.map(AuthenticatedUser)
                .ok_or_else(|| ApiError::Unauthenticated.into_actix(req)),
        )
    }
}

/// Extractor for optional authentication
#[derive(Debug, Clone)]
pub struct MaybeUser(pub Option<User>);

impl FromRequest for MaybeUser {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        ready(Ok(MaybeUser(req.extensions().get::<User>().cloned())))
    }
}
