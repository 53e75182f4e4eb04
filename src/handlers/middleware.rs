//! Middleware for authentication and security headers

use crate::engine::EngineError;
use crate::error::AppError;
use crate::handlers::auth::authenticate;
use crate::handlers::AppState;
use crate::models::AuthUser;
use axum::{
    body::Body,
    extract::State,
    http::{header, HeaderValue, Request},
    middleware::Next,
    response::{IntoResponse, Response},
};

/// Resolve the bearer token; the caller is available via Extension<AuthUser>
pub async fn require_auth(
    State(state): State<AppState>,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    let user = match authenticate(&state.pool, request.headers()).await {
        Ok(user) => user,
        Err(e) => return e.into_response(),
    };

    request.extensions_mut().insert(user);
    next.run(request).await
}

/// Only let admins through. Must run after `require_auth`.
pub async fn require_admin(request: Request<Body>, next: Next) -> Response {
    let Some(user) = request.extensions().get::<AuthUser>() else {
        return AppError::Unauthenticated.into_response();
    };

    if !user.admin {
        tracing::warn!("Non-admin {} tried to reach {}", user.uid, request.uri().path());
        return AppError::from(EngineError::permission("Admin access required")).into_response();
    }

    next.run(request).await
}

/// Security headers middleware
pub async fn security_headers(
    State(state): State<AppState>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let mut response = next.run(request).await;
    let headers = response.headers_mut();

    headers.insert("X-Frame-Options", HeaderValue::from_static("DENY"));
    headers.insert(
        "X-Content-Type-Options",
        HeaderValue::from_static("nosniff"),
    );
    headers.insert("Referrer-Policy", HeaderValue::from_static("no-referrer"));
    headers.insert(
        "Content-Security-Policy",
        HeaderValue::from_static("default-src 'none'; frame-ancestors 'none'"),
    );
    headers.insert(header::CACHE_CONTROL, HeaderValue::from_static("no-store"));

    if state.is_production {
        headers.insert(
            header::STRICT_TRANSPORT_SECURITY,
            HeaderValue::from_static("max-age=63072000; includeSubDomains"),
        );
    }

    response
}
