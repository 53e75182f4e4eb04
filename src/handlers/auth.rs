//! Bearer token authentication

use crate::db;
use crate::error::{AppError, AppResult};
use crate::models::*;
use axum::{
    extract::State,
    http::{header, HeaderMap, StatusCode},
    response::IntoResponse,
    Extension, Json,
};
use rand::RngCore;
use sha2::{Digest, Sha256};
use sqlx::PgPool;
use validator::Validate;

use super::AppState;

// =============================================================================
// Endpoints
// =============================================================================

/// Identity of the caller
pub async fn me(Extension(user): Extension<AuthUser>) -> impl IntoResponse {
    (StatusCode::OK, Json(ApiResponse::success(user)))
}

/// Issue a new bearer token (admin). The plain token is only returned here.
pub async fn issue_token(
    State(state): State<AppState>,
    Extension(admin): Extension<AuthUser>,
    Json(input): Json<IssueToken>,
) -> AppResult<impl IntoResponse> {
    input
        .validate()
        .map_err(crate::validation::ValidationError::from)?;

    if let Some(team_id) = input.team_id {
        db::teams::find(&state.pool, team_id)
            .await?
            .ok_or_else(|| AppError::not_found("Team"))?;
    }

    let token = generate_token();
    let stored = db::tokens::insert(&state.pool, &hash_token(&token), &input).await?;

    tracing::info!(
        "Token issued for {} by {} (admin: {})",
        stored.uid,
        admin.uid,
        stored.is_admin
    );

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(IssuedToken {
            token,
            uid: stored.uid,
            admin: stored.is_admin,
            team_id: stored.team_id,
        })),
    ))
}

// =============================================================================
// Token Utilities
// =============================================================================

/// Resolve the identity behind the request's bearer token
pub async fn authenticate(pool: &PgPool, headers: &HeaderMap) -> AppResult<AuthUser> {
    let token = bearer_token(headers).ok_or(AppError::Unauthenticated)?;

    db::tokens::find_identity(pool, &hash_token(&token))
        .await?
        .ok_or(AppError::Unauthenticated)
}

/// Store the configured bootstrap token as an admin token
pub async fn seed_bootstrap_token(pool: &PgPool, token: &str) -> AppResult<()> {
    if db::tokens::ensure_admin(pool, &hash_token(token)).await? {
        tracing::info!("Bootstrap admin token stored");
    }
    Ok(())
}

pub(crate) fn bearer_token(headers: &HeaderMap) -> Option<String> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.trim().split_once(' ')?;

    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }

    let token = token.trim();
    (!token.is_empty()).then(|| token.to_string())
}

pub(crate) fn generate_token() -> String {
    let mut bytes = [0u8; 32];
    rand::rngs::OsRng.fill_bytes(&mut bytes);
    hex::encode(bytes)
}

pub(crate) fn hash_token(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn test_hash_token_is_sha256() {
        let hash = hash_token("test-league-token");
        assert_eq!(hash.len(), 64);
        assert!(hash.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_hash_token_deterministic() {
        assert_eq!(hash_token("same"), hash_token("same"));
        assert_ne!(hash_token("a"), hash_token("b"));
    }

    #[test]
    fn test_generate_token_format() {
        let token = generate_token();
        assert_eq!(token.len(), 64);
        assert!(token.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(token, generate_token());
    }

    #[test]
    fn test_bearer_token_parsing() {
        assert_eq!(bearer_token(&headers("Bearer abc123")), Some("abc123".to_string()));
        assert_eq!(bearer_token(&headers("bearer  abc123 ")), Some("abc123".to_string()));
        assert_eq!(bearer_token(&headers("Basic abc123")), None);
        assert_eq!(bearer_token(&headers("Bearer ")), None);
        assert_eq!(bearer_token(&HeaderMap::new()), None);
    }
}
