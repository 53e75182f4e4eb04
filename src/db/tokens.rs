//! Bearer token storage

use crate::error::AppResult;
use crate::models::{ApiToken, AuthUser, IssueToken};
use sqlx::PgExecutor;

/// Identity behind a non-revoked token hash
pub async fn find_identity<'e>(
    exec: impl PgExecutor<'e>,
    token_hash: &str,
) -> AppResult<Option<AuthUser>> {
    let token = sqlx::query_as::<_, ApiToken>(
        "SELECT * FROM api_tokens WHERE token_hash = $1 AND revoked_at IS NULL",
    )
    .bind(token_hash)
    .fetch_optional(exec)
    .await?;

    Ok(token.map(AuthUser::from))
}

pub async fn insert<'e>(
    exec: impl PgExecutor<'e>,
    token_hash: &str,
    input: &IssueToken,
) -> AppResult<ApiToken> {
    let token = sqlx::query_as::<_, ApiToken>(
        r#"
        INSERT INTO api_tokens (token_hash, uid, is_admin, team_id, label)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING *
        "#,
    )
    .bind(token_hash)
    .bind(&input.uid)
    .bind(input.admin)
    .bind(input.team_id)
    .bind(&input.label)
    .fetch_one(exec)
    .await?;

    Ok(token)
}

/// Store an admin token unless its hash is already known
pub async fn ensure_admin<'e>(exec: impl PgExecutor<'e>, token_hash: &str) -> AppResult<bool> {
    let inserted = sqlx::query(
        r#"
        INSERT INTO api_tokens (token_hash, uid, is_admin, label)
        VALUES ($1, 'bootstrap-admin', true, 'bootstrap')
        ON CONFLICT (token_hash) DO NOTHING
        "#,
    )
    .bind(token_hash)
    .execute(exec)
    .await?;

    Ok(inserted.rows_affected() > 0)
}
