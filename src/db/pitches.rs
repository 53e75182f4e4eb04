//! Pitch registry queries

use crate::error::AppResult;
use crate::models::{CreatePitch, Pitch};
use sqlx::PgExecutor;
use uuid::Uuid;

pub async fn list<'e>(exec: impl PgExecutor<'e>) -> AppResult<Vec<Pitch>> {
    let pitches = sqlx::query_as::<_, Pitch>("SELECT * FROM pitches ORDER BY name ASC")
        .fetch_all(exec)
        .await?;

    Ok(pitches)
}

pub async fn find<'e>(exec: impl PgExecutor<'e>, id: Uuid) -> AppResult<Option<Pitch>> {
    let pitch = sqlx::query_as::<_, Pitch>("SELECT * FROM pitches WHERE id = $1")
        .bind(id)
        .fetch_optional(exec)
        .await?;

    Ok(pitch)
}

/// Ids from `ids` that do not exist
pub async fn missing<'e>(exec: impl PgExecutor<'e>, ids: &[Uuid]) -> AppResult<Vec<Uuid>> {
    let missing: Vec<Uuid> = sqlx::query_scalar(
        r#"
        SELECT requested.id
        FROM UNNEST($1::uuid[]) AS requested(id)
        LEFT JOIN pitches p ON p.id = requested.id
        WHERE p.id IS NULL
        "#,
    )
    .bind(ids)
    .fetch_all(exec)
    .await?;

    Ok(missing)
}

pub async fn insert<'e>(exec: impl PgExecutor<'e>, input: &CreatePitch) -> AppResult<Pitch> {
    let pitch = sqlx::query_as::<_, Pitch>(
        r#"
        INSERT INTO pitches (name, address, is_verified, owner_team_id)
        VALUES ($1, $2, $3, $4)
        RETURNING *
        "#,
    )
    .bind(input.name.trim())
    .bind(&input.address)
    .bind(input.is_verified)
    .bind(input.owner_team_id)
    .fetch_one(exec)
    .await?;

    Ok(pitch)
}
