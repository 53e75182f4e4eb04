//! Team registry queries

use super::conflict_on_unique;
use crate::engine::result::TeamNames;
use crate::error::AppResult;
use crate::models::Team;
use sqlx::{PgConnection, PgExecutor};
use uuid::Uuid;

const DUPLICATE_NAME: &str = "A team with this name already exists";

pub async fn list<'e>(exec: impl PgExecutor<'e>) -> AppResult<Vec<Team>> {
    let teams = sqlx::query_as::<_, Team>("SELECT * FROM teams ORDER BY name ASC")
        .fetch_all(exec)
        .await?;

    Ok(teams)
}

pub async fn find<'e>(exec: impl PgExecutor<'e>, id: Uuid) -> AppResult<Option<Team>> {
    let team = sqlx::query_as::<_, Team>("SELECT * FROM teams WHERE id = $1")
        .bind(id)
        .fetch_optional(exec)
        .await?;

    Ok(team)
}

/// Current names of the given teams; unknown ids are left out
pub async fn names<'e>(exec: impl PgExecutor<'e>, ids: &[Uuid]) -> AppResult<TeamNames> {
    let rows: Vec<(Uuid, String)> = sqlx::query_as("SELECT id, name FROM teams WHERE id = ANY($1)")
        .bind(ids)
        .fetch_all(exec)
        .await?;

    Ok(rows.into_iter().collect())
}

pub async fn insert<'e>(
    exec: impl PgExecutor<'e>,
    name: &str,
    contact_email: Option<&str>,
) -> AppResult<Team> {
    sqlx::query_as::<_, Team>(
        "INSERT INTO teams (name, contact_email) VALUES ($1, $2) RETURNING *",
    )
    .bind(name)
    .bind(contact_email)
    .fetch_one(exec)
    .await
    .map_err(|e| conflict_on_unique(e, DUPLICATE_NAME))
}

pub async fn update_contact<'e>(
    exec: impl PgExecutor<'e>,
    id: Uuid,
    contact_email: Option<&str>,
) -> AppResult<Option<Team>> {
    let team = sqlx::query_as::<_, Team>(
        "UPDATE teams SET contact_email = $2, updated_at = NOW() WHERE id = $1 RETURNING *",
    )
    .bind(id)
    .bind(contact_email)
    .fetch_optional(exec)
    .await?;

    Ok(team)
}

/// Rename a team and carry the new name into the name snapshots of its results
pub async fn rename(conn: &mut PgConnection, id: Uuid, name: &str) -> AppResult<Option<Team>> {
    let team = sqlx::query_as::<_, Team>(
        "UPDATE teams SET name = $2, updated_at = NOW() WHERE id = $1 RETURNING *",
    )
    .bind(id)
    .bind(name)
    .fetch_optional(&mut *conn)
    .await
    .map_err(|e| conflict_on_unique(e, DUPLICATE_NAME))?;

    if team.is_none() {
        return Ok(None);
    }

    sqlx::query("UPDATE results SET home_team_name = $2 WHERE home_team_id = $1")
        .bind(id)
        .bind(name)
        .execute(&mut *conn)
        .await?;
    sqlx::query("UPDATE results SET away_team_name = $2 WHERE away_team_id = $1")
        .bind(id)
        .bind(name)
        .execute(&mut *conn)
        .await?;

    Ok(team)
}

/// Ids from `ids` that do not exist
pub async fn missing<'e>(exec: impl PgExecutor<'e>, ids: &[Uuid]) -> AppResult<Vec<Uuid>> {
    let missing: Vec<Uuid> = sqlx::query_scalar(
        r#"
        SELECT requested.id
        FROM UNNEST($1::uuid[]) AS requested(id)
        LEFT JOIN teams t ON t.id = requested.id
        WHERE t.id IS NULL
        "#,
    )
    .bind(ids)
    .fetch_all(exec)
    .await?;

    Ok(missing)
}
