//! Result queries

use crate::error::AppResult;
use crate::models::{GameResult, ResultRecord};
use sqlx::PgExecutor;
use uuid::Uuid;

fn into_result(record: ResultRecord) -> AppResult<GameResult> {
    Ok(GameResult::try_from(record)?)
}

pub async fn find_for_update<'e>(
    exec: impl PgExecutor<'e>,
    id: Uuid,
) -> AppResult<Option<GameResult>> {
    sqlx::query_as::<_, ResultRecord>("SELECT * FROM results WHERE id = $1 FOR UPDATE")
        .bind(id)
        .fetch_optional(exec)
        .await?
        .map(into_result)
        .transpose()
}

pub async fn insert<'e>(exec: impl PgExecutor<'e>, result: &GameResult) -> AppResult<ResultRecord> {
    let r = result.to_record();
    let record = sqlx::query_as::<_, ResultRecord>(
        r#"
        INSERT INTO results (
            id, season_id, booking_id, home_team_id, home_team_name,
            away_team_id, away_team_name, home_score, away_score,
            reported_by_team_id, reported_by_user_id, date, location, friendly, status,
            confirmed_by_team_id, confirmed_by_user_id, confirmed_at,
            rejected_by_team_id, rejected_by_user_id, rejected_at, rejection_reason,
            last_edited_by, last_edited_at, created_at, updated_at
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16,
                $17, $18, $19, $20, $21, $22, $23, $24, $25, $26)
        RETURNING *
        "#,
    )
    .bind(r.id)
    .bind(r.season_id)
    .bind(r.booking_id)
    .bind(r.home_team_id)
    .bind(&r.home_team_name)
    .bind(r.away_team_id)
    .bind(&r.away_team_name)
    .bind(r.home_score)
    .bind(r.away_score)
    .bind(r.reported_by_team_id)
    .bind(&r.reported_by_user_id)
    .bind(r.date)
    .bind(&r.location)
    .bind(r.friendly)
    .bind(r.status)
    .bind(r.confirmed_by_team_id)
    .bind(&r.confirmed_by_user_id)
    .bind(r.confirmed_at)
    .bind(r.rejected_by_team_id)
    .bind(&r.rejected_by_user_id)
    .bind(r.rejected_at)
    .bind(&r.rejection_reason)
    .bind(&r.last_edited_by)
    .bind(r.last_edited_at)
    .bind(r.created_at)
    .bind(r.updated_at)
    .fetch_one(exec)
    .await?;

    Ok(record)
}

/// Write scores, status and review columns of an existing result
pub async fn update<'e>(exec: impl PgExecutor<'e>, result: &GameResult) -> AppResult<ResultRecord> {
    let r = result.to_record();
    let record = sqlx::query_as::<_, ResultRecord>(
        r#"
        UPDATE results SET
            home_score = $2,
            away_score = $3,
            reported_by_team_id = $4,
            reported_by_user_id = $5,
            status = $6,
            confirmed_by_team_id = $7,
            confirmed_by_user_id = $8,
            confirmed_at = $9,
            rejected_by_team_id = $10,
            rejected_by_user_id = $11,
            rejected_at = $12,
            rejection_reason = $13,
            last_edited_by = $14,
            last_edited_at = $15,
            updated_at = $16
        WHERE id = $1
        RETURNING *
        "#,
    )
    .bind(r.id)
    .bind(r.home_score)
    .bind(r.away_score)
    .bind(r.reported_by_team_id)
    .bind(&r.reported_by_user_id)
    .bind(r.status)
    .bind(r.confirmed_by_team_id)
    .bind(&r.confirmed_by_user_id)
    .bind(r.confirmed_at)
    .bind(r.rejected_by_team_id)
    .bind(&r.rejected_by_user_id)
    .bind(r.rejected_at)
    .bind(&r.rejection_reason)
    .bind(&r.last_edited_by)
    .bind(r.last_edited_at)
    .bind(r.updated_at)
    .fetch_one(exec)
    .await?;

    Ok(record)
}

pub async fn delete<'e>(exec: impl PgExecutor<'e>, id: Uuid) -> AppResult<bool> {
    let deleted = sqlx::query("DELETE FROM results WHERE id = $1")
        .bind(id)
        .execute(exec)
        .await?;

    Ok(deleted.rows_affected() > 0)
}

/// Every result of a season, for table computation
pub async fn for_season<'e>(
    exec: impl PgExecutor<'e>,
    season_id: Uuid,
) -> AppResult<Vec<GameResult>> {
    sqlx::query_as::<_, ResultRecord>("SELECT * FROM results WHERE season_id = $1")
        .bind(season_id)
        .fetch_all(exec)
        .await?
        .into_iter()
        .map(into_result)
        .collect()
}

pub async fn list_confirmed_for_season<'e>(
    exec: impl PgExecutor<'e>,
    season_id: Uuid,
) -> AppResult<Vec<ResultRecord>> {
    let records = sqlx::query_as::<_, ResultRecord>(
        r#"
        SELECT * FROM results
        WHERE season_id = $1 AND status = 'confirmed'
        ORDER BY date DESC NULLS LAST, created_at DESC
        "#,
    )
    .bind(season_id)
    .fetch_all(exec)
    .await?;

    Ok(records)
}

/// Pending results that `team_id` has to confirm or reject
pub async fn list_awaiting_team<'e>(
    exec: impl PgExecutor<'e>,
    team_id: Uuid,
) -> AppResult<Vec<ResultRecord>> {
    let records = sqlx::query_as::<_, ResultRecord>(
        r#"
        SELECT * FROM results
        WHERE status = 'pending'
          AND (home_team_id = $1 OR away_team_id = $1)
          AND reported_by_team_id IS DISTINCT FROM $1
        ORDER BY created_at ASC
        "#,
    )
    .bind(team_id)
    .fetch_all(exec)
    .await?;

    Ok(records)
}

pub async fn list_disputed<'e>(exec: impl PgExecutor<'e>) -> AppResult<Vec<ResultRecord>> {
    let records = sqlx::query_as::<_, ResultRecord>(
        "SELECT * FROM results WHERE status = 'disputed' ORDER BY rejected_at ASC",
    )
    .fetch_all(exec)
    .await?;

    Ok(records)
}
