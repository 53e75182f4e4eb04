//! Season, roster and current-season queries

use super::conflict_on_unique;
use crate::error::AppResult;
use crate::models::{RosterEntry, RosterStatus, Season};
use sqlx::{PgConnection, PgExecutor};
use uuid::Uuid;

pub async fn find<'e>(exec: impl PgExecutor<'e>, id: Uuid) -> AppResult<Option<Season>> {
    let season = sqlx::query_as::<_, Season>("SELECT * FROM seasons WHERE id = $1")
        .bind(id)
        .fetch_optional(exec)
        .await?;

    Ok(season)
}

pub async fn find_for_update<'e>(exec: impl PgExecutor<'e>, id: Uuid) -> AppResult<Option<Season>> {
    let season = sqlx::query_as::<_, Season>("SELECT * FROM seasons WHERE id = $1 FOR UPDATE")
        .bind(id)
        .fetch_optional(exec)
        .await?;

    Ok(season)
}

/// The season the current-season pointer refers to
pub async fn find_active<'e>(exec: impl PgExecutor<'e>) -> AppResult<Option<Season>> {
    let season = sqlx::query_as::<_, Season>(
        r#"
        SELECT s.* FROM seasons s
        JOIN current_season c ON c.season_id = s.id
        WHERE s.status = 'active'
        "#,
    )
    .fetch_optional(exec)
    .await?;

    Ok(season)
}

pub async fn insert<'e>(exec: impl PgExecutor<'e>, season: &Season) -> AppResult<Season> {
    let season = sqlx::query_as::<_, Season>(
        r#"
        INSERT INTO seasons (
            id, name, start_date, end_date, status, max_denials, cancellation_deadline_days,
            forfeit_win_score, forfeit_loss_score, points_for_win, points_for_draw,
            points_for_loss, ranking_criteria, min_games_played, final_table,
            created_at, updated_at
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17)
        RETURNING *
        "#,
    )
    .bind(season.id)
    .bind(&season.name)
    .bind(season.start_date)
    .bind(season.end_date)
    .bind(season.status)
    .bind(season.max_denials)
    .bind(season.cancellation_deadline_days)
    .bind(season.forfeit_win_score)
    .bind(season.forfeit_loss_score)
    .bind(season.points_for_win)
    .bind(season.points_for_draw)
    .bind(season.points_for_loss)
    .bind(&season.ranking_criteria)
    .bind(season.min_games_played)
    .bind(&season.final_table)
    .bind(season.created_at)
    .bind(season.updated_at)
    .fetch_one(exec)
    .await?;

    Ok(season)
}

/// Persist status, rules and the frozen table
pub async fn update<'e>(exec: impl PgExecutor<'e>, season: &Season) -> AppResult<Season> {
    let season = sqlx::query_as::<_, Season>(
        r#"
        UPDATE seasons SET
            status = $2,
            max_denials = $3,
            cancellation_deadline_days = $4,
            forfeit_win_score = $5,
            forfeit_loss_score = $6,
            points_for_win = $7,
            points_for_draw = $8,
            points_for_loss = $9,
            ranking_criteria = $10,
            min_games_played = $11,
            final_table = $12,
            updated_at = $13
        WHERE id = $1
        RETURNING *
        "#,
    )
    .bind(season.id)
    .bind(season.status)
    .bind(season.max_denials)
    .bind(season.cancellation_deadline_days)
    .bind(season.forfeit_win_score)
    .bind(season.forfeit_loss_score)
    .bind(season.points_for_win)
    .bind(season.points_for_draw)
    .bind(season.points_for_loss)
    .bind(&season.ranking_criteria)
    .bind(season.min_games_played)
    .bind(&season.final_table)
    .bind(season.updated_at)
    .fetch_one(exec)
    .await
    .map_err(|e| conflict_on_unique(e, "Another season is already active"))?;

    Ok(season)
}

pub async fn insert_roster(
    conn: &mut PgConnection,
    season_id: Uuid,
    team_ids: &[Uuid],
) -> AppResult<()> {
    sqlx::query(
        r#"
        INSERT INTO season_teams (season_id, team_id)
        SELECT $1, UNNEST($2::uuid[])
        "#,
    )
    .bind(season_id)
    .bind(team_ids)
    .execute(&mut *conn)
    .await?;

    Ok(())
}

/// Roster of a season with current team names
pub async fn roster<'e>(exec: impl PgExecutor<'e>, season_id: Uuid) -> AppResult<Vec<RosterEntry>> {
    let entries = sqlx::query_as::<_, RosterEntry>(
        r#"
        SELECT st.team_id, t.name, st.status
        FROM season_teams st
        JOIN teams t ON t.id = st.team_id
        WHERE st.season_id = $1
        ORDER BY t.name ASC
        "#,
    )
    .bind(season_id)
    .fetch_all(exec)
    .await?;

    Ok(entries)
}

/// Returns false when the team is not on the season's roster
pub async fn set_roster_status<'e>(
    exec: impl PgExecutor<'e>,
    season_id: Uuid,
    team_id: Uuid,
    status: RosterStatus,
) -> AppResult<bool> {
    let updated = sqlx::query(
        "UPDATE season_teams SET status = $3 WHERE season_id = $1 AND team_id = $2",
    )
    .bind(season_id)
    .bind(team_id)
    .bind(status)
    .execute(exec)
    .await?;

    Ok(updated.rows_affected() > 0)
}

/// Compare-and-swap the current-season pointer. Returns false when the
/// pointer no longer holds `expected`.
pub async fn swap_current<'e>(
    exec: impl PgExecutor<'e>,
    expected: Option<Uuid>,
    new: Option<Uuid>,
) -> AppResult<bool> {
    let updated = sqlx::query(
        "UPDATE current_season SET season_id = $2 WHERE id AND season_id IS NOT DISTINCT FROM $1",
    )
    .bind(expected)
    .bind(new)
    .execute(exec)
    .await?;

    Ok(updated.rows_affected() == 1)
}
