//! Season handlers: registry, lifecycle and standings

use crate::db;
use crate::engine::season as engine;
use crate::engine::EngineError;
use crate::error::{AppError, AppResult};
use crate::models::*;
use crate::validation::validate_create_season;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Extension, Json,
};
use chrono::Utc;
use uuid::Uuid;

use super::{ensure_known, AppState};

async fn season_response(state: &AppState, season: Season) -> AppResult<SeasonResponse> {
    let roster = db::seasons::roster(&state.pool, season.id).await?;
    Ok(SeasonResponse::new(season, roster))
}

// =============================================================================
// Public Endpoints
// =============================================================================

pub async fn get_active_season(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let season = db::seasons::find_active(&state.pool)
        .await?
        .ok_or_else(|| AppError::NotFound("There is no active season".to_string()))?;

    let response = season_response(&state, season).await?;
    Ok((StatusCode::OK, Json(ApiResponse::success(response))))
}

pub async fn get_season(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<impl IntoResponse> {
    let season = db::seasons::find(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::not_found("Season"))?;

    let response = season_response(&state, season).await?;
    Ok((StatusCode::OK, Json(ApiResponse::success(response))))
}

/// Live table, or the frozen one once the season is finished
pub async fn get_table(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<impl IntoResponse> {
    let season = db::seasons::find(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::not_found("Season"))?;

    let table = if season.is_finished() && season.final_table.is_some() {
        engine::table_for(&season, &[], &[])
    } else {
        let roster = db::seasons::roster(&state.pool, id).await?;
        let results = db::results::for_season(&state.pool, id).await?;
        engine::table_for(&season, &roster, &results)
    };

    Ok((StatusCode::OK, Json(ApiResponse::success(table))))
}

// =============================================================================
// Admin Endpoints
// =============================================================================

pub async fn create_season(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Json(input): Json<CreateSeason>,
) -> AppResult<impl IntoResponse> {
    validate_create_season(&input)?;

    let missing = db::teams::missing(&state.pool, &input.team_ids).await?;
    ensure_known("Team", &missing)?;

    let season = Season::planned(&input, Utc::now());

    let mut tx = state.pool.begin().await?;
    let season = db::seasons::insert(&mut *tx, &season).await?;
    db::seasons::insert_roster(&mut *tx, season.id, &input.team_ids).await?;
    tx.commit().await?;

    tracing::info!(
        "Season '{}' ({}) created by {} with {} teams",
        season.name,
        season.id,
        user.uid,
        input.team_ids.len()
    );

    let response = season_response(&state, season).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(response))))
}

pub async fn update_season_rules(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
    Json(rules): Json<SeasonRules>,
) -> AppResult<impl IntoResponse> {
    let mut tx = state.pool.begin().await?;

    let season = db::seasons::find_for_update(&mut *tx, id)
        .await?
        .ok_or_else(|| AppError::not_found("Season"))?;

    let updated = engine::update_rules(&season, rules, Utc::now())?;
    let season = db::seasons::update(&mut *tx, &updated).await?;
    tx.commit().await?;

    tracing::info!("Rules of season {} updated by {}", id, user.uid);

    let response = season_response(&state, season).await?;
    Ok((StatusCode::OK, Json(ApiResponse::success(response))))
}

/// Make a planned season the one active season
pub async fn activate_season(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> AppResult<impl IntoResponse> {
    let mut tx = state.pool.begin().await?;

    let season = db::seasons::find_for_update(&mut *tx, id)
        .await?
        .ok_or_else(|| AppError::not_found("Season"))?;

    let activated = engine::activate(&season, Utc::now())?;

    if !db::seasons::swap_current(&mut *tx, None, Some(id)).await? {
        return Err(EngineError::conflict("Another season is already active").into());
    }

    let season = db::seasons::update(&mut *tx, &activated).await?;
    tx.commit().await?;

    tracing::info!("Season {} activated by {}", id, user.uid);

    let response = season_response(&state, season).await?;
    Ok((StatusCode::OK, Json(ApiResponse::success(response))))
}

/// Finish the active season and freeze its final table
pub async fn finish_season(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> AppResult<impl IntoResponse> {
    let mut tx = state.pool.begin().await?;

    let season = db::seasons::find_for_update(&mut *tx, id)
        .await?
        .ok_or_else(|| AppError::not_found("Season"))?;
    let roster = db::seasons::roster(&mut *tx, id).await?;
    let results = db::results::for_season(&mut *tx, id).await?;

    let finished = engine::finish(&season, &roster, &results, Utc::now())?;

    if !db::seasons::swap_current(&mut *tx, Some(id), None).await? {
        return Err(EngineError::conflict("Season is not the current season").into());
    }

    let season = db::seasons::update(&mut *tx, &finished).await?;
    tx.commit().await?;

    tracing::info!("Season {} finished by {}", id, user.uid);

    let response = SeasonResponse::new(season, roster);
    Ok((StatusCode::OK, Json(ApiResponse::success(response))))
}

pub async fn set_roster_status(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path((id, team_id)): Path<(Uuid, Uuid)>,
    Json(input): Json<UpdateRosterEntry>,
) -> AppResult<impl IntoResponse> {
    let season = db::seasons::find(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::not_found("Season"))?;

    if !db::seasons::set_roster_status(&state.pool, id, team_id, input.status).await? {
        return Err(AppError::NotFound(
            "Team is not on this season's roster".to_string(),
        ));
    }

    tracing::info!(
        "Team {} set to {:?} in season {} by {}",
        team_id,
        input.status,
        id,
        user.uid
    );

    let response = season_response(&state, season).await?;
    Ok((StatusCode::OK, Json(ApiResponse::success(response))))
}
