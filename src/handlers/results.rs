//! Result handlers: reporting, confirmation, corrections and admin tools

use crate::db;
use crate::engine::booking::set_played;
use crate::engine::result::{self as engine, ResultAction};
use crate::error::{AppError, AppResult};
use crate::models::*;
use crate::notify;
use crate::validation::ValidationError;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Extension, Json,
};
use chrono::{DateTime, Utc};
use sqlx::PgConnection;
use uuid::Uuid;
use validator::Validate;

use super::{team_of, AppState};

/// Teams that should hear about a change made by `actor`: the opponent when
/// the actor played, both teams otherwise
fn recipients(result: &GameResult, actor: Option<Uuid>) -> Vec<Uuid> {
    match actor {
        Some(team) if team == result.home_team_id => vec![result.away_team_id],
        Some(team) if team == result.away_team_id => vec![result.home_team_id],
        _ => vec![result.home_team_id, result.away_team_id],
    }
}

fn notify_reported(state: &AppState, result: &GameResult, actor: Option<Uuid>) {
    state.notifier.notify_teams(
        &state.pool,
        recipients(result, actor),
        notify::result_reported(
            &result.home_team_name,
            &result.away_team_name,
            (result.home_score, result.away_score),
        ),
    );
}

/// Flip the linked booking between confirmed and played if it is not there yet
async fn sync_booking(
    conn: &mut PgConnection,
    booking_id: Uuid,
    played: bool,
    now: DateTime<Utc>,
) -> AppResult<()> {
    let booking = db::bookings::find_for_update(&mut *conn, booking_id)
        .await?
        .ok_or_else(|| AppError::not_found("Booking"))?;

    if let Some(changed) = set_played(&booking, played, now) {
        db::bookings::update(&mut *conn, &changed, booking.status()).await?;
        tracing::info!("Booking {} is now {:?}", booking_id, changed.status());
    }
    Ok(())
}

// =============================================================================
// Listings
// =============================================================================

/// Confirmed results of a season
pub async fn list_season_results(
    State(state): State<AppState>,
    Path(season_id): Path<Uuid>,
) -> AppResult<impl IntoResponse> {
    db::seasons::find(&state.pool, season_id)
        .await?
        .ok_or_else(|| AppError::not_found("Season"))?;

    let results = db::results::list_confirmed_for_season(&state.pool, season_id).await?;
    Ok((StatusCode::OK, Json(ApiResponse::success(results))))
}

/// Pending results the caller's team still has to confirm
pub async fn list_pending(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> AppResult<impl IntoResponse> {
    let team_id = team_of(&user)?;
    let results = db::results::list_awaiting_team(&state.pool, team_id).await?;
    Ok((StatusCode::OK, Json(ApiResponse::success(results))))
}

/// Results waiting for an admin decision
pub async fn list_disputed(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let results = db::results::list_disputed(&state.pool).await?;
    Ok((StatusCode::OK, Json(ApiResponse::success(results))))
}

// =============================================================================
// Team Endpoints
// =============================================================================

/// Report the score of a confirmed booking
pub async fn report_result(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(booking_id): Path<Uuid>,
    Json(input): Json<ReportResult>,
) -> AppResult<impl IntoResponse> {
    input.validate().map_err(ValidationError::from)?;
    let now = Utc::now();
    let mut tx = state.pool.begin().await?;

    let booking = db::bookings::find_for_update(&mut *tx, booking_id)
        .await?
        .ok_or_else(|| AppError::not_found("Booking"))?;

    let teams: Vec<Uuid> = booking
        .fixture()
        .map(|f| std::iter::once(f.home_team_id).chain(f.away_team_id).collect())
        .unwrap_or_default();
    let names = db::teams::names(&mut *tx, &teams).await?;

    let (result, played) =
        engine::report_for_booking(&booking, input.score(), &user, &names, input.location, now)?;

    let record = db::results::insert(&mut *tx, &result).await?;
    db::bookings::update(&mut *tx, &played, BookingStatus::Confirmed).await?;
    tx.commit().await?;

    notify_reported(&state, &result, result.reported_by_team_id);
    tracing::info!(
        "Result {} reported for booking {} by {}",
        result.id,
        booking_id,
        user.uid
    );

    Ok((StatusCode::CREATED, Json(ApiResponse::success(record))))
}

/// Report a game that had no booking
pub async fn report_unbooked(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Json(input): Json<UnbookedResult>,
) -> AppResult<impl IntoResponse> {
    db::seasons::find(&state.pool, input.season_id)
        .await?
        .ok_or_else(|| AppError::not_found("Season"))?;

    let names = db::teams::names(&state.pool, &[input.home_team_id, input.away_team_id]).await?;
    let result = engine::report_unbooked(&input, &user, &names, Utc::now())?;
    let record = db::results::insert(&state.pool, &result).await?;

    notify_reported(&state, &result, result.reported_by_team_id);
    tracing::info!("Unbooked result {} reported by {}", result.id, user.uid);

    Ok((StatusCode::CREATED, Json(ApiResponse::success(record))))
}

/// The opposing team confirms or disputes a pending result
pub async fn result_action(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
    Json(input): Json<ResultActionRequest>,
) -> AppResult<impl IntoResponse> {
    let team_id = team_of(&user)?;
    let reason = input.reason.clone();
    let mut tx = state.pool.begin().await?;

    let result = db::results::find_for_update(&mut *tx, id)
        .await?
        .ok_or_else(|| AppError::not_found("Result"))?;

    let reviewed = engine::handle_result_action(
        &result,
        team_id,
        &user.uid,
        input.action,
        input.reason,
        Utc::now(),
    )?;
    let record = db::results::update(&mut *tx, &reviewed).await?;
    tx.commit().await?;

    if input.action == ResultAction::Reject {
        state.notifier.notify_teams(
            &state.pool,
            recipients(&reviewed, Some(team_id)),
            notify::result_disputed(
                &reviewed.home_team_name,
                &reviewed.away_team_name,
                reason.as_deref(),
            ),
        );
    }

    tracing::info!("Result {} reviewed by team {}: {:?}", id, team_id, input.action);
    Ok((StatusCode::OK, Json(ApiResponse::success(record))))
}

/// Correct the scores of a result; it goes back to pending
pub async fn update_result(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
    Json(score): Json<Score>,
) -> AppResult<impl IntoResponse> {
    let mut tx = state.pool.begin().await?;

    let result = db::results::find_for_update(&mut *tx, id)
        .await?
        .ok_or_else(|| AppError::not_found("Result"))?;

    let edited = engine::update_scores(&result, score, &user, state.result_edit_policy, Utc::now())?;
    let record = db::results::update(&mut *tx, &edited).await?;
    tx.commit().await?;

    notify_reported(&state, &edited, user.team_id.filter(|t| edited.involves(*t)));
    tracing::info!("Result {} edited by {}", id, user.uid);

    Ok((StatusCode::OK, Json(ApiResponse::success(record))))
}

// =============================================================================
// Admin Endpoints
// =============================================================================

/// Force a score and confirm it
pub async fn admin_override(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
    Json(score): Json<Score>,
) -> AppResult<impl IntoResponse> {
    let mut tx = state.pool.begin().await?;

    let result = db::results::find_for_update(&mut *tx, id)
        .await?
        .ok_or_else(|| AppError::not_found("Result"))?;

    let forced = engine::admin_override(&result, score, &user, Utc::now())?;
    let record = db::results::update(&mut *tx, &forced).await?;
    tx.commit().await?;

    tracing::info!("Result {} overridden by admin {}", id, user.uid);
    Ok((StatusCode::OK, Json(ApiResponse::success(record))))
}

/// Enter a confirmed result; a linked confirmed booking becomes played.
/// Unlinked results need a date and a location.
pub async fn admin_create_result(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Json(input): Json<AdminCreateResult>,
) -> AppResult<impl IntoResponse> {
    let now = Utc::now();

    db::seasons::find(&state.pool, input.season_id)
        .await?
        .ok_or_else(|| AppError::not_found("Season"))?;

    let mut tx = state.pool.begin().await?;
    let booking = match input.booking_id {
        Some(booking_id) => Some(
            db::bookings::find_for_update(&mut *tx, booking_id)
                .await?
                .ok_or_else(|| AppError::not_found("Booking"))?,
        ),
        None => None,
    };
    let names = db::teams::names(&mut *tx, &[input.home_team_id, input.away_team_id]).await?;
    let result = engine::admin_create(&input, booking.as_ref(), &user, &names, now)?;

    if let Some(booking) = &booking {
        if let Some(played) = set_played(booking, true, now) {
            db::bookings::update(&mut *tx, &played, booking.status()).await?;
        }
    }

    let record = db::results::insert(&mut *tx, &result).await?;
    tx.commit().await?;

    tracing::info!("Result {} created by admin {}", result.id, user.uid);
    Ok((StatusCode::CREATED, Json(ApiResponse::success(record))))
}

/// Change the score of any result and optionally the linked booking's state
pub async fn admin_update_result(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
    Json(input): Json<AdminUpdateResult>,
) -> AppResult<impl IntoResponse> {
    let now = Utc::now();
    let mut tx = state.pool.begin().await?;

    let result = db::results::find_for_update(&mut *tx, id)
        .await?
        .ok_or_else(|| AppError::not_found("Result"))?;

    let score = Score {
        home_score: input.home_score,
        away_score: input.away_score,
    };
    let forced = engine::admin_override(&result, score, &user, now)?;
    let record = db::results::update(&mut *tx, &forced).await?;

    if let (Some(booking_id), Some(played)) = (result.booking_id, input.booking_played) {
        sync_booking(&mut *tx, booking_id, played, now).await?;
    }
    tx.commit().await?;

    tracing::info!("Result {} updated by admin {}", id, user.uid);
    Ok((StatusCode::OK, Json(ApiResponse::success(record))))
}

/// Delete a result; its played booking goes back to confirmed
pub async fn admin_delete_result(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> AppResult<impl IntoResponse> {
    let mut tx = state.pool.begin().await?;

    let result = db::results::find_for_update(&mut *tx, id)
        .await?
        .ok_or_else(|| AppError::not_found("Result"))?;

    db::results::delete(&mut *tx, id).await?;
    if let Some(booking_id) = result.booking_id {
        sync_booking(&mut *tx, booking_id, false, Utc::now()).await?;
    }
    tx.commit().await?;

    tracing::info!("Result {} deleted by admin {}", id, user.uid);
    Ok((StatusCode::OK, Json(ApiResponse::success(id))))
}
