//! Booking handlers: open slots, requests, confirmations and cancellations
//!
//! Every transition locks the booking row, lets the engine compute the new
//! state and writes it back guarded by the status that was read. Emails go
//! out only after the transaction committed.

use crate::db;
use crate::engine::booking::{self as engine, ActiveSeason, BookingAction};
use crate::engine::result::forfeit_result;
use crate::engine::slots::plan_slots;
use crate::engine::EngineError;
use crate::error::{AppError, AppResult};
use crate::models::*;
use crate::notify::{self, team_name};
use crate::validation::ValidationError;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Extension, Json,
};
use chrono::{Duration, Utc};
use uuid::Uuid;
use validator::Validate;

use super::{ensure_known, team_of, AppState};

/// Window listed when `to` is not given
const AVAILABLE_WINDOW_DAYS: i64 = 56;

// =============================================================================
// Listings
// =============================================================================

/// Open slots, optionally filtered by season and time window
pub async fn list_available(
    State(state): State<AppState>,
    Query(query): Query<AvailableSlotsQuery>,
) -> AppResult<impl IntoResponse> {
    let from = query.from.unwrap_or_else(Utc::now);
    let to = query
        .to
        .unwrap_or_else(|| from + Duration::days(AVAILABLE_WINDOW_DAYS));

    if to < from {
        return Err(ValidationError::InvalidDateRange.into());
    }

    let slots = db::bookings::list_available(&state.pool, query.season_id, from, to).await?;
    Ok((StatusCode::OK, Json(ApiResponse::success(slots))))
}

/// Bookings the caller's team plays in
pub async fn list_team_bookings(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> AppResult<impl IntoResponse> {
    let team_id = team_of(&user)?;
    let bookings = db::bookings::list_for_team(&state.pool, team_id).await?;
    Ok((StatusCode::OK, Json(ApiResponse::success(bookings))))
}

// =============================================================================
// Team Endpoints
// =============================================================================

/// Claim an open slot as home team against `away_team_id`
pub async fn request_slot(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
    Json(input): Json<RequestSlot>,
) -> AppResult<impl IntoResponse> {
    if !user.admin && !user.acts_for(input.home_team_id) {
        return Err(EngineError::permission("You can only request slots for your own team").into());
    }

    let missing =
        db::teams::missing(&state.pool, &[input.home_team_id, input.away_team_id]).await?;
    ensure_known("Team", &missing)?;

    let now = Utc::now();
    let mut tx = state.pool.begin().await?;

    let booking = db::bookings::find_for_update(&mut *tx, id)
        .await?
        .ok_or_else(|| AppError::not_found("Booking"))?;

    let season = db::seasons::find_active(&mut *tx).await?;
    let roster = match &season {
        Some(season) => db::seasons::roster(&mut *tx, season.id).await?,
        None => Vec::new(),
    };
    let open = db::bookings::open_fixtures(
        &mut *tx,
        booking.slot.season_id,
        input.home_team_id,
        input.away_team_id,
    )
    .await?;

    let claimed = engine::request_slot(
        &booking,
        season.as_ref().map(|season| ActiveSeason {
            season,
            roster: &roster,
        }),
        &open,
        input.home_team_id,
        input.away_team_id,
        &user.uid,
        now,
    )?;

    let record = db::bookings::update(&mut *tx, &claimed, BookingStatus::Available).await?;
    let names =
        db::teams::names(&mut *tx, &[input.home_team_id, input.away_team_id]).await?;
    tx.commit().await?;

    tracing::info!(
        "Slot {} requested by {} for {} vs {}",
        id,
        user.uid,
        input.home_team_id,
        input.away_team_id
    );

    state.notifier.notify_teams(
        &state.pool,
        vec![input.away_team_id],
        notify::slot_requested(
            team_name(&names, input.home_team_id),
            &state.notifier.kickoff(claimed.slot.date),
        ),
    );

    Ok((StatusCode::OK, Json(ApiResponse::success(record))))
}

/// The away team confirms or denies a request. Reaching the season's denial
/// limit turns the denial into a forfeit win for the home team.
pub async fn booking_action(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
    Json(input): Json<BookingActionRequest>,
) -> AppResult<impl IntoResponse> {
    let team_id = team_of(&user)?;
    let now = Utc::now();
    let reason = input.reason.clone();
    let mut tx = state.pool.begin().await?;

    let booking = db::bookings::find_for_update(&mut *tx, id)
        .await?
        .ok_or_else(|| AppError::not_found("Booking"))?;

    let updated = engine::handle_booking_action(&booking, team_id, input.action, input.reason, now)?;
    let record =
        db::bookings::update(&mut *tx, &updated, BookingStatus::PendingAwayConfirm).await?;

    let home_team_id = updated
        .fixture()
        .and_then(|f| f.opponent_of(team_id))
        .ok_or_else(|| EngineError::state("Booking has no home team"))?;

    let mut forfeit = None;
    if input.action == BookingAction::Deny {
        let season = db::seasons::find(&mut *tx, updated.slot.season_id)
            .await?
            .ok_or_else(|| AppError::not_found("Season"))?;
        let denials = db::bookings::count_denials(&mut *tx, season.id, team_id).await?;

        if engine::forfeit_due(&season, denials) {
            if let Some((winner, loser)) = engine::forfeit_parties(&updated) {
                let names = db::teams::names(&mut *tx, &[winner, loser]).await?;
                let result = forfeit_result(
                    &season,
                    &updated,
                    (winner, team_name(&names, winner)),
                    (loser, team_name(&names, loser)),
                    now,
                );
                db::results::insert(&mut *tx, &result).await?;
                tracing::info!(
                    "Team {} reached {} denials in season {}, forfeit result {} created",
                    loser,
                    denials,
                    season.id,
                    result.id
                );
                forfeit = Some(result);
            }
        }
    }

    let names = db::teams::names(&mut *tx, &[home_team_id, team_id]).await?;
    tx.commit().await?;

    let kickoff = state.notifier.kickoff(updated.slot.date);
    let away = team_name(&names, team_id);
    let message = match input.action {
        BookingAction::Confirm => notify::booking_confirmed(away, &kickoff),
        BookingAction::Deny => notify::booking_denied(away, &kickoff, reason.as_deref()),
    };
    state
        .notifier
        .notify_teams(&state.pool, vec![home_team_id], message);

    if let Some(result) = forfeit {
        state.notifier.notify_teams(
            &state.pool,
            vec![result.home_team_id, result.away_team_id],
            notify::forfeit_awarded(
                &result.home_team_name,
                &result.away_team_name,
                (result.home_score, result.away_score),
            ),
        );
    }

    tracing::info!("Booking {} answered by team {}: {:?}", id, team_id, input.action);
    Ok((StatusCode::OK, Json(ApiResponse::success(record))))
}

/// Cancel a confirmed booking; close to kick-off the opponent has to agree
pub async fn cancel_booking(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
    input: Option<Json<CancelBookingRequest>>,
) -> AppResult<impl IntoResponse> {
    let team_id = team_of(&user)?;
    let reason = input.map(|Json(input)| input.reason).unwrap_or_default();
    let now = Utc::now();
    let mut tx = state.pool.begin().await?;

    let booking = db::bookings::find_for_update(&mut *tx, id)
        .await?
        .ok_or_else(|| AppError::not_found("Booking"))?;
    let season = db::seasons::find(&mut *tx, booking.slot.season_id)
        .await?
        .ok_or_else(|| AppError::not_found("Season"))?;
    let pitch_verified = db::pitches::find(&mut *tx, booking.slot.pitch_id)
        .await?
        .is_some_and(|pitch| pitch.is_verified);

    let outcome = engine::initiate_cancellation(
        &booking,
        team_id,
        reason.clone(),
        &season,
        pitch_verified,
        now,
    )?;

    let record = db::bookings::update(&mut *tx, &outcome.booking, BookingStatus::Confirmed).await?;
    let replacement = match &outcome.replacement {
        Some(slot) => Some(db::bookings::insert(&mut *tx, slot).await?),
        None => None,
    };

    let opponent = outcome.booking.fixture().and_then(|f| f.opponent_of(team_id));
    let names = db::teams::names(&mut *tx, &[team_id]).await?;
    tx.commit().await?;

    if let Some(opponent) = opponent {
        let kickoff = state.notifier.kickoff(booking.slot.date);
        let team = team_name(&names, team_id);
        let message = if record.status == BookingStatus::Cancelled {
            notify::booking_cancelled(team, &kickoff, reason.as_deref())
        } else {
            notify::cancellation_requested(team, &kickoff, reason.as_deref())
        };
        state
            .notifier
            .notify_teams(&state.pool, vec![opponent], message);
    }

    tracing::info!(
        "Booking {} cancellation by team {}: {:?}",
        id,
        team_id,
        record.status
    );

    Ok((
        StatusCode::OK,
        Json(ApiResponse::success(CancellationResult {
            booking: record,
            replacement,
        })),
    ))
}

/// The opponent accepts or rejects a late cancellation
pub async fn respond_to_cancellation(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
    Json(input): Json<CancellationReply>,
) -> AppResult<impl IntoResponse> {
    let team_id = team_of(&user)?;
    let reason = input.reason.clone();
    let now = Utc::now();
    let mut tx = state.pool.begin().await?;

    let booking = db::bookings::find_for_update(&mut *tx, id)
        .await?
        .ok_or_else(|| AppError::not_found("Booking"))?;
    let pitch_verified = db::pitches::find(&mut *tx, booking.slot.pitch_id)
        .await?
        .is_some_and(|pitch| pitch.is_verified);

    let outcome = engine::respond_to_cancellation(
        &booking,
        team_id,
        input.response,
        input.reason,
        pitch_verified,
        now,
    )?;

    let record = db::bookings::update(
        &mut *tx,
        &outcome.booking,
        BookingStatus::CancellationPending,
    )
    .await?;
    let replacement = match &outcome.replacement {
        Some(slot) => Some(db::bookings::insert(&mut *tx, slot).await?),
        None => None,
    };

    let requester = outcome.booking.fixture().and_then(|f| f.opponent_of(team_id));
    let names = db::teams::names(&mut *tx, &[team_id]).await?;
    tx.commit().await?;

    if let Some(requester) = requester {
        let kickoff = state.notifier.kickoff(booking.slot.date);
        let team = team_name(&names, team_id);
        let message = match input.response {
            engine::CancellationResponse::Accept => notify::cancellation_accepted(team, &kickoff),
            engine::CancellationResponse::Reject => {
                notify::cancellation_rejected(team, &kickoff, reason.as_deref())
            }
        };
        state
            .notifier
            .notify_teams(&state.pool, vec![requester], message);
    }

    tracing::info!(
        "Cancellation of booking {} answered by team {}: {:?}",
        id,
        team_id,
        input.response
    );

    Ok((
        StatusCode::OK,
        Json(ApiResponse::success(CancellationResult {
            booking: record,
            replacement,
        })),
    ))
}

/// Booking created directly by an admin, or by a captain on their own pitch
pub async fn create_custom(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Json(mut input): Json<CustomBooking>,
) -> AppResult<impl IntoResponse> {
    input.validate().map_err(ValidationError::from)?;
    input.duration_minutes.get_or_insert(state.default_slot_minutes);

    let season = db::seasons::find(&state.pool, input.season_id)
        .await?
        .ok_or_else(|| AppError::not_found("Season"))?;
    let pitch = db::pitches::find(&state.pool, input.pitch_id)
        .await?
        .ok_or_else(|| AppError::not_found("Pitch"))?;

    let teams: Vec<Uuid> = [input.home_team_id, input.away_team_id]
        .into_iter()
        .flatten()
        .collect();
    ensure_known("Team", &db::teams::missing(&state.pool, &teams).await?)?;

    let booking = engine::create_custom_booking(&input, &user, &season, &pitch, Utc::now())?;
    let record = db::bookings::insert(&state.pool, &booking).await?;

    if let (BookingState::PendingAwayConfirm { fixture }, Some(away)) =
        (&booking.state, input.away_team_id)
    {
        let names = db::teams::names(&state.pool, &[fixture.home_team_id]).await?;
        state.notifier.notify_teams(
            &state.pool,
            vec![away],
            notify::slot_requested(
                team_name(&names, fixture.home_team_id),
                &state.notifier.kickoff(booking.slot.date),
            ),
        );
    }

    tracing::info!(
        "Custom booking {} created by {} on pitch {}",
        record.id,
        user.uid,
        pitch.name
    );

    Ok((StatusCode::CREATED, Json(ApiResponse::success(record))))
}

// =============================================================================
// Admin Endpoints
// =============================================================================

/// Generate open slots for a season
pub async fn bulk_create(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Json(input): Json<BulkSlotRequest>,
) -> AppResult<impl IntoResponse> {
    let planned = plan_slots(
        &input,
        state.timezone,
        state.default_slot_minutes,
        &user.uid,
        Utc::now(),
    )?;

    let season_id = input.season_id.ok_or_else(|| ValidationError::Required {
        field: "season_id".to_string(),
    })?;
    db::seasons::find(&state.pool, season_id)
        .await?
        .ok_or_else(|| AppError::not_found("Season"))?;

    let missing = db::pitches::missing(&state.pool, &input.pitch_ids).await?;
    ensure_known("Pitch", &missing)?;

    let mut tx = state.pool.begin().await?;
    let bookings = db::bookings::insert_open_slots(&mut *tx, &planned).await?;
    tx.commit().await?;

    tracing::info!(
        "{} slots created for season {} by {}",
        bookings.len(),
        season_id,
        user.uid
    );

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(BulkSlotResponse {
            created: bookings.len(),
            bookings,
        })),
    ))
}

/// Cancel any booking, whatever its state
pub async fn admin_cancel(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
    Json(input): Json<AdminCancelRequest>,
) -> AppResult<impl IntoResponse> {
    let mut tx = state.pool.begin().await?;

    let booking = db::bookings::find_for_update(&mut *tx, id)
        .await?
        .ok_or_else(|| AppError::not_found("Booking"))?;

    let cancelled = engine::admin_cancel(&booking, &input.reason, &user.uid, Utc::now())?;
    let record = db::bookings::update(&mut *tx, &cancelled, booking.status()).await?;
    tx.commit().await?;

    if let Some(fixture) = booking.fixture() {
        let teams = std::iter::once(fixture.home_team_id)
            .chain(fixture.away_team_id)
            .collect();
        state.notifier.notify_teams(
            &state.pool,
            teams,
            notify::admin_cancelled(&state.notifier.kickoff(booking.slot.date), input.reason.trim()),
        );
    }

    tracing::info!("Booking {} cancelled by admin {}", id, user.uid);
    Ok((StatusCode::OK, Json(ApiResponse::success(record))))
}
