//! Booking queries

use crate::engine::EngineError;
use crate::error::AppResult;
use crate::models::{Booking, BookingRecord, BookingStatus};
use chrono::{DateTime, Utc};
use sqlx::{PgConnection, PgExecutor, Postgres, QueryBuilder};
use uuid::Uuid;

/// Rows per INSERT statement; keeps bind parameters below the Postgres limit
const INSERT_CHUNK: usize = 1000;

fn into_booking(record: BookingRecord) -> AppResult<Booking> {
    Ok(Booking::try_from(record)?)
}

/// Load and lock a booking for the rest of the transaction
pub async fn find_for_update<'e>(
    exec: impl PgExecutor<'e>,
    id: Uuid,
) -> AppResult<Option<Booking>> {
    sqlx::query_as::<_, BookingRecord>("SELECT * FROM bookings WHERE id = $1 FOR UPDATE")
        .bind(id)
        .fetch_optional(exec)
        .await?
        .map(into_booking)
        .transpose()
}

pub async fn insert<'e>(exec: impl PgExecutor<'e>, booking: &Booking) -> AppResult<BookingRecord> {
    let r = booking.to_record();
    let record = sqlx::query_as::<_, BookingRecord>(
        r#"
        INSERT INTO bookings (
            id, date, duration_minutes, pitch_id, season_id, created_by,
            home_team_id, away_team_id, status, is_available, friendly,
            denied_by_team_id, denied_at, denial_reason,
            cancelled_by_team_id, cancelled_at,
            cancellation_requested_by_team_id, cancellation_requested_at,
            cancellation_request_reason, cancellation_rejection_reason,
            admin_cancelled_by, admin_cancellation_reason, created_at, updated_at
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16,
                $17, $18, $19, $20, $21, $22, $23, $24)
        RETURNING *
        "#,
    )
    .bind(r.id)
    .bind(r.date)
    .bind(r.duration_minutes)
    .bind(r.pitch_id)
    .bind(r.season_id)
    .bind(&r.created_by)
    .bind(r.home_team_id)
    .bind(r.away_team_id)
    .bind(r.status)
    .bind(r.is_available)
    .bind(r.friendly)
    .bind(r.denied_by_team_id)
    .bind(r.denied_at)
    .bind(&r.denial_reason)
    .bind(r.cancelled_by_team_id)
    .bind(r.cancelled_at)
    .bind(r.cancellation_requested_by_team_id)
    .bind(r.cancellation_requested_at)
    .bind(&r.cancellation_request_reason)
    .bind(&r.cancellation_rejection_reason)
    .bind(&r.admin_cancelled_by)
    .bind(&r.admin_cancellation_reason)
    .bind(r.created_at)
    .bind(r.updated_at)
    .fetch_one(exec)
    .await?;

    Ok(record)
}

/// Insert open slots in batches. Only the slot columns are written; the rest
/// take their defaults.
pub async fn insert_open_slots(
    conn: &mut PgConnection,
    bookings: &[Booking],
) -> AppResult<Vec<BookingRecord>> {
    let mut created = Vec::with_capacity(bookings.len());

    for chunk in bookings.chunks(INSERT_CHUNK) {
        let mut builder: QueryBuilder<Postgres> = QueryBuilder::new(
            "INSERT INTO bookings (id, date, duration_minutes, pitch_id, season_id, created_by, created_at, updated_at) ",
        );
        builder.push_values(chunk, |mut row, booking| {
            row.push_bind(booking.id)
                .push_bind(booking.slot.date)
                .push_bind(booking.slot.duration_minutes)
                .push_bind(booking.slot.pitch_id)
                .push_bind(booking.slot.season_id)
                .push_bind(&booking.created_by)
                .push_bind(booking.created_at)
                .push_bind(booking.updated_at);
        });
        builder.push(" RETURNING *");

        let mut records = builder
            .build_query_as::<BookingRecord>()
            .fetch_all(&mut *conn)
            .await?;
        created.append(&mut records);
    }

    Ok(created)
}

/// Write a transition. The row must still be in `expected`, otherwise someone
/// else changed it first and the write is refused.
pub async fn update<'e>(
    exec: impl PgExecutor<'e>,
    booking: &Booking,
    expected: BookingStatus,
) -> AppResult<BookingRecord> {
    let r = booking.to_record();
    let record = sqlx::query_as::<_, BookingRecord>(
        r#"
        UPDATE bookings SET
            created_by = $2,
            home_team_id = $3,
            away_team_id = $4,
            status = $5,
            is_available = $6,
            friendly = $7,
            denied_by_team_id = $8,
            denied_at = $9,
            denial_reason = $10,
            cancelled_by_team_id = $11,
            cancelled_at = $12,
            cancellation_requested_by_team_id = $13,
            cancellation_requested_at = $14,
            cancellation_request_reason = $15,
            cancellation_rejection_reason = $16,
            admin_cancelled_by = $17,
            admin_cancellation_reason = $18,
            updated_at = $19
        WHERE id = $1 AND status = $20
        RETURNING *
        "#,
    )
    .bind(r.id)
    .bind(&r.created_by)
    .bind(r.home_team_id)
    .bind(r.away_team_id)
    .bind(r.status)
    .bind(r.is_available)
    .bind(r.friendly)
    .bind(r.denied_by_team_id)
    .bind(r.denied_at)
    .bind(&r.denial_reason)
    .bind(r.cancelled_by_team_id)
    .bind(r.cancelled_at)
    .bind(r.cancellation_requested_by_team_id)
    .bind(r.cancellation_requested_at)
    .bind(&r.cancellation_request_reason)
    .bind(&r.cancellation_rejection_reason)
    .bind(&r.admin_cancelled_by)
    .bind(&r.admin_cancellation_reason)
    .bind(r.updated_at)
    .bind(expected)
    .fetch_optional(exec)
    .await?;

    record.ok_or_else(|| EngineError::conflict("Booking was changed by someone else, please reload").into())
}

/// Open (pending or confirmed) bookings between two teams in a season, in either order
pub async fn open_fixtures<'e>(
    exec: impl PgExecutor<'e>,
    season_id: Uuid,
    team_a: Uuid,
    team_b: Uuid,
) -> AppResult<Vec<Booking>> {
    sqlx::query_as::<_, BookingRecord>(
        r#"
        SELECT * FROM bookings
        WHERE season_id = $1
          AND status IN ('pending_away_confirm', 'confirmed')
          AND ((home_team_id = $2 AND away_team_id = $3)
            OR (home_team_id = $3 AND away_team_id = $2))
        "#,
    )
    .bind(season_id)
    .bind(team_a)
    .bind(team_b)
    .fetch_all(exec)
    .await?
    .into_iter()
    .map(into_booking)
    .collect()
}

/// Number of requests `team_id` has denied in the season
pub async fn count_denials<'e>(
    exec: impl PgExecutor<'e>,
    season_id: Uuid,
    team_id: Uuid,
) -> AppResult<i64> {
    let count: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM bookings WHERE season_id = $1 AND status = 'denied' AND denied_by_team_id = $2",
    )
    .bind(season_id)
    .bind(team_id)
    .fetch_one(exec)
    .await?;

    Ok(count)
}

pub async fn list_available<'e>(
    exec: impl PgExecutor<'e>,
    season_id: Option<Uuid>,
    from: DateTime<Utc>,
    to: DateTime<Utc>,
) -> AppResult<Vec<BookingRecord>> {
    let records = sqlx::query_as::<_, BookingRecord>(
        r#"
        SELECT * FROM bookings
        WHERE is_available = true
          AND status = 'available'
          AND ($1::uuid IS NULL OR season_id = $1)
          AND date >= $2
          AND date <= $3
        ORDER BY date ASC, pitch_id ASC
        "#,
    )
    .bind(season_id)
    .bind(from)
    .bind(to)
    .fetch_all(exec)
    .await?;

    Ok(records)
}

pub async fn list_for_team<'e>(
    exec: impl PgExecutor<'e>,
    team_id: Uuid,
) -> AppResult<Vec<BookingRecord>> {
    let records = sqlx::query_as::<_, BookingRecord>(
        r#"
        SELECT * FROM bookings
        WHERE home_team_id = $1 OR away_team_id = $1
        ORDER BY date DESC
        "#,
    )
    .bind(team_id)
    .fetch_all(exec)
    .await?;

    Ok(records)
}
