//! Bulk generation of open slots from a weekly pattern

use super::EngineResult;
use crate::models::{Booking, BulkSlotRequest, Slot};
use crate::validation::{parse_slot_time, ValidationError};
use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;
use uuid::Uuid;

/// Longest date range a single bulk request may cover
pub const MAX_RANGE_DAYS: i64 = 366;

pub const MIN_DURATION_MINUTES: i32 = 15;
pub const MAX_DURATION_MINUTES: i32 = 300;

fn required<T: Clone>(value: &Option<T>, field: &str) -> Result<T, ValidationError> {
    value.clone().ok_or_else(|| ValidationError::Required {
        field: field.to_string(),
    })
}

fn non_empty<T>(values: &[T], field: &str) -> Result<(), ValidationError> {
    if values.is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }
    Ok(())
}

/// Resolve a league-local date and time to UTC
pub fn local_to_utc(tz: Tz, date: NaiveDate, time: NaiveTime) -> Result<DateTime<Utc>, ValidationError> {
    let local = date.and_time(time);
    tz.from_local_datetime(&local)
        .single()
        .map(|dt| dt.with_timezone(&Utc))
        .ok_or_else(|| ValidationError::AmbiguousLocalTime {
            value: local.format("%Y-%m-%d %H:%M").to_string(),
        })
}

/// Expand a bulk request into open bookings: every selected weekday in the
/// range, on every pitch, at every time.
pub fn plan_slots(
    request: &BulkSlotRequest,
    tz: Tz,
    default_duration_minutes: i32,
    created_by: &str,
    now: DateTime<Utc>,
) -> EngineResult<Vec<Booking>> {
    let season_id: Uuid = required(&request.season_id, "season_id")?;
    let start = required(&request.start_date, "start_date")?;
    let end = required(&request.end_date, "end_date")?;
    non_empty(&request.pitch_ids, "pitch_ids")?;
    non_empty(&request.days_of_week, "days_of_week")?;
    non_empty(&request.times, "times")?;

    if end < start {
        return Err(ValidationError::InvalidDateRange.into());
    }
    if (end - start).num_days() > MAX_RANGE_DAYS {
        return Err(ValidationError::DateRangeTooLong {
            max_days: MAX_RANGE_DAYS,
        }
        .into());
    }

    if let Some(&day) = request.days_of_week.iter().find(|&&d| d > 6) {
        return Err(ValidationError::InvalidWeekday { value: day }.into());
    }

    let times = request
        .times
        .iter()
        .map(|t| parse_slot_time(t))
        .collect::<Result<Vec<_>, _>>()?;

    let duration_minutes = request.duration_minutes.unwrap_or(default_duration_minutes);
    if !(MIN_DURATION_MINUTES..=MAX_DURATION_MINUTES).contains(&duration_minutes) {
        return Err(ValidationError::InvalidDuration {
            min: MIN_DURATION_MINUTES,
            max: MAX_DURATION_MINUTES,
        }
        .into());
    }

    let mut bookings = Vec::new();
    let mut date = start;
    while date <= end {
        if request
            .days_of_week
            .contains(&date.weekday().num_days_from_sunday())
        {
            for &pitch_id in &request.pitch_ids {
                for &time in &times {
                    let slot = Slot {
                        date: local_to_utc(tz, date, time)?,
                        duration_minutes,
                        pitch_id,
                        season_id,
                    };
                    bookings.push(Booking::open(slot, created_by, now));
                }
            }
        }
        date += Duration::days(1);
    }

    if bookings.is_empty() {
        return Err(ValidationError::EmptySlotPlan.into());
    }

    Ok(bookings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::fixtures::now;
    use crate::engine::EngineError;
    use crate::models::BookingStatus;
    use chrono::Weekday;

    fn request() -> BulkSlotRequest {
        BulkSlotRequest {
            season_id: Some(Uuid::new_v4()),
            pitch_ids: vec![Uuid::new_v4(), Uuid::new_v4()],
            // Monday 2025-10-06 to Sunday 2025-10-19
            start_date: NaiveDate::from_ymd_opt(2025, 10, 6),
            end_date: NaiveDate::from_ymd_opt(2025, 10, 19),
            days_of_week: vec![2, 4],
            times: vec!["18:00".to_string(), "19:30".to_string()],
            duration_minutes: None,
        }
    }

    fn validation(err: EngineError) -> ValidationError {
        match err {
            EngineError::Validation(err) => err,
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn test_cross_product() {
        let bookings = plan_slots(&request(), chrono_tz::Europe::Berlin, 90, "admin", now()).unwrap();

        // 2 weeks x 2 weekdays x 2 pitches x 2 times
        assert_eq!(bookings.len(), 16);
        assert!(bookings.iter().all(|b| b.status() == BookingStatus::Available));
        assert!(bookings.iter().all(|b| b.slot.duration_minutes == 90));

        let berlin = chrono_tz::Europe::Berlin;
        for booking in &bookings {
            let local = booking.slot.date.with_timezone(&berlin);
            assert!(matches!(local.weekday(), Weekday::Tue | Weekday::Thu));
        }
    }

    #[test]
    fn test_times_are_league_local() {
        let mut req = request();
        req.pitch_ids.truncate(1);
        req.days_of_week = vec![2];
        req.times = vec!["18:00".to_string()];
        req.start_date = NaiveDate::from_ymd_opt(2025, 10, 7);
        req.end_date = NaiveDate::from_ymd_opt(2025, 10, 7);

        let bookings = plan_slots(&req, chrono_tz::Europe::Berlin, 90, "admin", now()).unwrap();
        assert_eq!(bookings.len(), 1);
        // CEST is UTC+2 in early October
        assert_eq!(
            bookings[0].slot.date,
            Utc.with_ymd_and_hms(2025, 10, 7, 16, 0, 0).unwrap()
        );
    }

    #[test]
    fn test_missing_fields() {
        let mut req = request();
        req.season_id = None;
        assert!(matches!(
            validation(plan_slots(&req, chrono_tz::UTC, 90, "admin", now()).unwrap_err()),
            ValidationError::Required { .. }
        ));

        let mut req = request();
        req.times.clear();
        assert!(matches!(
            validation(plan_slots(&req, chrono_tz::UTC, 90, "admin", now()).unwrap_err()),
            ValidationError::Required { .. }
        ));
    }

    #[test]
    fn test_empty_cross_product() {
        let mut req = request();
        // A single Monday with only Saturdays selected
        req.end_date = req.start_date;
        req.days_of_week = vec![6];
        assert!(matches!(
            validation(plan_slots(&req, chrono_tz::UTC, 90, "admin", now()).unwrap_err()),
            ValidationError::EmptySlotPlan
        ));
    }

    #[test]
    fn test_rejects_bad_input() {
        let mut req = request();
        req.days_of_week = vec![7];
        assert!(matches!(
            validation(plan_slots(&req, chrono_tz::UTC, 90, "admin", now()).unwrap_err()),
            ValidationError::InvalidWeekday { value: 7 }
        ));

        let mut req = request();
        req.times = vec!["abends".to_string()];
        assert!(matches!(
            validation(plan_slots(&req, chrono_tz::UTC, 90, "admin", now()).unwrap_err()),
            ValidationError::InvalidTime { .. }
        ));

        let mut req = request();
        req.duration_minutes = Some(5);
        assert!(matches!(
            validation(plan_slots(&req, chrono_tz::UTC, 90, "admin", now()).unwrap_err()),
            ValidationError::InvalidDuration { .. }
        ));

        let mut req = request();
        std::mem::swap(&mut req.start_date, &mut req.end_date);
        assert!(matches!(
            validation(plan_slots(&req, chrono_tz::UTC, 90, "admin", now()).unwrap_err()),
            ValidationError::InvalidDateRange
        ));
    }

    #[test]
    fn test_nonexistent_local_time() {
        // Clocks jump from 02:00 to 03:00 on 2026-03-29 in Berlin
        let date = NaiveDate::from_ymd_opt(2026, 3, 29).unwrap();
        let time = NaiveTime::from_hms_opt(2, 30, 0).unwrap();
        assert!(matches!(
            local_to_utc(chrono_tz::Europe::Berlin, date, time),
            Err(ValidationError::AmbiguousLocalTime { .. })
        ));
    }
}
