//! Slot claiming, confirmation, denial and cancellation

use super::{EngineError, EngineResult, SYSTEM_USER};
use crate::models::*;
use crate::validation::{validate_reason, ValidationError};
use chrono::{DateTime, Duration, Utc};
use serde::Deserialize;
use uuid::Uuid;

/// Default slot length when a request does not name one
pub const DEFAULT_DURATION_MINUTES: i32 = 90;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BookingAction {
    Confirm,
    Deny,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CancellationResponse {
    Accept,
    Reject,
}

/// The active season together with its roster
#[derive(Debug, Clone, Copy)]
pub struct ActiveSeason<'a> {
    pub season: &'a Season,
    pub roster: &'a [RosterEntry],
}

impl ActiveSeason<'_> {
    fn is_eligible(&self, team_id: Uuid) -> bool {
        self.roster
            .iter()
            .any(|entry| entry.team_id == team_id && entry.status == RosterStatus::Active)
    }
}

/// A cancelled booking and, for verified pitches, the slot that replaces it
#[derive(Debug, Clone)]
pub struct CancellationOutcome {
    pub booking: Booking,
    pub replacement: Option<Booking>,
}

/// Whether `bookings` already holds an open fixture between `a` and `b` in the season
pub fn has_open_fixture(bookings: &[Booking], season_id: Uuid, a: Uuid, b: Uuid) -> bool {
    bookings.iter().any(|booking| {
        booking.slot.season_id == season_id
            && matches!(
                booking.state,
                BookingState::PendingAwayConfirm { .. } | BookingState::Confirmed { .. }
            )
            && booking.fixture().is_some_and(|f| f.is_pairing(a, b))
    })
}

/// Claim an open slot for a fixture; the away team has to confirm afterwards
pub fn request_slot(
    booking: &Booking,
    active_season: Option<ActiveSeason<'_>>,
    season_bookings: &[Booking],
    home_team_id: Uuid,
    away_team_id: Uuid,
    requested_by: &str,
    now: DateTime<Utc>,
) -> EngineResult<Booking> {
    if booking.status() != BookingStatus::Available {
        return Err(EngineError::conflict("This slot has already been taken"));
    }

    let active = active_season.ok_or_else(|| EngineError::conflict("There is no active season"))?;

    if booking.slot.season_id != active.season.id {
        return Err(EngineError::conflict(
            "This slot does not belong to the active season",
        ));
    }

    if home_team_id == away_team_id {
        return Err(ValidationError::SameTeam.into());
    }

    if !active.is_eligible(home_team_id) {
        return Err(EngineError::conflict(
            "Team is not registered for the active season",
        ));
    }

    if has_open_fixture(
        season_bookings,
        booking.slot.season_id,
        home_team_id,
        away_team_id,
    ) {
        return Err(EngineError::conflict(
            "These teams already have an open booking this season",
        ));
    }

    let mut claimed = booking.with_state(
        BookingState::PendingAwayConfirm {
            fixture: Fixture::new(home_team_id, away_team_id),
        },
        now,
    );
    claimed.created_by = requested_by.to_string();
    Ok(claimed)
}

/// The away team's answer to a slot request
pub fn handle_booking_action(
    booking: &Booking,
    acting_team_id: Uuid,
    action: BookingAction,
    reason: Option<String>,
    now: DateTime<Utc>,
) -> EngineResult<Booking> {
    let BookingState::PendingAwayConfirm { fixture } = &booking.state else {
        return Err(EngineError::state("Booking is not awaiting confirmation"));
    };

    if fixture.away_team_id != Some(acting_team_id) {
        return Err(EngineError::state(
            "Only the away team can respond to this request",
        ));
    }

    validate_reason("reason", reason.as_deref())?;

    let state = match action {
        BookingAction::Confirm => BookingState::Confirmed {
            fixture: *fixture,
            rejected_cancellation: None,
        },
        BookingAction::Deny => BookingState::Denied {
            fixture: *fixture,
            denial: Denial {
                team_id: acting_team_id,
                at: now,
                reason,
            },
        },
    };

    Ok(booking.with_state(state, now))
}

/// Whether a team that has denied `denial_count` requests this season forfeits
pub fn forfeit_due(season: &Season, denial_count: i64) -> bool {
    season.max_denials > 0 && denial_count >= i64::from(season.max_denials)
}

/// Winner and loser of the forfeit a denied booking would produce
pub fn forfeit_parties(booking: &Booking) -> Option<(Uuid, Uuid)> {
    match &booking.state {
        BookingState::Denied { fixture, denial } => Some((fixture.home_team_id, denial.team_id)),
        _ => None,
    }
}

/// Point in time after which cancelling needs the opponent's consent
pub fn cancellation_deadline(booking: &Booking, deadline_days: i32) -> Option<DateTime<Utc>> {
    (deadline_days > 0).then(|| booking.slot.date - Duration::days(i64::from(deadline_days)))
}

pub fn initiate_cancellation(
    booking: &Booking,
    cancelling_team_id: Uuid,
    reason: Option<String>,
    season: &Season,
    pitch_verified: bool,
    now: DateTime<Utc>,
) -> EngineResult<CancellationOutcome> {
    let BookingState::Confirmed { fixture, .. } = &booking.state else {
        return Err(EngineError::state("Only confirmed bookings can be cancelled"));
    };

    if !fixture.involves(cancelling_team_id) {
        return Err(EngineError::permission(
            "Only participating teams can cancel this booking",
        ));
    }

    validate_reason("reason", reason.as_deref())?;

    // A hold without an opponent has nobody to ask for consent
    let in_time = fixture.away_team_id.is_none()
        || match cancellation_deadline(booking, season.cancellation_deadline_days) {
            None => true,
            Some(deadline) => now < deadline,
        };

    if in_time {
        return Ok(cancel_directly(
            booking,
            *fixture,
            cancelling_team_id,
            None,
            pitch_verified,
            now,
        ));
    }

    let pending = booking.with_state(
        BookingState::CancellationPending {
            fixture: *fixture,
            request: CancellationRequest {
                team_id: cancelling_team_id,
                at: now,
                reason,
            },
        },
        now,
    );

    Ok(CancellationOutcome {
        booking: pending,
        replacement: None,
    })
}

pub fn respond_to_cancellation(
    booking: &Booking,
    responding_team_id: Uuid,
    response: CancellationResponse,
    reason: Option<String>,
    pitch_verified: bool,
    now: DateTime<Utc>,
) -> EngineResult<CancellationOutcome> {
    let BookingState::CancellationPending { fixture, request } = &booking.state else {
        return Err(EngineError::state(
            "No cancellation request is pending for this booking",
        ));
    };

    if request.team_id == responding_team_id {
        return Err(EngineError::state(
            "The requesting team cannot answer its own cancellation request",
        ));
    }

    if !fixture.involves(responding_team_id) {
        return Err(EngineError::permission(
            "Only the opposing team can answer this cancellation request",
        ));
    }

    validate_reason("reason", reason.as_deref())?;

    match response {
        CancellationResponse::Accept => Ok(cancel_directly(
            booking,
            *fixture,
            request.team_id,
            Some(request.clone()),
            pitch_verified,
            now,
        )),
        CancellationResponse::Reject => Ok(CancellationOutcome {
            booking: booking.with_state(
                BookingState::Confirmed {
                    fixture: *fixture,
                    rejected_cancellation: reason,
                },
                now,
            ),
            replacement: None,
        }),
    }
}

fn cancel_directly(
    booking: &Booking,
    fixture: Fixture,
    cancelled_by_team_id: Uuid,
    request: Option<CancellationRequest>,
    pitch_verified: bool,
    now: DateTime<Utc>,
) -> CancellationOutcome {
    let cancelled = booking.with_state(
        BookingState::Cancelled {
            fixture,
            cancelled_by_team_id,
            cancelled_at: now,
            request,
        },
        now,
    );

    // Verified pitches are recurring league slots and must stay bookable.
    let replacement = pitch_verified.then(|| Booking::open(booking.slot.clone(), SYSTEM_USER, now));

    CancellationOutcome {
        booking: cancelled,
        replacement,
    }
}

/// A booking created directly by an admin or by a captain on their own pitch
pub fn create_custom_booking(
    input: &CustomBooking,
    user: &AuthUser,
    season: &Season,
    pitch: &Pitch,
    now: DateTime<Utc>,
) -> EngineResult<Booking> {
    if season.status != SeasonStatus::Active {
        return Err(ValidationError::SeasonNotActive.into());
    }

    if input.away_team_id.is_some() && input.home_team_id.is_none() {
        return Err(ValidationError::Required {
            field: "home_team_id".to_string(),
        }
        .into());
    }

    if input.home_team_id.is_some() && input.home_team_id == input.away_team_id {
        return Err(ValidationError::SameTeam.into());
    }

    if !user.admin {
        let team_id = user
            .team_id
            .ok_or_else(|| EngineError::permission("Your account is not linked to a team"))?;

        if pitch.is_verified {
            return Err(EngineError::permission(
                "Teams can only create bookings on unverified pitches",
            ));
        }
        if pitch.owner_team_id != Some(team_id) {
            return Err(EngineError::permission(
                "Teams can only create bookings on their own pitch",
            ));
        }
        if input.home_team_id != Some(team_id) {
            return Err(EngineError::permission(
                "Teams can only create bookings as the home team",
            ));
        }
    }

    let state = match (input.home_team_id, input.away_team_id) {
        (Some(home), Some(away)) => BookingState::PendingAwayConfirm {
            fixture: Fixture::new(home, away),
        },
        (Some(home), None) => BookingState::Confirmed {
            fixture: Fixture {
                home_team_id: home,
                away_team_id: None,
            },
            rejected_cancellation: None,
        },
        (None, _) => BookingState::Available,
    };

    let slot = Slot {
        date: input.date,
        duration_minutes: input.duration_minutes.unwrap_or(DEFAULT_DURATION_MINUTES),
        pitch_id: pitch.id,
        season_id: season.id,
    };

    let mut booking = Booking::open(slot, &user.uid, now).with_state(state, now);
    booking.friendly = input.friendly;
    Ok(booking)
}

/// Admin override: cancel regardless of the current status
pub fn admin_cancel(booking: &Booking, reason: &str, admin_id: &str, now: DateTime<Utc>) -> EngineResult<Booking> {
    if reason.trim().is_empty() {
        return Err(ValidationError::Required {
            field: "reason".to_string(),
        }
        .into());
    }
    validate_reason("reason", Some(reason))?;

    Ok(booking.with_state(
        BookingState::CancelledAdmin {
            fixture: booking.fixture().copied(),
            admin_id: admin_id.to_string(),
            reason: reason.trim().to_string(),
            cancelled_at: now,
        },
        now,
    ))
}

/// Move a confirmed booking to `played`
pub fn mark_played(booking: &Booking, now: DateTime<Utc>) -> EngineResult<Booking> {
    match &booking.state {
        BookingState::Confirmed { fixture, .. } => {
            Ok(booking.with_state(BookingState::Played { fixture: *fixture }, now))
        }
        _ => Err(EngineError::state(
            "Results can only be reported for confirmed bookings",
        )),
    }
}

/// Flip a booking between `confirmed` and `played`; `None` when nothing changes
pub fn set_played(booking: &Booking, played: bool, now: DateTime<Utc>) -> Option<Booking> {
    match (&booking.state, played) {
        (BookingState::Confirmed { fixture, .. }, true) => {
            Some(booking.with_state(BookingState::Played { fixture: *fixture }, now))
        }
        (BookingState::Played { fixture }, false) => Some(booking.with_state(
            BookingState::Confirmed {
                fixture: *fixture,
                rejected_cancellation: None,
            },
            now,
        )),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::fixtures::*;

    struct League {
        season: Season,
        roster: Vec<RosterEntry>,
        home: Uuid,
        away: Uuid,
    }

    fn league(rules: SeasonRules) -> League {
        let (home, away) = (Uuid::new_v4(), Uuid::new_v4());
        League {
            season: season(rules),
            roster: roster(&[(home, "FC Buntspecht"), (away, "Rote Socken")]),
            home,
            away,
        }
    }

    impl League {
        fn active(&self) -> Option<ActiveSeason<'_>> {
            Some(ActiveSeason {
                season: &self.season,
                roster: &self.roster,
            })
        }

        fn pending(&self) -> Booking {
            request_slot(
                &open_slot(self.season.id),
                self.active(),
                &[],
                self.home,
                self.away,
                "captain",
                now(),
            )
            .unwrap()
        }
    }

    fn assert_availability_invariant(booking: &Booking) {
        let record = booking.to_record();
        assert_eq!(
            record.is_available,
            record.home_team_id.is_none() && record.away_team_id.is_none()
        );
    }

    #[test]
    fn test_request_slot_claims_open_slot() {
        let league = league(SeasonRules::default());
        let booking = league.pending();

        assert_eq!(booking.status(), BookingStatus::PendingAwayConfirm);
        assert_eq!(booking.created_by, "captain");
        assert_eq!(booking.fixture(), Some(&Fixture::new(league.home, league.away)));
        assert!(!booking.is_available());
        assert_availability_invariant(&booking);
    }

    #[test]
    fn test_request_slot_rejects_taken_slot() {
        let league = league(SeasonRules::default());
        let taken = league.pending();

        let err = request_slot(
            &taken,
            league.active(),
            &[],
            league.home,
            league.away,
            "captain",
            now(),
        )
        .unwrap_err();
        assert!(matches!(err, EngineError::Conflict(_)));
    }

    #[test]
    fn test_request_slot_without_active_season() {
        let league = league(SeasonRules::default());
        let err = request_slot(
            &open_slot(league.season.id),
            None,
            &[],
            league.home,
            league.away,
            "captain",
            now(),
        )
        .unwrap_err();
        assert!(matches!(err, EngineError::Conflict(_)));
    }

    #[test]
    fn test_request_slot_requires_registered_home_team() {
        let league = league(SeasonRules::default());
        let err = request_slot(
            &open_slot(league.season.id),
            league.active(),
            &[],
            Uuid::new_v4(),
            league.away,
            "captain",
            now(),
        )
        .unwrap_err();
        assert!(matches!(err, EngineError::Conflict(_)));
    }

    #[test]
    fn test_request_slot_rejects_inactive_roster_entry() {
        let mut league = league(SeasonRules::default());
        league.roster[0].status = RosterStatus::Inactive;
        let err = request_slot(
            &open_slot(league.season.id),
            league.active(),
            &[],
            league.home,
            league.away,
            "captain",
            now(),
        )
        .unwrap_err();
        assert!(matches!(err, EngineError::Conflict(_)));
    }

    #[test]
    fn test_request_slot_rejects_duplicate_fixture_in_either_order() {
        let league = league(SeasonRules::default());
        let existing = vec![league.pending()];

        for (home, away) in [(league.home, league.away), (league.away, league.home)] {
            let err = request_slot(
                &open_slot(league.season.id),
                league.active(),
                &existing,
                home,
                away,
                "captain",
                now(),
            )
            .unwrap_err();
            assert!(matches!(err, EngineError::Conflict(_)));
        }
    }

    #[test]
    fn test_denied_fixture_can_be_requested_again() {
        let league = league(SeasonRules::default());
        let denied =
            handle_booking_action(&league.pending(), league.away, BookingAction::Deny, None, now())
                .unwrap();

        assert!(request_slot(
            &open_slot(league.season.id),
            league.active(),
            &[denied],
            league.home,
            league.away,
            "captain",
            now(),
        )
        .is_ok());
    }

    #[test]
    fn test_request_slot_same_team() {
        let league = league(SeasonRules::default());
        let err = request_slot(
            &open_slot(league.season.id),
            league.active(),
            &[],
            league.home,
            league.home,
            "captain",
            now(),
        )
        .unwrap_err();
        assert!(matches!(
            err,
            EngineError::Validation(ValidationError::SameTeam)
        ));
    }

    #[test]
    fn test_away_team_confirms() {
        let league = league(SeasonRules::default());
        let booking =
            handle_booking_action(&league.pending(), league.away, BookingAction::Confirm, None, now())
                .unwrap();
        assert_eq!(booking.status(), BookingStatus::Confirmed);
        assert_availability_invariant(&booking);
    }

    #[test]
    fn test_home_team_cannot_answer_request() {
        let league = league(SeasonRules::default());
        let err =
            handle_booking_action(&league.pending(), league.home, BookingAction::Confirm, None, now())
                .unwrap_err();
        assert!(matches!(err, EngineError::State(_)));
    }

    #[test]
    fn test_action_requires_pending_booking() {
        let league = league(SeasonRules::default());
        let err = handle_booking_action(
            &open_slot(league.season.id),
            league.away,
            BookingAction::Confirm,
            None,
            now(),
        )
        .unwrap_err();
        assert!(matches!(err, EngineError::State(_)));
    }

    #[test]
    fn test_deny_records_denier() {
        let league = league(SeasonRules::default());
        let booking = handle_booking_action(
            &league.pending(),
            league.away,
            BookingAction::Deny,
            Some("Zu kurzfristig".to_string()),
            now(),
        )
        .unwrap();

        let record = booking.to_record();
        assert_eq!(record.status, BookingStatus::Denied);
        assert_eq!(record.denied_by_team_id, Some(league.away));
        assert_eq!(record.denied_at, Some(now()));
        assert_eq!(record.denial_reason.as_deref(), Some("Zu kurzfristig"));
        assert_eq!(forfeit_parties(&booking), Some((league.home, league.away)));
        assert_availability_invariant(&booking);
    }

    #[test]
    fn test_forfeit_threshold() {
        let disabled = season(SeasonRules::default());
        assert!(!forfeit_due(&disabled, 10));

        let strict = season(SeasonRules {
            max_denials: 2,
            ..SeasonRules::default()
        });
        assert!(!forfeit_due(&strict, 1));
        assert!(forfeit_due(&strict, 2));
        assert!(forfeit_due(&strict, 3));
    }

    #[test]
    fn test_cancellation_before_deadline_regenerates_verified_slot() {
        let league = league(SeasonRules {
            cancellation_deadline_days: 2,
            ..SeasonRules::default()
        });
        let booking = confirmed(league.season.id, league.home, league.away);

        let outcome =
            initiate_cancellation(&booking, league.home, None, &league.season, true, now()).unwrap();

        assert_eq!(outcome.booking.status(), BookingStatus::Cancelled);
        assert_eq!(outcome.booking.to_record().cancelled_by_team_id, Some(league.home));

        let replacement = outcome.replacement.expect("verified pitch keeps its slot");
        assert_eq!(replacement.status(), BookingStatus::Available);
        assert_eq!(replacement.slot, booking.slot);
        assert_ne!(replacement.id, booking.id);
        assert!(replacement.fixture().is_none());
        assert_availability_invariant(&replacement);
        assert_availability_invariant(&outcome.booking);
    }

    #[test]
    fn test_cancellation_on_unverified_pitch_has_no_replacement() {
        let league = league(SeasonRules::default());
        let booking = confirmed(league.season.id, league.home, league.away);
        let outcome =
            initiate_cancellation(&booking, league.away, None, &league.season, false, now()).unwrap();
        assert_eq!(outcome.booking.status(), BookingStatus::Cancelled);
        assert!(outcome.replacement.is_none());
    }

    #[test]
    fn test_cancellation_after_deadline_needs_consent() {
        // Game is 7 days out, deadline is 10 days before kick-off.
        let league = league(SeasonRules {
            cancellation_deadline_days: 10,
            ..SeasonRules::default()
        });
        let booking = confirmed(league.season.id, league.home, league.away);

        let outcome = initiate_cancellation(
            &booking,
            league.home,
            Some("Zu wenige Spieler".to_string()),
            &league.season,
            true,
            now(),
        )
        .unwrap();

        assert_eq!(outcome.booking.status(), BookingStatus::CancellationPending);
        assert!(outcome.replacement.is_none());
        let record = outcome.booking.to_record();
        assert_eq!(record.cancellation_requested_by_team_id, Some(league.home));
        assert_eq!(
            record.cancellation_request_reason.as_deref(),
            Some("Zu wenige Spieler")
        );
    }

    #[test]
    fn test_late_cancellation_of_hold_is_immediate() {
        let league = league(SeasonRules {
            cancellation_deadline_days: 30,
            ..SeasonRules::default()
        });
        let own = pitch(false, Some(league.home));
        let mut input = custom(Some(league.home), None);
        input.season_id = league.season.id;
        input.date = now() + Duration::days(7);
        let hold =
            create_custom_booking(&input, &captain(league.home), &league.season, &own, now())
                .unwrap();
        assert_eq!(hold.status(), BookingStatus::Confirmed);

        let outcome =
            initiate_cancellation(&hold, league.home, None, &league.season, false, now()).unwrap();

        assert_eq!(outcome.booking.status(), BookingStatus::Cancelled);
        assert_eq!(outcome.booking.to_record().cancelled_by_team_id, Some(league.home));
        assert!(outcome.replacement.is_none());
    }

    #[test]
    fn test_request_slot_outside_active_season() {
        let league = league(SeasonRules::default());
        let err = request_slot(
            &open_slot(Uuid::new_v4()),
            league.active(),
            &[],
            league.home,
            league.away,
            "captain",
            now(),
        )
        .unwrap_err();
        assert!(matches!(err, EngineError::Conflict(_)));
    }

    #[test]
    fn test_cancellation_requires_confirmed_booking() {
        let league = league(SeasonRules::default());
        let err = initiate_cancellation(
            &league.pending(),
            league.home,
            None,
            &league.season,
            false,
            now(),
        )
        .unwrap_err();
        assert!(matches!(err, EngineError::State(_)));
    }

    #[test]
    fn test_outsider_cannot_cancel() {
        let league = league(SeasonRules::default());
        let booking = confirmed(league.season.id, league.home, league.away);
        let err = initiate_cancellation(&booking, Uuid::new_v4(), None, &league.season, false, now())
            .unwrap_err();
        assert!(matches!(err, EngineError::Permission(_)));
    }

    fn pending_cancellation(league: &League) -> Booking {
        let late = Season {
            cancellation_deadline_days: 30,
            ..league.season.clone()
        };
        let booking = confirmed(league.season.id, league.home, league.away);
        initiate_cancellation(&booking, league.home, None, &late, true, now())
            .unwrap()
            .booking
    }

    #[test]
    fn test_opponent_accepts_cancellation() {
        let league = league(SeasonRules::default());
        let pending = pending_cancellation(&league);

        let outcome = respond_to_cancellation(
            &pending,
            league.away,
            CancellationResponse::Accept,
            None,
            true,
            now(),
        )
        .unwrap();

        assert_eq!(outcome.booking.status(), BookingStatus::Cancelled);
        assert_eq!(outcome.booking.to_record().cancelled_by_team_id, Some(league.home));
        assert!(outcome.replacement.is_some());
    }

    #[test]
    fn test_opponent_rejects_cancellation() {
        let league = league(SeasonRules::default());
        let pending = pending_cancellation(&league);

        let outcome = respond_to_cancellation(
            &pending,
            league.away,
            CancellationResponse::Reject,
            Some("Wir wollen spielen".to_string()),
            true,
            now(),
        )
        .unwrap();

        let record = outcome.booking.to_record();
        assert_eq!(record.status, BookingStatus::Confirmed);
        assert!(record.cancellation_requested_by_team_id.is_none());
        assert!(record.cancellation_request_reason.is_none());
        assert_eq!(
            record.cancellation_rejection_reason.as_deref(),
            Some("Wir wollen spielen")
        );
        assert!(outcome.replacement.is_none());
    }

    #[test]
    fn test_requester_cannot_answer_own_request() {
        let league = league(SeasonRules::default());
        let err = respond_to_cancellation(
            &pending_cancellation(&league),
            league.home,
            CancellationResponse::Accept,
            None,
            true,
            now(),
        )
        .unwrap_err();
        assert!(matches!(err, EngineError::State(_)));
    }

    #[test]
    fn test_response_requires_pending_request() {
        let league = league(SeasonRules::default());
        let booking = confirmed(league.season.id, league.home, league.away);
        let err = respond_to_cancellation(
            &booking,
            league.away,
            CancellationResponse::Accept,
            None,
            true,
            now(),
        )
        .unwrap_err();
        assert!(matches!(err, EngineError::State(_)));
    }

    fn custom(home: Option<Uuid>, away: Option<Uuid>) -> CustomBooking {
        CustomBooking {
            season_id: Uuid::new_v4(),
            pitch_id: Uuid::new_v4(),
            date: now(),
            duration_minutes: None,
            home_team_id: home,
            away_team_id: away,
            friendly: false,
        }
    }

    fn pitch(verified: bool, owner: Option<Uuid>) -> Pitch {
        Pitch {
            id: Uuid::new_v4(),
            name: "Seepark".to_string(),
            address: None,
            is_verified: verified,
            owner_team_id: owner,
            created_at: now(),
        }
    }

    #[test]
    fn test_custom_booking_statuses() {
        let league = league(SeasonRules::default());
        let verified = pitch(true, None);

        let with_opponent = create_custom_booking(
            &custom(Some(league.home), Some(league.away)),
            &admin(),
            &league.season,
            &verified,
            now(),
        )
        .unwrap();
        assert_eq!(with_opponent.status(), BookingStatus::PendingAwayConfirm);

        let hold = create_custom_booking(
            &custom(Some(league.home), None),
            &admin(),
            &league.season,
            &verified,
            now(),
        )
        .unwrap();
        assert_eq!(hold.status(), BookingStatus::Confirmed);
        assert_availability_invariant(&hold);

        let open =
            create_custom_booking(&custom(None, None), &admin(), &league.season, &verified, now())
                .unwrap();
        assert_eq!(open.status(), BookingStatus::Available);
        assert_eq!(open.slot.duration_minutes, DEFAULT_DURATION_MINUTES);
        assert_availability_invariant(&open);
    }

    #[test]
    fn test_captain_books_own_unverified_pitch() {
        let league = league(SeasonRules::default());
        let own = pitch(false, Some(league.home));
        let booking = create_custom_booking(
            &custom(Some(league.home), Some(league.away)),
            &captain(league.home),
            &league.season,
            &own,
            now(),
        )
        .unwrap();
        assert_eq!(booking.status(), BookingStatus::PendingAwayConfirm);
        assert_eq!(booking.slot.pitch_id, own.id);
    }

    #[test]
    fn test_captain_booking_restrictions() {
        let league = league(SeasonRules::default());
        let user = captain(league.home);

        let cases = [
            (pitch(true, Some(league.home)), custom(Some(league.home), None)),
            (pitch(false, Some(league.away)), custom(Some(league.home), None)),
            (pitch(false, Some(league.home)), custom(Some(league.away), Some(league.home))),
        ];

        for (pitch, input) in cases {
            let err = create_custom_booking(&input, &user, &league.season, &pitch, now()).unwrap_err();
            assert!(matches!(err, EngineError::Permission(_)));
        }
    }

    #[test]
    fn test_custom_booking_needs_active_season() {
        let mut league = league(SeasonRules::default());
        league.season.status = SeasonStatus::Planning;
        let err = create_custom_booking(
            &custom(Some(league.home), None),
            &admin(),
            &league.season,
            &pitch(true, None),
            now(),
        )
        .unwrap_err();
        assert!(matches!(
            err,
            EngineError::Validation(ValidationError::SeasonNotActive)
        ));
    }

    #[test]
    fn test_admin_cancel_from_any_status() {
        let league = league(SeasonRules::default());
        for booking in [
            open_slot(league.season.id),
            league.pending(),
            confirmed(league.season.id, league.home, league.away),
        ] {
            let cancelled = admin_cancel(&booking, "Platz gesperrt", "admin", now()).unwrap();
            let record = cancelled.to_record();
            assert_eq!(record.status, BookingStatus::CancelledAdmin);
            assert_eq!(record.admin_cancelled_by.as_deref(), Some("admin"));
            assert_eq!(record.admin_cancellation_reason.as_deref(), Some("Platz gesperrt"));
            assert_availability_invariant(&cancelled);
        }
    }

    #[test]
    fn test_admin_cancel_needs_reason() {
        let league = league(SeasonRules::default());
        assert!(admin_cancel(&league.pending(), "  ", "admin", now()).is_err());
    }

    #[test]
    fn test_played_flip() {
        let league = league(SeasonRules::default());
        let booking = confirmed(league.season.id, league.home, league.away);

        let played = set_played(&booking, true, now()).unwrap();
        assert_eq!(played.status(), BookingStatus::Played);
        assert!(set_played(&played, true, now()).is_none());

        let reopened = set_played(&played, false, now()).unwrap();
        assert_eq!(reopened.status(), BookingStatus::Confirmed);
        assert!(set_played(&league.pending(), false, now()).is_none());
    }
}
