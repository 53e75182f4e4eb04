//! Result reporting, confirmation, disputes and admin corrections

use super::booking::mark_played;
use super::{EngineError, EngineResult, SYSTEM_USER};
use crate::models::*;
use crate::validation::{validate_reason, validate_scores, ValidationError};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::collections::HashMap;
use std::str::FromStr;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResultAction {
    Confirm,
    Reject,
}

/// Who may correct the scores of a reported result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResultEditPolicy {
    /// Players of the two teams and admins
    #[default]
    Participants,
    /// Every authenticated caller
    AnyAuthenticated,
}

impl FromStr for ResultEditPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "participants" => Ok(Self::Participants),
            "any" => Ok(Self::AnyAuthenticated),
            other => Err(format!("unknown result edit policy '{}'", other)),
        }
    }
}

/// Current team names keyed by id
pub type TeamNames = HashMap<Uuid, String>;

fn team_name(names: &TeamNames, team_id: Uuid) -> EngineResult<String> {
    names
        .get(&team_id)
        .cloned()
        .ok_or_else(|| EngineError::NotFound(format!("Team {} not found", team_id)))
}

struct NewResult {
    season_id: Uuid,
    booking_id: Option<Uuid>,
    home_team_id: Uuid,
    away_team_id: Uuid,
    score: Score,
    date: Option<DateTime<Utc>>,
    location: Option<String>,
    friendly: bool,
}

impl NewResult {
    fn build(
        self,
        names: &TeamNames,
        reporter: &AuthUser,
        reporting_team: Option<Uuid>,
        state: ResultState,
        now: DateTime<Utc>,
    ) -> EngineResult<GameResult> {
        if self.home_team_id == self.away_team_id {
            return Err(ValidationError::SameTeam.into());
        }
        validate_scores(self.score.home_score, self.score.away_score)?;

        Ok(GameResult {
            id: Uuid::new_v4(),
            season_id: self.season_id,
            booking_id: self.booking_id,
            home_team_name: team_name(names, self.home_team_id)?,
            home_team_id: self.home_team_id,
            away_team_name: team_name(names, self.away_team_id)?,
            away_team_id: self.away_team_id,
            home_score: self.score.home_score,
            away_score: self.score.away_score,
            reported_by_team_id: reporting_team,
            reported_by_user_id: reporter.uid.clone(),
            date: self.date,
            location: self.location,
            friendly: self.friendly,
            state,
            last_edit: None,
            created_at: now,
            updated_at: now,
        })
    }
}

/// Team a caller reports for in a game between `home` and `away`
fn reporting_team(user: &AuthUser, home: Uuid, away: Uuid) -> EngineResult<Option<Uuid>> {
    match user.team_id {
        Some(team) if team == home || team == away => Ok(Some(team)),
        _ if user.admin => Ok(None),
        _ => Err(EngineError::permission(
            "Only participating teams can report this result",
        )),
    }
}

/// Report the score of a confirmed booking. Returns the pending result and
/// the booking moved to `played`.
pub fn report_for_booking(
    booking: &Booking,
    score: Score,
    reporter: &AuthUser,
    names: &TeamNames,
    location: Option<String>,
    now: DateTime<Utc>,
) -> EngineResult<(GameResult, Booking)> {
    let BookingState::Confirmed { fixture, .. } = &booking.state else {
        return Err(EngineError::state(
            "Results can only be reported for confirmed bookings",
        ));
    };
    let away_team_id = fixture
        .away_team_id
        .ok_or_else(|| EngineError::state("Booking has no opponent yet"))?;

    let team = reporting_team(reporter, fixture.home_team_id, away_team_id)?;

    let result = NewResult {
        season_id: booking.slot.season_id,
        booking_id: Some(booking.id),
        home_team_id: fixture.home_team_id,
        away_team_id,
        score,
        date: Some(booking.slot.date),
        location,
        friendly: booking.friendly,
    }
    .build(names, reporter, team, ResultState::Pending, now)?;

    Ok((result, mark_played(booking, now)?))
}

/// Report a game that was played without a booking
pub fn report_unbooked(
    input: &UnbookedResult,
    reporter: &AuthUser,
    names: &TeamNames,
    now: DateTime<Utc>,
) -> EngineResult<GameResult> {
    input.validate().map_err(ValidationError::from)?;

    let date = input.date.ok_or_else(|| ValidationError::Required {
        field: "date".to_string(),
    })?;
    let location = input
        .location
        .as_deref()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .ok_or_else(|| ValidationError::Required {
            field: "location".to_string(),
        })?;

    let team = reporting_team(reporter, input.home_team_id, input.away_team_id)?;

    NewResult {
        season_id: input.season_id,
        booking_id: None,
        home_team_id: input.home_team_id,
        away_team_id: input.away_team_id,
        score: Score {
            home_score: input.home_score,
            away_score: input.away_score,
        },
        date: Some(date),
        location: Some(location.to_string()),
        friendly: input.friendly,
    }
    .build(names, reporter, team, ResultState::Pending, now)
}

/// The opposing team confirms or disputes a pending result
pub fn handle_result_action(
    result: &GameResult,
    acting_team_id: Uuid,
    acting_user_id: &str,
    action: ResultAction,
    reason: Option<String>,
    now: DateTime<Utc>,
) -> EngineResult<GameResult> {
    if result.state != ResultState::Pending {
        return Err(EngineError::state("Result is not awaiting confirmation"));
    }

    if result.reported_by_team_id == Some(acting_team_id) {
        return Err(EngineError::permission(
            "The reporting team cannot confirm its own result",
        ));
    }

    if !result.involves(acting_team_id) {
        return Err(EngineError::permission(
            "Only the opposing team can confirm this result",
        ));
    }

    validate_reason("reason", reason.as_deref())?;

    let review = Review {
        team_id: Some(acting_team_id),
        user_id: acting_user_id.to_string(),
        at: now,
    };

    let state = match action {
        ResultAction::Confirm => ResultState::Confirmed(review),
        ResultAction::Reject => ResultState::Disputed { review, reason },
    };

    Ok(GameResult {
        state,
        updated_at: now,
        ..result.clone()
    })
}

/// Confirmed result awarded to `winner` when `loser` denied too often
pub fn forfeit_result(
    season: &Season,
    booking: &Booking,
    winner: (Uuid, &str),
    loser: (Uuid, &str),
    now: DateTime<Utc>,
) -> GameResult {
    GameResult {
        id: Uuid::new_v4(),
        season_id: season.id,
        booking_id: Some(booking.id),
        home_team_id: winner.0,
        home_team_name: winner.1.to_string(),
        away_team_id: loser.0,
        away_team_name: loser.1.to_string(),
        home_score: season.forfeit_win_score,
        away_score: season.forfeit_loss_score,
        reported_by_team_id: None,
        reported_by_user_id: SYSTEM_USER.to_string(),
        date: Some(booking.slot.date),
        location: None,
        friendly: false,
        state: ResultState::Confirmed(Review {
            team_id: None,
            user_id: SYSTEM_USER.to_string(),
            at: now,
        }),
        last_edit: None,
        created_at: now,
        updated_at: now,
    }
}

/// Correct the scores; the result has to be confirmed again afterwards
pub fn update_scores(
    result: &GameResult,
    score: Score,
    editor: &AuthUser,
    policy: ResultEditPolicy,
    now: DateTime<Utc>,
) -> EngineResult<GameResult> {
    let participant = editor.team_id.filter(|team| result.involves(*team));

    if policy == ResultEditPolicy::Participants && participant.is_none() && !editor.admin {
        return Err(EngineError::permission(
            "Only participating teams can edit this result",
        ));
    }

    validate_scores(score.home_score, score.away_score)?;

    Ok(GameResult {
        home_score: score.home_score,
        away_score: score.away_score,
        // The other team has to confirm the corrected score.
        reported_by_team_id: participant.or(result.reported_by_team_id),
        reported_by_user_id: editor.uid.clone(),
        state: ResultState::Pending,
        last_edit: Some(Edit {
            user_id: editor.uid.clone(),
            at: now,
        }),
        updated_at: now,
        ..result.clone()
    })
}

fn admin_review(admin: &AuthUser, now: DateTime<Utc>) -> ResultState {
    ResultState::Confirmed(Review {
        team_id: None,
        user_id: admin.uid.clone(),
        at: now,
    })
}

/// Force a score and confirm it
pub fn admin_override(
    result: &GameResult,
    score: Score,
    admin: &AuthUser,
    now: DateTime<Utc>,
) -> EngineResult<GameResult> {
    validate_scores(score.home_score, score.away_score)?;

    Ok(GameResult {
        home_score: score.home_score,
        away_score: score.away_score,
        state: admin_review(admin, now),
        last_edit: Some(Edit {
            user_id: admin.uid.clone(),
            at: now,
        }),
        updated_at: now,
        ..result.clone()
    })
}

/// Enter an already confirmed result. A linked booking must be confirmed or
/// played between the same two teams; an unlinked result needs a date and
/// a location.
pub fn admin_create(
    input: &AdminCreateResult,
    booking: Option<&Booking>,
    admin: &AuthUser,
    names: &TeamNames,
    now: DateTime<Utc>,
) -> EngineResult<GameResult> {
    input.validate().map_err(ValidationError::from)?;

    let (date, location) = match (input.booking_id, booking) {
        (None, _) => {
            let date = input.date.ok_or_else(|| ValidationError::Required {
                field: "date".to_string(),
            })?;
            let location = input
                .location
                .as_deref()
                .map(str::trim)
                .filter(|l| !l.is_empty())
                .ok_or_else(|| ValidationError::Required {
                    field: "location".to_string(),
                })?;
            (date, Some(location.to_string()))
        }
        (Some(id), Some(booking)) if booking.id == id => {
            let fixture = match &booking.state {
                BookingState::Confirmed { fixture, .. } | BookingState::Played { fixture } => {
                    fixture
                }
                _ => {
                    return Err(EngineError::state(
                        "Results can only be linked to confirmed or played bookings",
                    ))
                }
            };
            if fixture.home_team_id != input.home_team_id
                || fixture.away_team_id != Some(input.away_team_id)
                || booking.slot.season_id != input.season_id
            {
                return Err(ValidationError::Invalid(
                    "Booking is not a game between these teams in this season".to_string(),
                )
                .into());
            }
            (input.date.unwrap_or(booking.slot.date), input.location.clone())
        }
        (Some(_), _) => return Err(EngineError::NotFound("Booking not found".to_string())),
    };

    NewResult {
        season_id: input.season_id,
        booking_id: input.booking_id,
        home_team_id: input.home_team_id,
        away_team_id: input.away_team_id,
        score: Score {
            home_score: input.home_score,
            away_score: input.away_score,
        },
        date: Some(date),
        location,
        friendly: input.friendly,
    }
    .build(names, admin, None, admin_review(admin, now), now)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::booking::{forfeit_due, forfeit_parties, handle_booking_action, BookingAction};
    use crate::engine::fixtures::*;

    struct Game {
        season: Season,
        home: Uuid,
        away: Uuid,
        names: TeamNames,
    }

    fn game(rules: SeasonRules) -> Game {
        let (home, away) = (Uuid::new_v4(), Uuid::new_v4());
        Game {
            season: season(rules),
            home,
            away,
            names: HashMap::from([
                (home, "FC Buntspecht".to_string()),
                (away, "Rote Socken".to_string()),
            ]),
        }
    }

    fn score(home_score: i32, away_score: i32) -> Score {
        Score {
            home_score,
            away_score,
        }
    }

    impl Game {
        fn reported(&self) -> (GameResult, Booking) {
            let booking = confirmed(self.season.id, self.home, self.away);
            report_for_booking(&booking, score(2, 1), &captain(self.home), &self.names, None, now())
                .unwrap()
        }
    }

    #[test]
    fn test_report_moves_booking_to_played() {
        let game = game(SeasonRules::default());
        let (result, booking) = game.reported();

        assert_eq!(result.status(), ResultStatus::Pending);
        assert_eq!(result.booking_id, Some(booking.id));
        assert_eq!(result.home_team_name, "FC Buntspecht");
        assert_eq!(result.away_team_name, "Rote Socken");
        assert_eq!(result.reported_by_team_id, Some(game.home));
        assert_eq!(result.date, Some(booking.slot.date));
        assert_eq!(booking.status(), BookingStatus::Played);
    }

    #[test]
    fn test_report_copies_friendly_flag() {
        let game = game(SeasonRules::default());
        let mut booking = confirmed(game.season.id, game.home, game.away);
        booking.friendly = true;
        let (result, _) =
            report_for_booking(&booking, score(0, 0), &captain(game.away), &game.names, None, now())
                .unwrap();
        assert!(result.friendly);
    }

    #[test]
    fn test_report_requires_confirmed_booking() {
        let game = game(SeasonRules::default());
        for booking in [
            open_slot(game.season.id),
            game.reported().1,
        ] {
            let err = report_for_booking(
                &booking,
                score(1, 0),
                &captain(game.home),
                &game.names,
                None,
                now(),
            )
            .unwrap_err();
            assert!(matches!(err, EngineError::State(_)));
        }
    }

    #[test]
    fn test_outsider_cannot_report() {
        let game = game(SeasonRules::default());
        let booking = confirmed(game.season.id, game.home, game.away);
        let err = report_for_booking(
            &booking,
            score(1, 0),
            &captain(Uuid::new_v4()),
            &game.names,
            None,
            now(),
        )
        .unwrap_err();
        assert!(matches!(err, EngineError::Permission(_)));

        assert!(
            report_for_booking(&booking, score(1, 0), &admin(), &game.names, None, now()).is_ok()
        );
    }

    #[test]
    fn test_report_rejects_out_of_range_scores() {
        let game = game(SeasonRules::default());
        let booking = confirmed(game.season.id, game.home, game.away);
        let err = report_for_booking(
            &booking,
            score(-1, 3),
            &captain(game.home),
            &game.names,
            None,
            now(),
        )
        .unwrap_err();
        assert!(matches!(
            err,
            EngineError::Validation(ValidationError::InvalidScore { .. })
        ));
    }

    fn unbooked(game: &Game) -> UnbookedResult {
        UnbookedResult {
            season_id: game.season.id,
            home_team_id: game.home,
            away_team_id: game.away,
            home_score: 3,
            away_score: 3,
            date: Some(now()),
            location: Some("Seepark".to_string()),
            friendly: false,
        }
    }

    #[test]
    fn test_unbooked_result() {
        let game = game(SeasonRules::default());
        let result = report_unbooked(&unbooked(&game), &captain(game.away), &game.names, now()).unwrap();
        assert_eq!(result.status(), ResultStatus::Pending);
        assert!(result.booking_id.is_none());
        assert_eq!(result.reported_by_team_id, Some(game.away));
        assert_eq!(result.location.as_deref(), Some("Seepark"));
    }

    #[test]
    fn test_unbooked_result_needs_date_and_location() {
        let game = game(SeasonRules::default());

        let mut input = unbooked(&game);
        input.date = None;
        assert!(report_unbooked(&input, &captain(game.home), &game.names, now()).is_err());

        let mut input = unbooked(&game);
        input.location = Some("  ".to_string());
        assert!(matches!(
            report_unbooked(&input, &captain(game.home), &game.names, now()),
            Err(EngineError::Validation(ValidationError::Required { .. }))
        ));
    }

    #[test]
    fn test_unknown_team_is_not_found() {
        let game = game(SeasonRules::default());
        let mut input = unbooked(&game);
        input.away_team_id = Uuid::new_v4();
        assert!(matches!(
            report_unbooked(&input, &admin(), &game.names, now()),
            Err(EngineError::NotFound(_))
        ));
    }

    #[test]
    fn test_opponent_confirms() {
        let game = game(SeasonRules::default());
        let (result, _) = game.reported();

        let confirmed =
            handle_result_action(&result, game.away, "away-captain", ResultAction::Confirm, None, now())
                .unwrap();
        let record = confirmed.to_record();
        assert_eq!(record.status, ResultStatus::Confirmed);
        assert_eq!(record.confirmed_by_team_id, Some(game.away));
        assert_eq!(record.confirmed_by_user_id.as_deref(), Some("away-captain"));
    }

    #[test]
    fn test_opponent_disputes() {
        let game = game(SeasonRules::default());
        let (result, _) = game.reported();

        let disputed = handle_result_action(
            &result,
            game.away,
            "away-captain",
            ResultAction::Reject,
            Some("Es stand 1:1".to_string()),
            now(),
        )
        .unwrap();
        let record = disputed.to_record();
        assert_eq!(record.status, ResultStatus::Disputed);
        assert_eq!(record.rejected_by_team_id, Some(game.away));
        assert_eq!(record.rejection_reason.as_deref(), Some("Es stand 1:1"));
    }

    #[test]
    fn test_self_confirmation_fails() {
        let game = game(SeasonRules::default());
        let (result, _) = game.reported();

        for action in [ResultAction::Confirm, ResultAction::Reject] {
            let err = handle_result_action(&result, game.home, "home-captain", action, None, now())
                .unwrap_err();
            assert!(matches!(err, EngineError::Permission(_)));
        }
    }

    #[test]
    fn test_outsider_cannot_confirm() {
        let game = game(SeasonRules::default());
        let (result, _) = game.reported();
        let err =
            handle_result_action(&result, Uuid::new_v4(), "someone", ResultAction::Confirm, None, now())
                .unwrap_err();
        assert!(matches!(err, EngineError::Permission(_)));
    }

    #[test]
    fn test_action_requires_pending_result() {
        let game = game(SeasonRules::default());
        let (result, _) = game.reported();
        let confirmed =
            handle_result_action(&result, game.away, "away", ResultAction::Confirm, None, now()).unwrap();
        let err = handle_result_action(&confirmed, game.away, "away", ResultAction::Reject, None, now())
            .unwrap_err();
        assert!(matches!(err, EngineError::State(_)));
    }

    #[test]
    fn test_second_denial_forfeits() {
        let game = game(SeasonRules {
            max_denials: 2,
            ..SeasonRules::default()
        });

        let mut forfeits = Vec::new();
        for denials in 1..=2 {
            let pending = confirmed(game.season.id, game.home, game.away).with_state(
                BookingState::PendingAwayConfirm {
                    fixture: Fixture::new(game.home, game.away),
                },
                now(),
            );
            let denied =
                handle_booking_action(&pending, game.away, BookingAction::Deny, None, now()).unwrap();

            if forfeit_due(&game.season, denials) {
                let (winner, loser) = forfeit_parties(&denied).unwrap();
                forfeits.push(forfeit_result(
                    &game.season,
                    &denied,
                    (winner, game.names[&winner].as_str()),
                    (loser, game.names[&loser].as_str()),
                    now(),
                ));
            }
        }

        assert_eq!(forfeits.len(), 1);
        let forfeit = &forfeits[0];
        assert!(forfeit.is_confirmed());
        assert_eq!(forfeit.home_team_id, game.home);
        assert_eq!(forfeit.away_team_id, game.away);
        assert_eq!((forfeit.home_score, forfeit.away_score), (3, 0));
        assert_eq!(forfeit.reported_by_user_id, SYSTEM_USER);
        assert_eq!(forfeit.to_record().confirmed_by_user_id.as_deref(), Some(SYSTEM_USER));
    }

    #[test]
    fn test_forfeit_uses_season_scores() {
        let game = game(SeasonRules {
            forfeit_win_score: 5,
            forfeit_loss_score: 1,
            ..SeasonRules::default()
        });
        let booking = confirmed(game.season.id, game.home, game.away);
        let result = forfeit_result(&game.season, &booking, (game.home, "A"), (game.away, "B"), now());
        assert_eq!((result.home_score, result.away_score), (5, 1));
    }

    #[test]
    fn test_update_resets_to_pending() {
        let game = game(SeasonRules::default());
        let (result, _) = game.reported();
        let confirmed =
            handle_result_action(&result, game.away, "away", ResultAction::Confirm, None, now()).unwrap();

        let edited = update_scores(
            &confirmed,
            score(1, 1),
            &captain(game.away),
            ResultEditPolicy::Participants,
            now(),
        )
        .unwrap();

        assert_eq!(edited.status(), ResultStatus::Pending);
        assert_eq!((edited.home_score, edited.away_score), (1, 1));
        assert_eq!(edited.reported_by_team_id, Some(game.away));
        let record = edited.to_record();
        assert!(record.confirmed_by_user_id.is_none());
        assert_eq!(record.last_edited_by.as_deref(), Some(captain(game.away).uid.as_str()));

        // The home team can now confirm the correction.
        assert!(handle_result_action(&edited, game.home, "home", ResultAction::Confirm, None, now()).is_ok());
    }

    #[test]
    fn test_update_policy() {
        let game = game(SeasonRules::default());
        let (result, _) = game.reported();
        let outsider = captain(Uuid::new_v4());

        assert!(matches!(
            update_scores(&result, score(0, 0), &outsider, ResultEditPolicy::Participants, now()),
            Err(EngineError::Permission(_))
        ));
        assert!(update_scores(&result, score(0, 0), &outsider, ResultEditPolicy::AnyAuthenticated, now()).is_ok());
        assert!(update_scores(&result, score(0, 0), &admin(), ResultEditPolicy::Participants, now()).is_ok());
    }

    #[test]
    fn test_policy_from_str() {
        assert_eq!("participants".parse(), Ok(ResultEditPolicy::Participants));
        assert_eq!("ANY".parse(), Ok(ResultEditPolicy::AnyAuthenticated));
        assert!("nobody".parse::<ResultEditPolicy>().is_err());
    }

    #[test]
    fn test_admin_override_confirms() {
        let game = game(SeasonRules::default());
        let (result, _) = game.reported();
        let disputed =
            handle_result_action(&result, game.away, "away", ResultAction::Reject, None, now()).unwrap();

        let forced = admin_override(&disputed, score(4, 0), &admin(), now()).unwrap();
        assert!(forced.is_confirmed());
        assert_eq!((forced.home_score, forced.away_score), (4, 0));
        assert!(forced.to_record().rejection_reason.is_none());
    }

    fn admin_input(game: &Game, booking_id: Option<Uuid>) -> AdminCreateResult {
        AdminCreateResult {
            season_id: game.season.id,
            booking_id,
            home_team_id: game.home,
            away_team_id: game.away,
            home_score: 2,
            away_score: 2,
            date: None,
            location: None,
            friendly: false,
        }
    }

    #[test]
    fn test_admin_create_unlinked_needs_date_and_location() {
        let game = game(SeasonRules::default());
        let mut input = admin_input(&game, None);

        let err = admin_create(&input, None, &admin(), &game.names, now()).unwrap_err();
        assert!(matches!(
            err,
            EngineError::Validation(ValidationError::Required { ref field }) if field == "date"
        ));

        input.date = Some(now());
        input.location = Some("  ".to_string());
        let err = admin_create(&input, None, &admin(), &game.names, now()).unwrap_err();
        assert!(matches!(
            err,
            EngineError::Validation(ValidationError::Required { ref field }) if field == "location"
        ));

        input.location = Some("Dietenbachpark".to_string());
        let result = admin_create(&input, None, &admin(), &game.names, now()).unwrap();
        assert!(result.is_confirmed());
        assert!(result.reported_by_team_id.is_none());
        assert_eq!(result.reported_by_user_id, "admin");
        assert_eq!(result.location.as_deref(), Some("Dietenbachpark"));
    }

    #[test]
    fn test_admin_create_linked_to_confirmed_booking() {
        let game = game(SeasonRules::default());
        let booking = confirmed(game.season.id, game.home, game.away);
        let input = admin_input(&game, Some(booking.id));

        let result = admin_create(&input, Some(&booking), &admin(), &game.names, now()).unwrap();
        assert!(result.is_confirmed());
        assert_eq!(result.booking_id, Some(booking.id));
        assert_eq!(result.date, Some(booking.slot.date));
    }

    #[test]
    fn test_admin_create_rejects_unusable_booking() {
        let game = game(SeasonRules::default());

        let open = open_slot(game.season.id);
        let err = admin_create(
            &admin_input(&game, Some(open.id)),
            Some(&open),
            &admin(),
            &game.names,
            now(),
        )
        .unwrap_err();
        assert!(matches!(err, EngineError::State(_)));

        let other = confirmed(game.season.id, game.home, Uuid::new_v4());
        let err = admin_create(
            &admin_input(&game, Some(other.id)),
            Some(&other),
            &admin(),
            &game.names,
            now(),
        )
        .unwrap_err();
        assert!(matches!(err, EngineError::Validation(_)));

        let err = admin_create(
            &admin_input(&game, Some(Uuid::new_v4())),
            None,
            &admin(),
            &game.names,
            now(),
        )
        .unwrap_err();
        assert!(matches!(err, EngineError::NotFound(_)));
    }
}
