//! Input validation module

use crate::models::{CreateSeason, RankingCriterion, SeasonRules};
use chrono::NaiveTime;
use std::collections::HashSet;
use thiserror::Error;
use validator::Validate;

/// Highest score a team can be credited with in a single game
pub const MAX_SCORE: i32 = 99;

/// Maximum length of free-text reasons (denials, cancellations, disputes)
pub const MAX_REASON_LENGTH: usize = 500;

#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("Field '{field}' is required")]
    Required { field: String },

    #[error("Field '{field}' is too long (max {max} characters)")]
    TooLong { field: String, max: usize },

    #[error("Invalid email format")]
    InvalidEmail,

    #[error("Invalid time '{value}' (expected HH:MM)")]
    InvalidTime { value: String },

    #[error("Invalid weekday {value} (expected 0 = Sunday to 6 = Saturday)")]
    InvalidWeekday { value: u32 },

    #[error("End date must not be before start date")]
    InvalidDateRange,

    #[error("Date range is too long (max {max_days} days)")]
    DateRangeTooLong { max_days: i64 },

    #[error("The selected dates, weekdays and times do not produce any slots")]
    EmptySlotPlan,

    #[error("Local time {value} is ambiguous or does not exist in the league timezone")]
    AmbiguousLocalTime { value: String },

    #[error("Duration must be between {min} and {max} minutes")]
    InvalidDuration { min: i32, max: i32 },

    #[error("Scores must be between 0 and {max}")]
    InvalidScore { max: i32 },

    #[error("A team cannot play against itself")]
    SameTeam,

    #[error("Season is not active")]
    SeasonNotActive,

    #[error("Ranking criteria must not be empty or contain duplicates")]
    InvalidRankingCriteria,

    #[error("{0}")]
    Invalid(String),
}

impl From<validator::ValidationErrors> for ValidationError {
    fn from(errors: validator::ValidationErrors) -> Self {
        ValidationError::Invalid(errors.to_string())
    }
}

/// Validate a season creation request
pub fn validate_create_season(input: &CreateSeason) -> Result<(), ValidationError> {
    input.validate()?;

    if input.name.trim().is_empty() {
        return Err(ValidationError::Required {
            field: "name".to_string(),
        });
    }

    if input.end_date < input.start_date {
        return Err(ValidationError::InvalidDateRange);
    }

    let unique: HashSet<_> = input.team_ids.iter().collect();
    if unique.len() != input.team_ids.len() {
        return Err(ValidationError::Invalid(
            "team_ids must not contain duplicates".to_string(),
        ));
    }

    validate_season_rules(&input.rules)
}

/// Validate the configurable rules of a season
pub fn validate_season_rules(rules: &SeasonRules) -> Result<(), ValidationError> {
    rules.validate()?;
    validate_ranking_criteria(&rules.ranking_criteria)
}

/// Ranking criteria must be a non-empty list without repeats
pub fn validate_ranking_criteria(criteria: &[RankingCriterion]) -> Result<(), ValidationError> {
    let unique: HashSet<_> = criteria.iter().collect();
    if criteria.is_empty() || unique.len() != criteria.len() {
        return Err(ValidationError::InvalidRankingCriteria);
    }
    Ok(())
}

/// Validate a team name
pub fn validate_team_name(name: &str) -> Result<(), ValidationError> {
    if name.trim().is_empty() {
        return Err(ValidationError::Required {
            field: "name".to_string(),
        });
    }
    if name.len() > 100 {
        return Err(ValidationError::TooLong {
            field: "name".to_string(),
            max: 100,
        });
    }
    Ok(())
}

/// Validate an optional contact address
pub fn validate_contact_email(email: Option<&str>) -> Result<(), ValidationError> {
    match email {
        Some(email) if !email.is_empty() && !is_valid_email(email) => {
            Err(ValidationError::InvalidEmail)
        }
        _ => Ok(()),
    }
}

/// Both scores of a game must be within range
pub fn validate_scores(home_score: i32, away_score: i32) -> Result<(), ValidationError> {
    let in_range = |s: i32| (0..=MAX_SCORE).contains(&s);
    if !in_range(home_score) || !in_range(away_score) {
        return Err(ValidationError::InvalidScore { max: MAX_SCORE });
    }
    Ok(())
}

/// Free-text reasons are optional but bounded
pub fn validate_reason(field: &str, reason: Option<&str>) -> Result<(), ValidationError> {
    if let Some(reason) = reason {
        if reason.len() > MAX_REASON_LENGTH {
            return Err(ValidationError::TooLong {
                field: field.to_string(),
                max: MAX_REASON_LENGTH,
            });
        }
    }
    Ok(())
}

/// Parse a slot start time given as "HH:MM"
pub fn parse_slot_time(value: &str) -> Result<NaiveTime, ValidationError> {
    NaiveTime::parse_from_str(value.trim(), "%H:%M").map_err(|_| ValidationError::InvalidTime {
        value: value.to_string(),
    })
}

/// Simple email validation
fn is_valid_email(email: &str) -> bool {
    // Basic check: contains @ and at least one .
    let parts: Vec<&str> = email.split('@').collect();
    if parts.len() != 2 {
        return false;
    }
    let (local, domain) = (parts[0], parts[1]);

    !local.is_empty() && !domain.is_empty() && domain.contains('.') && domain.len() > 2
}
