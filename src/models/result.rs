//! Reported game results

use super::{required, RecordError};
use crate::engine::result::ResultAction;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "result_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ResultStatus {
    Pending,
    Confirmed,
    Disputed,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct ResultRecord {
    pub id: Uuid,
    pub season_id: Uuid,
    pub booking_id: Option<Uuid>,
    pub home_team_id: Uuid,
    pub home_team_name: String,
    pub away_team_id: Uuid,
    pub away_team_name: String,
    pub home_score: i32,
    pub away_score: i32,
    pub reported_by_team_id: Option<Uuid>,
    pub reported_by_user_id: String,
    pub date: Option<DateTime<Utc>>,
    pub location: Option<String>,
    pub friendly: bool,
    pub status: ResultStatus,
    pub confirmed_by_team_id: Option<Uuid>,
    pub confirmed_by_user_id: Option<String>,
    pub confirmed_at: Option<DateTime<Utc>>,
    pub rejected_by_team_id: Option<Uuid>,
    pub rejected_by_user_id: Option<String>,
    pub rejected_at: Option<DateTime<Utc>>,
    pub rejection_reason: Option<String>,
    pub last_edited_by: Option<String>,
    pub last_edited_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Who confirmed or rejected a result, and when
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Review {
    pub team_id: Option<Uuid>,
    pub user_id: String,
    pub at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResultState {
    Pending,
    Confirmed(Review),
    Disputed {
        review: Review,
        reason: Option<String>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Edit {
    pub user_id: String,
    pub at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameResult {
    pub id: Uuid,
    pub season_id: Uuid,
    pub booking_id: Option<Uuid>,
    pub home_team_id: Uuid,
    pub home_team_name: String,
    pub away_team_id: Uuid,
    pub away_team_name: String,
    pub home_score: i32,
    pub away_score: i32,
    pub reported_by_team_id: Option<Uuid>,
    pub reported_by_user_id: String,
    pub date: Option<DateTime<Utc>>,
    pub location: Option<String>,
    pub friendly: bool,
    pub state: ResultState,
    pub last_edit: Option<Edit>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl GameResult {
    pub fn status(&self) -> ResultStatus {
        match self.state {
            ResultState::Pending => ResultStatus::Pending,
            ResultState::Confirmed(_) => ResultStatus::Confirmed,
            ResultState::Disputed { .. } => ResultStatus::Disputed,
        }
    }

    pub fn is_confirmed(&self) -> bool {
        matches!(self.state, ResultState::Confirmed(_))
    }

    pub fn involves(&self, team_id: Uuid) -> bool {
        self.home_team_id == team_id || self.away_team_id == team_id
    }

    pub fn to_record(&self) -> ResultRecord {
        let mut record = ResultRecord {
            id: self.id,
            season_id: self.season_id,
            booking_id: self.booking_id,
            home_team_id: self.home_team_id,
            home_team_name: self.home_team_name.clone(),
            away_team_id: self.away_team_id,
            away_team_name: self.away_team_name.clone(),
            home_score: self.home_score,
            away_score: self.away_score,
            reported_by_team_id: self.reported_by_team_id,
            reported_by_user_id: self.reported_by_user_id.clone(),
            date: self.date,
            location: self.location.clone(),
            friendly: self.friendly,
            status: self.status(),
            confirmed_by_team_id: None,
            confirmed_by_user_id: None,
            confirmed_at: None,
            rejected_by_team_id: None,
            rejected_by_user_id: None,
            rejected_at: None,
            rejection_reason: None,
            last_edited_by: self.last_edit.as_ref().map(|e| e.user_id.clone()),
            last_edited_at: self.last_edit.as_ref().map(|e| e.at),
            created_at: self.created_at,
            updated_at: self.updated_at,
        };

        match &self.state {
            ResultState::Pending => {}
            ResultState::Confirmed(review) => {
                record.confirmed_by_team_id = review.team_id;
                record.confirmed_by_user_id = Some(review.user_id.clone());
                record.confirmed_at = Some(review.at);
            }
            ResultState::Disputed { review, reason } => {
                record.rejected_by_team_id = review.team_id;
                record.rejected_by_user_id = Some(review.user_id.clone());
                record.rejected_at = Some(review.at);
                record.rejection_reason = reason.clone();
            }
        }

        record
    }
}

impl TryFrom<ResultRecord> for GameResult {
    type Error = RecordError;

    fn try_from(record: ResultRecord) -> Result<Self, Self::Error> {
        const ENTITY: &str = "result";
        let id = record.id;

        let state = match record.status {
            ResultStatus::Pending => ResultState::Pending,
            ResultStatus::Confirmed => ResultState::Confirmed(Review {
                team_id: record.confirmed_by_team_id,
                user_id: required(
                    record.confirmed_by_user_id.clone(),
                    ENTITY,
                    id,
                    "confirmed_by_user_id",
                )?,
                at: required(record.confirmed_at, ENTITY, id, "confirmed_at")?,
            }),
            ResultStatus::Disputed => ResultState::Disputed {
                review: Review {
                    team_id: record.rejected_by_team_id,
                    user_id: required(
                        record.rejected_by_user_id.clone(),
                        ENTITY,
                        id,
                        "rejected_by_user_id",
                    )?,
                    at: required(record.rejected_at, ENTITY, id, "rejected_at")?,
                },
                reason: record.rejection_reason.clone(),
            },
        };

        let last_edit = match (record.last_edited_by, record.last_edited_at) {
            (Some(user_id), Some(at)) => Some(Edit { user_id, at }),
            _ => None,
        };

        Ok(GameResult {
            id,
            season_id: record.season_id,
            booking_id: record.booking_id,
            home_team_id: record.home_team_id,
            home_team_name: record.home_team_name,
            away_team_id: record.away_team_id,
            away_team_name: record.away_team_name,
            home_score: record.home_score,
            away_score: record.away_score,
            reported_by_team_id: record.reported_by_team_id,
            reported_by_user_id: record.reported_by_user_id,
            date: record.date,
            location: record.location,
            friendly: record.friendly,
            state,
            last_edit,
            created_at: record.created_at,
            updated_at: record.updated_at,
        })
    }
}

// =============================================================================
// Requests
// =============================================================================

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Score {
    pub home_score: i32,
    pub away_score: i32,
}

/// A game played without a booking (e.g. on a pitch outside the system)
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ReportResult {
    pub home_score: i32,
    pub away_score: i32,
    #[validate(length(max = 255))]
    pub location: Option<String>,
}

impl ReportResult {
    pub fn score(&self) -> Score {
        Score {
            home_score: self.home_score,
            away_score: self.away_score,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ResultActionRequest {
    pub action: ResultAction,
    pub reason: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UnbookedResult {
    pub season_id: Uuid,
    pub home_team_id: Uuid,
    pub away_team_id: Uuid,
    pub home_score: i32,
    pub away_score: i32,
    pub date: Option<DateTime<Utc>>,
    #[validate(length(max = 255))]
    pub location: Option<String>,
    #[serde(default)]
    pub friendly: bool,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct AdminCreateResult {
    pub season_id: Uuid,
    pub booking_id: Option<Uuid>,
    pub home_team_id: Uuid,
    pub away_team_id: Uuid,
    pub home_score: i32,
    pub away_score: i32,
    pub date: Option<DateTime<Utc>>,
    #[validate(length(max = 255))]
    pub location: Option<String>,
    #[serde(default)]
    pub friendly: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AdminUpdateResult {
    pub home_score: i32,
    pub away_score: i32,
    /// Move the linked booking to `played` (true) or back to `confirmed` (false)
    pub booking_played: Option<bool>,
}
