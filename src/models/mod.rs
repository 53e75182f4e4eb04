//! Data models for the application

mod booking;
mod result;
mod season;

pub use booking::*;
pub use result::*;
pub use season::*;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

/// A stored record that cannot be turned into a consistent domain value
#[derive(Debug, thiserror::Error)]
#[error("Inconsistent {entity} record {id}: {reason}")]
pub struct RecordError {
    pub entity: &'static str,
    pub id: Uuid,
    pub reason: String,
}

impl RecordError {
    pub(crate) fn missing(entity: &'static str, id: Uuid, field: &str) -> Self {
        Self {
            entity,
            id,
            reason: format!("'{}' is required for its status", field),
        }
    }
}

/// Unwrap a column that the record's status says must be present
pub(crate) fn required<T>(
    value: Option<T>,
    entity: &'static str,
    id: Uuid,
    field: &str,
) -> Result<T, RecordError> {
    value.ok_or_else(|| RecordError::missing(entity, id, field))
}

// =============================================================================
// Identity
// =============================================================================

/// Caller identity resolved from a bearer token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthUser {
    pub uid: String,
    pub admin: bool,
    pub team_id: Option<Uuid>,
}

impl AuthUser {
    /// Whether this caller plays for (or administers on behalf of) the team
    pub fn acts_for(&self, team_id: Uuid) -> bool {
        self.team_id == Some(team_id)
    }
}

#[derive(Debug, Clone, FromRow)]
#[allow(dead_code)]
pub struct ApiToken {
    pub id: Uuid,
    pub token_hash: String,
    pub uid: String,
    pub is_admin: bool,
    pub team_id: Option<Uuid>,
    pub label: Option<String>,
    pub created_at: DateTime<Utc>,
    pub revoked_at: Option<DateTime<Utc>>,
}

impl From<ApiToken> for AuthUser {
    fn from(token: ApiToken) -> Self {
        Self {
            uid: token.uid,
            admin: token.is_admin,
            team_id: token.team_id,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct IssueToken {
    #[validate(length(min = 1, max = 128))]
    pub uid: String,
    #[serde(default)]
    pub admin: bool,
    pub team_id: Option<Uuid>,
    #[validate(length(max = 100))]
    pub label: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct IssuedToken {
    /// Plain token, only ever returned once
    pub token: String,
    pub uid: String,
    pub admin: bool,
    pub team_id: Option<Uuid>,
}

// =============================================================================
// Team
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Team {
    pub id: Uuid,
    pub name: String,
    pub contact_email: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTeam {
    pub name: String,
    pub contact_email: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateTeam {
    pub name: Option<String>,
    pub contact_email: Option<String>,
}

// =============================================================================
// Pitch
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Pitch {
    pub id: Uuid,
    pub name: String,
    pub address: Option<String>,
    /// Verified pitches are league-managed; their slots are regenerated on cancellation
    pub is_verified: bool,
    pub owner_team_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreatePitch {
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    #[validate(length(max = 255))]
    pub address: Option<String>,
    #[serde(default)]
    pub is_verified: bool,
    pub owner_team_id: Option<Uuid>,
}

// =============================================================================
// API Responses
// =============================================================================

#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            message: Some(message.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_envelope_carries_message() {
        let body = serde_json::to_value(ApiResponse::<()>::error("Slot already taken")).unwrap();
        assert_eq!(body["success"], false);
        assert_eq!(body["message"], "Slot already taken");
        assert!(body.get("data").is_none());
    }

    #[test]
    fn test_success_envelope_carries_data() {
        let body = serde_json::to_value(ApiResponse::success(vec![1, 2])).unwrap();
        assert_eq!(body["success"], true);
        assert_eq!(body["data"], serde_json::json!([1, 2]));
        assert!(body.get("message").is_none());
    }

    #[test]
    fn test_acts_for() {
        let team = Uuid::new_v4();
        let user = AuthUser {
            uid: "captain".to_string(),
            admin: false,
            team_id: Some(team),
        };
        assert!(user.acts_for(team));
        assert!(!user.acts_for(Uuid::new_v4()));
    }
}
