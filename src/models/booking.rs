//! Booking slots and their lifecycle states
//!
//! `BookingRecord` is the flat row stored in Postgres and returned by the API.
//! `Booking` is what the engine works with: its `state` only carries the
//! fields that are meaningful for the current status.

use super::{required, RecordError};
use crate::engine::booking::{BookingAction, CancellationResponse};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "booking_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum BookingStatus {
    Available,
    PendingAwayConfirm,
    Confirmed,
    Denied,
    CancellationPending,
    Cancelled,
    CancelledAdmin,
    Played,
}

// =============================================================================
// Stored record
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct BookingRecord {
    pub id: Uuid,
    pub date: DateTime<Utc>,
    pub duration_minutes: i32,
    pub pitch_id: Uuid,
    pub season_id: Uuid,
    pub created_by: String,
    pub home_team_id: Option<Uuid>,
    pub away_team_id: Option<Uuid>,
    pub status: BookingStatus,
    pub is_available: bool,
    pub friendly: bool,
    pub denied_by_team_id: Option<Uuid>,
    pub denied_at: Option<DateTime<Utc>>,
    pub denial_reason: Option<String>,
    pub cancelled_by_team_id: Option<Uuid>,
    pub cancelled_at: Option<DateTime<Utc>>,
    pub cancellation_requested_by_team_id: Option<Uuid>,
    pub cancellation_requested_at: Option<DateTime<Utc>>,
    pub cancellation_request_reason: Option<String>,
    pub cancellation_rejection_reason: Option<String>,
    pub admin_cancelled_by: Option<String>,
    pub admin_cancellation_reason: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// =============================================================================
// Domain
// =============================================================================

/// Where and when a booking takes place
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Slot {
    pub date: DateTime<Utc>,
    pub duration_minutes: i32,
    pub pitch_id: Uuid,
    pub season_id: Uuid,
}

/// The teams holding a booking. A hold without opponent has no away team.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Fixture {
    pub home_team_id: Uuid,
    pub away_team_id: Option<Uuid>,
}

impl Fixture {
    pub fn new(home_team_id: Uuid, away_team_id: Uuid) -> Self {
        Self {
            home_team_id,
            away_team_id: Some(away_team_id),
        }
    }

    pub fn involves(&self, team_id: Uuid) -> bool {
        self.home_team_id == team_id || self.away_team_id == Some(team_id)
    }

    pub fn opponent_of(&self, team_id: Uuid) -> Option<Uuid> {
        if self.home_team_id == team_id {
            self.away_team_id
        } else if self.away_team_id == Some(team_id) {
            Some(self.home_team_id)
        } else {
            None
        }
    }

    /// Same two teams, regardless of who is at home
    pub fn is_pairing(&self, a: Uuid, b: Uuid) -> bool {
        match self.away_team_id {
            Some(away) => {
                (self.home_team_id == a && away == b) || (self.home_team_id == b && away == a)
            }
            None => false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Denial {
    pub team_id: Uuid,
    pub at: DateTime<Utc>,
    pub reason: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CancellationRequest {
    pub team_id: Uuid,
    pub at: DateTime<Utc>,
    pub reason: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BookingState {
    Available,
    PendingAwayConfirm {
        fixture: Fixture,
    },
    Confirmed {
        fixture: Fixture,
        /// Reason given when the last cancellation request was turned down
        rejected_cancellation: Option<String>,
    },
    Denied {
        fixture: Fixture,
        denial: Denial,
    },
    CancellationPending {
        fixture: Fixture,
        request: CancellationRequest,
    },
    Cancelled {
        fixture: Fixture,
        cancelled_by_team_id: Uuid,
        cancelled_at: DateTime<Utc>,
        request: Option<CancellationRequest>,
    },
    CancelledAdmin {
        fixture: Option<Fixture>,
        admin_id: String,
        reason: String,
        cancelled_at: DateTime<Utc>,
    },
    Played {
        fixture: Fixture,
    },
}

impl BookingState {
    pub fn status(&self) -> BookingStatus {
        match self {
            BookingState::Available => BookingStatus::Available,
            BookingState::PendingAwayConfirm { .. } => BookingStatus::PendingAwayConfirm,
            BookingState::Confirmed { .. } => BookingStatus::Confirmed,
            BookingState::Denied { .. } => BookingStatus::Denied,
            BookingState::CancellationPending { .. } => BookingStatus::CancellationPending,
            BookingState::Cancelled { .. } => BookingStatus::Cancelled,
            BookingState::CancelledAdmin { .. } => BookingStatus::CancelledAdmin,
            BookingState::Played { .. } => BookingStatus::Played,
        }
    }

    pub fn fixture(&self) -> Option<&Fixture> {
        match self {
            BookingState::Available => None,
            BookingState::CancelledAdmin { fixture, .. } => fixture.as_ref(),
            BookingState::PendingAwayConfirm { fixture }
            | BookingState::Confirmed { fixture, .. }
            | BookingState::Denied { fixture, .. }
            | BookingState::CancellationPending { fixture, .. }
            | BookingState::Cancelled { fixture, .. }
            | BookingState::Played { fixture } => Some(fixture),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Booking {
    pub id: Uuid,
    pub slot: Slot,
    pub created_by: String,
    pub friendly: bool,
    pub state: BookingState,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Booking {
    /// A new unclaimed slot
    pub fn open(slot: Slot, created_by: &str, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            slot,
            created_by: created_by.to_string(),
            friendly: false,
            state: BookingState::Available,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn status(&self) -> BookingStatus {
        self.state.status()
    }

    pub fn fixture(&self) -> Option<&Fixture> {
        self.state.fixture()
    }

    pub fn is_available(&self) -> bool {
        self.fixture().is_none()
    }

    /// Copy of this booking moved into `state`
    pub fn with_state(&self, state: BookingState, now: DateTime<Utc>) -> Self {
        Self {
            state,
            updated_at: now,
            ..self.clone()
        }
    }

    pub fn to_record(&self) -> BookingRecord {
        let fixture = self.fixture();
        let mut record = BookingRecord {
            id: self.id,
            date: self.slot.date,
            duration_minutes: self.slot.duration_minutes,
            pitch_id: self.slot.pitch_id,
            season_id: self.slot.season_id,
            created_by: self.created_by.clone(),
            home_team_id: fixture.map(|f| f.home_team_id),
            away_team_id: fixture.and_then(|f| f.away_team_id),
            status: self.status(),
            is_available: self.is_available(),
            friendly: self.friendly,
            denied_by_team_id: None,
            denied_at: None,
            denial_reason: None,
            cancelled_by_team_id: None,
            cancelled_at: None,
            cancellation_requested_by_team_id: None,
            cancellation_requested_at: None,
            cancellation_request_reason: None,
            cancellation_rejection_reason: None,
            admin_cancelled_by: None,
            admin_cancellation_reason: None,
            created_at: self.created_at,
            updated_at: self.updated_at,
        };

        match &self.state {
            BookingState::Confirmed {
                rejected_cancellation,
                ..
            } => {
                record.cancellation_rejection_reason = rejected_cancellation.clone();
            }
            BookingState::Denied { denial, .. } => {
                record.denied_by_team_id = Some(denial.team_id);
                record.denied_at = Some(denial.at);
                record.denial_reason = denial.reason.clone();
            }
            BookingState::CancellationPending { request, .. } => {
                record.set_request(Some(request));
            }
            BookingState::Cancelled {
                cancelled_by_team_id,
                cancelled_at,
                request,
                ..
            } => {
                record.cancelled_by_team_id = Some(*cancelled_by_team_id);
                record.cancelled_at = Some(*cancelled_at);
                record.set_request(request.as_ref());
            }
            BookingState::CancelledAdmin {
                admin_id,
                reason,
                cancelled_at,
                ..
            } => {
                record.admin_cancelled_by = Some(admin_id.clone());
                record.admin_cancellation_reason = Some(reason.clone());
                record.cancelled_at = Some(*cancelled_at);
            }
            BookingState::Available
            | BookingState::PendingAwayConfirm { .. }
            | BookingState::Played { .. } => {}
        }

        record
    }
}

impl BookingRecord {
    fn set_request(&mut self, request: Option<&CancellationRequest>) {
        if let Some(request) = request {
            self.cancellation_requested_by_team_id = Some(request.team_id);
            self.cancellation_requested_at = Some(request.at);
            self.cancellation_request_reason = request.reason.clone();
        }
    }

    fn request(&self) -> Option<CancellationRequest> {
        Some(CancellationRequest {
            team_id: self.cancellation_requested_by_team_id?,
            at: self.cancellation_requested_at?,
            reason: self.cancellation_request_reason.clone(),
        })
    }
}

impl TryFrom<BookingRecord> for Booking {
    type Error = RecordError;

    fn try_from(record: BookingRecord) -> Result<Self, Self::Error> {
        const ENTITY: &str = "booking";
        let id = record.id;

        let fixture = match (record.home_team_id, record.away_team_id) {
            (Some(home_team_id), away_team_id) => Some(Fixture {
                home_team_id,
                away_team_id,
            }),
            (None, None) => None,
            (None, Some(_)) => {
                return Err(RecordError {
                    entity: ENTITY,
                    id,
                    reason: "away team set without home team".to_string(),
                })
            }
        };
        let teams = |fixture: Option<Fixture>| required(fixture, ENTITY, id, "home_team_id");

        let state = match record.status {
            BookingStatus::Available => {
                if fixture.is_some() {
                    return Err(RecordError {
                        entity: ENTITY,
                        id,
                        reason: "available booking holds teams".to_string(),
                    });
                }
                BookingState::Available
            }
            BookingStatus::PendingAwayConfirm => {
                let fixture = teams(fixture)?;
                required(fixture.away_team_id, ENTITY, id, "away_team_id")?;
                BookingState::PendingAwayConfirm { fixture }
            }
            BookingStatus::Confirmed => BookingState::Confirmed {
                fixture: teams(fixture)?,
                rejected_cancellation: record.cancellation_rejection_reason.clone(),
            },
            BookingStatus::Denied => BookingState::Denied {
                fixture: teams(fixture)?,
                denial: Denial {
                    team_id: required(record.denied_by_team_id, ENTITY, id, "denied_by_team_id")?,
                    at: required(record.denied_at, ENTITY, id, "denied_at")?,
                    reason: record.denial_reason.clone(),
                },
            },
            BookingStatus::CancellationPending => BookingState::CancellationPending {
                fixture: teams(fixture)?,
                request: required(
                    record.request(),
                    ENTITY,
                    id,
                    "cancellation_requested_by_team_id",
                )?,
            },
            BookingStatus::Cancelled => BookingState::Cancelled {
                fixture: teams(fixture)?,
                cancelled_by_team_id: required(
                    record.cancelled_by_team_id,
                    ENTITY,
                    id,
                    "cancelled_by_team_id",
                )?,
                cancelled_at: required(record.cancelled_at, ENTITY, id, "cancelled_at")?,
                request: record.request(),
            },
            BookingStatus::CancelledAdmin => BookingState::CancelledAdmin {
                fixture,
                admin_id: required(record.admin_cancelled_by.clone(), ENTITY, id, "admin_cancelled_by")?,
                reason: record.admin_cancellation_reason.clone().unwrap_or_default(),
                cancelled_at: required(record.cancelled_at, ENTITY, id, "cancelled_at")?,
            },
            BookingStatus::Played => BookingState::Played {
                fixture: teams(fixture)?,
            },
        };

        Ok(Booking {
            id,
            slot: Slot {
                date: record.date,
                duration_minutes: record.duration_minutes,
                pitch_id: record.pitch_id,
                season_id: record.season_id,
            },
            created_by: record.created_by,
            friendly: record.friendly,
            state,
            created_at: record.created_at,
            updated_at: record.updated_at,
        })
    }
}

// =============================================================================
// Requests
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BulkSlotRequest {
    pub season_id: Option<Uuid>,
    #[serde(default)]
    pub pitch_ids: Vec<Uuid>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    /// 0 = Sunday … 6 = Saturday
    #[serde(default)]
    pub days_of_week: Vec<u32>,
    /// League-local kick-off times as "HH:MM"
    #[serde(default)]
    pub times: Vec<String>,
    pub duration_minutes: Option<i32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BulkSlotResponse {
    pub created: usize,
    pub bookings: Vec<BookingRecord>,
}

/// A booking after a cancellation step, with the slot that replaced it
#[derive(Debug, Clone, Serialize)]
pub struct CancellationResult {
    pub booking: BookingRecord,
    pub replacement: Option<BookingRecord>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RequestSlot {
    pub home_team_id: Uuid,
    pub away_team_id: Uuid,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CustomBooking {
    pub season_id: Uuid,
    pub pitch_id: Uuid,
    pub date: DateTime<Utc>,
    #[validate(range(min = 15, max = 300))]
    pub duration_minutes: Option<i32>,
    pub home_team_id: Option<Uuid>,
    pub away_team_id: Option<Uuid>,
    #[serde(default)]
    pub friendly: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BookingActionRequest {
    pub action: BookingAction,
    pub reason: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CancelBookingRequest {
    pub reason: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CancellationReply {
    pub response: CancellationResponse,
    pub reason: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AdminCancelRequest {
    pub reason: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AvailableSlotsQuery {
    pub season_id: Option<Uuid>,
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
}
