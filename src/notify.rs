//! Email notifications
//!
//! Messages are handed to a mail webhook as JSON once a transition has been
//! committed. Delivery runs on its own task; failures are logged and never
//! reach the request that triggered them.

use crate::engine::result::TeamNames;
use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use serde::Serialize;
use sqlx::PgPool;
use uuid::Uuid;

/// Payload posted to the mail webhook
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Email {
    pub from: String,
    pub to: String,
    pub subject: String,
    pub text: String,
    pub html: String,
}

/// Subject and plain-text body of a notification
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub subject: String,
    pub text: String,
}

impl Message {
    fn new(subject: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            subject: subject.into(),
            text: text.into(),
        }
    }

    /// HTML rendering: one escaped paragraph per text paragraph
    pub fn html(&self) -> String {
        self.text
            .split("\n\n")
            .map(|p| format!("<p>{}</p>", escape_html(p).replace('\n', "<br>")))
            .collect()
    }
}

#[derive(Clone)]
pub struct Notifier {
    client: reqwest::Client,
    webhook_url: Option<String>,
    from: String,
    timezone: Tz,
}

impl Notifier {
    pub fn new(webhook_url: Option<String>, from: String, timezone: Tz) -> Self {
        Self {
            client: reqwest::Client::new(),
            webhook_url,
            from,
            timezone,
        }
    }

    /// Kick-off time in league-local time, e.g. "04.10.2025 18:30"
    pub fn kickoff(&self, date: DateTime<Utc>) -> String {
        format_kickoff(self.timezone, date)
    }

    /// Send `message` to the contact address of each team, in the background
    pub fn notify_teams(&self, pool: &PgPool, team_ids: Vec<Uuid>, message: Message) {
        let notifier = self.clone();
        let pool = pool.clone();

        tokio::spawn(async move {
            for team_id in team_ids {
                if let Err(e) = notifier.notify_team(&pool, team_id, &message).await {
                    tracing::warn!("Failed to notify team {}: {}", team_id, e);
                }
            }
        });
    }

    async fn notify_team(
        &self,
        pool: &PgPool,
        team_id: Uuid,
        message: &Message,
    ) -> Result<(), NotifyError> {
        let contact: Option<Option<String>> =
            sqlx::query_scalar("SELECT contact_email FROM teams WHERE id = $1")
                .bind(team_id)
                .fetch_optional(pool)
                .await?;

        let Some(to) = contact.flatten().filter(|c| !c.is_empty()) else {
            tracing::debug!("Team {} has no contact address, skipping notification", team_id);
            return Ok(());
        };

        self.deliver(Email {
            from: self.from.clone(),
            to,
            subject: message.subject.clone(),
            text: message.text.clone(),
            html: message.html(),
        })
        .await
    }

    async fn deliver(&self, email: Email) -> Result<(), NotifyError> {
        let Some(url) = &self.webhook_url else {
            tracing::info!(to = %email.to, subject = %email.subject, "Mail webhook not configured, email not sent");
            return Ok(());
        };

        self.client
            .post(url)
            .json(&email)
            .send()
            .await?
            .error_for_status()?;

        tracing::info!(to = %email.to, subject = %email.subject, "Email sent");
        Ok(())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    #[error("lookup failed: {0}")]
    Database(#[from] sqlx::Error),
    #[error("delivery failed: {0}")]
    Http(#[from] reqwest::Error),
}

pub fn format_kickoff(tz: Tz, date: DateTime<Utc>) -> String {
    date.with_timezone(&tz).format("%d.%m.%Y %H:%M").to_string()
}

/// Escape HTML special characters
pub fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#x27;")
}

/// Display name of a team for message texts
pub fn team_name(names: &TeamNames, team_id: Uuid) -> &str {
    names.get(&team_id).map(String::as_str).unwrap_or("Ein Team")
}

fn with_reason(text: String, reason: Option<&str>) -> String {
    match reason.map(str::trim).filter(|r| !r.is_empty()) {
        Some(reason) => format!("{}\n\nBegründung: {}", text, reason),
        None => text,
    }
}

// =============================================================================
// Templates
// =============================================================================

pub fn slot_requested(home_team: &str, kickoff: &str) -> Message {
    Message::new(
        format!("Spielanfrage von {}", home_team),
        format!(
            "{} möchte am {} gegen euch spielen.\n\nBitte bestätigt oder lehnt die Anfrage ab.",
            home_team, kickoff
        ),
    )
}

pub fn booking_confirmed(away_team: &str, kickoff: &str) -> Message {
    Message::new(
        "Spiel bestätigt",
        format!("{} hat das Spiel am {} bestätigt.", away_team, kickoff),
    )
}

pub fn booking_denied(away_team: &str, kickoff: &str, reason: Option<&str>) -> Message {
    Message::new(
        "Spielanfrage abgelehnt",
        with_reason(
            format!("{} hat die Anfrage für den {} abgelehnt.", away_team, kickoff),
            reason,
        ),
    )
}

pub fn forfeit_awarded(winner: &str, loser: &str, score: (i32, i32)) -> Message {
    Message::new(
        "Spielwertung nach Absagen",
        format!(
            "{} hat zu viele Spielanfragen abgelehnt. Das Spiel wird mit {}:{} für {} gewertet.",
            loser, score.0, score.1, winner
        ),
    )
}

pub fn booking_cancelled(team: &str, kickoff: &str, reason: Option<&str>) -> Message {
    Message::new(
        "Spiel abgesagt",
        with_reason(format!("{} hat das Spiel am {} abgesagt.", team, kickoff), reason),
    )
}

pub fn cancellation_requested(team: &str, kickoff: &str, reason: Option<&str>) -> Message {
    Message::new(
        "Absage angefragt",
        with_reason(
            format!(
                "{} möchte das Spiel am {} kurzfristig absagen.\n\nBitte stimmt der Absage zu oder lehnt sie ab.",
                team, kickoff
            ),
            reason,
        ),
    )
}

pub fn cancellation_rejected(team: &str, kickoff: &str, reason: Option<&str>) -> Message {
    Message::new(
        "Absage abgelehnt",
        with_reason(
            format!(
                "{} hat der Absage für den {} nicht zugestimmt. Das Spiel findet statt.",
                team, kickoff
            ),
            reason,
        ),
    )
}

pub fn cancellation_accepted(team: &str, kickoff: &str) -> Message {
    Message::new(
        "Absage angenommen",
        format!(
            "{} hat der Absage für den {} zugestimmt. Das Spiel ist abgesagt.",
            team, kickoff
        ),
    )
}

pub fn admin_cancelled(kickoff: &str, reason: &str) -> Message {
    Message::new(
        "Spiel von der Liga abgesagt",
        with_reason(
            format!("Die Ligaleitung hat das Spiel am {} abgesagt.", kickoff),
            Some(reason),
        ),
    )
}

pub fn result_reported(home: &str, away: &str, score: (i32, i32)) -> Message {
    Message::new(
        "Ergebnis eingetragen",
        format!(
            "Für das Spiel {} gegen {} wurde {}:{} eingetragen.\n\nBitte bestätigt das Ergebnis oder widersprecht.",
            home, away, score.0, score.1
        ),
    )
}

pub fn result_disputed(home: &str, away: &str, reason: Option<&str>) -> Message {
    Message::new(
        "Ergebnis angefochten",
        with_reason(
            format!(
                "Das Ergebnis {} gegen {} wurde angefochten. Die Ligaleitung wird sich melden.",
                home, away
            ),
            reason,
        ),
    )
}
