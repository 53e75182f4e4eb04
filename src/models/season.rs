//! Season, roster and standings types

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "season_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum SeasonStatus {
    Planning,
    Active,
    Finished,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "roster_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum RosterStatus {
    Active,
    Inactive,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RankingCriterion {
    Points,
    GoalDifference,
    GoalsScored,
    HeadToHead,
}

pub fn default_ranking_criteria() -> Vec<RankingCriterion> {
    vec![
        RankingCriterion::Points,
        RankingCriterion::GoalDifference,
        RankingCriterion::GoalsScored,
    ]
}

// =============================================================================
// Season
// =============================================================================

#[derive(Debug, Clone, FromRow)]
pub struct Season {
    pub id: Uuid,
    pub name: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub status: SeasonStatus,
    pub max_denials: i32,
    pub cancellation_deadline_days: i32,
    pub forfeit_win_score: i32,
    pub forfeit_loss_score: i32,
    pub points_for_win: i32,
    pub points_for_draw: i32,
    pub points_for_loss: i32,
    pub ranking_criteria: Json<Vec<RankingCriterion>>,
    pub min_games_played: i32,
    pub final_table: Option<Json<Vec<StandingsRow>>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Season {
    pub fn is_finished(&self) -> bool {
        self.status == SeasonStatus::Finished
    }

    pub fn rules(&self) -> SeasonRules {
        SeasonRules {
            max_denials: self.max_denials,
            cancellation_deadline_days: self.cancellation_deadline_days,
            forfeit_win_score: self.forfeit_win_score,
            forfeit_loss_score: self.forfeit_loss_score,
            points_for_win: self.points_for_win,
            points_for_draw: self.points_for_draw,
            points_for_loss: self.points_for_loss,
            ranking_criteria: self.ranking_criteria.0.clone(),
            min_games_played: self.min_games_played,
        }
    }

    pub fn apply_rules(&mut self, rules: SeasonRules) {
        self.max_denials = rules.max_denials;
        self.cancellation_deadline_days = rules.cancellation_deadline_days;
        self.forfeit_win_score = rules.forfeit_win_score;
        self.forfeit_loss_score = rules.forfeit_loss_score;
        self.points_for_win = rules.points_for_win;
        self.points_for_draw = rules.points_for_draw;
        self.points_for_loss = rules.points_for_loss;
        self.ranking_criteria = Json(rules.ranking_criteria);
        self.min_games_played = rules.min_games_played;
    }

    /// A fresh season in planning, as created by an admin
    pub fn planned(input: &CreateSeason, now: DateTime<Utc>) -> Self {
        let mut season = Self {
            id: Uuid::new_v4(),
            name: input.name.trim().to_string(),
            start_date: input.start_date,
            end_date: input.end_date,
            status: SeasonStatus::Planning,
            max_denials: 0,
            cancellation_deadline_days: 0,
            forfeit_win_score: 0,
            forfeit_loss_score: 0,
            points_for_win: 0,
            points_for_draw: 0,
            points_for_loss: 0,
            ranking_criteria: Json(Vec::new()),
            min_games_played: 0,
            final_table: None,
            created_at: now,
            updated_at: now,
        };
        season.apply_rules(input.rules.clone());
        season
    }
}

/// Configurable competition rules of a season
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct SeasonRules {
    /// Denials after which every further denial forfeits the game (0 disables)
    #[validate(range(min = 0, max = 50))]
    pub max_denials: i32,
    /// Days before kick-off after which cancelling needs the opponent's consent (0 disables)
    #[validate(range(min = 0, max = 60))]
    pub cancellation_deadline_days: i32,
    #[validate(range(min = 0, max = 99))]
    pub forfeit_win_score: i32,
    #[validate(range(min = 0, max = 99))]
    pub forfeit_loss_score: i32,
    #[validate(range(min = 0, max = 10))]
    pub points_for_win: i32,
    #[validate(range(min = 0, max = 10))]
    pub points_for_draw: i32,
    #[validate(range(min = 0, max = 10))]
    pub points_for_loss: i32,
    pub ranking_criteria: Vec<RankingCriterion>,
    #[validate(range(min = 0, max = 100))]
    pub min_games_played: i32,
}

impl Default for SeasonRules {
    fn default() -> Self {
        Self {
            max_denials: 0,
            cancellation_deadline_days: 0,
            forfeit_win_score: 3,
            forfeit_loss_score: 0,
            points_for_win: 3,
            points_for_draw: 1,
            points_for_loss: 0,
            ranking_criteria: default_ranking_criteria(),
            min_games_played: 0,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateSeason {
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    #[validate(length(min = 2, message = "a season needs at least two teams"))]
    pub team_ids: Vec<Uuid>,
    #[serde(default)]
    pub rules: SeasonRules,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpdateRosterEntry {
    pub status: RosterStatus,
}

// =============================================================================
// Roster
// =============================================================================

/// A team's participation in a season; the name is joined from the team registry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct RosterEntry {
    pub team_id: Uuid,
    pub name: String,
    pub status: RosterStatus,
}

// =============================================================================
// Standings
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StandingsRow {
    pub team_id: Uuid,
    pub team_name: String,
    pub games_played: i32,
    pub wins: i32,
    pub draws: i32,
    pub losses: i32,
    pub goals_scored: i32,
    pub goals_conceded: i32,
    pub goal_difference: i32,
    pub points: i32,
}

impl StandingsRow {
    pub fn new(team_id: Uuid, team_name: impl Into<String>) -> Self {
        Self {
            team_id,
            team_name: team_name.into(),
            games_played: 0,
            wins: 0,
            draws: 0,
            losses: 0,
            goals_scored: 0,
            goals_conceded: 0,
            goal_difference: 0,
            points: 0,
        }
    }
}

// =============================================================================
// Responses
// =============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct SeasonResponse {
    pub id: Uuid,
    pub name: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub status: SeasonStatus,
    pub is_finished: bool,
    pub teams: Vec<RosterEntry>,
    #[serde(flatten)]
    pub rules: SeasonRules,
    pub final_table: Option<Vec<StandingsRow>>,
}

impl SeasonResponse {
    pub fn new(season: Season, teams: Vec<RosterEntry>) -> Self {
        Self {
            is_finished: season.is_finished(),
            rules: season.rules(),
            id: season.id,
            name: season.name,
            start_date: season.start_date,
            end_date: season.end_date,
            status: season.status,
            teams,
            final_table: season.final_table.map(|table| table.0),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct TableResponse {
    pub season_id: Uuid,
    /// True when the table is the frozen final table of a finished season
    pub is_final: bool,
    pub rows: Vec<StandingsRow>,
}
