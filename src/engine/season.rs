//! Season lifecycle: planning, active, finished

use super::standings::compute_table;
use super::{EngineError, EngineResult};
use crate::models::*;
use crate::validation::validate_season_rules;
use chrono::{DateTime, Utc};
use sqlx::types::Json;

/// Move a season from planning to active
pub fn activate(season: &Season, now: DateTime<Utc>) -> EngineResult<Season> {
    if season.status != SeasonStatus::Planning {
        return Err(EngineError::state("Only seasons in planning can be activated"));
    }

    Ok(Season {
        status: SeasonStatus::Active,
        updated_at: now,
        ..season.clone()
    })
}

/// Finish an active season and freeze its final table
pub fn finish(
    season: &Season,
    roster: &[RosterEntry],
    results: &[GameResult],
    now: DateTime<Utc>,
) -> EngineResult<Season> {
    if season.status != SeasonStatus::Active {
        return Err(EngineError::state("Only the active season can be finished"));
    }

    let table = compute_table(season, roster, results, true);

    Ok(Season {
        status: SeasonStatus::Finished,
        final_table: Some(Json(table)),
        updated_at: now,
        ..season.clone()
    })
}

pub fn update_rules(season: &Season, rules: SeasonRules, now: DateTime<Utc>) -> EngineResult<Season> {
    if season.is_finished() {
        return Err(EngineError::state("Rules of a finished season cannot change"));
    }
    validate_season_rules(&rules)?;

    let mut updated = Season {
        updated_at: now,
        ..season.clone()
    };
    updated.apply_rules(rules);
    Ok(updated)
}

/// The table to show for a season: frozen once finished, live otherwise
pub fn table_for(season: &Season, roster: &[RosterEntry], results: &[GameResult]) -> TableResponse {
    match (&season.status, &season.final_table) {
        (SeasonStatus::Finished, Some(frozen)) => TableResponse {
            season_id: season.id,
            is_final: true,
            rows: frozen.0.clone(),
        },
        _ => TableResponse {
            season_id: season.id,
            is_final: false,
            rows: compute_table(season, roster, results, false),
        },
    }
}
