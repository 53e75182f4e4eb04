//! Ranked season table

use crate::models::{GameResult, RankingCriterion, RosterEntry, Season, StandingsRow};
use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};
use uuid::Uuid;

/// Points, goal difference and goals from games among a tied group
type MutualKey = (i32, i32, i32);

fn counts(result: &GameResult, season_id: Uuid) -> bool {
    result.is_confirmed() && !result.friendly && result.season_id == season_id
}

fn record_game(row: &mut StandingsRow, scored: i32, conceded: i32, season: &Season) {
    row.games_played += 1;
    row.goals_scored += scored;
    row.goals_conceded += conceded;
    row.goal_difference = row.goals_scored - row.goals_conceded;

    match scored.cmp(&conceded) {
        Ordering::Greater => {
            row.wins += 1;
            row.points += season.points_for_win;
        }
        Ordering::Equal => {
            row.draws += 1;
            row.points += season.points_for_draw;
        }
        Ordering::Less => {
            row.losses += 1;
            row.points += season.points_for_loss;
        }
    }
}

/// Compute the table of `season` from its roster and results.
///
/// Only confirmed, non-friendly results of the season count, and only for
/// teams on the roster. With `apply_final_rules` the season's minimum number
/// of games is enforced.
pub fn compute_table(
    season: &Season,
    roster: &[RosterEntry],
    results: &[GameResult],
    apply_final_rules: bool,
) -> Vec<StandingsRow> {
    let mut rows: HashMap<Uuid, StandingsRow> = roster
        .iter()
        .map(|entry| (entry.team_id, StandingsRow::new(entry.team_id, entry.name.clone())))
        .collect();

    let counted: Vec<&GameResult> = results.iter().filter(|r| counts(r, season.id)).collect();

    for result in &counted {
        if let Some(row) = rows.get_mut(&result.home_team_id) {
            record_game(row, result.home_score, result.away_score, season);
        }
        if let Some(row) = rows.get_mut(&result.away_team_id) {
            record_game(row, result.away_score, result.home_score, season);
        }
    }

    let mut table: Vec<StandingsRow> = rows.into_values().collect();

    if apply_final_rules && season.min_games_played > 0 {
        table.retain(|row| row.games_played >= season.min_games_played);
    }

    let criteria = &season.ranking_criteria.0;
    let mutual = mutual_keys(&table, &counted, criteria, season);

    table.sort_by(|a, b| {
        compare(a, b, criteria, &mutual)
            .then_with(|| a.team_name.cmp(&b.team_name))
            .then_with(|| a.team_id.cmp(&b.team_id))
    });

    table
}

fn criterion_key(row: &StandingsRow, criterion: RankingCriterion) -> Option<i32> {
    match criterion {
        RankingCriterion::Points => Some(row.points),
        RankingCriterion::GoalDifference => Some(row.goal_difference),
        RankingCriterion::GoalsScored => Some(row.goals_scored),
        RankingCriterion::HeadToHead => None,
    }
}

fn compare(
    a: &StandingsRow,
    b: &StandingsRow,
    criteria: &[RankingCriterion],
    mutual: &HashMap<Uuid, MutualKey>,
) -> Ordering {
    for &criterion in criteria {
        let ordering = match criterion_key(a, criterion).zip(criterion_key(b, criterion)) {
            Some((ka, kb)) => kb.cmp(&ka),
            None => {
                let ka = mutual.get(&a.team_id).copied().unwrap_or_default();
                let kb = mutual.get(&b.team_id).copied().unwrap_or_default();
                kb.cmp(&ka)
            }
        };
        if ordering != Ordering::Equal {
            return ordering;
        }
    }
    Ordering::Equal
}

/// Head-to-head keys for every team that is level with another team on all
/// criteria listed before `head_to_head`.
fn mutual_keys(
    table: &[StandingsRow],
    results: &[&GameResult],
    criteria: &[RankingCriterion],
    season: &Season,
) -> HashMap<Uuid, MutualKey> {
    let Some(position) = criteria
        .iter()
        .position(|c| *c == RankingCriterion::HeadToHead)
    else {
        return HashMap::new();
    };
    let prefix = &criteria[..position];

    let mut groups: HashMap<Vec<i32>, Vec<&StandingsRow>> = HashMap::new();
    for row in table {
        let key: Vec<i32> = prefix.iter().filter_map(|c| criterion_key(row, *c)).collect();
        groups.entry(key).or_default().push(row);
    }

    let mut keys = HashMap::new();
    for group in groups.values().filter(|g| g.len() > 1) {
        let members: HashSet<Uuid> = group.iter().map(|row| row.team_id).collect();
        let mut mini: HashMap<Uuid, StandingsRow> = group
            .iter()
            .map(|row| (row.team_id, StandingsRow::new(row.team_id, row.team_name.clone())))
            .collect();

        for result in results
            .iter()
            .filter(|r| members.contains(&r.home_team_id) && members.contains(&r.away_team_id))
        {
            if let Some(row) = mini.get_mut(&result.home_team_id) {
                record_game(row, result.home_score, result.away_score, season);
            }
            if let Some(row) = mini.get_mut(&result.away_team_id) {
                record_game(row, result.away_score, result.home_score, season);
            }
        }

        for (team_id, row) in mini {
            keys.insert(team_id, (row.points, row.goal_difference, row.goals_scored));
        }
    }

    keys
}
