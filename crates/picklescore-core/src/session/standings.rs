// Standings: recomputed from completed matches on every read.

use serde::Serialize;

use super::model::{Match, Team};

/// Ranking points awarded per win.
pub const POINTS_PER_WIN: u32 = 2;

/// One row of the standings table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TeamStanding {
    pub team: Team,
    pub played: u32,
    pub won: u32,
    /// Own points minus opponent points, summed over completed matches.
    pub diff: i64,
    pub points: u32,
}

/// Build the standings table for `teams`.
///
/// Only completed matches count. A win is a strictly greater score. Rows are
/// ordered by points, then point differential, then wins, all descending;
/// the sort is stable so full ties keep team order.
pub fn compute_standings(teams: &[Team], matches: &[Match]) -> Vec<TeamStanding> {
    let completed: Vec<&Match> = matches.iter().filter(|m| m.is_completed()).collect();

    let mut rows: Vec<TeamStanding> = teams
        .iter()
        .map(|team| {
            let mut played = 0;
            let mut won = 0;
            let mut diff = 0i64;
            for (own, opp) in completed.iter().filter_map(|m| m.scores_for(team.id)) {
                played += 1;
                diff += i64::from(own) - i64::from(opp);
                if own > opp {
                    won += 1;
                }
            }
            TeamStanding {
                team: team.clone(),
                played,
                won,
                diff,
                points: won * POINTS_PER_WIN,
            }
        })
        .collect();

    rows.sort_by(|a, b| {
        b.points
            .cmp(&a.points)
            .then_with(|| b.diff.cmp(&a.diff))
            .then_with(|| b.won.cmp(&a.won))
    });
    rows
}
