// Team generation and roster-level team operations.
//
// These are pure functions over slices so the store can apply them and
// persist the result as one mutation.

use std::cmp::Reverse;
use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use super::model::{Player, PlayerId, Team, TeamId};

/// Which players feed a team generation pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RosterSelection {
    /// Every rostered player.
    All,
    /// Only players flagged as playing this session.
    #[default]
    AvailableOnly,
}

impl RosterSelection {
    pub fn select(self, players: &[Player]) -> Vec<Player> {
        match self {
            RosterSelection::All => players.to_vec(),
            RosterSelection::AvailableOnly => {
                players.iter().filter(|p| p.playing).cloned().collect()
            }
        }
    }
}

/// Pair players into balanced two-player teams.
///
/// Players are sorted by descending strength weight (stable, so ties keep
/// roster order). The strongest remaining player is then repeatedly paired
/// with the weakest remaining one. With an odd count the middle player is
/// left out. Team ids are drawn from `next_id` in pairing order.
pub fn generate_teams(players: &[Player], mut next_id: impl FnMut() -> TeamId) -> Vec<Team> {
    let mut sorted: Vec<Player> = players.to_vec();
    sorted.sort_by_key(|p| Reverse(p.strength.weight()));

    let mut pool: VecDeque<Player> = sorted.into();
    let mut teams = Vec::with_capacity(pool.len() / 2);

    while pool.len() >= 2 {
        let (Some(strong), Some(weak)) = (pool.pop_front(), pool.pop_back()) else {
            break;
        };
        teams.push(Team::new(next_id(), strong, weak));
    }

    teams
}

/// Every team that does not contain `player_id`, in original order.
pub fn remove_teams_referencing(teams: &[Team], player_id: PlayerId) -> Vec<Team> {
    teams
        .iter()
        .filter(|t| !t.contains(player_id))
        .cloned()
        .collect()
}

/// Position of a player within the team list: (team index, slot index).
fn locate(teams: &[Team], player_id: PlayerId) -> Option<(usize, usize)> {
    teams.iter().enumerate().find_map(|(team_idx, team)| {
        team.players
            .iter()
            .position(|p| p.id == player_id)
            .map(|slot| (team_idx, slot))
    })
}

/// Exchange two players between their team slots.
///
/// Returns the new team list, or `None` when either player is not on a team
/// or both ids resolve to the same slot. Team ids and names are kept.
pub fn swap_players(teams: &[Team], player_a: PlayerId, player_b: PlayerId) -> Option<Vec<Team>> {
    let loc_a = locate(teams, player_a)?;
    let loc_b = locate(teams, player_b)?;
    if loc_a == loc_b {
        return None;
    }

    let (team_a, slot_a) = loc_a;
    let (team_b, slot_b) = loc_b;
    let moving_a = teams[team_a].players[slot_a].clone();
    let moving_b = teams[team_b].players[slot_b].clone();

    let mut swapped = teams.to_vec();
    swapped[team_a].players[slot_a] = moving_b;
    swapped[team_b].players[slot_b] = moving_a;
    Some(swapped)
}
