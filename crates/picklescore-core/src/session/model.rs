// Session data model: players, teams, matches and their point history.

use std::fmt;

use serde::{Deserialize, Serialize};

pub type PlayerId = i64;
pub type TeamId = i64;
pub type MatchId = i64;

// ---------------------------------------------------------------------------
// Players
// ---------------------------------------------------------------------------

/// Coarse skill tier of a player, used only as a balancing weight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Strength {
    Pro,
    Medium,
    Noob,
}

impl Strength {
    /// Balancing weight: pro=3, medium=2, noob=1.
    pub fn weight(self) -> u8 {
        match self {
            Strength::Pro => 3,
            Strength::Medium => 2,
            Strength::Noob => 1,
        }
    }

    /// Parse a tier name (case-insensitive, surrounding whitespace ignored).
    pub fn from_str_tier(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "pro" => Some(Strength::Pro),
            "medium" | "med" => Some(Strength::Medium),
            "noob" => Some(Strength::Noob),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Strength::Pro => "pro",
            Strength::Medium => "medium",
            Strength::Noob => "noob",
        }
    }
}

impl fmt::Display for Strength {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn default_playing() -> bool {
    true
}

/// A rostered player.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
    pub strength: Strength,
    /// Whether the player takes part in the next team generation.
    /// Snapshots written before availability existed load as playing.
    #[serde(default = "default_playing")]
    pub playing: bool,
}

impl Player {
    pub fn new(id: PlayerId, name: impl Into<String>, strength: Strength) -> Self {
        Player {
            id,
            name: name.into(),
            strength,
            playing: true,
        }
    }
}

// ---------------------------------------------------------------------------
// Teams
// ---------------------------------------------------------------------------

/// Two players paired for the session.
///
/// Teams hold copies of the player records as they were at generation time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Team {
    pub id: TeamId,
    pub players: [Player; 2],
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl Team {
    pub fn new(id: TeamId, first: Player, second: Player) -> Self {
        Team {
            id,
            players: [first, second],
            name: None,
        }
    }

    /// Whether either slot holds the given player.
    pub fn contains(&self, player_id: PlayerId) -> bool {
        self.players.iter().any(|p| p.id == player_id)
    }

    /// Display label: the custom name if set, otherwise "A & B".
    pub fn label(&self) -> String {
        match &self.name {
            Some(name) => name.clone(),
            None => format!("{} & {}", self.players[0].name, self.players[1].name),
        }
    }
}

// ---------------------------------------------------------------------------
// Matches
// ---------------------------------------------------------------------------

/// One scored point. The history is an append-only log in scoring order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchHistoryItem {
    pub team_id: TeamId,
    pub timestamp: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchStatus {
    Active,
    Completed,
}

/// A match between two teams, referenced by id.
///
/// `score_a` always equals the number of history entries for `team_a_id`,
/// and likewise for `score_b`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Match {
    pub id: MatchId,
    pub team_a_id: TeamId,
    pub team_b_id: TeamId,
    pub score_a: u32,
    pub score_b: u32,
    pub history: Vec<MatchHistoryItem>,
    pub status: MatchStatus,
    pub start_time: i64,
}

impl Match {
    /// A fresh active match with both scores at zero.
    pub fn new(id: MatchId, team_a_id: TeamId, team_b_id: TeamId, start_time: i64) -> Self {
        Match {
            id,
            team_a_id,
            team_b_id,
            score_a: 0,
            score_b: 0,
            history: Vec::new(),
            status: MatchStatus::Active,
            start_time,
        }
    }

    pub fn involves(&self, team_id: TeamId) -> bool {
        self.team_a_id == team_id || self.team_b_id == team_id
    }

    pub fn is_completed(&self) -> bool {
        self.status == MatchStatus::Completed
    }

    /// Own and opponent score from the perspective of `team_id`, or `None`
    /// if the team did not play in this match.
    pub fn scores_for(&self, team_id: TeamId) -> Option<(u32, u32)> {
        if self.team_a_id == team_id {
            Some((self.score_a, self.score_b))
        } else if self.team_b_id == team_id {
            Some((self.score_b, self.score_a))
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strength_weights() {
        assert_eq!(Strength::Pro.weight(), 3);
        assert_eq!(Strength::Medium.weight(), 2);
        assert_eq!(Strength::Noob.weight(), 1);
    }

    #[test]
    fn strength_parse() {
        assert_eq!(Strength::from_str_tier(" PRO "), Some(Strength::Pro));
        assert_eq!(Strength::from_str_tier("med"), Some(Strength::Medium));
        assert_eq!(Strength::from_str_tier("noob"), Some(Strength::Noob));
        assert_eq!(Strength::from_str_tier("elite"), None);
    }

    #[test]
    fn match_json_uses_snapshot_field_names() {
        let mut m = Match::new(7, 10, 20, 1_000);
        m.score_a = 1;
        m.history.push(MatchHistoryItem {
            team_id: 10,
            timestamp: 1_001,
        });
        let json = serde_json::to_value(&m).unwrap();
        assert_eq!(json["teamAId"], 10);
        assert_eq!(json["teamBId"], 20);
        assert_eq!(json["scoreA"], 1);
        assert_eq!(json["scoreB"], 0);
        assert_eq!(json["startTime"], 1_000);
        assert_eq!(json["status"], "active");
        assert_eq!(json["history"][0]["teamId"], 10);
    }

    #[test]
    fn player_without_playing_flag_defaults_to_playing() {
        let p: Player =
            serde_json::from_str(r#"{"id":1,"name":"Rutik","strength":"pro"}"#).unwrap();
        assert!(p.playing);
        assert_eq!(p.strength, Strength::Pro);
    }

    #[test]
    fn team_label_prefers_custom_name() {
        let mut team = Team::new(
            1,
            Player::new(1, "Rutik", Strength::Pro),
            Player::new(3, "Sahil", Strength::Noob),
        );
        assert_eq!(team.label(), "Rutik & Sahil");
        team.name = Some("Dinkers".into());
        assert_eq!(team.label(), "Dinkers");
    }

    #[test]
    fn scores_from_either_side() {
        let mut m = Match::new(1, 10, 20, 0);
        m.score_a = 11;
        m.score_b = 7;
        assert_eq!(m.scores_for(10), Some((11, 7)));
        assert_eq!(m.scores_for(20), Some((7, 11)));
        assert_eq!(m.scores_for(30), None);
    }
}
