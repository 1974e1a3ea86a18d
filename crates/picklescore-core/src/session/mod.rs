// Session domain: the data model and the pure operations the store applies.

pub mod model;
pub mod scoring;
pub mod snapshot;
pub mod standings;
pub mod teams;

use thiserror::Error;

use model::{MatchId, PlayerId, TeamId};

/// Why a command left the session untouched.
///
/// Invalid arguments are not failures: the command is a no-op, nothing is
/// persisted, and the reason is reported so callers can tell a stale UI
/// click from a programming error. Call `.ok()` to discard it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Ignored {
    #[error("player name is empty")]
    EmptyName,

    #[error("no player with id {0}")]
    UnknownPlayer(PlayerId),

    #[error("no team with id {0}")]
    UnknownTeam(TeamId),

    #[error("no match with id {0}")]
    UnknownMatch(MatchId),

    #[error("player {0} is not on any team")]
    PlayerNotOnTeam(PlayerId),

    #[error("both ids resolve to the same team slot")]
    SamePlayer,

    #[error("a match needs two different teams (got {0} twice)")]
    SameTeam(TeamId),

    #[error("team {team_id} is not playing in match {match_id}")]
    TeamNotInMatch { match_id: MatchId, team_id: TeamId },

    #[error("match {0} has no points to undo")]
    EmptyHistory(MatchId),

    #[error("team {0} has no points to take back")]
    NoPointsForTeam(TeamId),

    #[error("match {0} is already completed")]
    MatchCompleted(MatchId),
}
