// Line-oriented user commands for the interactive shell.

use picklescore_core::session::model::{MatchId, PlayerId, Strength, TeamId};
use thiserror::Error;

/// Which team of the focused match a scoring command targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    /// Side A, or side B, of the focused match.
    A,
    B,
    /// A team id, which must be one of the focused match's two teams.
    Team(TeamId),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserCommand {
    Players,
    AddPlayer { name: String, strength: Strength },
    DeletePlayer(PlayerId),
    TogglePlayer(PlayerId),
    SetAllPlaying(bool),
    GenerateTeams,
    SwapPlayers(PlayerId, PlayerId),
    Teams,
    RenameTeam { team: TeamId, name: String },
    StartMatch(TeamId, TeamId),
    Point(Side),
    Undo,
    Minus(Side),
    Reset,
    End,
    Focus(MatchId),
    Matches,
    Standings,
    Help,
    Quit,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("empty command")]
    Empty,

    #[error("unknown command `{0}` (try `help`)")]
    Unknown(String),

    #[error("usage: {0}")]
    Usage(&'static str),

    #[error("`{0}` is not a number")]
    BadNumber(String),

    #[error("unknown strength `{0}` (pro, medium, noob)")]
    BadStrength(String),
}

pub const HELP: &str = "\
players                   list the roster
add <name...> <strength>  add a player (pro, medium, noob)
del <player>              delete a player and their teams
toggle <player>           flip whether a player is playing
all on|off                mark everyone playing or sitting out
gen                       generate balanced teams
swap <player> <player>    exchange two players between teams
teams                     list teams
rename <team> <name...>   name a team (empty name clears it)
start <team> <team>       start a match and focus it
point a|b|<team>          score a point in the focused match
undo                      take back the last point
minus a|b|<team>          take back that team's last point
reset                     zero the focused match
end                       complete the focused match
focus <match>             focus another match in play
matches                   match history, newest first
standings                 standings table
quit                      exit";

fn parse_id(token: &str) -> Result<i64, ParseError> {
    token
        .parse::<i64>()
        .map_err(|_| ParseError::BadNumber(token.to_string()))
}

fn parse_side(token: &str) -> Result<Side, ParseError> {
    match token.to_ascii_lowercase().as_str() {
        "a" => Ok(Side::A),
        "b" => Ok(Side::B),
        _ => parse_id(token).map(Side::Team),
    }
}

/// Parse one input line. Never panics on malformed input.
pub fn parse_command(line: &str) -> Result<UserCommand, ParseError> {
    let tokens: Vec<&str> = line.split_whitespace().collect();
    let Some((&head, args)) = tokens.split_first() else {
        return Err(ParseError::Empty);
    };

    let cmd = match (head.to_ascii_lowercase().as_str(), args) {
        ("players", []) => UserCommand::Players,
        ("add", [name @ .., strength]) if !name.is_empty() => {
            let strength = Strength::from_str_tier(strength)
                .ok_or_else(|| ParseError::BadStrength(strength.to_string()))?;
            UserCommand::AddPlayer {
                name: name.join(" "),
                strength,
            }
        }
        ("add", _) => return Err(ParseError::Usage("add <name...> <strength>")),
        ("del", [id]) => UserCommand::DeletePlayer(parse_id(id)?),
        ("del", _) => return Err(ParseError::Usage("del <player>")),
        ("toggle", [id]) => UserCommand::TogglePlayer(parse_id(id)?),
        ("toggle", _) => return Err(ParseError::Usage("toggle <player>")),
        ("all", [flag]) => match flag.to_ascii_lowercase().as_str() {
            "on" => UserCommand::SetAllPlaying(true),
            "off" => UserCommand::SetAllPlaying(false),
            _ => return Err(ParseError::Usage("all on|off")),
        },
        ("all", _) => return Err(ParseError::Usage("all on|off")),
        ("gen", []) => UserCommand::GenerateTeams,
        ("swap", [a, b]) => UserCommand::SwapPlayers(parse_id(a)?, parse_id(b)?),
        ("swap", _) => return Err(ParseError::Usage("swap <player> <player>")),
        ("teams", []) => UserCommand::Teams,
        ("rename", [team, name @ ..]) => UserCommand::RenameTeam {
            team: parse_id(team)?,
            name: name.join(" "),
        },
        ("rename", _) => return Err(ParseError::Usage("rename <team> <name...>")),
        ("start", [a, b]) => UserCommand::StartMatch(parse_id(a)?, parse_id(b)?),
        ("start", _) => return Err(ParseError::Usage("start <team> <team>")),
        ("point", [side]) => UserCommand::Point(parse_side(side)?),
        ("point", _) => return Err(ParseError::Usage("point a|b|<team>")),
        ("undo", []) => UserCommand::Undo,
        ("minus", [side]) => UserCommand::Minus(parse_side(side)?),
        ("minus", _) => return Err(ParseError::Usage("minus a|b|<team>")),
        ("reset", []) => UserCommand::Reset,
        ("end", []) => UserCommand::End,
        ("focus", [id]) => UserCommand::Focus(parse_id(id)?),
        ("focus", _) => return Err(ParseError::Usage("focus <match>")),
        ("matches", []) => UserCommand::Matches,
        ("standings", []) => UserCommand::Standings,
        ("help" | "?", _) => UserCommand::Help,
        ("quit" | "exit" | "q", []) => UserCommand::Quit,
        (
            "players" | "gen" | "teams" | "undo" | "reset" | "end" | "matches" | "standings"
            | "quit" | "exit" | "q",
            _,
        ) => return Err(ParseError::Usage("this command takes no arguments")),
        (other, _) => return Err(ParseError::Unknown(other.to_string())),
    };
    Ok(cmd)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_simple_commands() {
        assert_eq!(parse_command("players"), Ok(UserCommand::Players));
        assert_eq!(parse_command("  GEN  "), Ok(UserCommand::GenerateTeams));
        assert_eq!(parse_command("undo"), Ok(UserCommand::Undo));
        assert_eq!(parse_command("q"), Ok(UserCommand::Quit));
        assert_eq!(parse_command("?"), Ok(UserCommand::Help));
    }

    #[test]
    fn add_takes_multi_word_names() {
        assert_eq!(
            parse_command("add Anna Maria med"),
            Ok(UserCommand::AddPlayer {
                name: "Anna Maria".into(),
                strength: Strength::Medium
            })
        );
        assert_eq!(
            parse_command("add Bob elite"),
            Err(ParseError::BadStrength("elite".into()))
        );
        assert!(matches!(parse_command("add pro"), Err(ParseError::Usage(_))));
    }

    #[test]
    fn numeric_arguments() {
        assert_eq!(parse_command("del 4"), Ok(UserCommand::DeletePlayer(4)));
        assert_eq!(
            parse_command("start 17 -3"),
            Ok(UserCommand::StartMatch(17, -3))
        );
        assert_eq!(
            parse_command("swap 1 x"),
            Err(ParseError::BadNumber("x".into()))
        );
        assert!(matches!(parse_command("focus"), Err(ParseError::Usage(_))));
    }

    #[test]
    fn sides_accept_letters_or_ids() {
        assert_eq!(parse_command("point A"), Ok(UserCommand::Point(Side::A)));
        assert_eq!(parse_command("minus b"), Ok(UserCommand::Minus(Side::B)));
        assert_eq!(
            parse_command("point 1700000000000"),
            Ok(UserCommand::Point(Side::Team(1_700_000_000_000)))
        );
        assert_eq!(
            parse_command("point c"),
            Err(ParseError::BadNumber("c".into()))
        );
    }

    #[test]
    fn rename_allows_blank_name() {
        assert_eq!(
            parse_command("rename 9 The Dinks"),
            Ok(UserCommand::RenameTeam {
                team: 9,
                name: "The Dinks".into()
            })
        );
        assert_eq!(
            parse_command("rename 9"),
            Ok(UserCommand::RenameTeam {
                team: 9,
                name: String::new()
            })
        );
    }

    #[test]
    fn all_on_off() {
        assert_eq!(parse_command("all on"), Ok(UserCommand::SetAllPlaying(true)));
        assert_eq!(parse_command("all OFF"), Ok(UserCommand::SetAllPlaying(false)));
        assert!(matches!(parse_command("all maybe"), Err(ParseError::Usage(_))));
    }

    #[test]
    fn junk_is_an_error() {
        assert_eq!(parse_command(""), Err(ParseError::Empty));
        assert_eq!(parse_command("   "), Err(ParseError::Empty));
        assert_eq!(
            parse_command("serve"),
            Err(ParseError::Unknown("serve".into()))
        );
        assert!(matches!(parse_command("teams now"), Err(ParseError::Usage(_))));
    }
}
