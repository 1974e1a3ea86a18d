// Application state and command dispatch for the interactive shell.
//
// Each parsed `UserCommand` is applied to the session store and answered with
// a block of text for the terminal. Match-scoped commands act on the focused
// match.

use std::fmt::Write as _;

use tracing::{debug, info};

use picklescore_core::config::Config;
use picklescore_core::session::model::{Match, MatchId, MatchStatus, TeamId};
use picklescore_core::session::teams::RosterSelection;
use picklescore_core::session::Ignored;
use picklescore_core::storage::SnapshotStorage;
use picklescore_core::store::SessionStore;

use crate::command::{Side, UserCommand, HELP};

/// What the shell should do after a command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    /// Print this text and keep reading.
    Text(String),
    /// Stop the shell.
    Quit,
}

/// The complete shell state.
pub struct AppState<S: SnapshotStorage> {
    pub store: SessionStore<S>,
    /// Which players `gen` draws from.
    pub roster_selection: RosterSelection,
}

impl<S: SnapshotStorage> AppState<S> {
    pub fn new(store: SessionStore<S>, config: &Config) -> Self {
        AppState {
            store,
            roster_selection: config.roster_selection,
        }
    }

    fn focused(&self) -> Result<&Match, String> {
        self.store
            .active_match()
            .ok_or_else(|| "no match in focus (use `start` or `focus`)".to_string())
    }

    fn resolve_side(&self, side: Side) -> Result<(MatchId, TeamId), String> {
        let m = self.focused()?;
        let team = match side {
            Side::A => m.team_a_id,
            Side::B => m.team_b_id,
            Side::Team(id) => id,
        };
        Ok((m.id, team))
    }

    // -----------------------------------------------------------------------
    // Views
    // -----------------------------------------------------------------------

    pub fn render_players(&self) -> String {
        let players = self.store.players();
        if players.is_empty() {
            return "no players".into();
        }
        let mut out = String::new();
        for p in players {
            let mark = if p.playing { "*" } else { " " };
            let _ = writeln!(out, "{mark} {:>15}  {:<20} {}", p.id, p.name, p.strength);
        }
        out.truncate(out.trim_end().len());
        out
    }

    pub fn render_teams(&self) -> String {
        let teams = self.store.teams();
        if teams.is_empty() {
            return "no teams (use `gen`)".into();
        }
        let mut out = String::new();
        for t in teams {
            let _ = writeln!(
                out,
                "{:>15}  {:<28} [{} {}, {} {}]",
                t.id,
                t.label(),
                t.players[0].id,
                t.players[0].strength,
                t.players[1].id,
                t.players[1].strength
            );
        }
        out.truncate(out.trim_end().len());
        out
    }

    fn render_match_line(&self, m: &Match) -> String {
        let status = match m.status {
            MatchStatus::Active => "in play",
            MatchStatus::Completed => "final",
        };
        let focus = if self.store.active_match_id() == Some(m.id) {
            " <"
        } else {
            ""
        };
        format!(
            "{:>15}  {} {} - {} {}  ({status}){focus}",
            m.id,
            self.store.team_label(m.team_a_id),
            m.score_a,
            m.score_b,
            self.store.team_label(m.team_b_id),
        )
    }

    pub fn render_matches(&self) -> String {
        let history = self.store.match_history();
        if history.is_empty() {
            return "no matches".into();
        }
        history
            .iter()
            .map(|m| self.render_match_line(m))
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn render_scoreboard(&self) -> String {
        match self.focused() {
            Ok(m) => self.render_match_line(m),
            Err(e) => e,
        }
    }

    pub fn render_standings(&self) -> String {
        let table = self.store.standings();
        if table.is_empty() {
            return "no teams (use `gen`)".into();
        }
        let mut out = format!(
            "{:<3} {:<28} {:>2} {:>2} {:>5} {:>3}\n",
            "#", "team", "P", "W", "+/-", "Pts"
        );
        for (rank, row) in table.iter().enumerate() {
            let _ = writeln!(
                out,
                "{:<3} {:<28} {:>2} {:>2} {:>+5} {:>3}",
                rank + 1,
                row.team.label(),
                row.played,
                row.won,
                row.diff,
                row.points
            );
        }
        out.truncate(out.trim_end().len());
        out
    }

    // -----------------------------------------------------------------------
    // Dispatch
    // -----------------------------------------------------------------------

    /// Apply one command and describe the result.
    pub fn handle_user_command(&mut self, cmd: UserCommand) -> Reply {
        debug!("user command: {:?}", cmd);
        let text = match self.apply(cmd) {
            Ok(Some(text)) => text,
            Ok(None) => return Reply::Quit,
            Err(text) => text,
        };
        Reply::Text(text)
    }

    /// `Ok(None)` means quit; `Err` carries a message for a command that
    /// changed nothing.
    fn apply(&mut self, cmd: UserCommand) -> Result<Option<String>, String> {
        let text = match cmd {
            UserCommand::Players => self.render_players(),
            UserCommand::AddPlayer { name, strength } => {
                let id = self.store.add_player(&name, strength).map_err(ignored)?;
                format!("added player {id}")
            }
            UserCommand::DeletePlayer(id) => {
                self.store.delete_player(id).map_err(ignored)?;
                format!("deleted player {id}")
            }
            UserCommand::TogglePlayer(id) => {
                let playing = self.store.toggle_player_availability(id).map_err(ignored)?;
                let state = if playing { "playing" } else { "sitting out" };
                format!("player {id} is {state}")
            }
            UserCommand::SetAllPlaying(playing) => {
                self.store.set_all_players_availability(playing);
                let state = if playing { "playing" } else { "sitting out" };
                format!("everyone is {state}")
            }
            UserCommand::GenerateTeams => {
                let count = self.store.generate_teams(self.roster_selection).len();
                info!("generated {} teams from the shell", count);
                if count == 0 {
                    "not enough players for a team".to_string()
                } else {
                    self.render_teams()
                }
            }
            UserCommand::SwapPlayers(a, b) => {
                self.store.swap_players(a, b).map_err(ignored)?;
                self.render_teams()
            }
            UserCommand::Teams => self.render_teams(),
            UserCommand::RenameTeam { team, name } => {
                self.store.rename_team(team, &name).map_err(ignored)?;
                format!("team {team} is now {}", self.store.team_label(team))
            }
            UserCommand::StartMatch(a, b) => {
                self.store.start_match(a, b).map_err(ignored)?;
                self.render_scoreboard()
            }
            UserCommand::Point(side) => {
                let (m, team) = self.resolve_side(side)?;
                self.store.score_point(m, team).map_err(ignored)?;
                self.render_scoreboard()
            }
            UserCommand::Undo => {
                let m = self.focused()?.id;
                self.store.undo_last_point(m).map_err(ignored)?;
                self.render_scoreboard()
            }
            UserCommand::Minus(side) => {
                let (m, team) = self.resolve_side(side)?;
                self.store.decrement_point(m, team).map_err(ignored)?;
                self.render_scoreboard()
            }
            UserCommand::Reset => {
                let m = self.focused()?.id;
                self.store.reset_match(m).map_err(ignored)?;
                self.render_scoreboard()
            }
            UserCommand::End => {
                let m = self.focused()?.id;
                self.store.end_match(m).map_err(ignored)?;
                let line = self
                    .store
                    .get_match(m)
                    .map(|m| self.render_match_line(m))
                    .unwrap_or_default();
                format!("{line}\n\n{}", self.render_standings())
            }
            UserCommand::Focus(id) => {
                self.store.focus_match(id).map_err(ignored)?;
                self.render_scoreboard()
            }
            UserCommand::Matches => self.render_matches(),
            UserCommand::Standings => self.render_standings(),
            UserCommand::Help => HELP.to_string(),
            UserCommand::Quit => return Ok(None),
        };
        Ok(Some(text))
    }
}

fn ignored(reason: Ignored) -> String {
    format!("ignored: {reason}")
}
