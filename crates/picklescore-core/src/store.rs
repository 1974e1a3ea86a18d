// Session store: owns the session state, applies commands, and writes the
// full snapshot through to durable storage after every applied command.
//
// Command flow: validate -> mutate -> serialize -> save. A command that
// returns `Err(Ignored)` has not touched state and has not written anything.

use tracing::{debug, info, warn};

use crate::config::Config;
use crate::seed::{default_roster, SeedSource};
use crate::session::model::{
    Match, MatchHistoryItem, MatchId, Player, PlayerId, Strength, Team, TeamId,
};
use crate::session::snapshot::SessionState;
use crate::session::standings::{compute_standings, TeamStanding};
use crate::session::teams::{self, RosterSelection};
use crate::session::Ignored;
use crate::storage::SnapshotStorage;

// ---------------------------------------------------------------------------
// Supporting types
// ---------------------------------------------------------------------------

/// Source of wall-clock time for ids and timestamps.
pub trait Clock {
    fn now_millis(&self) -> i64;
}

/// UTC wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_millis(&self) -> i64 {
        chrono::Utc::now().timestamp_millis()
    }
}

/// Where the store's state came from during `initialize`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadSource {
    /// A saved snapshot was adopted.
    Stored,
    /// No usable snapshot; the roster came from the seed source.
    Seeded,
    /// No usable snapshot and the seed source failed; the built-in roster
    /// was used.
    DefaultRoster,
}

/// Behavior switches for the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoreOptions {
    /// Reject scoring, undo and reset on completed matches.
    pub lock_completed: bool,
}

impl Default for StoreOptions {
    fn default() -> Self {
        StoreOptions {
            lock_completed: true,
        }
    }
}

impl From<&Config> for StoreOptions {
    fn from(config: &Config) -> Self {
        StoreOptions {
            lock_completed: config.lock_completed,
        }
    }
}

/// The two teams of the focused match. Either may be missing if teams were
/// regenerated after the match started.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActiveMatchTeams<'a> {
    pub team_a: Option<&'a Team>,
    pub team_b: Option<&'a Team>,
}

// ---------------------------------------------------------------------------
// SessionStore
// ---------------------------------------------------------------------------

pub struct SessionStore<S: SnapshotStorage> {
    state: SessionState,
    storage: S,
    clock: Box<dyn Clock>,
    options: StoreOptions,
    /// No writes happen until `initialize` has run, so an empty startup
    /// state never overwrites a saved session.
    ready: bool,
    /// Highest id issued or loaded so far.
    last_id: i64,
}

fn issue_id(clock: &dyn Clock, last_id: &mut i64) -> i64 {
    let id = clock.now_millis().max(last_id.saturating_add(1));
    *last_id = id;
    id
}

impl<S: SnapshotStorage> SessionStore<S> {
    pub fn new(storage: S, options: StoreOptions) -> Self {
        Self::with_clock(storage, options, SystemClock)
    }

    pub fn with_clock(storage: S, options: StoreOptions, clock: impl Clock + 'static) -> Self {
        SessionStore {
            state: SessionState::default(),
            storage,
            clock: Box::new(clock),
            options,
            ready: false,
            last_id: 0,
        }
    }

    /// Load the saved snapshot, or seed a fresh roster if there is none.
    ///
    /// A corrupt snapshot or unreadable slot is logged and treated as absent.
    /// A failing seed source falls back to the built-in roster. After this
    /// the store is ready and the resulting state is written once.
    pub fn initialize(&mut self, seed: &dyn SeedSource) -> LoadSource {
        let stored = match self.storage.load() {
            Ok(Some(raw)) => match SessionState::from_json_lenient(&raw) {
                Ok(state) => Some(state),
                Err(e) => {
                    warn!("saved session is corrupt, reseeding: {}", e);
                    None
                }
            },
            Ok(None) => {
                info!("no saved session found");
                None
            }
            Err(e) => {
                warn!("failed to read saved session, reseeding: {:#}", e);
                None
            }
        };

        let source = match stored {
            Some(state) => {
                info!(
                    "restored session: {} players, {} teams, {} matches",
                    state.players.len(),
                    state.teams.len(),
                    state.matches.len()
                );
                self.state = state;
                LoadSource::Stored
            }
            None => self.seed_roster(seed),
        };

        self.last_id = self.state.max_id();
        self.ready = true;
        self.persist();
        source
    }

    fn seed_roster(&mut self, seed: &dyn SeedSource) -> LoadSource {
        let (players, source) = match seed.load_players() {
            Ok(players) => (players, LoadSource::Seeded),
            Err(e) => {
                warn!("seed roster unavailable, using built-in roster: {}", e);
                (default_roster(), LoadSource::DefaultRoster)
            }
        };
        info!("seeded session with {} players", players.len());
        self.state = SessionState {
            players,
            ..SessionState::default()
        };
        source
    }

    /// Serialize the full snapshot and hand it to storage. Failures are
    /// logged; in-memory state stays authoritative.
    fn persist(&self) {
        if !self.ready {
            debug!("store not ready, skipping save");
            return;
        }
        let json = match self.state.to_json() {
            Ok(json) => json,
            Err(e) => {
                warn!("failed to serialize session: {}", e);
                return;
            }
        };
        if let Err(e) = self.storage.save(&json) {
            warn!("failed to save session: {:#}", e);
        }
    }

    fn next_id(&mut self) -> i64 {
        issue_id(self.clock.as_ref(), &mut self.last_id)
    }

    fn match_mut(&mut self, match_id: MatchId) -> Result<&mut Match, Ignored> {
        self.state
            .matches
            .iter_mut()
            .find(|m| m.id == match_id)
            .ok_or(Ignored::UnknownMatch(match_id))
    }

    /// Like `match_mut`, but refuses completed matches when locking is on.
    fn open_match_mut(&mut self, match_id: MatchId) -> Result<&mut Match, Ignored> {
        let lock = self.options.lock_completed;
        let m = self.match_mut(match_id)?;
        if lock && m.is_completed() {
            return Err(Ignored::MatchCompleted(match_id));
        }
        Ok(m)
    }

    // -----------------------------------------------------------------------
    // Accessors
    // -----------------------------------------------------------------------

    pub fn is_ready(&self) -> bool {
        self.ready
    }

    pub fn options(&self) -> StoreOptions {
        self.options
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// The full current snapshot.
    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn players(&self) -> &[Player] {
        &self.state.players
    }

    pub fn teams(&self) -> &[Team] {
        &self.state.teams
    }

    pub fn matches(&self) -> &[Match] {
        &self.state.matches
    }

    pub fn active_match_id(&self) -> Option<MatchId> {
        self.state.active_match_id
    }

    pub fn player(&self, player_id: PlayerId) -> Option<&Player> {
        self.state.players.iter().find(|p| p.id == player_id)
    }

    pub fn team(&self, team_id: TeamId) -> Option<&Team> {
        self.state.teams.iter().find(|t| t.id == team_id)
    }

    pub fn get_match(&self, match_id: MatchId) -> Option<&Match> {
        self.state.matches.iter().find(|m| m.id == match_id)
    }

    // -----------------------------------------------------------------------
    // Derived views
    // -----------------------------------------------------------------------

    /// The match the focus pointer refers to, if it still exists.
    pub fn active_match(&self) -> Option<&Match> {
        self.state.active_match_id.and_then(|id| self.get_match(id))
    }

    pub fn active_match_teams(&self) -> Option<ActiveMatchTeams<'_>> {
        let m = self.active_match()?;
        Some(ActiveMatchTeams {
            team_a: self.team(m.team_a_id),
            team_b: self.team(m.team_b_id),
        })
    }

    pub fn standings(&self) -> Vec<TeamStanding> {
        compute_standings(&self.state.teams, &self.state.matches)
    }

    /// Display label for a team id, with a synthesized fallback for ids no
    /// longer in the team list.
    pub fn team_label(&self, team_id: TeamId) -> String {
        self.team(team_id)
            .map(Team::label)
            .unwrap_or_else(|| format!("Team {team_id}"))
    }

    /// All matches, most recently started first.
    pub fn match_history(&self) -> Vec<&Match> {
        let mut list: Vec<&Match> = self.state.matches.iter().collect();
        list.sort_by(|a, b| b.start_time.cmp(&a.start_time));
        list
    }

    // -----------------------------------------------------------------------
    // Player commands
    // -----------------------------------------------------------------------

    /// Append a player to the roster and return its id.
    pub fn add_player(&mut self, name: &str, strength: Strength) -> Result<PlayerId, Ignored> {
        let name = name.trim();
        if name.is_empty() {
            return Err(Ignored::EmptyName);
        }
        let id = self.next_id();
        self.state.players.push(Player::new(id, name, strength));
        info!("added player {} '{}' ({})", id, name, strength);
        self.persist();
        Ok(id)
    }

    /// Remove a player and every team containing them. Matches are kept.
    pub fn delete_player(&mut self, player_id: PlayerId) -> Result<(), Ignored> {
        let idx = self
            .state
            .players
            .iter()
            .position(|p| p.id == player_id)
            .ok_or(Ignored::UnknownPlayer(player_id))?;
        let removed = self.state.players.remove(idx);
        let before = self.state.teams.len();
        self.state.teams = teams::remove_teams_referencing(&self.state.teams, player_id);
        info!(
            "deleted player {} '{}', dropped {} team(s)",
            player_id,
            removed.name,
            before - self.state.teams.len()
        );
        self.persist();
        Ok(())
    }

    /// Flip a player's "playing this session" flag. Returns the new value.
    pub fn toggle_player_availability(&mut self, player_id: PlayerId) -> Result<bool, Ignored> {
        let player = self
            .state
            .players
            .iter_mut()
            .find(|p| p.id == player_id)
            .ok_or(Ignored::UnknownPlayer(player_id))?;
        player.playing = !player.playing;
        let playing = player.playing;
        debug!("player {} playing={}", player_id, playing);
        self.persist();
        Ok(playing)
    }

    pub fn set_all_players_availability(&mut self, playing: bool) {
        for player in &mut self.state.players {
            player.playing = playing;
        }
        debug!("all players playing={}", playing);
        self.persist();
    }

    // -----------------------------------------------------------------------
    // Team commands
    // -----------------------------------------------------------------------

    /// Replace the team list with freshly balanced pairs. Existing matches
    /// keep their team ids even if those teams disappear.
    pub fn generate_teams(&mut self, selection: RosterSelection) -> &[Team] {
        let pool = selection.select(&self.state.players);
        let clock = self.clock.as_ref();
        let last_id = &mut self.last_id;
        let generated = teams::generate_teams(&pool, || issue_id(clock, last_id));
        info!(
            "generated {} team(s) from {} player(s) ({:?})",
            generated.len(),
            pool.len(),
            selection
        );
        self.state.teams = generated;
        self.persist();
        &self.state.teams
    }

    /// Exchange two players between their team slots.
    pub fn swap_players(&mut self, player_a: PlayerId, player_b: PlayerId) -> Result<(), Ignored> {
        if player_a == player_b {
            return Err(Ignored::SamePlayer);
        }
        for id in [player_a, player_b] {
            if !self.state.teams.iter().any(|t| t.contains(id)) {
                return Err(Ignored::PlayerNotOnTeam(id));
            }
        }
        let swapped = teams::swap_players(&self.state.teams, player_a, player_b)
            .ok_or(Ignored::SamePlayer)?;
        self.state.teams = swapped;
        debug!("swapped players {} and {}", player_a, player_b);
        self.persist();
        Ok(())
    }

    /// Set a team's custom name. A blank name clears it.
    pub fn rename_team(&mut self, team_id: TeamId, name: &str) -> Result<(), Ignored> {
        let team = self
            .state
            .teams
            .iter_mut()
            .find(|t| t.id == team_id)
            .ok_or(Ignored::UnknownTeam(team_id))?;
        let name = name.trim();
        team.name = (!name.is_empty()).then(|| name.to_string());
        debug!("team {} renamed to {:?}", team_id, team.name);
        self.persist();
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Match commands
    // -----------------------------------------------------------------------

    /// Start a new match, put it first in the list, and focus it.
    pub fn start_match(&mut self, team_a: TeamId, team_b: TeamId) -> Result<MatchId, Ignored> {
        if team_a == team_b {
            return Err(Ignored::SameTeam(team_a));
        }
        let id = self.next_id();
        let started = self.clock.now_millis();
        self.state
            .matches
            .insert(0, Match::new(id, team_a, team_b, started));
        self.state.active_match_id = Some(id);
        info!(
            "started match {}: {} vs {}",
            id,
            self.team_label(team_a),
            self.team_label(team_b)
        );
        self.persist();
        Ok(id)
    }

    pub fn score_point(&mut self, match_id: MatchId, team_id: TeamId) -> Result<(), Ignored> {
        let now = self.clock.now_millis();
        let m = self.open_match_mut(match_id)?;
        m.score_point(team_id, now)?;
        debug!("match {} point to team {} ({}-{})", match_id, team_id, m.score_a, m.score_b);
        self.persist();
        Ok(())
    }

    /// Take back the most recent point of the match.
    pub fn undo_last_point(&mut self, match_id: MatchId) -> Result<MatchHistoryItem, Ignored> {
        let m = self.open_match_mut(match_id)?;
        let undone = m.undo_last_point()?;
        debug!("match {} undid point for team {}", match_id, undone.team_id);
        self.persist();
        Ok(undone)
    }

    /// Take back the most recent point scored by `team_id`.
    pub fn decrement_point(
        &mut self,
        match_id: MatchId,
        team_id: TeamId,
    ) -> Result<MatchHistoryItem, Ignored> {
        let m = self.open_match_mut(match_id)?;
        let removed = m.decrement_point(team_id)?;
        debug!("match {} removed point for team {}", match_id, team_id);
        self.persist();
        Ok(removed)
    }

    pub fn reset_match(&mut self, match_id: MatchId) -> Result<(), Ignored> {
        self.open_match_mut(match_id)?.reset();
        info!("match {} reset", match_id);
        self.persist();
        Ok(())
    }

    /// Mark a match completed and drop focus from it.
    pub fn end_match(&mut self, match_id: MatchId) -> Result<(), Ignored> {
        let m = self.match_mut(match_id)?;
        let already = m.is_completed();
        m.complete();
        let (score_a, score_b) = (m.score_a, m.score_b);

        let focused = self.state.active_match_id == Some(match_id);
        if focused {
            self.state.active_match_id = None;
        }
        if already && !focused {
            return Err(Ignored::MatchCompleted(match_id));
        }
        info!("match {} ended {}-{}", match_id, score_a, score_b);
        self.persist();
        Ok(())
    }

    /// Point the focus at another match that is still in play.
    pub fn focus_match(&mut self, match_id: MatchId) -> Result<(), Ignored> {
        let m = self.match_mut(match_id)?;
        if m.is_completed() {
            return Err(Ignored::MatchCompleted(match_id));
        }
        self.state.active_match_id = Some(match_id);
        debug!("focused match {}", match_id);
        self.persist();
        Ok(())
    }

    /// Remove a match entirely, clearing focus if it pointed there.
    pub fn delete_match(&mut self, match_id: MatchId) -> Result<(), Ignored> {
        let idx = self
            .state
            .matches
            .iter()
            .position(|m| m.id == match_id)
            .ok_or(Ignored::UnknownMatch(match_id))?;
        self.state.matches.remove(idx);
        if self.state.active_match_id == Some(match_id) {
            self.state.active_match_id = None;
        }
        info!("deleted match {}", match_id);
        self.persist();
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
