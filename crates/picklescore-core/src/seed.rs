// Seed roster: the bundled player list used when no saved session exists.

use std::collections::HashSet;
use std::io::Read;
use std::path::Path;

use serde::Deserialize;
use tracing::warn;

use crate::session::model::{Player, PlayerId, Strength};

#[derive(Debug, thiserror::Error)]
pub enum SeedError {
    #[error("failed to read seed roster {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("CSV error in seed roster {path}: {source}")]
    Csv { path: String, source: csv::Error },

    #[error("seed roster {0} has no valid players")]
    Empty(String),
}

/// Seed CSV row: `id,name,strength`.
#[derive(Debug, Deserialize)]
struct RawSeedPlayer {
    id: PlayerId,
    name: String,
    strength: String,
}

/// Where the store gets its first roster from.
pub trait SeedSource {
    fn load_players(&self) -> Result<Vec<Player>, SeedError>;
}

/// Seed roster read from a CSV file.
#[derive(Debug, Clone)]
pub struct CsvSeed {
    pub path: String,
}

impl CsvSeed {
    pub fn new(path: impl Into<String>) -> Self {
        CsvSeed { path: path.into() }
    }
}

impl SeedSource for CsvSeed {
    fn load_players(&self) -> Result<Vec<Player>, SeedError> {
        load_seed_roster(Path::new(&self.path))
    }
}

/// The hardcoded roster, always available.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultRoster;

impl SeedSource for DefaultRoster {
    fn load_players(&self) -> Result<Vec<Player>, SeedError> {
        Ok(default_roster())
    }
}

/// Four example players so a fresh install is usable straight away.
pub fn default_roster() -> Vec<Player> {
    vec![
        Player::new(1, "Rutik", Strength::Pro),
        Player::new(2, "Aman", Strength::Medium),
        Player::new(3, "Sahil", Strength::Noob),
        Player::new(4, "Karan", Strength::Medium),
    ]
}

fn load_roster_from_reader<R: Read>(rdr: R) -> Result<Vec<Player>, csv::Error> {
    let mut reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(rdr);
    // An unreadable header makes the whole file unusable; bad rows are skipped.
    reader.headers()?;
    let mut players = Vec::new();
    let mut seen = HashSet::new();
    for result in reader.deserialize::<RawSeedPlayer>() {
        match result {
            Ok(raw) => {
                let name = raw.name.trim();
                if name.is_empty() {
                    warn!("skipping seed player {}: blank name", raw.id);
                    continue;
                }
                let Some(strength) = Strength::from_str_tier(&raw.strength) else {
                    warn!("skipping seed player '{}': unknown strength '{}'", name, raw.strength);
                    continue;
                };
                if !seen.insert(raw.id) {
                    warn!("skipping seed player '{}': duplicate id {}", name, raw.id);
                    continue;
                }
                players.push(Player::new(raw.id, name, strength));
            }
            Err(e) => {
                warn!("skipping malformed seed row: {}", e);
            }
        }
    }
    Ok(players)
}

/// Load the seed roster from a CSV file with an `id,name,strength` header.
pub fn load_seed_roster(path: &Path) -> Result<Vec<Player>, SeedError> {
    let file = std::fs::File::open(path).map_err(|e| SeedError::Io {
        path: path.display().to_string(),
        source: e,
    })?;
    let players = load_roster_from_reader(file).map_err(|e| SeedError::Csv {
        path: path.display().to_string(),
        source: e,
    })?;
    if players.is_empty() {
        return Err(SeedError::Empty(path.display().to_string()));
    }
    Ok(players)
}
