// Serialized session snapshot and its lenient decoder.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

use super::model::{Match, MatchId, Player, Team};

/// The complete persisted session: roster, teams, matches, focus pointer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionState {
    pub players: Vec<Player>,
    pub teams: Vec<Team>,
    pub matches: Vec<Match>,
    pub active_match_id: Option<MatchId>,
}

/// A stored snapshot that cannot be used at all.
#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("snapshot is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("snapshot top level is not an object")]
    NotAnObject,
}

impl SessionState {
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    /// Decode a stored snapshot, tolerating partially-shaped objects.
    ///
    /// Invalid JSON or a non-object top level is an error. Otherwise each of
    /// the four fields is decoded on its own; a missing or malformed field
    /// falls back to an empty collection or a null pointer. Inside a
    /// collection, malformed entries are dropped and the rest are kept.
    pub fn from_json_lenient(raw: &str) -> Result<Self, SnapshotError> {
        let value: serde_json::Value = serde_json::from_str(raw)?;
        let serde_json::Value::Object(mut fields) = value else {
            return Err(SnapshotError::NotAnObject);
        };

        Ok(SessionState {
            players: take_list(&mut fields, "players"),
            teams: take_list(&mut fields, "teams"),
            matches: take_list(&mut fields, "matches"),
            active_match_id: take_field(&mut fields, "activeMatchId"),
        })
    }

    /// Largest id in use anywhere in the snapshot, or 0 when empty.
    pub fn max_id(&self) -> i64 {
        let players = self.players.iter().map(|p| p.id);
        let teams = self.teams.iter().map(|t| t.id);
        let matches = self.matches.iter().map(|m| m.id);
        players.chain(teams).chain(matches).max().unwrap_or(0)
    }
}

fn take_field<T: DeserializeOwned + Default>(
    fields: &mut serde_json::Map<String, serde_json::Value>,
    key: &str,
) -> T {
    let Some(value) = fields.remove(key) else {
        return T::default();
    };
    serde_json::from_value(value).unwrap_or_else(|e| {
        warn!("snapshot field `{key}` is malformed, using default: {e}");
        T::default()
    })
}

/// Decode an array field entry by entry, skipping entries that do not fit.
fn take_list<T: DeserializeOwned>(
    fields: &mut serde_json::Map<String, serde_json::Value>,
    key: &str,
) -> Vec<T> {
    let entries: Vec<serde_json::Value> = take_field(fields, key);
    entries
        .into_iter()
        .enumerate()
        .filter_map(|(idx, entry)| match serde_json::from_value(entry) {
            Ok(item) => Some(item),
            Err(e) => {
                warn!("skipping malformed entry {idx} in snapshot field `{key}`: {e}");
                None
            }
        })
        .collect()
}
