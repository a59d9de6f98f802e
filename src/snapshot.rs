//! Saving and restoring games in progress.
//!
//! A snapshot is the full [`GameState`] as pretty-printed JSON, wrapped with
//! a format version. Pending feedback events are not saved.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

use crate::game::invariants::check_invariants;
use crate::game::GameState;

/// Current snapshot format.
pub const SNAPSHOT_VERSION: u32 = 1;

/// Error type for snapshot operations.
#[derive(Debug, Error)]
pub enum SnapshotError {
    /// Reading or writing the file failed.
    #[error("snapshot {}: {source}", path.display())]
    Io {
        /// File involved.
        path: PathBuf,
        /// Underlying error.
        source: io::Error,
    },
    /// The file is not a valid snapshot.
    #[error("malformed snapshot: {0}")]
    Json(#[from] serde_json::Error),
    /// The snapshot was written by an incompatible version.
    #[error("unsupported snapshot version {found} (expected {SNAPSHOT_VERSION})")]
    Version {
        /// Version found in the file.
        found: u32,
    },
    /// The decoded state breaks a game invariant.
    #[error("inconsistent snapshot: {0}")]
    Inconsistent(String),
}

#[derive(Serialize, Deserialize)]
struct Snapshot {
    version: u32,
    state: GameState,
}

/// Encode a game as snapshot JSON.
///
/// # Errors
///
/// Returns an error if serialization fails.
pub fn to_json(state: &GameState) -> Result<String, SnapshotError> {
    let snapshot = Snapshot {
        version: SNAPSHOT_VERSION,
        state: state.clone(),
    };
    Ok(serde_json::to_string_pretty(&snapshot)?)
}

/// Decode snapshot JSON, checking version and consistency.
///
/// # Errors
///
/// Returns an error for malformed JSON, a foreign version, or a state that
/// breaks a game invariant.
pub fn from_json(text: &str) -> Result<GameState, SnapshotError> {
    let snapshot: Snapshot = serde_json::from_str(text)?;
    if snapshot.version != SNAPSHOT_VERSION {
        return Err(SnapshotError::Version {
            found: snapshot.version,
        });
    }
    if let Some(violation) = check_invariants(&snapshot.state).into_iter().next() {
        return Err(SnapshotError::Inconsistent(violation.to_string()));
    }
    Ok(snapshot.state)
}

/// Save a game to `path`.
///
/// # Errors
///
/// Returns an error if serialization or the write fails.
pub fn save(state: &GameState, path: &Path) -> Result<(), SnapshotError> {
    let json = to_json(state)?;
    fs::write(path, json).map_err(|source| SnapshotError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    info!(path = %path.display(), turn = state.turn_number(), "snapshot saved");
    Ok(())
}

/// Load a game from `path`.
///
/// # Errors
///
/// See [`from_json`]; also fails if the file cannot be read.
pub fn load(path: &Path) -> Result<GameState, SnapshotError> {
    let text = fs::read_to_string(path).map_err(|source| SnapshotError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let state = from_json(&text)?;
    info!(path = %path.display(), turn = state.turn_number(), "snapshot loaded");
    Ok(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GameConfig;
    use crate::game::{Command, Coord};

    fn midgame() -> GameState {
        let mut game = GameState::new(&GameConfig::default()).unwrap();
        game.apply(Command::Roll).unwrap();
        game.apply(Command::Summon {
            template: 1,
            at: Coord::new(4, 8),
        })
        .unwrap();
        game.apply(Command::StartActionPhase).unwrap();
        game
    }

    #[test]
    fn test_json_preserves_turn_state() {
        let game = midgame();
        let restored = from_json(&to_json(&game).unwrap()).unwrap();
        assert_eq!(restored.board(), game.board());
        assert_eq!(restored.players(), game.players());
        assert_eq!(restored.phase(), game.phase());
        assert_eq!(restored.turn(), game.turn());
        assert!(restored.events().is_empty());
    }

    #[test]
    fn test_rejects_foreign_version() {
        let json = to_json(&midgame()).unwrap().replacen("\"version\": 1", "\"version\": 7", 1);
        assert!(matches!(from_json(&json), Err(SnapshotError::Version { found: 7 })));
    }

    #[test]
    fn test_rejects_garbage() {
        assert!(matches!(from_json("{ not json"), Err(SnapshotError::Json(_))));
    }

    #[test]
    fn test_rejects_truncated_board() {
        let json = to_json(&midgame()).unwrap();
        let mut value: serde_json::Value = serde_json::from_str(&json).unwrap();
        value["state"]["board"]["tiles"].as_array_mut().unwrap().truncate(10);
        let broken = serde_json::to_string(&value).unwrap();
        assert!(matches!(from_json(&broken), Err(SnapshotError::Json(_))));
    }

    #[test]
    fn test_save_load_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("game.json");
        let game = midgame();
        save(&game, &path).unwrap();
        let restored = load(&path).unwrap();
        assert_eq!(restored.board(), game.board());
        assert!(matches!(
            load(&dir.path().join("missing.json")),
            Err(SnapshotError::Io { .. })
        ));
    }
}
