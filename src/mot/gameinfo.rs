//! `gameinfo.ini` reader.
//!
//! Only the `gameID=` line matters here; it groups sequences of the same
//! match into one output directory.

use std::fs;
use std::path::Path;

use log::warn;

/// Game id used when `gameinfo.ini` is unreadable or has no `gameID` line.
pub const UNKNOWN_GAME_ID: &str = "unknown";

const GAME_ID_KEY: &str = "gameID=";

/// Read the game id from a `gameinfo.ini` file, falling back to
/// [`UNKNOWN_GAME_ID`].
pub fn read_game_id(path: &Path) -> String {
    match fs::read_to_string(path) {
        Ok(content) => parse_game_id(&content).unwrap_or_else(|| UNKNOWN_GAME_ID.to_string()),
        Err(err) => {
            warn!("could not read {}: {}", path.display(), err);
            UNKNOWN_GAME_ID.to_string()
        }
    }
}

/// First `gameID=` value in `content`, made safe to use as a single path
/// component.
pub fn parse_game_id(content: &str) -> Option<String> {
    let value = content
        .lines()
        .find_map(|line| line.strip_prefix(GAME_ID_KEY))?
        .trim();

    let sanitized: String = value
        .chars()
        .map(|c| if matches!(c, '/' | '\\') { '_' } else { c })
        .collect();

    match sanitized.as_str() {
        "" | "." | ".." => None,
        _ => Some(sanitized),
    }
}
