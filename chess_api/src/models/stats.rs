use serde::Deserialize;
use std::collections::BTreeMap;

/// `GET /player/{username}/stats` — per-format rating snapshot.
///
/// The payload is a map of section names (`chess_blitz`, `chess_bullet`,
/// `chess_rapid`, `chess_daily`, `chess960_daily`, plus non-game sections
/// like `fide` or `tactics`) to loosely shaped objects, so sections are kept
/// as raw JSON and picked apart by [`PlayerStats::rating_snapshots`].
#[derive(Debug, Clone, Deserialize)]
pub struct PlayerStats {
    /// Raw stats sections keyed by upstream section name.
    #[serde(flatten)]
    pub sections: BTreeMap<String, serde_json::Value>,
}

/// One (format, rating, timestamp) observation extracted from a stats payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RatingSnapshot {
    /// Format key with the `chess_` prefix stripped (`blitz`, `960_daily`, ...).
    pub format: String,
    /// Current rating in that format.
    pub rating: i32,
    /// Unix timestamp the rating was last updated.
    pub timestamp: i64,
}

impl PlayerStats {
    /// Extract one snapshot per section that carries a `last.rating` value.
    /// Sections without one (puzzle counters, FIDE scalar) are skipped.
    pub fn rating_snapshots(&self) -> Vec<RatingSnapshot> {
        let mut out = Vec::new();
        for (key, value) in &self.sections {
            let Some(last) = value.get("last") else {
                continue;
            };
            let (Some(rating), Some(ts)) = (
                last.get("rating").and_then(|v| v.as_i64()),
                last.get("date").and_then(|v| v.as_i64()),
            ) else {
                continue;
            };
            let format = key.strip_prefix("chess_").unwrap_or(key).to_string();
            out.push(RatingSnapshot {
                format,
                rating: rating as i32,
                timestamp: ts,
            });
        }
        out
    }
}
