use serde::Deserialize;

/// `GET /player/{username}/games/archives` — ordered list of monthly archive
/// URLs, oldest first.
#[derive(Debug, Clone, Deserialize)]
pub struct ArchiveIndex {
    /// One URL per month the player finished at least one game in.
    pub archives: Vec<String>,
}
