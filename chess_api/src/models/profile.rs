use serde::Deserialize;

/// `GET /player/{username}` — public profile.
#[derive(Debug, Clone, Deserialize)]
pub struct Profile {
    /// Account name as the platform spells it.
    pub username: Option<String>,
    /// Account creation as a Unix timestamp.
    pub joined: Option<i64>,
    /// Country endpoint URL.
    pub country: Option<String>,
    /// Account status (`basic`, `premium`, ...).
    pub status: Option<String>,
    /// Avatar image URL.
    pub avatar: Option<String>,
}
