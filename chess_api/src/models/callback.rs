use serde::Deserialize;

/// `GET {callback}/{live|daily}/game/{id}` — extended per-game data from the
/// web host. Carries the fields the bulk archive payload omits.
#[derive(Debug, Clone, Deserialize)]
pub struct CallbackResponse {
    /// Game-level extras.
    pub game: CallbackGame,
    /// The two participants, in board orientation rather than color.
    pub players: CallbackPlayers,
}

/// Game-level callback fields.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CallbackGame {
    /// Rating delta applied to white by this game.
    pub rating_change_white: Option<i32>,
    /// Rating delta applied to black by this game.
    pub rating_change_black: Option<i32>,
}

/// Board-oriented pair of players.
#[derive(Debug, Clone, Deserialize)]
pub struct CallbackPlayers {
    /// Player rendered at the top of the board.
    pub top: CallbackPlayer,
    /// Player rendered at the bottom of the board.
    pub bottom: CallbackPlayer,
}

/// Per-player callback fields, including a small profile snapshot.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CallbackPlayer {
    /// Account name.
    pub username: Option<String>,
    /// Post-game rating.
    pub rating: Option<i32>,
    /// Engine-evaluated accuracy percentage, when analysis ran.
    pub accuracy: Option<f64>,
    /// Display color, `"white"` or `"black"`.
    pub color: Option<String>,
    /// Country name at time of the game.
    pub country_name: Option<String>,
    /// Membership level code.
    pub membership_code: Option<String>,
    /// Avatar image URL.
    pub avatar_url: Option<String>,
}

impl CallbackResponse {
    /// Find the participant matching `username`, case-insensitively.
    pub fn player(&self, username: &str) -> Option<&CallbackPlayer> {
        [&self.players.top, &self.players.bottom]
            .into_iter()
            .find(|p| {
                p.username
                    .as_deref()
                    .is_some_and(|u| u.eq_ignore_ascii_case(username))
            })
    }

    /// The opponent of `username`, if the username matches either side.
    pub fn opponent(&self, username: &str) -> Option<&CallbackPlayer> {
        let top_is_me = self
            .players
            .top
            .username
            .as_deref()
            .is_some_and(|u| u.eq_ignore_ascii_case(username));
        let bottom_is_me = self
            .players
            .bottom
            .username
            .as_deref()
            .is_some_and(|u| u.eq_ignore_ascii_case(username));
        match (top_is_me, bottom_is_me) {
            (true, _) => Some(&self.players.bottom),
            (_, true) => Some(&self.players.top),
            _ => None,
        }
    }
}
