//! Game format (speed class / variant) as a closed enum.
//!
//! The store persists formats as stable text keys (`"bullet"`, `"blitz"`,
//! `"rapid"`, `"daily"`, `"chess960"`, `"daily_chess960"`, ...). Unrecognized
//! rule names survive through the [`Variant::Other`] fallback instead of
//! free-form strings leaking through the pipeline.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Time-control category of a game.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Format {
    /// Live game, under the bullet threshold.
    Bullet,
    /// Live game, under the blitz threshold.
    Blitz,
    /// Live game, under the rapid threshold.
    Rapid,
    /// Correspondence game with standard rules.
    Daily,
    /// Live game with non-standard rules.
    Live(Variant),
    /// Correspondence game with non-standard rules.
    DailyVariant(Variant),
}

/// Non-standard rules variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Variant {
    /// Fischer random.
    Chess960,
    /// King of the hill.
    KingOfTheHill,
    /// Three-check.
    ThreeCheck,
    /// Bughouse.
    Bughouse,
    /// Crazyhouse.
    Crazyhouse,
    /// Fallback for rule names this build does not know.
    Other(String),
}

impl Variant {
    /// Parse an upstream `rules` value; `"chess"` is not a variant.
    pub fn from_rules(rules: &str) -> Option<Self> {
        match rules {
            "chess" => None,
            "chess960" => Some(Variant::Chess960),
            "kingofthehill" => Some(Variant::KingOfTheHill),
            "threecheck" => Some(Variant::ThreeCheck),
            "bughouse" => Some(Variant::Bughouse),
            "crazyhouse" => Some(Variant::Crazyhouse),
            other => Some(Variant::Other(other.to_string())),
        }
    }

    /// Stable text key for storage.
    pub fn key(&self) -> &str {
        match self {
            Variant::Chess960 => "chess960",
            Variant::KingOfTheHill => "kingofthehill",
            Variant::ThreeCheck => "threecheck",
            Variant::Bughouse => "bughouse",
            Variant::Crazyhouse => "crazyhouse",
            Variant::Other(s) => s,
        }
    }
}

impl Format {
    /// Stable text key for storage (`games.format`, `rating_events.format`).
    pub fn key(&self) -> String {
        match self {
            Format::Bullet => "bullet".to_string(),
            Format::Blitz => "blitz".to_string(),
            Format::Rapid => "rapid".to_string(),
            Format::Daily => "daily".to_string(),
            Format::Live(v) => v.key().to_string(),
            Format::DailyVariant(v) => format!("daily_{}", v.key()),
        }
    }

    /// Map an upstream `time_class` word to a format, when recognized.
    pub fn from_time_class(tc: &str) -> Option<Self> {
        match tc {
            "bullet" => Some(Format::Bullet),
            "blitz" => Some(Format::Blitz),
            "rapid" => Some(Format::Rapid),
            "daily" => Some(Format::Daily),
            _ => None,
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.key())
    }
}

/// Speed-class boundaries applied to the estimated game length
/// `base + 40 * increment` seconds.
///
/// Canonical boundaries: bullet < 180s <= blitz < 600s <= rapid < 1 day.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SpeedThresholds {
    /// Estimates strictly below this are bullet.
    pub bullet_max_secs: i32,
    /// Estimates strictly below this (and not bullet) are blitz.
    pub blitz_max_secs: i32,
    /// Estimates strictly below this (and not blitz) are rapid; daily beyond.
    pub rapid_max_secs: i32,
}

impl Default for SpeedThresholds {
    fn default() -> Self {
        Self {
            bullet_max_secs: 180,
            blitz_max_secs: 600,
            rapid_max_secs: 86_400,
        }
    }
}

impl SpeedThresholds {
    /// Classify an estimated game length in seconds.
    pub fn classify(&self, estimate_secs: i32) -> Format {
        if estimate_secs < self.bullet_max_secs {
            Format::Bullet
        } else if estimate_secs < self.blitz_max_secs {
            Format::Blitz
        } else if estimate_secs < self.rapid_max_secs {
            Format::Rapid
        } else {
            Format::Daily
        }
    }
}

/// Classify a game from its URL kind, rules, upstream time class, and the
/// estimated length, in that precedence order.
pub fn classify(
    is_daily_url: bool,
    rules: Option<&str>,
    time_class: Option<&str>,
    estimate_secs: Option<i32>,
    thresholds: &SpeedThresholds,
) -> Format {
    if let Some(variant) = rules.and_then(Variant::from_rules) {
        return if is_daily_url {
            Format::DailyVariant(variant)
        } else {
            Format::Live(variant)
        };
    }
    if is_daily_url {
        return Format::Daily;
    }
    if let Some(f) = time_class.and_then(Format::from_time_class) {
        return f;
    }
    match estimate_secs {
        Some(e) => thresholds.classify(e),
        // Nothing to classify from; a live game with no control defaults to blitz.
        None => Format::Blitz,
    }
}
