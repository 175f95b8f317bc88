//! Time-control string parsing.
//!
//! Three upstream shapes: `"N"` (fixed seconds), `"N+I"` (base + per-move
//! increment), and `"M/S"` (daily: M moves per S seconds).

/// Parsed time control.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeControl {
    /// Base thinking time in seconds.
    pub base_secs: i32,
    /// Per-move increment in seconds.
    pub increment_secs: i32,
    /// For daily controls: moves per time unit.
    pub moves_per_unit: Option<i32>,
}

impl TimeControl {
    /// Estimated game length used for speed classification:
    /// `base + 40 * increment`.
    pub fn estimate_secs(&self) -> i32 {
        self.base_secs.saturating_add(self.increment_secs.saturating_mul(40))
    }
}

/// Parse a time-control string; malformed input yields `None` and the caller
/// degrades to absent derived fields.
pub fn parse(s: &str) -> Option<TimeControl> {
    let s = s.trim();
    if let Some((moves, secs)) = s.split_once('/') {
        let moves = moves.parse::<i32>().ok()?;
        let secs = secs.parse::<i32>().ok()?;
        if moves <= 0 || secs <= 0 {
            return None;
        }
        return Some(TimeControl {
            base_secs: secs,
            increment_secs: 0,
            moves_per_unit: Some(moves),
        });
    }
    if let Some((base, inc)) = s.split_once('+') {
        let base = base.parse::<i32>().ok()?;
        let inc = inc.parse::<i32>().ok()?;
        if base < 0 || inc < 0 {
            return None;
        }
        return Some(TimeControl {
            base_secs: base,
            increment_secs: inc,
            moves_per_unit: None,
        });
    }
    let base = s.parse::<i32>().ok()?;
    if base < 0 {
        return None;
    }
    Some(TimeControl {
        base_secs: base,
        increment_secs: 0,
        moves_per_unit: None,
    })
}
