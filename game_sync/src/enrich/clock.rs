//! Per-move clock annotation parsing and move-time derivation.
//!
//! Live movetext carries `{[%clk H:MM:SS.t]}` annotations, one per ply. All
//! math happens in tenths of a second to keep the 0.1s precision exact.

use once_cell::sync::Lazy;
use regex::Regex;

static CLK_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{\[%clk\s+([0-9:.]+)\]\}").expect("clk regex"));

/// Parse one clock reading (`H:M:S`, `M:S`, or bare seconds, with an optional
/// `.t` fraction) into seconds, rounded to 0.1s.
pub fn parse_clock(s: &str) -> Option<f64> {
    let parts: Vec<&str> = s.trim().split(':').collect();
    if parts.is_empty() || parts.len() > 3 {
        return None;
    }
    let mut secs = 0.0f64;
    for part in &parts {
        let v = part.parse::<f64>().ok()?;
        if v < 0.0 {
            return None;
        }
        secs = secs * 60.0 + v;
    }
    Some(round_tenths(secs))
}

/// Format seconds back into the clock shape: `H:MM:SS[.t]` above an hour,
/// `M:SS[.t]` below. Round-trips with [`parse_clock`] within 0.1s.
pub fn format_clock(secs: f64) -> String {
    let tenths = (secs * 10.0).round() as i64;
    let frac = tenths % 10;
    let total = tenths / 10;
    let (h, m, s) = (total / 3600, (total % 3600) / 60, total % 60);
    let base = if h > 0 {
        format!("{h}:{m:02}:{s:02}")
    } else {
        format!("{m}:{s:02}")
    };
    if frac > 0 {
        format!("{base}.{frac}")
    } else {
        base
    }
}

/// Extract all per-ply clock readings from a movetext block, in order.
pub fn extract_clocks(pgn: &str) -> Vec<f64> {
    CLK_RE
        .captures_iter(pgn)
        .filter_map(|c| parse_clock(&c[1]))
        .collect()
}

/// Derive per-ply time spent from clock readings.
///
/// Plies alternate players, so the comparable previous reading for ply `i`
/// is `clocks[i - 2]`. The first ply of each player compares against the base
/// time. Increment is credited back each move; results clamp at zero.
pub fn move_times(clocks: &[f64], base_secs: f64, increment_secs: f64) -> Vec<f64> {
    clocks
        .iter()
        .enumerate()
        .map(|(i, &clk)| {
            let spent = if i < 2 {
                base_secs - clk
            } else {
                clocks[i - 2] - clk + increment_secs
            };
            round_tenths(spent.max(0.0))
        })
        .collect()
}

/// Game duration: the larger of the two players' total time spent.
pub fn game_duration(times: &[f64]) -> Option<f64> {
    if times.is_empty() {
        return None;
    }
    let white: f64 = times.iter().step_by(2).sum();
    let black: f64 = times.iter().skip(1).step_by(2).sum();
    Some(round_tenths(white.max(black)))
}

fn round_tenths(v: f64) -> f64 {
    (v * 10.0).round() / 10.0
}
