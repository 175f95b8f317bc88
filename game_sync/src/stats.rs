//! Per-day rollups over the games table.
//!
//! Each affected UTC date gets one row per format that saw games plus an
//! `"all"` totals row. Recomputation is always whole-date: delete the date's
//! rows, rebuild them from the games in `[midnight, midnight+1d)`. `rebuild`
//! covers every date in the store; `update` only dates touched since the
//! last run, padded by a small safety window for late-arriving games.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Duration, NaiveDate, Utc};
use diesel::prelude::*;

use crate::models::{DailyStatRow, GameRecord};
use crate::store::ratings::RatingResolver;
use crate::store::{daily, games, kv, StoreResult};

/// kv key holding the Unix time of the last incremental run.
const LAST_RUN_KEY: &str = "daily_stats/last_run";

const SECS_PER_DAY: i64 = 86_400;

/// What a rollup run accomplished.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct StatsSummary {
    pub dates: usize,
    pub rows: usize,
}

/// Elo performance estimate: average opponent rating shifted by the score
/// fraction. Perfect and zero scores clamp to +/-400 instead of diverging.
pub fn performance_rating(score_sum: f64, game_count: usize, avg_opponent: f64) -> f64 {
    let s = score_sum / game_count as f64;
    if s >= 1.0 {
        avg_opponent + 400.0
    } else if s <= 0.0 {
        avg_opponent - 400.0
    } else {
        avg_opponent + 400.0 * (s / (1.0 - s)).log10()
    }
}

/// Longest win run and longest loss run over outcomes in play order.
/// Draws and unknown outcomes break both runs.
pub fn streaks(outcomes: &[Option<f64>]) -> (i32, i32) {
    let mut best_win = 0;
    let mut worst_loss = 0;
    let mut wins = 0;
    let mut losses = 0;
    for outcome in outcomes {
        match outcome {
            Some(o) if *o == 1.0 => {
                wins += 1;
                losses = 0;
            }
            Some(o) if *o == 0.0 => {
                losses += 1;
                wins = 0;
            }
            _ => {
                wins = 0;
                losses = 0;
            }
        }
        best_win = best_win.max(wins);
        worst_loss = worst_loss.max(losses);
    }
    (best_win, worst_loss)
}

/// Recompute every date the store has games for.
pub fn rebuild(conn: &mut SqliteConnection) -> StoreResult<StatsSummary> {
    let dates = all_dates(conn)?;
    run_over(conn, dates)
}

/// Recompute only dates with games processed since the last run, plus the
/// trailing `safety_window_days` dates. Records the run time afterwards.
pub fn update(conn: &mut SqliteConnection, safety_window_days: i64) -> StoreResult<StatsSummary> {
    let run_started = Utc::now().timestamp();
    let last_run = kv::get_json::<i64>(conn, LAST_RUN_KEY)?.unwrap_or(0);

    let mut dates: BTreeSet<NaiveDate> = games::processed_after(conn, last_run)?
        .iter()
        .map(|g| date_of(g.end_time))
        .collect();
    let today = date_of(run_started);
    for back in 0..safety_window_days.max(0) {
        dates.insert(today - Duration::days(back));
    }

    let summary = run_over(conn, dates)?;
    kv::put_json(conn, LAST_RUN_KEY, &run_started)?;
    Ok(summary)
}

fn run_over(conn: &mut SqliteConnection, dates: BTreeSet<NaiveDate>) -> StoreResult<StatsSummary> {
    let resolver = RatingResolver::load(conn)?;
    let mut summary = StatsSummary::default();
    for date in dates {
        let rows = recompute_date(conn, &resolver, date)?;
        summary.dates += 1;
        summary.rows += rows;
    }
    tracing::info!(dates = summary.dates, rows = summary.rows, "daily stats updated");
    Ok(summary)
}

/// Distinct UTC dates with at least one game.
fn all_dates(conn: &mut SqliteConnection) -> StoreResult<BTreeSet<NaiveDate>> {
    use crate::schema::games::dsl::*;

    let end_times: Vec<i64> = games.select(end_time).load(conn)?;
    Ok(end_times.into_iter().map(date_of).collect())
}

fn date_of(ts: i64) -> NaiveDate {
    DateTime::from_timestamp(ts, 0)
        .unwrap_or_default()
        .date_naive()
}

fn day_start(date: NaiveDate) -> i64 {
    date.and_hms_opt(0, 0, 0)
        .unwrap_or_default()
        .and_utc()
        .timestamp()
}

/// Rebuild all rows for one date. Returns how many rows were written; a date
/// that lost all its games ends up with zero rows.
fn recompute_date(
    conn: &mut SqliteConnection,
    resolver: &RatingResolver,
    date: NaiveDate,
) -> StoreResult<usize> {
    let start = day_start(date);
    let day_games = games::in_end_time_range(conn, start, start + SECS_PER_DAY)?;

    daily::delete_date(conn, &date.format("%Y-%m-%d").to_string())?;
    if day_games.is_empty() {
        return Ok(0);
    }

    let mut by_format: BTreeMap<&str, Vec<&GameRecord>> = BTreeMap::new();
    for game in &day_games {
        by_format.entry(game.format.as_str()).or_default().push(game);
    }

    let mut written = 0;
    for (format_key, group) in &by_format {
        let mut row = aggregate(date, format_key, group);
        row.rating_start = resolver.resolve(format_key, start);
        row.rating_end = resolver.resolve(format_key, start + SECS_PER_DAY);
        row.rating_change = match (row.rating_start, row.rating_end) {
            (Some(a), Some(b)) => Some(b - a),
            _ => None,
        };
        daily::upsert(conn, &row)?;
        written += 1;
    }

    // Cross-format totals; no single rating track applies.
    let all: Vec<&GameRecord> = day_games.iter().collect();
    daily::upsert(conn, &aggregate(date, "all", &all))?;
    Ok(written + 1)
}

fn aggregate(date: NaiveDate, format_key: &str, group: &[&GameRecord]) -> DailyStatRow {
    let mut wins = 0;
    let mut draws = 0;
    let mut losses = 0;
    let mut total_duration = 0.0;
    let mut with_duration = 0usize;
    let mut opponent_sum = 0.0;
    let mut with_opponent = 0usize;
    let mut perf_score = 0.0;
    let mut perf_games = 0usize;
    let mut perf_opponent_sum = 0.0;
    let mut outcomes = Vec::with_capacity(group.len());

    for game in group {
        outcomes.push(game.my_outcome);
        match game.my_outcome {
            Some(o) if o == 1.0 => wins += 1,
            Some(o) if o == 0.5 => draws += 1,
            Some(o) if o == 0.0 => losses += 1,
            _ => {}
        }
        if let Some(d) = game.duration_secs {
            total_duration += d;
            with_duration += 1;
        }
        if let Some(r) = game.opponent_rating {
            opponent_sum += f64::from(r);
            with_opponent += 1;
            if let Some(o) = game.my_outcome {
                perf_score += o;
                perf_opponent_sum += f64::from(r);
                perf_games += 1;
            }
        }
    }

    let (best_win_streak, worst_loss_streak) = streaks(&outcomes);
    DailyStatRow {
        date: date.format("%Y-%m-%d").to_string(),
        format: format_key.to_string(),
        games: group.len() as i32,
        wins,
        draws,
        losses,
        total_duration_secs: total_duration,
        avg_duration_secs: (with_duration > 0).then(|| total_duration / with_duration as f64),
        avg_opponent_rating: (with_opponent > 0).then(|| opponent_sum / with_opponent as f64),
        best_win_streak,
        worst_loss_streak,
        performance_rating: (perf_games > 0)
            .then(|| performance_rating(perf_score, perf_games, perf_opponent_sum / perf_games as f64)),
        rating_start: None,
        rating_end: None,
        rating_change: None,
        updated_at: Utc::now().timestamp(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn performance_matches_closed_form() {
        // 50% score performs exactly at the opposition's level.
        assert!((performance_rating(1.0, 2, 1600.0) - 1600.0).abs() < 1e-9);
        // 75% against 1500 is about +191.
        let p = performance_rating(3.0, 4, 1500.0);
        assert!((p - 1690.848).abs() < 0.01, "{p}");
    }

    #[test]
    fn perfect_and_zero_scores_clamp() {
        assert_eq!(performance_rating(3.0, 3, 1400.0), 1800.0);
        assert_eq!(performance_rating(0.0, 3, 1500.0), 1100.0);
    }

    #[test]
    fn streaks_break_on_draws_and_unknowns() {
        let outcomes = [
            Some(1.0),
            Some(1.0),
            Some(0.5),
            Some(1.0),
            None,
            Some(0.0),
            Some(0.0),
            Some(0.0),
        ];
        assert_eq!(streaks(&outcomes), (2, 3));
    }

    #[test]
    fn empty_outcomes_have_no_streaks() {
        assert_eq!(streaks(&[]), (0, 0));
    }

    #[test]
    fn date_helpers_are_utc() {
        let d = date_of(1_622_499_450);
        assert_eq!(d.to_string(), "2021-05-31");
        assert_eq!(date_of(day_start(d)), d);
    }
}
