//! Tolerant PGN header-block parsing.
//!
//! Headers are `[Key "Value"]` lines ahead of the movetext. Malformed lines
//! are skipped; a missing header simply yields `None` for that field.

use chrono::{DateTime, Duration, NaiveDate, NaiveTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeMap;

static HEADER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(?m)^\[(\w+)\s+"([^"]*)"\]"#).expect("header regex"));

/// Parsed header block.
#[derive(Debug, Clone, Default)]
pub struct Headers {
    map: BTreeMap<String, String>,
}

impl Headers {
    /// Parse every well-formed header line; never fails.
    pub fn parse(pgn: &str) -> Self {
        let mut map = BTreeMap::new();
        for caps in HEADER_RE.captures_iter(pgn) {
            map.insert(caps[1].to_string(), caps[2].to_string());
        }
        Self { map }
    }

    /// Raw header value; empty and `"?"`/`"-"` placeholders count as absent.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.map
            .get(key)
            .map(String::as_str)
            .filter(|v| !v.is_empty() && *v != "?" && *v != "-" && *v != "????.??.??")
    }

    /// Game start instant from `UTCDate`/`Date` + `UTCTime`/`StartTime`.
    pub fn start_instant(&self) -> Option<DateTime<Utc>> {
        let date = self.date("UTCDate").or_else(|| self.date("Date"))?;
        let time = self.time("UTCTime").or_else(|| self.time("StartTime"))?;
        Some(date.and_time(time).and_utc())
    }

    /// Game end instant from `EndDate` + `EndTime`. When only the time of day
    /// is present, the start date anchors it, rolling over midnight if the
    /// end reads earlier than the start.
    pub fn end_instant(&self) -> Option<DateTime<Utc>> {
        let time = self.time("EndTime")?;
        if let Some(date) = self.date("EndDate") {
            return Some(date.and_time(time).and_utc());
        }
        let start = self.start_instant()?;
        let mut end = start.date_naive().and_time(time).and_utc();
        if end < start {
            end += Duration::days(1);
        }
        Some(end)
    }

    fn date(&self, key: &str) -> Option<NaiveDate> {
        NaiveDate::parse_from_str(self.get(key)?, "%Y.%m.%d").ok()
    }

    fn time(&self, key: &str) -> Option<NaiveTime> {
        NaiveTime::parse_from_str(self.get(key)?, "%H:%M:%S").ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    const SAMPLE: &str = r#"[Event "Live Chess"]
[Site "Chess.com"]
[Date "2021.05.31"]
[Round "-"]
[White "alice"]
[Black "bob"]
[Result "1-0"]
[ECO "B01"]
[ECOUrl "https://www.chess.com/openings/Scandinavian-Defense"]
[UTCDate "2021.05.31"]
[UTCTime "22:15:00"]
[EndDate "2021.05.31"]
[EndTime "22:27:30"]
[Termination "alice won by resignation"]

1. e4 d5 2. exd5 1-0"#;

    #[test]
    fn picks_up_headers_and_anchors() {
        let h = Headers::parse(SAMPLE);
        assert_eq!(h.get("ECO"), Some("B01"));
        assert_eq!(h.get("Round"), None, "placeholder counts as absent");
        assert_eq!(
            h.start_instant(),
            Some(Utc.with_ymd_and_hms(2021, 5, 31, 22, 15, 0).unwrap())
        );
        assert_eq!(
            h.end_instant(),
            Some(Utc.with_ymd_and_hms(2021, 5, 31, 22, 27, 30).unwrap())
        );
    }

    #[test]
    fn midnight_rollover_without_end_date() {
        let pgn = r#"[UTCDate "2021.05.31"]
[UTCTime "23:58:00"]
[EndTime "00:03:10"]"#;
        let h = Headers::parse(pgn);
        assert_eq!(
            h.end_instant(),
            Some(Utc.with_ymd_and_hms(2021, 6, 1, 0, 3, 10).unwrap())
        );
    }

    #[test]
    fn malformed_lines_are_skipped() {
        let h = Headers::parse("[Broken no-quote]\n[ECO \"C20\"]\nnot a header");
        assert_eq!(h.get("ECO"), Some("C20"));
        assert_eq!(h.get("Broken"), None);
    }

    #[test]
    fn empty_input_yields_nothing() {
        let h = Headers::parse("");
        assert!(h.start_instant().is_none());
        assert!(h.end_instant().is_none());
    }
}
