//! Per-session cleaning pass
//!
//! [`clean_session`] combines lap completion and column normalization in a fixed
//! order:
//!
//! ```text
//! raw session
//!     ↓ complete_missing_laps   (needs laps + results)
//!     ↓ normalize_columns       (needs laps)
//! cleaned session
//! ```
//!
//! Completion runs first so that synthesized rows take part in the per-driver
//! fills, and so that every duration column, synthesized zeros included, goes
//! through the same conversion.

use lapseq_session::Session;

use crate::{
    completer::complete_missing_laps,
    normalizer::{ConversionIssue, normalize_columns},
};

/// What the cleaning pass changed in a session.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CleaningReport {
    /// Number of laps synthesized by lap completion
    pub synthesized_laps: usize,
    /// Duration columns left unconverted
    pub conversion_issues: Vec<ConversionIssue>,
}

/// A cleaned copy of a session and the report of the pass that produced it.
#[derive(Debug, Clone, PartialEq)]
pub struct CleanedSession {
    pub session: Session,
    pub report: CleaningReport,
}

/// Cleans a session without modifying it.
///
/// Lap completion is skipped when the results table is missing; normalization
/// is skipped when the lap table is missing.
///
/// # Examples
///
/// ```
/// use lapseq_cleaning::cleaner::clean_session;
/// use lapseq_session::{LapRecord, LapTable, ResultRecord, ResultTable, Session};
///
/// let laps = LapTable::new(vec![
///     LapRecord::new("VER", "1", 1),
///     LapRecord::new("VER", "1", 2),
///     LapRecord::new("HAM", "44", 1),
/// ]);
/// let results = ResultTable::new(vec![ResultRecord::new("44", "HAM", Some(2.0))]);
/// let raw = Session::new("demo", Some(laps), Some(results));
///
/// let cleaned = clean_session(&raw);
/// assert_eq!(cleaned.report.synthesized_laps, 1);
/// assert_eq!(cleaned.session.laps.unwrap().len(), 4);
/// assert_eq!(raw.laps.unwrap().len(), 3);
/// ```
#[must_use]
pub fn clean_session(session: &Session) -> CleanedSession {
    let mut cleaned = session.clone();
    let mut report = CleaningReport::default();

    if let (Some(laps), Some(results)) = (&cleaned.laps, &cleaned.results) {
        let completion = complete_missing_laps(laps, results);
        report.synthesized_laps = completion.synthesized;
        cleaned.laps = Some(completion.laps);
    }
    if let Some(laps) = &mut cleaned.laps {
        report.conversion_issues = normalize_columns(laps);
    }

    log::debug!(
        "cleaned session {}: {} laps synthesized, {} columns unconverted",
        cleaned.name,
        report.synthesized_laps,
        report.conversion_issues.len()
    );
    CleanedSession {
        session: cleaned,
        report,
    }
}

#[cfg(test)]
mod tests {
    use lapseq_session::{LapRecord, LapTable, ResultRecord, ResultTable, TimeCell};

    use super::*;

    fn raw_session() -> Session {
        let mut ver1 = LapRecord::new("VER", "1", 1);
        ver1.lap_time = Some(TimeCell::Text("00:01:35".to_owned()));
        ver1.tyre_life = Some(1.0);
        let mut ver2 = LapRecord::new("VER", "1", 2);
        ver2.lap_time = None;
        ver2.tyre_life = Some(2.0);
        ver2.extra.insert("PitInTime".to_owned(), serde_json::Value::Null);
        let mut ham1 = LapRecord::new("HAM", "44", 1);
        ham1.lap_time = Some(TimeCell::Text("00:01:36".to_owned()));
        ham1.tyre_life = Some(5.0);
        ham1.position = None;

        Session::new(
            "raw",
            Some(LapTable::new(vec![ver1, ver2, ham1])),
            Some(ResultTable::new(vec![
                ResultRecord::new("1", "VER", Some(1.0)),
                ResultRecord::new("44", "HAM", Some(2.0)),
            ])),
        )
    }

    #[test]
    fn test_clean_session_pipeline() {
        let raw = raw_session();
        let cleaned = clean_session(&raw);

        assert_eq!(cleaned.report.synthesized_laps, 1);
        assert!(cleaned.report.conversion_issues.is_empty());

        let laps = cleaned.session.laps.unwrap();
        let ham = laps.laps_for_number("44");
        assert_eq!(ham.len(), 2);
        // real lap: position filled backward from the synthesized lap
        assert_eq!(ham[0].position, Some(2.0));
        assert_eq!(ham[0].lap_time, Some(TimeCell::Seconds(96.0)));
        // synthesized lap keeps its zero duration
        assert_eq!(ham[1].lap_time, Some(TimeCell::Seconds(0.0)));
        assert_eq!(ham[1].tyre_life, Some(6.0));

        let ver = laps.laps_for_number("1");
        assert_eq!(ver[1].lap_time, Some(TimeCell::Seconds(95.0)));
        assert!(ver.iter().all(|lap| lap.extra.is_empty()));
    }

    #[test]
    fn test_input_session_is_unchanged() {
        let raw = raw_session();
        let before = raw.clone();
        let _ = clean_session(&raw);
        assert_eq!(raw, before);
    }

    #[test]
    fn test_missing_results_skips_completion() {
        let mut raw = raw_session();
        raw.results = None;
        let cleaned = clean_session(&raw);
        assert_eq!(cleaned.report.synthesized_laps, 0);
        let laps = cleaned.session.laps.unwrap();
        assert_eq!(laps.len(), 3);
        // normalization still ran
        assert!(laps.iter().all(|lap| lap.tyre_life.is_some()));
    }

    #[test]
    fn test_missing_laps() {
        let raw = Session::new("no laps", None, Some(ResultTable::default()));
        let cleaned = clean_session(&raw);
        assert!(cleaned.session.laps.is_none());
        assert_eq!(cleaned.report, CleaningReport::default());
    }

    #[test]
    fn test_unconvertible_column_is_reported() {
        let mut raw = raw_session();
        if let Some(laps) = &mut raw.laps {
            laps.laps[0].sector2_time = Some(TimeCell::Text("n/a".to_owned()));
        }
        let cleaned = clean_session(&raw);
        assert_eq!(cleaned.report.conversion_issues.len(), 1);
        // other duration columns still converted
        let laps = cleaned.session.laps.unwrap();
        assert!(
            laps.iter()
                .all(|lap| matches!(lap.lap_time, Some(TimeCell::Seconds(_))))
        );
    }
}
