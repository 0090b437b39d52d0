//! Session container: one race or qualifying event
//!
//! A session owns an optional lap table and an optional results table. Either may
//! be absent when the upstream loader could not fetch it; the pipeline treats such
//! sessions as missing data instead of failing.
//!
//! # Serialization
//!
//! One session per JSON document:
//!
//! ```json
//! {
//!   "name": "2023_bahrain_race",
//!   "info": { "meeting_name": "Bahrain Grand Prix", "session_name": "Race" },
//!   "laps": [ { "Driver": "VER", "DriverNumber": "1", "LapNumber": 1, ... } ],
//!   "results": [ { "DriverNumber": "1", "Abbreviation": "VER", "Position": 1.0 } ]
//! }
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{lap::LapTable, result::ResultTable};

/// Descriptive metadata of a session.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionInfo {
    #[serde(default)]
    pub meeting_name: Option<String>,
    #[serde(default)]
    pub session_name: Option<String>,
    #[serde(default)]
    pub start_date: Option<DateTime<Utc>>,
}

/// One event's lap and result data.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Session {
    /// Identifier used in reports (file stem when loaded from disk)
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub info: Option<SessionInfo>,
    #[serde(default)]
    pub laps: Option<LapTable>,
    #[serde(default)]
    pub results: Option<ResultTable>,
}

impl Session {
    #[must_use]
    pub fn new(name: impl Into<String>, laps: Option<LapTable>, results: Option<ResultTable>) -> Self {
        Self {
            name: name.into(),
            info: None,
            laps,
            results,
        }
    }

    /// Human-readable label, preferring the meeting and session names.
    #[must_use]
    pub fn display_name(&self) -> String {
        match &self.info {
            Some(SessionInfo {
                meeting_name: Some(meeting),
                session_name: Some(session),
                ..
            }) => format!("{} ({meeting} {session})", self.name),
            _ => self.name.clone(),
        }
    }
}
