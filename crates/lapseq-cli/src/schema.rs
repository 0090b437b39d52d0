use chrono::{DateTime, Utc};
use lapseq_cleaning::cleaner::{CleanedSession, CleaningReport};
use lapseq_dataset::{
    assembler::SessionOutcome,
    dataset::{Partition, PrepareConfig, PreparedDataset},
};
use lapseq_session::Session;
use lapseq_stats::minmax::MinMaxScaler;
use serde::{Deserialize, Serialize};

/// Cleaned sessions written by the `clean` command
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CleanedSessionCollection {
    /// Timestamp when the collection was written (ISO 8601 format)
    pub cleaned_at: DateTime<Utc>,
    pub sessions: Vec<Session>,
    /// What cleaning changed, one entry per session
    #[serde(default)]
    pub reports: Vec<CleaningSummary>,
}

impl CleanedSessionCollection {
    pub fn new(cleaned: Vec<CleanedSession>) -> Self {
        let reports = cleaned
            .iter()
            .map(|cleaned| CleaningSummary::new(&cleaned.session, &cleaned.report))
            .collect();
        let sessions = cleaned.into_iter().map(|cleaned| cleaned.session).collect();
        Self {
            cleaned_at: Utc::now(),
            sessions,
            reports,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CleaningSummary {
    pub session: String,
    pub synthesized_laps: usize,
    /// Duration columns left as text, with the reason
    pub unconverted_columns: Vec<String>,
}

impl CleaningSummary {
    fn new(session: &Session, report: &CleaningReport) -> Self {
        Self {
            session: session.name.clone(),
            synthesized_laps: report.synthesized_laps,
            unconverted_columns: report
                .conversion_issues
                .iter()
                .map(ToString::to_string)
                .collect(),
        }
    }
}

/// Prepared dataset written by the `prepare` and `pipeline` commands
///
/// Tensors are stored flat in row-major order next to their shapes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatasetExport {
    /// Timestamp when the dataset was generated (ISO 8601 format)
    pub generated_at: DateTime<Utc>,
    pub config: PrepareConfig,
    pub train: PartitionExport,
    pub test: PartitionExport,
    /// Scaler fitted on the train partition, reusable at inference time
    pub scaler: MinMaxScaler,
    /// Sessions assigned to the test partition, accepted or not
    pub test_sessions: Vec<String>,
}

impl DatasetExport {
    pub fn new(config: PrepareConfig, dataset: &PreparedDataset) -> Self {
        Self {
            generated_at: Utc::now(),
            config,
            train: PartitionExport::new(&dataset.train),
            test: PartitionExport::new(&dataset.test),
            scaler: dataset.scaler.clone(),
            test_sessions: dataset.test_sessions.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PartitionExport {
    /// `[sessions, drivers, max_laps, features]`
    pub x_shape: [usize; 4],
    /// `[sessions, drivers]`
    pub y_shape: [usize; 2],
    /// Accepted session names, in tensor order
    pub sessions: Vec<String>,
    /// Driver abbreviations of each accepted session, in driver-axis order
    pub drivers: Vec<Vec<String>>,
    pub x: Vec<f32>,
    pub y: Vec<i32>,
    pub outcomes: Vec<OutcomeExport>,
}

impl PartitionExport {
    fn new(partition: &Partition) -> Self {
        Self {
            x_shape: partition.x_shape(),
            y_shape: partition.y_shape(),
            sessions: partition.session_names().map(str::to_owned).collect(),
            drivers: partition
                .samples
                .iter()
                .map(|sample| sample.drivers.clone())
                .collect(),
            x: partition.x_values().collect(),
            y: partition.y_values().collect(),
            outcomes: partition.outcomes.iter().map(OutcomeExport::new).collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutcomeExport {
    pub session: String,
    pub accepted: bool,
    pub rejection: Option<String>,
    pub dropped_drivers: Vec<String>,
}

impl OutcomeExport {
    fn new(outcome: &SessionOutcome) -> Self {
        Self {
            session: outcome.session.clone(),
            accepted: outcome.is_accepted(),
            rejection: outcome.rejection.as_ref().map(ToString::to_string),
            dropped_drivers: outcome
                .dropped_drivers
                .iter()
                .map(ToString::to_string)
                .collect(),
        }
    }
}
