//! Per-session tensor assembly
//!
//! For each cleaned session, the assembler pairs result rows with lap rows by
//! driver number and stacks the drivers' feature matrices into one
//! `(drivers, max_laps, 9)` sample with a `(drivers,)` label vector.
//!
//! # Driver order
//!
//! Drivers are ordered by abbreviation, independent of finishing position. Labels
//! follow the same order and are zero-based positions (`position - 1`).
//!
//! # Rejections
//!
//! Problems are recorded, never raised:
//!
//! - a driver without laps, without a usable position, or with a malformed matrix
//!   is dropped from its session ([`DriverRejection`])
//! - a session without lap or results table, or with fewer or more valid drivers
//!   than required, is dropped from the dataset ([`SessionRejection`])
//!
//! Sessions are never padded with placeholder drivers.

use lapseq_session::{ResultRecord, Session};

use crate::feature::{FeatureExtractor, FeatureMatrix, ScalerPhase};

/// Why a driver was left out of a session sample.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::IsVariant)]
pub enum DriverRejectionReason {
    #[display("no laps recorded for driver number")]
    NoLaps,
    #[display("feature matrix has shape {actual:?}, expected {expected:?}")]
    ShapeMismatch {
        actual: (usize, usize),
        expected: (usize, usize),
    },
    #[display("no usable finishing position")]
    MissingPosition,
}

#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display)]
#[display("driver {abbreviation} (#{driver_number}): {reason}")]
pub struct DriverRejection {
    pub abbreviation: String,
    pub driver_number: String,
    pub reason: DriverRejectionReason,
}

/// Why a session contributed nothing to the dataset.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error, derive_more::IsVariant)]
pub enum SessionRejection {
    #[display("session has no lap table")]
    MissingLaps,
    #[display("session has no results table")]
    MissingResults,
    #[display("{valid_drivers} drivers produced valid features, {required} required")]
    IncompleteSession { valid_drivers: usize, required: usize },
}

/// What happened to one session during assembly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionOutcome {
    pub session: String,
    /// `None` when the session was accepted
    pub rejection: Option<SessionRejection>,
    pub dropped_drivers: Vec<DriverRejection>,
}

impl SessionOutcome {
    fn new(session: &Session) -> Self {
        Self {
            session: session.name.clone(),
            rejection: None,
            dropped_drivers: vec![],
        }
    }

    #[must_use]
    pub fn is_accepted(&self) -> bool {
        self.rejection.is_none()
    }
}

/// Feature matrices and labels of one accepted session.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionSample {
    pub session: String,
    /// Driver abbreviations, in driver-axis order
    pub drivers: Vec<String>,
    pub features: Vec<FeatureMatrix>,
    /// Zero-based finishing positions, in driver-axis order
    pub labels: Vec<i32>,
}

impl SessionSample {
    fn new(session: &Session) -> Self {
        Self {
            session: session.name.clone(),
            drivers: vec![],
            features: vec![],
            labels: vec![],
        }
    }

    #[must_use]
    pub fn num_drivers(&self) -> usize {
        self.features.len()
    }
}

/// Accepted samples plus the outcome of every input session.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Assembly {
    pub samples: Vec<SessionSample>,
    pub outcomes: Vec<SessionOutcome>,
}

impl Assembly {
    pub fn rejected(&self) -> impl Iterator<Item = &SessionOutcome> + '_ {
        self.outcomes.iter().filter(|outcome| !outcome.is_accepted())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SequenceAssembler {
    extractor: FeatureExtractor,
    required_drivers: usize,
}

impl SequenceAssembler {
    #[must_use]
    pub fn new(extractor: FeatureExtractor, required_drivers: usize) -> Self {
        Self {
            extractor,
            required_drivers,
        }
    }

    #[must_use]
    pub fn extractor(&self) -> &FeatureExtractor {
        &self.extractor
    }

    #[must_use]
    pub fn required_drivers(&self) -> usize {
        self.required_drivers
    }

    /// Assembles every session that yields exactly `required_drivers` valid drivers.
    pub fn assemble(&self, sessions: &[Session], mut phase: ScalerPhase<'_>) -> Assembly {
        let mut assembly = Assembly::default();
        for session in sessions {
            let (sample, outcome) = self.assemble_session(session, phase.reborrow());
            match &outcome.rejection {
                None => log::debug!("session {}: accepted", outcome.session),
                Some(rejection) => log::debug!("session {}: rejected, {rejection}", outcome.session),
            }
            assembly.samples.extend(sample);
            assembly.outcomes.push(outcome);
        }
        assembly
    }

    fn assemble_session(
        &self,
        session: &Session,
        mut phase: ScalerPhase<'_>,
    ) -> (Option<SessionSample>, SessionOutcome) {
        let mut outcome = SessionOutcome::new(session);
        let Some(laps) = &session.laps else {
            outcome.rejection = Some(SessionRejection::MissingLaps);
            return (None, outcome);
        };
        let Some(results) = &session.results else {
            outcome.rejection = Some(SessionRejection::MissingResults);
            return (None, outcome);
        };

        let mut sample = SessionSample::new(session);
        for result in results.sorted_by_abbreviation() {
            let reject = |reason| DriverRejection {
                abbreviation: result.abbreviation.clone(),
                driver_number: result.driver_number.clone(),
                reason,
            };

            let driver_laps = laps.laps_for_number(&result.driver_number);
            if driver_laps.is_empty() {
                outcome
                    .dropped_drivers
                    .push(reject(DriverRejectionReason::NoLaps));
                continue;
            }
            let features = self.extractor.extract(driver_laps, phase.reborrow());
            let expected = self.extractor.expected_shape();
            if features.shape() != expected {
                outcome
                    .dropped_drivers
                    .push(reject(DriverRejectionReason::ShapeMismatch {
                        actual: features.shape(),
                        expected,
                    }));
                continue;
            }
            let Some(label) = position_label(result) else {
                outcome
                    .dropped_drivers
                    .push(reject(DriverRejectionReason::MissingPosition));
                continue;
            };

            sample.drivers.push(result.abbreviation.clone());
            sample.features.push(features);
            sample.labels.push(label);
        }

        if sample.num_drivers() != self.required_drivers {
            outcome.rejection = Some(SessionRejection::IncompleteSession {
                valid_drivers: sample.num_drivers(),
                required: self.required_drivers,
            });
            return (None, outcome);
        }
        (Some(sample), outcome)
    }
}

/// Zero-based label of a classified driver.
#[expect(clippy::cast_possible_truncation, clippy::float_cmp)]
fn position_label(result: &ResultRecord) -> Option<i32> {
    let position = result.position?;
    let valid = position.is_finite() && position >= 1.0 && position.trunc() == position;
    valid.then(|| position as i32 - 1)
}
