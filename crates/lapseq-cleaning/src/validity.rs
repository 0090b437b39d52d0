//! Admission checks for raw sessions
//!
//! A session enters the pipeline only when it describes a full, classified grid:
//!
//! - both the lap table and the results table are present
//! - every result row has a finishing position
//! - the results name exactly [`ValidityRules::required_drivers`] distinct drivers
//! - the lap table contains laps of exactly that many distinct drivers

use lapseq_session::{GRID_SIZE, Session};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum ValidityError {
    #[display("session has no lap table")]
    MissingLaps,
    #[display("session has no results table")]
    MissingResults,
    #[display("{count} result rows have no finishing position")]
    MissingPosition { count: usize },
    #[display("expected {required} drivers, found {in_results} in results and {in_laps} in laps")]
    DriverCount {
        required: usize,
        in_results: usize,
        in_laps: usize,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidityRules {
    pub required_drivers: usize,
}

impl Default for ValidityRules {
    fn default() -> Self {
        Self {
            required_drivers: GRID_SIZE,
        }
    }
}

impl ValidityRules {
    /// Checks whether a raw session may be cleaned and used.
    pub fn check(&self, session: &Session) -> Result<(), ValidityError> {
        let results = session
            .results
            .as_ref()
            .ok_or(ValidityError::MissingResults)?;
        let laps = session.laps.as_ref().ok_or(ValidityError::MissingLaps)?;

        let count = results
            .iter()
            .filter(|result| !result.position.is_some_and(f64::is_finite))
            .count();
        if count > 0 {
            return Err(ValidityError::MissingPosition { count });
        }

        let in_results = results.abbreviations().len();
        let in_laps = laps.drivers().len();
        if in_results != self.required_drivers || in_laps != self.required_drivers {
            return Err(ValidityError::DriverCount {
                required: self.required_drivers,
                in_results,
                in_laps,
            });
        }
        Ok(())
    }
}
