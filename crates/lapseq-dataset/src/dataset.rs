//! Train/test split and scaler coordination
//!
//! [`DatasetPreparer::prepare`] turns cleaned sessions into two tensor partitions
//! that share one scaler:
//!
//! 1. Shuffle the sessions with a seeded PCG generator
//! 2. Split at `floor(n * (1 - test_ratio))`: the head is train, the tail is test
//! 3. Fit the scaler over every train session and every driver number listed in
//!    its results
//! 4. Assemble train and test with the frozen scaler
//!
//! Test sessions never reach the fit pass, and neither do train-session drivers
//! that are missing from the results table.

use lapseq_session::{GRID_SIZE, Session};
use lapseq_stats::minmax::MinMaxScaler;
use rand::{SeedableRng as _, seq::SliceRandom as _};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use crate::{
    assembler::{SequenceAssembler, SessionOutcome, SessionSample},
    feature::{FeatureExtractor, FeatureMatrix, NUM_FEATURES, ScalerPhase},
};

/// Parameters of dataset preparation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PrepareConfig {
    /// Length of every driver's feature window
    pub max_laps: usize,
    /// Share of sessions held out for testing, in `[0, 1]`
    pub test_ratio: f64,
    pub seed: u64,
    /// Drivers a session must yield to be accepted
    pub required_drivers: usize,
}

impl Default for PrepareConfig {
    fn default() -> Self {
        Self {
            max_laps: 40,
            test_ratio: 0.2,
            seed: 42,
            required_drivers: GRID_SIZE,
        }
    }
}

impl PrepareConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_laps == 0 {
            return Err(ConfigError::ZeroMaxLaps);
        }
        if self.required_drivers == 0 {
            return Err(ConfigError::ZeroRequiredDrivers);
        }
        if !(0.0..=1.0).contains(&self.test_ratio) {
            return Err(ConfigError::TestRatioOutOfRange {
                test_ratio: self.test_ratio,
            });
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, derive_more::Display, derive_more::Error)]
pub enum ConfigError {
    #[display("max_laps must be positive")]
    ZeroMaxLaps,
    #[display("required_drivers must be positive")]
    ZeroRequiredDrivers,
    #[display("test_ratio must be within [0, 1], got {test_ratio}")]
    TestRatioOutOfRange { test_ratio: f64 },
}

/// One side of the split: stacked samples and the outcome of every session.
#[derive(Debug, Clone, PartialEq)]
pub struct Partition {
    pub samples: Vec<SessionSample>,
    pub outcomes: Vec<SessionOutcome>,
    max_laps: usize,
    driver_count: usize,
}

impl Partition {
    #[must_use]
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// `(sessions, drivers, max_laps, features)`
    #[must_use]
    pub fn x_shape(&self) -> [usize; 4] {
        [self.len(), self.driver_count, self.max_laps, NUM_FEATURES]
    }

    /// `(sessions, drivers)`
    #[must_use]
    pub fn y_shape(&self) -> [usize; 2] {
        [self.len(), self.driver_count]
    }

    /// Feature tensor values in row-major order.
    pub fn x_values(&self) -> impl Iterator<Item = f32> + '_ {
        self.samples
            .iter()
            .flat_map(|sample| &sample.features)
            .flat_map(FeatureMatrix::values)
    }

    /// Label tensor values in row-major order.
    pub fn y_values(&self) -> impl Iterator<Item = i32> + '_ {
        self.samples
            .iter()
            .flat_map(|sample| sample.labels.iter().copied())
    }

    /// Names of the accepted sessions, in tensor order.
    pub fn session_names(&self) -> impl Iterator<Item = &str> + '_ {
        self.samples.iter().map(|sample| sample.session.as_str())
    }
}

/// Train and test tensors with the scaler fitted on train data.
#[derive(Debug, Clone, PartialEq)]
pub struct PreparedDataset {
    pub train: Partition,
    pub test: Partition,
    pub scaler: MinMaxScaler,
    /// Every session assigned to the test side, accepted or not
    pub test_sessions: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct DatasetPreparer {
    config: PrepareConfig,
    assembler: SequenceAssembler,
}

impl DatasetPreparer {
    pub fn new(config: PrepareConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let assembler = SequenceAssembler::new(
            FeatureExtractor::new(config.max_laps),
            config.required_drivers,
        );
        Ok(Self { config, assembler })
    }

    #[must_use]
    pub fn config(&self) -> &PrepareConfig {
        &self.config
    }

    /// Index of the first test session for `len` sessions.
    #[expect(
        clippy::cast_precision_loss,
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss
    )]
    #[must_use]
    pub fn split_index(&self, len: usize) -> usize {
        let split = (len as f64 * (1.0 - self.config.test_ratio)).floor() as usize;
        split.min(len)
    }

    /// Shuffles the sessions and splits them into `(train, test)`.
    #[must_use]
    pub fn split(&self, mut sessions: Vec<Session>) -> (Vec<Session>, Vec<Session>) {
        let mut rng = Pcg32::seed_from_u64(self.config.seed);
        sessions.shuffle(&mut rng);
        let test = sessions.split_off(self.split_index(sessions.len()));
        (sessions, test)
    }

    /// Fits the scaler over the result drivers of the given sessions.
    ///
    /// Sessions without a lap or results table are skipped. A listed driver
    /// without laps contributes one window of padding zeros.
    #[must_use]
    pub fn fit_scaler(&self, train: &[Session]) -> MinMaxScaler {
        let extractor = self.assembler.extractor();
        let mut accumulator = extractor.new_accumulator();
        for session in train {
            let (Some(laps), Some(results)) = (&session.laps, &session.results) else {
                continue;
            };
            for driver_number in results.distinct_driver_numbers() {
                let driver_laps = laps.laps_for_number(driver_number);
                extractor.extract(driver_laps, ScalerPhase::Fit(&mut accumulator));
            }
        }
        accumulator.finish()
    }

    /// Runs the full split, fit and assembly sequence.
    ///
    /// # Examples
    ///
    /// ```
    /// use lapseq_dataset::dataset::{DatasetPreparer, PrepareConfig};
    ///
    /// let preparer = DatasetPreparer::new(PrepareConfig::default()).unwrap();
    /// let dataset = preparer.prepare(vec![]);
    /// assert_eq!(dataset.train.x_shape(), [0, 20, 40, 9]);
    /// assert_eq!(dataset.test.y_shape(), [0, 20]);
    /// ```
    #[must_use]
    pub fn prepare(&self, sessions: Vec<Session>) -> PreparedDataset {
        let (train, test) = self.split(sessions);
        log::debug!(
            "split into {} train and {} test sessions",
            train.len(),
            test.len()
        );

        let scaler = self.fit_scaler(&train);
        let train = self.partition(&train, &scaler);
        let test_sessions = test.iter().map(|session| session.name.clone()).collect();
        let test = self.partition(&test, &scaler);

        log::info!(
            "train: X {:?}, Y {:?}",
            train.x_shape(),
            train.y_shape()
        );
        log::info!("test: X {:?}, Y {:?}", test.x_shape(), test.y_shape());

        PreparedDataset {
            train,
            test,
            scaler,
            test_sessions,
        }
    }

    fn partition(&self, sessions: &[Session], scaler: &MinMaxScaler) -> Partition {
        let assembly = self
            .assembler
            .assemble(sessions, ScalerPhase::Transform(scaler));
        Partition {
            samples: assembly.samples,
            outcomes: assembly.outcomes,
            max_laps: self.config.max_laps,
            driver_count: self.config.required_drivers,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::grid_session;

    fn sessions(count: usize, laps: u32) -> Vec<Session> {
        (0..count)
            .map(|i| {
                #[expect(clippy::cast_precision_loss)]
                let pace = 88.0 + i as f64;
                grid_session(&format!("race {i}"), 20, laps, pace)
            })
            .collect()
    }

    fn preparer(config: PrepareConfig) -> DatasetPreparer {
        DatasetPreparer::new(config).unwrap()
    }

    #[test]
    fn test_ten_full_sessions() {
        let preparer = preparer(PrepareConfig::default());
        let dataset = preparer.prepare(sessions(10, 45));

        assert_eq!(dataset.train.x_shape(), [8, 20, 40, 9]);
        assert_eq!(dataset.test.x_shape(), [2, 20, 40, 9]);
        assert_eq!(dataset.train.y_shape(), [8, 20]);
        assert_eq!(dataset.test.y_shape(), [2, 20]);
        assert_eq!(dataset.train.x_values().count(), 8 * 20 * 40 * 9);
        assert!(dataset.train.y_values().all(|y| (0..=19).contains(&y)));
        assert_eq!(dataset.test_sessions.len(), 2);
        assert_eq!(
            dataset.test.session_names().collect::<Vec<_>>(),
            dataset.test_sessions
        );
    }

    #[test]
    fn test_split_index() {
        let default = preparer(PrepareConfig::default());
        assert_eq!(default.split_index(10), 8);
        assert_eq!(default.split_index(7), 5);
        assert_eq!(default.split_index(0), 0);

        let all_test = preparer(PrepareConfig {
            test_ratio: 1.0,
            ..PrepareConfig::default()
        });
        assert_eq!(all_test.split_index(10), 0);
        let no_test = preparer(PrepareConfig {
            test_ratio: 0.0,
            ..PrepareConfig::default()
        });
        assert_eq!(no_test.split_index(10), 10);
    }

    #[test]
    fn test_same_seed_is_deterministic() {
        let preparer = preparer(PrepareConfig::default());
        let first = preparer.prepare(sessions(10, 12));
        let second = preparer.prepare(sessions(10, 12));
        assert_eq!(first, second);
    }

    #[test]
    fn test_seed_changes_split() {
        let names = |seed: u64| {
            let preparer = preparer(PrepareConfig {
                seed,
                ..PrepareConfig::default()
            });
            let (train, _) = preparer.split(sessions(10, 1));
            train.into_iter().map(|s| s.name).collect::<Vec<_>>()
        };
        assert_eq!(names(42), names(42));
        assert!((0..8).any(|seed| names(seed) != names(42)));
    }

    #[test]
    fn test_scaler_ignores_test_sessions() {
        let preparer = preparer(PrepareConfig::default());
        let baseline = preparer.prepare(sessions(10, 12));

        // replace every held-out session with one far outside the train range
        let swapped = sessions(10, 12)
            .into_iter()
            .map(|session| {
                if baseline.test_sessions.contains(&session.name) {
                    grid_session(&session.name, 20, 60, 500.0)
                } else {
                    session
                }
            })
            .collect::<Vec<_>>();
        let rerun = preparer.prepare(swapped);

        assert_eq!(rerun.test_sessions, baseline.test_sessions);
        assert_eq!(rerun.scaler, baseline.scaler);

        let (train, _) = preparer.split(sessions(10, 12));
        assert_eq!(preparer.fit_scaler(&train), baseline.scaler);
    }

    #[test]
    fn test_train_values_are_bounded() {
        let preparer = preparer(PrepareConfig::default());
        let dataset = preparer.prepare(sessions(10, 45));
        assert!(
            dataset
                .train
                .x_values()
                .all(|value| (0.0..=1.0).contains(&value))
        );
    }

    #[test]
    fn test_incomplete_sessions_are_reported() {
        let mut input = sessions(4, 5);
        input.push(grid_session("short grid", 19, 5, 90.0));
        let preparer = preparer(PrepareConfig {
            test_ratio: 0.0,
            ..PrepareConfig::default()
        });
        let dataset = preparer.prepare(input);

        assert_eq!(dataset.train.len(), 4);
        let rejected = dataset
            .train
            .outcomes
            .iter()
            .filter(|outcome| !outcome.is_accepted())
            .map(|outcome| outcome.session.as_str())
            .collect::<Vec<_>>();
        assert_eq!(rejected, ["short grid"]);
        assert!(dataset.test.is_empty());
        assert!(dataset.test_sessions.is_empty());
    }

    #[test]
    fn test_empty_partitions_keep_their_shape() {
        let preparer = preparer(PrepareConfig {
            max_laps: 12,
            ..PrepareConfig::default()
        });
        let dataset = preparer.prepare(vec![]);
        assert_eq!(dataset.train.x_shape(), [0, 20, 12, 9]);
        assert_eq!(dataset.test.x_shape(), [0, 20, 12, 9]);
        assert_eq!(dataset.train.y_shape(), [0, 20]);
        assert_eq!(dataset.scaler.samples_seen(), 0);
    }

    #[test]
    fn test_cleaned_sessions_prepare() {
        let mut raw = sessions(6, 8);
        // first driver of every session retires after three laps
        for session in &mut raw {
            if let Some(laps) = &mut session.laps {
                laps.laps
                    .retain(|lap| lap.driver_number != "10" || lap.lap_number <= 3);
            }
        }
        let cleaned = raw
            .iter()
            .map(|session| lapseq_cleaning::cleaner::clean_session(session).session)
            .collect::<Vec<_>>();
        let preparer = preparer(PrepareConfig {
            max_laps: 8,
            test_ratio: 0.5,
            ..PrepareConfig::default()
        });
        let dataset = preparer.prepare(cleaned);
        assert_eq!(dataset.train.x_shape(), [3, 20, 8, 9]);
        assert_eq!(dataset.test.x_shape(), [3, 20, 8, 9]);
        assert!(dataset.train.outcomes.iter().all(SessionOutcome::is_accepted));
    }

    #[test]
    fn test_config_validation() {
        assert!(PrepareConfig::default().validate().is_ok());
        let invalid = [
            (
                PrepareConfig {
                    max_laps: 0,
                    ..PrepareConfig::default()
                },
                ConfigError::ZeroMaxLaps,
            ),
            (
                PrepareConfig {
                    required_drivers: 0,
                    ..PrepareConfig::default()
                },
                ConfigError::ZeroRequiredDrivers,
            ),
            (
                PrepareConfig {
                    test_ratio: 1.5,
                    ..PrepareConfig::default()
                },
                ConfigError::TestRatioOutOfRange { test_ratio: 1.5 },
            ),
        ];
        for (config, error) in invalid {
            assert_eq!(DatasetPreparer::new(config).unwrap_err(), error);
        }
    }
}
