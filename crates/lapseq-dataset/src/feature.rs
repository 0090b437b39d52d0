//! Per-driver feature extraction
//!
//! A driver's cleaned laps become a fixed-size `(max_laps, 9)` matrix:
//!
//! 1. Select the [`LapFeature`] columns in their fixed order
//! 2. Pad with all-zero rows, or truncate to the earliest `max_laps` laps
//! 3. Either feed the raw rows to the scaler accumulator ([`ScalerPhase::Fit`]) or
//!    scale them with the fitted scaler ([`ScalerPhase::Transform`])
//!
//! In fit mode the returned matrix is the *unscaled* padded matrix.
//!
//! # Missing values
//!
//! A missing cell, or a duration cell that was never converted to seconds, is
//! extracted as `NaN`. The accumulator ignores `NaN` and the scaler propagates it.

use lapseq_session::{LapRecord, TimeCell};
use lapseq_stats::minmax::{MinMaxAccumulator, MinMaxScaler};
use serde::{Deserialize, Serialize};

/// Number of features per lap.
pub const NUM_FEATURES: usize = LapFeature::LEN;

/// Feature values of one lap, in [`LapFeature::ALL`] order.
pub type FeatureRow = [f32; NUM_FEATURES];

/// Feature columns of the per-driver matrix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LapFeature {
    LapTime,
    TyreLife,
    FreshTyre,
    SpeedST,
    LapNumber,
    Position,
    SpeedI1,
    SpeedI2,
    SpeedFL,
}

impl LapFeature {
    pub const LEN: usize = 9;
    pub const ALL: [Self; Self::LEN] = [
        Self::LapTime,
        Self::TyreLife,
        Self::FreshTyre,
        Self::SpeedST,
        Self::LapNumber,
        Self::Position,
        Self::SpeedI1,
        Self::SpeedI2,
        Self::SpeedFL,
    ];

    /// Lap table column the feature is read from.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::LapTime => "LapTime",
            Self::TyreLife => "TyreLife",
            Self::FreshTyre => "FreshTyre",
            Self::SpeedST => "SpeedST",
            Self::LapNumber => "LapNumber",
            Self::Position => "Position",
            Self::SpeedI1 => "SpeedI1",
            Self::SpeedI2 => "SpeedI2",
            Self::SpeedFL => "SpeedFL",
        }
    }

    /// Reads the raw (unscaled) feature value of a lap.
    #[expect(clippy::cast_possible_truncation)]
    #[must_use]
    pub fn extract_raw(self, lap: &LapRecord) -> f32 {
        let value = match self {
            Self::LapTime => lap.lap_time.as_ref().and_then(TimeCell::seconds),
            Self::TyreLife => lap.tyre_life,
            Self::FreshTyre => lap.fresh_tyre.map(|fresh| f64::from(u8::from(fresh))),
            Self::SpeedST => lap.speed_st,
            Self::LapNumber => Some(f64::from(lap.lap_number)),
            Self::Position => lap.position,
            Self::SpeedI1 => lap.speed_i1,
            Self::SpeedI2 => lap.speed_i2,
            Self::SpeedFL => lap.speed_fl,
        };
        value.map_or(f32::NAN, |value| value as f32)
    }

    #[must_use]
    pub fn extract_row(lap: &LapRecord) -> FeatureRow {
        Self::ALL.map(|feature| feature.extract_raw(lap))
    }
}

/// Feature matrix of one driver, one row per lap.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureMatrix {
    rows: Vec<FeatureRow>,
}

impl FeatureMatrix {
    #[must_use]
    pub fn new(rows: Vec<FeatureRow>) -> Self {
        Self { rows }
    }

    #[must_use]
    pub fn rows(&self) -> &[FeatureRow] {
        &self.rows
    }

    /// `(laps, features)`
    #[must_use]
    pub fn shape(&self) -> (usize, usize) {
        (self.rows.len(), NUM_FEATURES)
    }

    /// All values in row-major order.
    pub fn values(&self) -> impl Iterator<Item = f32> + '_ {
        self.rows.iter().flatten().copied()
    }
}

/// Scaler state handed to the extractor.
///
/// Fitting needs exclusive access to the accumulator; transforming only reads the
/// frozen scaler.
#[derive(Debug)]
pub enum ScalerPhase<'a> {
    Fit(&'a mut MinMaxAccumulator),
    Transform(&'a MinMaxScaler),
}

impl ScalerPhase<'_> {
    /// Borrows the phase for a shorter lifetime, so it can be passed on repeatedly.
    pub fn reborrow(&mut self) -> ScalerPhase<'_> {
        match self {
            ScalerPhase::Fit(accumulator) => ScalerPhase::Fit(accumulator),
            ScalerPhase::Transform(scaler) => ScalerPhase::Transform(scaler),
        }
    }
}

/// Builds fixed-size feature matrices from driver laps.
///
/// # Examples
///
/// ```
/// use lapseq_dataset::feature::{FeatureExtractor, NUM_FEATURES, ScalerPhase};
/// use lapseq_session::LapRecord;
///
/// let extractor = FeatureExtractor::new(40);
/// let laps = (1..=5).map(|n| LapRecord::new("VER", "1", n)).collect::<Vec<_>>();
///
/// let mut accumulator = extractor.new_accumulator();
/// let raw = extractor.extract(&laps, ScalerPhase::Fit(&mut accumulator));
/// assert_eq!(raw.shape(), (40, NUM_FEATURES));
///
/// let scaler = accumulator.finish();
/// let scaled = extractor.extract(&laps, ScalerPhase::Transform(&scaler));
/// assert_eq!(scaled.shape(), (40, NUM_FEATURES));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeatureExtractor {
    max_laps: usize,
}

impl FeatureExtractor {
    #[must_use]
    pub fn new(max_laps: usize) -> Self {
        Self { max_laps }
    }

    #[must_use]
    pub fn max_laps(&self) -> usize {
        self.max_laps
    }

    /// Shape every extracted matrix is expected to have.
    #[must_use]
    pub fn expected_shape(&self) -> (usize, usize) {
        (self.max_laps, NUM_FEATURES)
    }

    /// Creates an empty accumulator sized for this extractor's features.
    #[must_use]
    pub fn new_accumulator(&self) -> MinMaxAccumulator {
        MinMaxAccumulator::new(NUM_FEATURES)
    }

    /// Selects, pads and truncates laps without scaling.
    ///
    /// Laps are taken in the given order; the earliest `max_laps` are kept.
    pub fn raw_matrix<'a, I>(&self, laps: I) -> FeatureMatrix
    where
        I: IntoIterator<Item = &'a LapRecord>,
    {
        let mut rows = laps
            .into_iter()
            .take(self.max_laps)
            .map(LapFeature::extract_row)
            .collect::<Vec<_>>();
        rows.resize(self.max_laps, [0.0; NUM_FEATURES]);
        FeatureMatrix::new(rows)
    }

    /// Extracts the feature matrix of one driver.
    ///
    /// # Panics
    ///
    /// Panics if the accumulator or scaler was not created for [`NUM_FEATURES`]
    /// columns.
    pub fn extract<'a, I>(&self, laps: I, phase: ScalerPhase<'_>) -> FeatureMatrix
    where
        I: IntoIterator<Item = &'a LapRecord>,
    {
        let mut matrix = self.raw_matrix(laps);
        match phase {
            ScalerPhase::Fit(accumulator) => accumulator.observe_rows(&matrix.rows),
            ScalerPhase::Transform(scaler) => {
                for row in &mut matrix.rows {
                    scaler.transform_in_place(row);
                }
            }
        }
        matrix
    }
}
