//! Lap table: one row per (driver, lap)
//!
//! Rows use the column names of the FastF1 lap table. The columns the pipeline
//! reads are typed fields of [`LapRecord`]; every other column is kept verbatim in
//! [`LapRecord::extra`] so that bookkeeping columns can be dropped explicitly
//! during cleaning.
//!
//! # Column groups
//!
//! - [`TimeColumn`]: duration-typed columns (lap time, sector times, session times)
//! - [`SpeedColumn`]: the four speed-trap measurements
//!
//! Both groups expose accessors so cleaning steps can be written once per group
//! instead of once per field.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Deserializer, Serialize, de::Error as _};

use crate::duration::TimeCell;

/// A single lap driven by a single driver.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct LapRecord {
    /// Driver abbreviation (e.g. `"VER"`)
    pub driver: String,
    /// Driver number as a string (e.g. `"1"`, `"44"`)
    #[serde(deserialize_with = "driver_number")]
    pub driver_number: String,
    /// 1-based lap number
    #[serde(deserialize_with = "lap_number")]
    pub lap_number: u32,
    pub team: Option<String>,
    pub compound: Option<String>,
    pub tyre_life: Option<f64>,
    pub fresh_tyre: Option<bool>,
    pub position: Option<f64>,

    pub speed_i1: Option<f64>,
    pub speed_i2: Option<f64>,
    #[serde(rename = "SpeedFL")]
    pub speed_fl: Option<f64>,
    #[serde(rename = "SpeedST")]
    pub speed_st: Option<f64>,

    pub time: Option<TimeCell>,
    pub lap_time: Option<TimeCell>,
    pub sector1_time: Option<TimeCell>,
    pub sector2_time: Option<TimeCell>,
    pub sector3_time: Option<TimeCell>,
    pub sector1_session_time: Option<TimeCell>,
    pub sector2_session_time: Option<TimeCell>,
    pub sector3_session_time: Option<TimeCell>,
    pub lap_start_time: Option<TimeCell>,

    /// Columns not used by the pipeline, keyed by column name
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

impl LapRecord {
    /// Creates a lap with identity fields set and every measurement missing.
    #[must_use]
    pub fn new(driver: impl Into<String>, driver_number: impl Into<String>, lap_number: u32) -> Self {
        Self {
            driver: driver.into(),
            driver_number: driver_number.into(),
            lap_number,
            team: None,
            compound: None,
            tyre_life: None,
            fresh_tyre: None,
            position: None,
            speed_i1: None,
            speed_i2: None,
            speed_fl: None,
            speed_st: None,
            time: None,
            lap_time: None,
            sector1_time: None,
            sector2_time: None,
            sector3_time: None,
            sector1_session_time: None,
            sector2_session_time: None,
            sector3_session_time: None,
            lap_start_time: None,
            extra: BTreeMap::new(),
        }
    }
}

/// Duration-typed lap columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum TimeColumn {
    Time,
    LapTime,
    Sector1Time,
    Sector2Time,
    Sector3Time,
    Sector1SessionTime,
    Sector2SessionTime,
    Sector3SessionTime,
    LapStartTime,
}

impl TimeColumn {
    pub const LEN: usize = 9;
    pub const ALL: [Self; Self::LEN] = [
        Self::Time,
        Self::LapTime,
        Self::Sector1Time,
        Self::Sector2Time,
        Self::Sector3Time,
        Self::Sector1SessionTime,
        Self::Sector2SessionTime,
        Self::Sector3SessionTime,
        Self::LapStartTime,
    ];

    /// Column name in the lap table.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Time => "Time",
            Self::LapTime => "LapTime",
            Self::Sector1Time => "Sector1Time",
            Self::Sector2Time => "Sector2Time",
            Self::Sector3Time => "Sector3Time",
            Self::Sector1SessionTime => "Sector1SessionTime",
            Self::Sector2SessionTime => "Sector2SessionTime",
            Self::Sector3SessionTime => "Sector3SessionTime",
            Self::LapStartTime => "LapStartTime",
        }
    }

    #[must_use]
    pub fn cell(self, lap: &LapRecord) -> Option<&TimeCell> {
        match self {
            Self::Time => lap.time.as_ref(),
            Self::LapTime => lap.lap_time.as_ref(),
            Self::Sector1Time => lap.sector1_time.as_ref(),
            Self::Sector2Time => lap.sector2_time.as_ref(),
            Self::Sector3Time => lap.sector3_time.as_ref(),
            Self::Sector1SessionTime => lap.sector1_session_time.as_ref(),
            Self::Sector2SessionTime => lap.sector2_session_time.as_ref(),
            Self::Sector3SessionTime => lap.sector3_session_time.as_ref(),
            Self::LapStartTime => lap.lap_start_time.as_ref(),
        }
    }

    pub fn cell_mut(self, lap: &mut LapRecord) -> &mut Option<TimeCell> {
        match self {
            Self::Time => &mut lap.time,
            Self::LapTime => &mut lap.lap_time,
            Self::Sector1Time => &mut lap.sector1_time,
            Self::Sector2Time => &mut lap.sector2_time,
            Self::Sector3Time => &mut lap.sector3_time,
            Self::Sector1SessionTime => &mut lap.sector1_session_time,
            Self::Sector2SessionTime => &mut lap.sector2_session_time,
            Self::Sector3SessionTime => &mut lap.sector3_session_time,
            Self::LapStartTime => &mut lap.lap_start_time,
        }
    }
}

/// Speed-trap columns (km/h).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum SpeedColumn {
    SpeedI1,
    SpeedI2,
    SpeedFL,
    SpeedST,
}

impl SpeedColumn {
    pub const LEN: usize = 4;
    pub const ALL: [Self; Self::LEN] = [Self::SpeedI1, Self::SpeedI2, Self::SpeedFL, Self::SpeedST];

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::SpeedI1 => "SpeedI1",
            Self::SpeedI2 => "SpeedI2",
            Self::SpeedFL => "SpeedFL",
            Self::SpeedST => "SpeedST",
        }
    }

    #[must_use]
    pub fn value(self, lap: &LapRecord) -> Option<f64> {
        match self {
            Self::SpeedI1 => lap.speed_i1,
            Self::SpeedI2 => lap.speed_i2,
            Self::SpeedFL => lap.speed_fl,
            Self::SpeedST => lap.speed_st,
        }
    }

    pub fn value_mut(self, lap: &mut LapRecord) -> &mut Option<f64> {
        match self {
            Self::SpeedI1 => &mut lap.speed_i1,
            Self::SpeedI2 => &mut lap.speed_i2,
            Self::SpeedFL => &mut lap.speed_fl,
            Self::SpeedST => &mut lap.speed_st,
        }
    }
}

/// Row indices of a lap table grouped by driver abbreviation.
///
/// Indices inside each group keep the table's row order.
pub type DriverGroups = BTreeMap<String, Vec<usize>>;

/// All laps of a session.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LapTable {
    pub laps: Vec<LapRecord>,
}

impl LapTable {
    #[must_use]
    pub fn new(laps: Vec<LapRecord>) -> Self {
        Self { laps }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.laps.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.laps.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &LapRecord> + '_ {
        self.laps.iter()
    }

    /// Highest lap number observed across all drivers.
    #[must_use]
    pub fn max_lap_number(&self) -> Option<u32> {
        self.laps.iter().map(|lap| lap.lap_number).max()
    }

    /// Distinct driver abbreviations.
    #[must_use]
    pub fn drivers(&self) -> BTreeSet<&str> {
        self.laps.iter().map(|lap| lap.driver.as_str()).collect()
    }

    /// Partitions row indices by driver abbreviation.
    #[must_use]
    pub fn driver_groups(&self) -> DriverGroups {
        let mut groups = DriverGroups::new();
        for (index, lap) in self.laps.iter().enumerate() {
            groups.entry(lap.driver.clone()).or_default().push(index);
        }
        groups
    }

    /// Laps of the driver with the given number, in row order.
    #[must_use]
    pub fn laps_for_number(&self, driver_number: &str) -> Vec<&LapRecord> {
        self.laps
            .iter()
            .filter(|lap| lap.driver_number == driver_number)
            .collect()
    }

    /// Sorts rows by driver abbreviation, then lap number.
    ///
    /// The sort is stable, so rows with equal keys keep their relative order.
    pub fn sort_by_driver_and_lap(&mut self) {
        self.laps.sort_by(|a, b| {
            a.driver
                .cmp(&b.driver)
                .then_with(|| a.lap_number.cmp(&b.lap_number))
        });
    }
}

impl FromIterator<LapRecord> for LapTable {
    fn from_iter<I: IntoIterator<Item = LapRecord>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

// Exporters write numeric columns through float dtypes, so `1.0` must read as lap 1.
#[expect(
    clippy::float_cmp,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss
)]
fn lap_number<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawLapNumber {
        Integer(u32),
        Float(f64),
    }

    match RawLapNumber::deserialize(deserializer)? {
        RawLapNumber::Integer(n) => Ok(n),
        RawLapNumber::Float(f) if f.trunc() == f && (0.0..=f64::from(u32::MAX)).contains(&f) => {
            Ok(f as u32)
        }
        RawLapNumber::Float(f) => Err(D::Error::custom(format!("invalid lap number {f}"))),
    }
}

pub(crate) fn driver_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawDriverNumber {
        Text(String),
        Integer(u64),
    }

    Ok(match RawDriverNumber::deserialize(deserializer)? {
        RawDriverNumber::Text(text) => text,
        RawDriverNumber::Integer(n) => n.to_string(),
    })
}
