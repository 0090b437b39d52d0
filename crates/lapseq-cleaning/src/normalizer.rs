//! Column normalization for completed lap tables
//!
//! [`normalize_columns`] runs the steps below in this order. Later steps rely on
//! gaps closed by earlier ones:
//!
//! 1. [`drop_bookkeeping_columns`]
//! 2. [`fill_time_series`]: duration and speed columns
//! 3. [`fill_speeds`]: speed columns again
//! 4. [`fill_position`]
//! 5. [`fill_tyre_life`]
//! 6. [`convert_time_columns`]
//!
//! Every fill uses the nearest known value of the same driver: backward fill first,
//! then forward fill. Values never cross from one driver to another, and a driver
//! without any known value for a column keeps it missing.

use lapseq_session::{
    LapRecord, LapTable, SpeedColumn, TimeCell, TimeColumn, duration::DurationParseError,
};

/// Administrative lap columns removed before feature extraction.
pub const BOOKKEEPING_COLUMNS: [&str; 10] = [
    "IsAccurate",
    "LapStartDate",
    "FastF1Generated",
    "DeletedReason",
    "Deleted",
    "IsPersonalBest",
    "Stint",
    "PitOutTime",
    "PitInTime",
    "TrackStatus",
];

/// A duration column that could not be converted to seconds.
///
/// The column keeps its original cells for the whole session.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
#[display(
    "column {} not converted to seconds (driver {driver}, lap {lap_number}): {error}",
    column.name()
)]
pub struct ConversionIssue {
    pub column: TimeColumn,
    pub driver: String,
    pub lap_number: u32,
    #[error(source)]
    pub error: DurationParseError,
}

/// Runs every normalization step in order and returns the conversion issues.
pub fn normalize_columns(laps: &mut LapTable) -> Vec<ConversionIssue> {
    drop_bookkeeping_columns(laps);
    fill_time_series(laps);
    fill_speeds(laps);
    fill_position(laps);
    fill_tyre_life(laps);
    convert_time_columns(laps)
}

pub fn drop_bookkeeping_columns(laps: &mut LapTable) {
    for lap in &mut laps.laps {
        for column in BOOKKEEPING_COLUMNS {
            lap.extra.remove(column);
        }
    }
}

/// Fills duration and speed columns per driver.
pub fn fill_time_series(laps: &mut LapTable) {
    for column in TimeColumn::ALL {
        fill_nearest_by_driver(laps, |lap| column.cell_mut(lap));
    }
    fill_speeds(laps);
}

pub fn fill_speeds(laps: &mut LapTable) {
    for column in SpeedColumn::ALL {
        fill_nearest_by_driver(laps, |lap| column.value_mut(lap));
    }
}

pub fn fill_position(laps: &mut LapTable) {
    fill_nearest_by_driver(laps, |lap| &mut lap.position);
}

/// Sets tyre life to zero where it is still missing.
pub fn fill_tyre_life(laps: &mut LapTable) {
    for lap in &mut laps.laps {
        lap.tyre_life.get_or_insert(0.0);
    }
}

/// Converts every duration column to numeric seconds.
///
/// Conversion is all-or-nothing per column: if any cell fails to parse, the column
/// is left as it was and an issue is logged and returned. Other columns still
/// convert.
pub fn convert_time_columns(laps: &mut LapTable) -> Vec<ConversionIssue> {
    let mut issues = vec![];
    for column in TimeColumn::ALL {
        let converted = laps
            .iter()
            .map(|lap| {
                column
                    .cell(lap)
                    .map(TimeCell::to_seconds)
                    .transpose()
                    .map_err(|error| ConversionIssue {
                        column,
                        driver: lap.driver.clone(),
                        lap_number: lap.lap_number,
                        error,
                    })
            })
            .collect::<Result<Vec<_>, _>>();
        match converted {
            Ok(seconds) => {
                for (lap, seconds) in laps.laps.iter_mut().zip(seconds) {
                    *column.cell_mut(lap) = seconds.map(TimeCell::Seconds);
                }
            }
            Err(issue) => {
                log::warn!("{issue}");
                issues.push(issue);
            }
        }
    }
    issues
}

/// Backward-then-forward fill of one column within each driver's rows.
fn fill_nearest_by_driver<T, F>(laps: &mut LapTable, mut cell: F)
where
    T: Clone,
    F: FnMut(&mut LapRecord) -> &mut Option<T>,
{
    for indices in laps.driver_groups().values() {
        let mut next = None;
        for &index in indices.iter().rev() {
            let value = cell(&mut laps.laps[index]);
            if let Some(known) = value.as_ref() {
                next = Some(known.clone());
            } else {
                value.clone_from(&next);
            }
        }
        let mut previous = None;
        for &index in indices {
            let value = cell(&mut laps.laps[index]);
            if let Some(known) = value.as_ref() {
                previous = Some(known.clone());
            } else {
                value.clone_from(&previous);
            }
        }
    }
}
