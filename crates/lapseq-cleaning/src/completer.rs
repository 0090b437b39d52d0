//! Missing-lap synthesis
//!
//! Every driver in a completed lap table has exactly one row for each lap number
//! in `1..=max_lap`, where `max_lap` is the highest lap number observed for *any*
//! driver of the session. Drivers who retired early are padded up to the session
//! maximum, so later feature windows all span the same lap range.
//!
//! # Synthesized rows
//!
//! | Column                         | Value                                           |
//! |--------------------------------|-------------------------------------------------|
//! | `Driver`, `DriverNumber`       | from the driver's first row                     |
//! | `Team`, `Compound`             | from the driver's last row                      |
//! | `TyreLife`                     | last row's tyre life + 1                        |
//! | `Position`                     | final classified position, if the driver has one|
//! | duration columns               | zero                                            |
//! | speed columns, `FreshTyre`     | zero / `false`                                  |
//! | everything else                | missing                                         |
//!
//! The tyre-life rule is a heuristic: every synthesized lap of a multi-lap gap
//! gets the same `last + 1` value rather than a running count.
//!
//! Duplicate `(driver, lap)` rows in the input are kept as they are; completion
//! only adds the lap numbers a driver has no row for.

use std::collections::BTreeSet;

use lapseq_session::{LapRecord, LapTable, ResultTable, SpeedColumn, TimeCell, TimeColumn};

/// A lap table with missing laps filled in.
#[derive(Debug, Clone, PartialEq)]
pub struct LapCompletion {
    /// Completed table, sorted by driver then lap number
    pub laps: LapTable,
    /// Number of rows added
    pub synthesized: usize,
}

/// Values copied from a driver's known rows into synthesized rows.
#[derive(Debug)]
struct LapSeed<'a> {
    driver: &'a str,
    driver_number: &'a str,
    team: Option<&'a str>,
    compound: Option<&'a str>,
    tyre_life: Option<f64>,
    position: Option<f64>,
}

impl<'a> LapSeed<'a> {
    fn new(first: &'a LapRecord, last: &'a LapRecord, results: &ResultTable) -> Self {
        let position = results
            .find_by_number(&first.driver_number)
            .and_then(|result| result.position);
        Self {
            driver: &first.driver,
            driver_number: &first.driver_number,
            team: last.team.as_deref(),
            compound: last.compound.as_deref(),
            tyre_life: last.tyre_life.map(|life| life + 1.0),
            position,
        }
    }

    fn synthesize(&self, lap_number: u32) -> LapRecord {
        let mut lap = LapRecord::new(self.driver, self.driver_number, lap_number);
        lap.team = self.team.map(str::to_owned);
        lap.compound = self.compound.map(str::to_owned);
        lap.tyre_life = self.tyre_life;
        lap.position = self.position;
        lap.fresh_tyre = Some(false);
        for column in TimeColumn::ALL {
            *column.cell_mut(&mut lap) = Some(TimeCell::ZERO);
        }
        for column in SpeedColumn::ALL {
            *column.value_mut(&mut lap) = Some(0.0);
        }
        lap
    }
}

/// Synthesizes the laps each driver is missing up to the session's last lap.
///
/// The input table is not modified. An empty table is returned unchanged.
#[must_use]
pub fn complete_missing_laps(laps: &LapTable, results: &ResultTable) -> LapCompletion {
    let Some(max_lap) = laps.max_lap_number() else {
        return LapCompletion {
            laps: laps.clone(),
            synthesized: 0,
        };
    };

    let mut completed = laps.laps.clone();
    for indices in laps.driver_groups().values() {
        let (Some(&first), Some(&last)) = (indices.first(), indices.last()) else {
            continue;
        };
        let seed = LapSeed::new(&laps.laps[first], &laps.laps[last], results);
        let existing = indices
            .iter()
            .map(|&index| laps.laps[index].lap_number)
            .collect::<BTreeSet<_>>();
        completed.extend(
            (1..=max_lap)
                .filter(|lap_number| !existing.contains(lap_number))
                .map(|lap_number| seed.synthesize(lap_number)),
        );
    }

    let synthesized = completed.len() - laps.len();
    let mut laps = LapTable::new(completed);
    laps.sort_by_driver_and_lap();
    LapCompletion { laps, synthesized }
}

#[cfg(test)]
mod tests {
    use lapseq_session::ResultRecord;

    use super::*;

    fn lap(driver: &str, number: &str, lap_number: u32, tyre_life: f64) -> LapRecord {
        let mut lap = LapRecord::new(driver, number, lap_number);
        lap.tyre_life = Some(tyre_life);
        lap.team = Some(format!("{driver} team"));
        lap.compound = Some("MEDIUM".to_owned());
        lap.lap_time = Some(TimeCell::Seconds(90.0));
        lap.speed_st = Some(310.0);
        lap.fresh_tyre = Some(true);
        lap
    }

    fn laps_of<'a>(table: &'a LapTable, driver: &str) -> Vec<&'a LapRecord> {
        table.iter().filter(|lap| lap.driver == driver).collect()
    }

    #[test]
    fn test_every_driver_spans_session_range() {
        let table = LapTable::new(vec![
            lap("VER", "1", 1, 1.0),
            lap("VER", "1", 2, 2.0),
            lap("VER", "1", 3, 3.0),
            lap("VER", "1", 4, 4.0),
            lap("VER", "1", 5, 5.0),
            lap("SAR", "2", 2, 8.0),
            lap("HAM", "44", 3, 1.0),
            lap("HAM", "44", 1, 9.0),
        ]);
        let results = ResultTable::new(vec![ResultRecord::new("2", "SAR", Some(20.0))]);
        let completion = complete_missing_laps(&table, &results);

        for driver in ["VER", "SAR", "HAM"] {
            let lap_numbers = laps_of(&completion.laps, driver)
                .iter()
                .map(|lap| lap.lap_number)
                .collect::<Vec<_>>();
            assert_eq!(lap_numbers, [1, 2, 3, 4, 5], "driver {driver}");
        }
        assert_eq!(completion.synthesized, 4 + 3);
        assert_eq!(completion.laps.len(), 15);
    }

    #[test]
    fn test_synthesized_row_values() {
        let table = LapTable::new(vec![
            lap("VER", "1", 1, 1.0),
            lap("VER", "1", 2, 2.0),
            lap("VER", "1", 3, 3.0),
            lap("SAR", "2", 1, 7.0),
        ]);
        let results = ResultTable::new(vec![ResultRecord::new("2", "SAR", Some(20.0))]);
        let completion = complete_missing_laps(&table, &results);

        let sar = laps_of(&completion.laps, "SAR");
        let synthesized = sar[2];
        assert_eq!(synthesized.lap_number, 3);
        assert_eq!(synthesized.driver_number, "2");
        assert_eq!(synthesized.team.as_deref(), Some("SAR team"));
        assert_eq!(synthesized.compound.as_deref(), Some("MEDIUM"));
        assert_eq!(synthesized.position, Some(20.0));
        assert_eq!(synthesized.fresh_tyre, Some(false));
        assert!(
            TimeColumn::ALL
                .iter()
                .all(|c| c.cell(synthesized) == Some(&TimeCell::ZERO))
        );
        assert!(SpeedColumn::ALL.iter().all(|c| c.value(synthesized) == Some(0.0)));
        assert!(synthesized.extra.is_empty());
        // same tyre life for every lap of the gap
        assert_eq!(sar[1].tyre_life, Some(8.0));
        assert_eq!(sar[2].tyre_life, Some(8.0));
        // original row untouched
        assert_eq!(sar[0].tyre_life, Some(7.0));
        assert_eq!(sar[0].fresh_tyre, Some(true));
    }

    #[test]
    fn test_position_missing_without_result_row() {
        let table = LapTable::new(vec![lap("VER", "1", 2, 1.0), lap("HAM", "44", 1, 1.0)]);
        let completion = complete_missing_laps(&table, &ResultTable::default());
        let ham = laps_of(&completion.laps, "HAM");
        assert_eq!(ham[1].position, None);
        let ver = laps_of(&completion.laps, "VER");
        assert_eq!(ver[0].lap_number, 1);
    }

    #[test]
    fn test_input_is_not_mutated() {
        let table = LapTable::new(vec![lap("VER", "1", 3, 1.0)]);
        let before = table.clone();
        let completion = complete_missing_laps(&table, &ResultTable::default());
        assert_eq!(table, before);
        assert_eq!(completion.synthesized, 2);
    }

    #[test]
    fn test_empty_table() {
        let completion = complete_missing_laps(&LapTable::default(), &ResultTable::default());
        assert!(completion.laps.is_empty());
        assert_eq!(completion.synthesized, 0);
    }
}
