//! Cleaned-session builders shared by the unit tests.

use lapseq_session::{LapRecord, LapTable, ResultRecord, ResultTable, Session, TimeCell};

/// Abbreviation of the `index`-th driver of a fixture grid.
pub(crate) fn abbreviation(index: usize) -> String {
    format!("D{index:02}")
}

/// A cleaned session with `drivers` drivers and `laps` laps each.
///
/// Driver `i` has number `i + 10` and finishes in position `drivers - i`, so the
/// finishing order is the reverse of the abbreviation order.
#[expect(clippy::cast_precision_loss)]
pub(crate) fn grid_session(name: &str, drivers: usize, laps: u32, pace: f64) -> Session {
    let mut rows = vec![];
    let mut results = vec![];
    for index in 0..drivers {
        let number = (index + 10).to_string();
        let position = (drivers - index) as f64;
        for lap_number in 1..=laps {
            let mut lap = LapRecord::new(abbreviation(index), number.clone(), lap_number);
            lap.lap_time = Some(TimeCell::Seconds(
                pace + index as f64 * 0.1 + f64::from(lap_number) * 0.01,
            ));
            lap.tyre_life = Some(f64::from(lap_number));
            lap.fresh_tyre = Some(lap_number == 1);
            lap.position = Some(position);
            lap.speed_i1 = Some(250.0 + index as f64);
            lap.speed_i2 = Some(260.0 + index as f64);
            lap.speed_fl = Some(270.0 + index as f64);
            lap.speed_st = Some(300.0 + index as f64);
            rows.push(lap);
        }
        results.push(ResultRecord::new(number, abbreviation(index), Some(position)));
    }
    // results arrive in finishing order, not abbreviation order
    results.reverse();
    Session::new(
        name,
        Some(LapTable::new(rows)),
        Some(ResultTable::new(results)),
    )
}
