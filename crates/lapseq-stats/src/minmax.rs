//! Two-phase min/max scaling
//!
//! The scaler maps each column `x` to `(x - min) / (max - min)` using the minimum
//! and maximum observed during fitting. Values outside the fitted range map outside
//! `[0, 1]`; no clipping is applied.
//!
//! # Missing values
//!
//! `NaN` inputs are ignored while fitting and propagate through transforms.
//!
//! # Degenerate columns
//!
//! - A column whose observed range is zero is scaled with a range of `1`, so it only
//!   gets shifted by its minimum.
//! - A column that never received a finite value is fitted as `min = max = 0`, which
//!   makes the transform the identity for that column.

use serde::{Deserialize, Serialize};

/// Running per-column minimum and maximum (fit phase).
#[derive(Debug, Clone, PartialEq)]
pub struct MinMaxAccumulator {
    min: Vec<f32>,
    max: Vec<f32>,
    samples_seen: usize,
}

impl MinMaxAccumulator {
    /// Creates an empty accumulator for rows with `num_columns` values.
    #[must_use]
    pub fn new(num_columns: usize) -> Self {
        Self {
            min: vec![f32::INFINITY; num_columns],
            max: vec![f32::NEG_INFINITY; num_columns],
            samples_seen: 0,
        }
    }

    #[must_use]
    pub fn num_columns(&self) -> usize {
        self.min.len()
    }

    /// Number of rows observed so far.
    #[must_use]
    pub fn samples_seen(&self) -> usize {
        self.samples_seen
    }

    /// Updates the running statistics with one row.
    ///
    /// # Panics
    ///
    /// Panics if the row length differs from [`Self::num_columns`].
    pub fn observe(&mut self, row: &[f32]) {
        assert_eq!(row.len(), self.num_columns(), "row length mismatch");
        // `f32::min`/`f32::max` return the other operand when one is NaN
        for ((min, max), value) in self.min.iter_mut().zip(&mut self.max).zip(row) {
            *min = min.min(*value);
            *max = max.max(*value);
        }
        self.samples_seen += 1;
    }

    /// Updates the running statistics with every row of `rows`.
    pub fn observe_rows<'a, I, R>(&mut self, rows: I)
    where
        I: IntoIterator<Item = &'a R>,
        R: AsRef<[f32]> + 'a + ?Sized,
    {
        for row in rows {
            self.observe(row.as_ref());
        }
    }

    /// Freezes the statistics into a scaler.
    #[must_use]
    pub fn finish(self) -> MinMaxScaler {
        let (data_min, data_max) = self
            .min
            .into_iter()
            .zip(self.max)
            .map(|(min, max)| if min > max { (0.0, 0.0) } else { (min, max) })
            .unzip();
        MinMaxScaler {
            data_min,
            data_max,
            samples_seen: self.samples_seen,
        }
    }
}

/// Fitted min/max transform (transform phase).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MinMaxScaler {
    data_min: Vec<f32>,
    data_max: Vec<f32>,
    samples_seen: usize,
}

impl MinMaxScaler {
    #[must_use]
    pub fn num_columns(&self) -> usize {
        self.data_min.len()
    }

    /// Number of rows the scaler was fitted on.
    #[must_use]
    pub fn samples_seen(&self) -> usize {
        self.samples_seen
    }

    #[must_use]
    pub fn data_min(&self) -> &[f32] {
        &self.data_min
    }

    #[must_use]
    pub fn data_max(&self) -> &[f32] {
        &self.data_max
    }

    /// Per-column `max - min`.
    #[must_use]
    pub fn data_range(&self) -> Vec<f32> {
        self.data_min
            .iter()
            .zip(&self.data_max)
            .map(|(min, max)| max - min)
            .collect()
    }

    #[expect(clippy::float_cmp)]
    fn scale(&self, column: usize) -> f32 {
        let range = self.data_max[column] - self.data_min[column];
        if range == 0.0 { 1.0 } else { range }
    }

    /// Scales a row in place.
    ///
    /// # Panics
    ///
    /// Panics if the row length differs from [`Self::num_columns`].
    pub fn transform_in_place(&self, row: &mut [f32]) {
        assert_eq!(row.len(), self.num_columns(), "row length mismatch");
        for (column, value) in row.iter_mut().enumerate() {
            *value = (*value - self.data_min[column]) / self.scale(column);
        }
    }

    /// Returns a scaled copy of a row.
    #[must_use]
    pub fn transform(&self, row: &[f32]) -> Vec<f32> {
        let mut scaled = row.to_vec();
        self.transform_in_place(&mut scaled);
        scaled
    }

    /// Maps a scaled row back to raw feature values in place.
    ///
    /// # Panics
    ///
    /// Panics if the row length differs from [`Self::num_columns`].
    pub fn inverse_transform_in_place(&self, row: &mut [f32]) {
        assert_eq!(row.len(), self.num_columns(), "row length mismatch");
        for (column, value) in row.iter_mut().enumerate() {
            *value = *value * self.scale(column) + self.data_min[column];
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_incremental_fit_matches_single_fit() {
        let rows: [[f32; 2]; 3] = [[1.0, -5.0], [4.0, 5.0], [2.0, 0.0]];

        let mut incremental = MinMaxAccumulator::new(2);
        incremental.observe(&rows[0]);
        incremental.observe_rows(&rows[1..]);

        let mut single = MinMaxAccumulator::new(2);
        single.observe_rows(&rows);

        assert_eq!(incremental.finish(), single.finish());
    }

    #[test]
    fn test_transform_bounds() {
        let mut acc = MinMaxAccumulator::new(2);
        acc.observe_rows(&[[0.0_f32, 100.0], [10.0, 300.0]]);
        let scaler = acc.finish();

        assert_eq!(scaler.data_min(), [0.0, 100.0]);
        assert_eq!(scaler.data_max(), [10.0, 300.0]);
        assert_eq!(scaler.data_range(), vec![10.0, 200.0]);
        assert_eq!(scaler.transform(&[0.0, 100.0]), vec![0.0, 0.0]);
        assert_eq!(scaler.transform(&[10.0, 300.0]), vec![1.0, 1.0]);
        assert_eq!(scaler.transform(&[5.0, 200.0]), vec![0.5, 0.5]);
        // no clipping outside the fitted range
        assert_eq!(scaler.transform(&[20.0, 0.0]), vec![2.0, -0.5]);
    }

    #[test]
    fn test_nan_is_ignored_when_fitting() {
        let mut acc = MinMaxAccumulator::new(1);
        acc.observe(&[f32::NAN]);
        acc.observe(&[2.0]);
        acc.observe(&[4.0]);
        assert_eq!(acc.samples_seen(), 3);
        let scaler = acc.finish();
        assert_eq!(scaler.data_min(), [2.0]);
        assert_eq!(scaler.data_max(), [4.0]);
        assert!(scaler.transform(&[f32::NAN])[0].is_nan());
    }

    #[test]
    fn test_degenerate_columns() {
        let mut acc = MinMaxAccumulator::new(2);
        acc.observe(&[3.0, f32::NAN]);
        acc.observe(&[3.0, f32::NAN]);
        let scaler = acc.finish();

        // constant column: shifted only
        assert_eq!(scaler.transform(&[3.0, 7.0])[0], 0.0);
        assert_eq!(scaler.transform(&[5.0, 7.0])[0], 2.0);
        // never observed: identity
        assert_eq!(scaler.data_min()[1], 0.0);
        assert_eq!(scaler.transform(&[5.0, 7.0])[1], 7.0);
    }

    #[test]
    fn test_inverse_transform() {
        let mut acc = MinMaxAccumulator::new(2);
        acc.observe_rows(&[[10.0_f32, 0.0], [20.0, 4.0]]);
        let scaler = acc.finish();

        let mut row = [15.0_f32, 1.0];
        scaler.transform_in_place(&mut row);
        assert_eq!(row, [0.5, 0.25]);
        scaler.inverse_transform_in_place(&mut row);
        assert_eq!(row, [15.0, 1.0]);
    }

    #[test]
    fn test_empty_fit() {
        let scaler = MinMaxAccumulator::new(3).finish();
        assert_eq!(scaler.samples_seen(), 0);
        assert_eq!(scaler.transform(&[1.0, 2.0, 3.0]), vec![1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_scaler_json_roundtrip() {
        let mut acc = MinMaxAccumulator::new(2);
        acc.observe(&[1.0, 2.0]);
        let scaler = acc.finish();
        let json = serde_json::to_string(&scaler).unwrap();
        let restored: MinMaxScaler = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, scaler);
    }
}
