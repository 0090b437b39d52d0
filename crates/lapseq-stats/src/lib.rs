//! Statistical utilities for lap-sequence preparation.
//!
//! This crate provides the min/max feature scaler used to map raw lap features into
//! `[0, 1]`. Scaling is split into two phases with distinct types:
//!
//! - [`minmax::MinMaxAccumulator`]: running per-column minimum and maximum, updated
//!   incrementally during the fit phase
//! - [`minmax::MinMaxScaler`]: the frozen, read-only transform produced by
//!   [`MinMaxAccumulator::finish`](minmax::MinMaxAccumulator::finish)
//!
//! Because the scaler can only be obtained by consuming the accumulator, every fit
//! call necessarily happens before the first transform call.
//!
//! # Examples
//!
//! ```
//! use lapseq_stats::minmax::MinMaxAccumulator;
//!
//! let mut acc = MinMaxAccumulator::new(2);
//! acc.observe(&[1.0, 10.0]);
//! acc.observe(&[3.0, 30.0]);
//! let scaler = acc.finish();
//!
//! assert_eq!(scaler.transform(&[2.0, 30.0]), vec![0.5, 1.0]);
//! ```

pub mod minmax;
