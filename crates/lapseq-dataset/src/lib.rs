//! Fixed-shape tensors from cleaned lap telemetry
//!
//! This crate turns cleaned sessions into model-ready tensors:
//!
//! - `X`: `(sessions, drivers, max_laps, 9)` scaled lap features
//! - `Y`: `(sessions, drivers)` zero-based finishing positions
//!
//! # Architecture
//!
//! ```text
//! cleaned sessions
//!     ↓ DatasetPreparer::split        seeded shuffle, train/test cut
//!     ↓ DatasetPreparer::fit_scaler   train sessions only
//!     ↓ SequenceAssembler::assemble   per partition, frozen scaler
//!         ↓ FeatureExtractor::extract per driver
//! PreparedDataset { train, test, scaler, test_sessions }
//! ```
//!
//! # Modules
//!
//! - [`feature`]: the nine lap features and the per-driver `(max_laps, 9)` matrix
//! - [`assembler`]: per-session stacking, the full-grid gate and reason-coded
//!   rejections
//! - [`dataset`]: configuration, split, scaler fit and the resulting partitions

pub mod assembler;
pub mod dataset;
pub mod feature;

#[cfg(test)]
mod fixtures;
