//! Session cleaning for lap-telemetry sequence preparation
//!
//! Raw sessions have ragged lap tables: drivers who retire stop producing laps,
//! measurements are missing on individual laps, and timing columns arrive as
//! textual durations. This crate turns a raw [`Session`](lapseq_session::Session)
//! into a cleaned copy that the dataset stage can consume directly.
//!
//! # Modules
//!
//! - [`validity`]: admission rules for raw sessions (full grid, classified results)
//! - [`completer`]: synthesizes missing laps so every driver spans `1..=max_lap`
//! - [`normalizer`]: drops bookkeeping columns, fills gaps per driver, converts
//!   durations to seconds
//! - [`cleaner`]: the fixed-order cleaning pass combining the two steps above
//!
//! # Examples
//!
//! ```
//! use lapseq_cleaning::{cleaner::clean_session, validity::ValidityRules};
//! use lapseq_session::Session;
//!
//! let sessions: Vec<Session> = vec![]; // Load from files
//! let rules = ValidityRules::default();
//!
//! let cleaned = sessions
//!     .iter()
//!     .filter(|session| rules.check(session).is_ok())
//!     .map(clean_session)
//!     .collect::<Vec<_>>();
//! assert!(cleaned.is_empty());
//! ```

pub mod cleaner;
pub mod completer;
pub mod normalizer;
pub mod validity;
