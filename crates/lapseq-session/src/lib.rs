//! Session data model for lap-telemetry sequence preparation
//!
//! This crate defines the tables the rest of the workspace consumes:
//!
//! - [`Session`]: one event, owning an optional [`LapTable`] and [`ResultTable`]
//! - [`LapRecord`]: one lap by one driver, keyed by (driver, lap number)
//! - [`ResultRecord`]: one driver's final classification
//! - [`TimeCell`]: a duration cell, numeric seconds or unconverted text
//!
//! Tables are plain values. Cleaning never mutates a loaded session in place; it
//! clones the tables and returns a new session.
//!
//! # Examples
//!
//! ```
//! use lapseq_session::{LapRecord, LapTable, ResultRecord, ResultTable, Session};
//!
//! let laps = LapTable::new(vec![
//!     LapRecord::new("VER", "1", 1),
//!     LapRecord::new("VER", "1", 2),
//!     LapRecord::new("HAM", "44", 1),
//! ]);
//! let results = ResultTable::new(vec![
//!     ResultRecord::new("1", "VER", Some(1.0)),
//!     ResultRecord::new("44", "HAM", Some(2.0)),
//! ]);
//! let session = Session::new("demo", Some(laps), Some(results));
//!
//! let laps = session.laps.as_ref().unwrap();
//! assert_eq!(laps.max_lap_number(), Some(2));
//! assert_eq!(laps.drivers().len(), 2);
//! ```

pub use self::{
    duration::TimeCell,
    lap::{DriverGroups, LapRecord, LapTable, SpeedColumn, TimeColumn},
    result::{ResultRecord, ResultTable},
    session::{Session, SessionInfo},
};

/// Number of drivers in a full grid.
pub const GRID_SIZE: usize = 20;

pub mod duration;
pub mod lap;
pub mod result;
pub mod session;
