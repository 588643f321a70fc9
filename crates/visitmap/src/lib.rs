//! `visitmap` - Keep track of school visits on a map
//!
//! This library provides the school record model, per-year visit statistics,
//! geographic helpers (haversine distance, proximity sorting, map bounds),
//! navigation links and a local `SQLite` store for the records.

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

pub mod cli;
pub mod config;
pub mod error;
pub mod geo;
pub mod logging;
pub mod navigation;
pub mod school;
pub mod stats;
pub mod storage;

pub use config::Config;
pub use error::{Error, Result};
pub use geo::{
    bounds_for_points, distance, format_distance, is_within_radius, sort_by_distance, Coordinate,
    Located, MapView, WithDistance,
};
pub use logging::init_logging;
pub use navigation::{AmapNavigator, NavigationProvider, TravelMode};
pub use school::School;
pub use stats::{yearly_stats, YearlyStats};
pub use storage::{Storage, StorageStats};
