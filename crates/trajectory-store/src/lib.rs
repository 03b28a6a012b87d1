//! Trajectory Store
//!
//! Fetches raw records from a [`RemoteSource`], turns them into domain
//! entities and memoizes them per store. [`DataStore`] implements
//! [`trajectory_core::Relations`], so entities resolve their relations
//! through it.

mod config;
mod data_store;
mod error;
mod source;
mod stats;

pub use config::{TrajectoryConfig, SOURCE_DIR_ENV};
pub use data_store::DataStore;
pub use error::{Result, SourceError, StoreError};
pub use source::{FixtureSource, MemorySource, RemoteSource};
pub use stats::{FetchStats, FetchStatsSnapshot};
