//! Trajectory Core
//!
//! Typed entities built from raw API records, the collections that query
//! them, and the estimation engine that projects when a project will finish.
//!
//! Nothing in this crate performs I/O. Relations that need a remote fetch go
//! through the [`Relations`] trait, implemented by the store crate.

mod error;
mod estimate;
mod iteration;
mod project;
mod projects;
mod record;
mod relations;
mod stories;
mod story;

pub use error::{DomainError, EntityKind, Result};
pub use estimate::{MetricsSummary, ProjectMetrics, DAYS_PER_WEEK, WORKING_DAYS_PER_WEEK};
pub use iteration::{Iteration, IterationMembership};
pub use project::{Project, ProjectId};
pub use projects::Projects;
pub use record::{normalize_key, RawRecord};
pub use relations::Relations;
pub use stories::Stories;
pub use story::{Story, StoryId, StoryState};
