//! Project entity.

use crate::error::{DomainError, EntityKind, Result};
use crate::estimate::{ProjectMetrics, DAYS_PER_WEEK, WORKING_DAYS_PER_WEEK};
use crate::iteration::Iteration;
use crate::record::{Attributes, RawRecord};
use crate::relations::Relations;
use crate::stories::Stories;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use tokio::sync::OnceCell;

/// Unique identifier for a Project
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct ProjectId(i64);

impl ProjectId {
    pub fn new(id: i64) -> Self {
        Self(id)
    }

    pub fn get(&self) -> i64 {
        self.0
    }
}

impl From<i64> for ProjectId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

impl fmt::Display for ProjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A tracked project.
///
/// Attributes are fixed once built from a record. The stories relation is
/// fetched on first access through a [`Relations`] implementation and kept
/// for the life of the value, so every clone of the owning `Arc<Project>`
/// shares one fetch.
#[derive(Debug, Serialize)]
pub struct Project {
    id: ProjectId,
    name: Option<String>,
    keyword: Option<String>,
    archived: bool,
    created_at: Option<DateTime<Utc>>,
    updated_at: Option<DateTime<Utc>>,
    estimated_velocity: i64,
    historic_velocity: Vec<i64>,
    completed_iterations_count: Option<i64>,
    completed_stories_count: Option<i64>,

    #[serde(skip)]
    stories: OnceCell<Arc<Stories>>,
}

impl Project {
    /// Build a project from a raw API record.
    ///
    /// Fails with [`DomainError::MissingRequiredField`] when `id` is absent
    /// or null, and with [`DomainError::InvalidField`] when a present value
    /// cannot be coerced.
    pub fn from_record(raw: &RawRecord) -> Result<Self> {
        let attrs = Attributes::new(EntityKind::Project, raw);

        Ok(Self {
            id: ProjectId::new(attrs.require_i64("id")?),
            name: attrs.string("name")?,
            keyword: attrs.string("keyword")?,
            archived: attrs.bool("archived")?,
            created_at: attrs.timestamp("created_at")?,
            updated_at: attrs.timestamp("updated_at")?,
            estimated_velocity: attrs.i64("estimated_velocity")?.unwrap_or(0),
            historic_velocity: attrs.i64_list("historic_velocity")?,
            completed_iterations_count: attrs.i64("completed_iterations_count")?,
            completed_stories_count: attrs.i64("completed_stories_count")?,
            stories: OnceCell::new(),
        })
    }

    // ========== Getters ==========

    pub fn id(&self) -> ProjectId {
        self.id
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn keyword(&self) -> Option<&str> {
        self.keyword.as_deref()
    }

    pub fn is_archived(&self) -> bool {
        self.archived
    }

    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        self.created_at
    }

    pub fn updated_at(&self) -> Option<DateTime<Utc>> {
        self.updated_at
    }

    /// Points per iteration the team is expected to deliver
    pub fn estimated_velocity(&self) -> i64 {
        self.estimated_velocity
    }

    /// Velocities of past iterations, oldest first
    pub fn historic_velocity(&self) -> &[i64] {
        &self.historic_velocity
    }

    pub fn completed_iterations_count(&self) -> Option<i64> {
        self.completed_iterations_count
    }

    pub fn completed_stories_count(&self) -> Option<i64> {
        self.completed_stories_count
    }

    // ========== Velocity ==========

    /// Estimated velocity spread over a full week
    pub fn estimated_velocity_per_day(&self) -> f64 {
        self.estimated_velocity as f64 / DAYS_PER_WEEK
    }

    /// Estimated velocity spread over the working days of a week
    pub fn estimated_velocity_per_working_day(&self) -> f64 {
        self.estimated_velocity as f64 / WORKING_DAYS_PER_WEEK
    }

    /// True once any past iteration recorded a non-zero velocity
    pub fn has_started(&self) -> bool {
        self.historic_velocity.iter().any(|&v| v != 0)
    }

    /// Most recent non-zero historic velocity.
    pub fn last_non_null_velocity(&self) -> Result<i64> {
        self.historic_velocity
            .iter()
            .rev()
            .copied()
            .find(|&v| v != 0)
            .ok_or(DomainError::VelocityNeverStarted {
                project_id: self.id,
            })
    }

    // ========== Relations ==========

    /// Stories of this project, fetched once and then memoized.
    ///
    /// Concurrent first calls share a single fetch. A failed fetch leaves
    /// the relation empty so the next call tries again.
    pub async fn stories<R>(&self, relations: &R) -> std::result::Result<Arc<Stories>, R::Error>
    where
        R: Relations + ?Sized,
    {
        self.loaded_stories(relations).await.cloned()
    }

    /// Stories of this project assigned to `iteration`
    pub async fn stories_in_iteration<R, I>(
        &self,
        relations: &R,
        iteration: &I,
    ) -> std::result::Result<Stories, R::Error>
    where
        R: Relations + ?Sized,
        I: Iteration + ?Sized,
    {
        Ok(self.loaded_stories(relations).await?.in_iteration(iteration))
    }

    /// Estimation view over this project and its stories
    pub async fn metrics<R>(&self, relations: &R) -> std::result::Result<ProjectMetrics<'_>, R::Error>
    where
        R: Relations + ?Sized,
    {
        let stories = self.loaded_stories(relations).await?;
        Ok(ProjectMetrics::new(self, stories))
    }

    /// Stories already fetched for this project, if any
    pub fn cached_stories(&self) -> Option<&Arc<Stories>> {
        self.stories.get()
    }

    async fn loaded_stories<R>(&self, relations: &R) -> std::result::Result<&Arc<Stories>, R::Error>
    where
        R: Relations + ?Sized,
    {
        self.stories
            .get_or_try_init(|| relations.fetch_stories(self))
            .await
    }
}

impl PartialEq for Project {
    fn eq(&self, other: &Self) -> bool {
        // Entity equality: same ID = same project
        self.id == other.id
    }
}

impl Eq for Project {}
