//! Relation resolution port.
//!
//! Entities never own each other: a project reaches its stories, and a story
//! reaches its project, through whatever implements [`Relations`]. The store
//! crate provides the caching implementation.

use crate::project::{Project, ProjectId};
use crate::stories::Stories;
use async_trait::async_trait;
use std::sync::Arc;

/// Resolves the relations between entities
#[async_trait]
pub trait Relations: Send + Sync {
    /// Error raised when a relation cannot be fetched
    type Error: Send;

    /// Stories belonging to `project`
    async fn fetch_stories(&self, project: &Project) -> Result<Arc<Stories>, Self::Error>;

    /// Project with the given id, `None` if the account has no such project
    async fn find_project_by_id(&self, id: ProjectId) -> Result<Option<Arc<Project>>, Self::Error>;
}
