//! In-memory source.

use super::{records_from_value, RemoteSource};
use crate::error::SourceError;
use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use trajectory_core::{ProjectId, RawRecord};

/// Holds records in memory.
///
/// Stories of a project that was never given any are an empty list.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    projects: Vec<RawRecord>,
    stories: HashMap<ProjectId, Vec<RawRecord>>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a project record
    pub fn with_project(mut self, record: RawRecord) -> Self {
        self.projects.push(record);
        self
    }

    /// Add story records to a project
    pub fn with_stories(
        mut self,
        project_id: ProjectId,
        records: impl IntoIterator<Item = RawRecord>,
    ) -> Self {
        self.stories.entry(project_id).or_default().extend(records);
        self
    }

    /// Build a source from JSON arrays of projects and per-project stories
    pub fn from_json(
        projects: Value,
        stories: impl IntoIterator<Item = (ProjectId, Value)>,
    ) -> Result<Self, SourceError> {
        let mut source = Self::new();
        source.projects = records_from_value(projects)?;
        for (project_id, value) in stories {
            source = source.with_stories(project_id, records_from_value(value)?);
        }
        Ok(source)
    }
}

#[async_trait]
impl RemoteSource for MemorySource {
    async fn list_projects(&self) -> Result<Vec<RawRecord>, SourceError> {
        Ok(self.projects.clone())
    }

    async fn list_stories(&self, project_id: ProjectId) -> Result<Vec<RawRecord>, SourceError> {
        Ok(self.stories.get(&project_id).cloned().unwrap_or_default())
    }
}
