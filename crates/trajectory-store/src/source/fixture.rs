//! Directory-backed source.

use super::{records_from_value, RemoteSource};
use crate::error::SourceError;
use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use trajectory_core::{ProjectId, RawRecord};

/// Reads records from a directory laid out like the remote API:
///
/// ```text
/// <root>/projects.json
/// <root>/projects/<project_id>/stories.json
/// ```
///
/// A project without a `stories.json` has no stories.
#[derive(Debug, Clone)]
pub struct FixtureSource {
    root: PathBuf,
}

impl FixtureSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of the projects file
    pub fn projects_path(&self) -> PathBuf {
        self.root.join("projects.json")
    }

    /// Path of a project's stories file
    pub fn stories_path(&self, project_id: ProjectId) -> PathBuf {
        self.root
            .join("projects")
            .join(project_id.to_string())
            .join("stories.json")
    }

    async fn read_records(path: &Path) -> Result<Vec<RawRecord>, SourceError> {
        let content = tokio::fs::read_to_string(path).await?;
        let value = serde_json::from_str(&content)
            .map_err(|e| SourceError::Json(format!("{}: {}", path.display(), e)))?;
        records_from_value(value)
    }
}

#[async_trait]
impl RemoteSource for FixtureSource {
    async fn list_projects(&self) -> Result<Vec<RawRecord>, SourceError> {
        let path = self.projects_path();
        match Self::read_records(&path).await {
            Err(SourceError::Io(e)) if e.kind() == ErrorKind::NotFound => {
                Err(SourceError::NotFound(path))
            }
            other => other,
        }
    }

    async fn list_stories(&self, project_id: ProjectId) -> Result<Vec<RawRecord>, SourceError> {
        match Self::read_records(&self.stories_path(project_id)).await {
            Err(SourceError::Io(e)) if e.kind() == ErrorKind::NotFound => Ok(Vec::new()),
            other => other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_missing_projects_file() {
        let dir = tempdir().unwrap();
        let source = FixtureSource::new(dir.path());

        let err = source.list_projects().await.unwrap_err();
        assert!(matches!(err, SourceError::NotFound(p) if p.ends_with("projects.json")));
    }

    #[tokio::test]
    async fn test_missing_stories_file_is_empty() {
        let dir = tempdir().unwrap();
        let source = FixtureSource::new(dir.path());

        let stories = source.list_stories(ProjectId::new(3)).await.unwrap();
        assert!(stories.is_empty());
    }

    #[tokio::test]
    async fn test_reads_layout() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("projects.json"), r#"[{"id": 3, "keyword": "web"}]"#)
            .unwrap();
        let stories_dir = dir.path().join("projects").join("3");
        std::fs::create_dir_all(&stories_dir).unwrap();
        std::fs::write(
            stories_dir.join("stories.json"),
            r#"[{"id": 30, "points": 2}, {"id": 31}]"#,
        )
        .unwrap();

        let source = FixtureSource::new(dir.path());
        let projects = source.list_projects().await.unwrap();
        assert_eq!(projects.len(), 1);
        assert_eq!(projects[0]["keyword"], "web");

        let stories = source.list_stories(ProjectId::new(3)).await.unwrap();
        assert_eq!(stories.len(), 2);
    }

    #[tokio::test]
    async fn test_malformed_json() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("projects.json"), "[{").unwrap();

        let err = FixtureSource::new(dir.path()).list_projects().await.unwrap_err();
        assert!(matches!(err, SourceError::Json(msg) if msg.contains("projects.json")));
    }
}
