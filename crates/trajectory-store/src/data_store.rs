//! Single-flight caching data store.
//!
//! The store starts empty. The project list is fetched on first use and kept
//! for the life of the store; each project's stories are fetched the first
//! time they are asked for. Concurrent first callers of the same key wait on
//! one shared fetch. Failed fetches leave the slot empty.

use crate::error::{Result, StoreError};
use crate::source::RemoteSource;
use crate::stats::FetchStats;
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::OnceCell;
use trajectory_core::{DomainError, Project, ProjectId, Projects, Relations, Stories, Story};

type StorySlot = Arc<OnceCell<Arc<Stories>>>;

/// Caching front of a [`RemoteSource`]
pub struct DataStore {
    /// Where records come from
    source: Arc<dyn RemoteSource>,

    /// Every project of the account, once fetched
    projects: OnceCell<Arc<Projects>>,

    /// One slot per project id; the lock only guards slot lookup
    stories: Mutex<HashMap<ProjectId, StorySlot>>,

    stats: FetchStats,
}

impl DataStore {
    /// Create an empty store over `source`
    pub fn new(source: Arc<dyn RemoteSource>) -> Self {
        Self {
            source,
            projects: OnceCell::new(),
            stories: Mutex::new(HashMap::new()),
            stats: FetchStats::new(),
        }
    }

    /// All projects, fetched on first call
    pub async fn fetch_projects(&self) -> Result<Arc<Projects>> {
        let mut fetched = false;
        let projects = self
            .projects
            .get_or_try_init(|| {
                fetched = true;
                self.load_projects()
            })
            .await?
            .clone();

        if !fetched {
            self.stats.record_cache_hit();
        }
        Ok(projects)
    }

    /// Stories of `project`, fetched on first call for its id
    pub async fn fetch_stories(&self, project: &Project) -> Result<Arc<Stories>> {
        self.fetch_stories_by_id(project.id()).await
    }

    /// Stories of the project with the given id, fetched on first call
    pub async fn fetch_stories_by_id(&self, project_id: ProjectId) -> Result<Arc<Stories>> {
        let slot = self.story_slot(project_id);

        let mut fetched = false;
        let stories = slot
            .get_or_try_init(|| {
                fetched = true;
                self.load_stories(project_id)
            })
            .await?
            .clone();

        if !fetched {
            self.stats.record_cache_hit();
        }
        Ok(stories)
    }

    /// Project with the given id, `None` if the account has none
    pub async fn find_project_by_id(&self, id: ProjectId) -> Result<Option<Arc<Project>>> {
        Ok(self.fetch_projects().await?.find_by_id(id).cloned())
    }

    /// Project with the given keyword, `None` if the account has none
    pub async fn find_project_by_keyword(&self, keyword: &str) -> Result<Option<Arc<Project>>> {
        Ok(self.fetch_projects().await?.find_by_keyword(keyword).cloned())
    }

    /// Project a story belongs to
    pub async fn project_for_story(&self, story: &Story) -> Result<Option<Arc<Project>>> {
        story.project(self).await
    }

    pub fn stats(&self) -> &FetchStats {
        &self.stats
    }

    /// True once the project list has been fetched
    pub fn projects_loaded(&self) -> bool {
        self.projects.initialized()
    }

    fn story_slot(&self, project_id: ProjectId) -> StorySlot {
        self.stories.lock().entry(project_id).or_default().clone()
    }

    async fn load_projects(&self) -> Result<Arc<Projects>> {
        tracing::debug!("Fetching projects");
        self.stats.record_cache_miss();
        self.stats.record_remote_call();

        let records = self.source.list_projects().await.map_err(|e| {
            tracing::warn!(error = %e, "Failed to fetch projects");
            StoreError::from(e)
        })?;

        let projects = Projects::from_records(&records).map_err(|e| {
            tracing::warn!(error = %e, "Rejected project records");
            StoreError::from(e)
        })?;

        tracing::info!(count = projects.len(), "Fetched projects");
        Ok(Arc::new(projects))
    }

    async fn load_stories(&self, project_id: ProjectId) -> Result<Arc<Stories>> {
        tracing::debug!(project_id = %project_id, "Fetching stories");
        self.stats.record_cache_miss();
        self.stats.record_remote_call();

        let records = self.source.list_stories(project_id).await.map_err(|e| {
            tracing::warn!(project_id = %project_id, error = %e, "Failed to fetch stories");
            StoreError::from(e)
        })?;

        // Stories carry the id of the project they were fetched for
        let stories = records
            .iter()
            .map(|raw| Story::from_record(raw).map(|s| s.for_project(project_id)))
            .collect::<std::result::Result<Stories, DomainError>>()
            .map_err(|e| {
                tracing::warn!(project_id = %project_id, error = %e, "Rejected story records");
                StoreError::from(e)
            })?;

        tracing::info!(project_id = %project_id, count = stories.len(), "Fetched stories");
        Ok(Arc::new(stories))
    }
}

#[async_trait]
impl Relations for DataStore {
    type Error = StoreError;

    async fn fetch_stories(&self, project: &Project) -> Result<Arc<Stories>> {
        DataStore::fetch_stories(self, project).await
    }

    async fn find_project_by_id(&self, id: ProjectId) -> Result<Option<Arc<Project>>> {
        DataStore::find_project_by_id(self, id).await
    }
}

impl std::fmt::Debug for DataStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DataStore")
            .field("projects_loaded", &self.projects_loaded())
            .field("story_slots", &self.stories.lock().len())
            .field("stats", &self.stats)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SourceError;
    use crate::source::MemorySource;
    use serde_json::json;
    use trajectory_core::RawRecord;

    fn record(value: serde_json::Value) -> RawRecord {
        match value {
            serde_json::Value::Object(map) => map,
            _ => unreachable!(),
        }
    }

    fn store() -> DataStore {
        let source = MemorySource::new()
            .with_project(record(json!({ "id": 1, "keyword": "website" })))
            .with_project(record(json!({ "id": 2, "keyword": "legacy", "archived": true })))
            .with_stories(
                ProjectId::new(1),
                [
                    record(json!({ "id": 10, "project_id": 99, "points": 3 })),
                    record(json!({ "id": 11, "points": 5 })),
                ],
            );
        DataStore::new(Arc::new(source))
    }

    /// Source whose every call fails
    struct DownSource;

    #[async_trait]
    impl RemoteSource for DownSource {
        async fn list_projects(&self) -> std::result::Result<Vec<RawRecord>, SourceError> {
            Err(SourceError::Unavailable("offline".to_string()))
        }

        async fn list_stories(
            &self,
            _project_id: ProjectId,
        ) -> std::result::Result<Vec<RawRecord>, SourceError> {
            Err(SourceError::Unavailable("offline".to_string()))
        }
    }

    #[tokio::test]
    async fn test_store_starts_empty() {
        let store = store();
        assert!(!store.projects_loaded());
        assert_eq!(store.stats().remote_calls(), 0);
    }

    #[tokio::test]
    async fn test_fetch_projects_memoized() {
        let store = store();
        let first = store.fetch_projects().await.unwrap();
        let second = store.fetch_projects().await.unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(first.len(), 2);
        assert_eq!(store.stats().remote_calls(), 1);
        assert_eq!(store.stats().cache_hits(), 1);
        assert_eq!(store.stats().cache_misses(), 1);
    }

    #[tokio::test]
    async fn test_projects_do_not_fetch_stories() {
        let store = store();
        store.fetch_projects().await.unwrap();
        assert_eq!(store.stats().remote_calls(), 1);
    }

    #[tokio::test]
    async fn test_stories_tagged_with_project() {
        let store = store();
        let stories = store.fetch_stories_by_id(ProjectId::new(1)).await.unwrap();

        assert_eq!(stories.len(), 2);
        assert!(stories
            .iter()
            .all(|s| s.project_id() == Some(ProjectId::new(1))));
    }

    #[tokio::test]
    async fn test_lookups() {
        let store = store();
        assert_eq!(
            store
                .find_project_by_keyword("legacy")
                .await
                .unwrap()
                .map(|p| p.id()),
            Some(ProjectId::new(2))
        );
        assert!(store.find_project_by_id(ProjectId::new(404)).await.unwrap().is_none());
        assert!(store.find_project_by_keyword("nope").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_failure_is_not_cached() {
        let store = DataStore::new(Arc::new(DownSource));

        let err = store.fetch_projects().await.unwrap_err();
        assert!(matches!(err, StoreError::Source(SourceError::Unavailable(_))));
        assert!(store.fetch_projects().await.is_err());
        assert!(!store.projects_loaded());
        assert_eq!(store.stats().remote_calls(), 2);
    }

    #[tokio::test]
    async fn test_bad_story_record_aborts_batch() {
        let source = MemorySource::new()
            .with_project(record(json!({ "id": 1 })))
            .with_stories(
                ProjectId::new(1),
                [record(json!({ "id": 10 })), record(json!({ "title": "no id" }))],
            );
        let store = DataStore::new(Arc::new(source));

        let err = store.fetch_stories_by_id(ProjectId::new(1)).await.unwrap_err();
        assert!(matches!(
            err,
            StoreError::Domain(DomainError::MissingRequiredField { field: "id", .. })
        ));
    }
}
