//! Project collection.

use crate::error::Result;
use crate::project::{Project, ProjectId};
use crate::record::RawRecord;
use std::ops::Deref;
use std::sync::Arc;

/// Ordered projects in source order.
///
/// Members are shared `Arc<Project>` values, so filtered views keep pointing
/// at the same projects and share their lazily fetched relations.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Projects(Vec<Arc<Project>>);

impl Projects {
    pub fn new(projects: Vec<Arc<Project>>) -> Self {
        Self(projects)
    }

    /// Build projects from raw records, failing on the first bad record
    pub fn from_records<'a, I>(records: I) -> Result<Self>
    where
        I: IntoIterator<Item = &'a RawRecord>,
    {
        records
            .into_iter()
            .map(|raw| Project::from_record(raw).map(Arc::new))
            .collect::<Result<Vec<_>>>()
            .map(Self)
    }

    /// Project with the given id, if any
    pub fn find_by_id(&self, id: ProjectId) -> Option<&Arc<Project>> {
        self.0.iter().find(|p| p.id() == id)
    }

    /// Project with the given keyword, if any
    pub fn find_by_keyword(&self, keyword: &str) -> Option<&Arc<Project>> {
        self.0.iter().find(|p| p.keyword() == Some(keyword))
    }

    /// Archived projects
    pub fn archived(&self) -> Projects {
        self.select(|p| p.is_archived())
    }

    /// Projects that are not archived
    pub fn active(&self) -> Projects {
        self.select(|p| !p.is_archived())
    }

    fn select<F>(&self, predicate: F) -> Projects
    where
        F: Fn(&Project) -> bool,
    {
        self.0.iter().filter(|p| predicate(p)).cloned().collect()
    }
}

impl Deref for Projects {
    type Target = [Arc<Project>];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl From<Vec<Arc<Project>>> for Projects {
    fn from(projects: Vec<Arc<Project>>) -> Self {
        Self(projects)
    }
}

impl From<Vec<Project>> for Projects {
    fn from(projects: Vec<Project>) -> Self {
        projects.into_iter().map(Arc::new).collect()
    }
}

impl FromIterator<Arc<Project>> for Projects {
    fn from_iter<T: IntoIterator<Item = Arc<Project>>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl IntoIterator for Projects {
    type Item = Arc<Project>;
    type IntoIter = std::vec::IntoIter<Arc<Project>>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a Projects {
    type Item = &'a Arc<Project>;
    type IntoIter = std::slice::Iter<'a, Arc<Project>>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
