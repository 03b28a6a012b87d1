//! Story entity.

use crate::error::{EntityKind, Result};
use crate::project::{Project, ProjectId};
use crate::record::{Attributes, RawRecord};
use crate::relations::Relations;
use chrono::{DateTime, Utc};
use serde::{Serialize, Serializer};
use std::fmt;
use std::sync::Arc;

/// Unique identifier for a Story
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct StoryId(i64);

impl StoryId {
    pub fn new(id: i64) -> Self {
        Self(id)
    }

    pub fn get(&self) -> i64 {
        self.0
    }
}

impl From<i64> for StoryId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

impl fmt::Display for StoryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Workflow state of a story
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum StoryState {
    Unstarted,
    Started,
    Finished,
    Delivered,
    Accepted,
    Rejected,
    /// Token outside the known vocabulary, kept verbatim
    Other(String),
}

impl StoryState {
    /// Parse a state token as sent by the API (case-insensitive)
    pub fn from_token(token: &str) -> Self {
        match token.trim().to_ascii_lowercase().as_str() {
            "unstarted" => StoryState::Unstarted,
            "started" => StoryState::Started,
            "finished" => StoryState::Finished,
            "delivered" => StoryState::Delivered,
            "accepted" => StoryState::Accepted,
            "rejected" => StoryState::Rejected,
            _ => StoryState::Other(token.trim().to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            StoryState::Unstarted => "unstarted",
            StoryState::Started => "started",
            StoryState::Finished => "finished",
            StoryState::Delivered => "delivered",
            StoryState::Accepted => "accepted",
            StoryState::Rejected => "rejected",
            StoryState::Other(token) => token,
        }
    }

    /// Terminal states: finished, delivered and accepted stories count as done
    pub fn is_completed(&self) -> bool {
        matches!(
            self,
            StoryState::Finished | StoryState::Delivered | StoryState::Accepted
        )
    }
}

impl fmt::Display for StoryState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for StoryState {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// A unit of work inside a project.
///
/// The owning project is referenced by id only and resolved on demand
/// through [`Relations`].
#[derive(Debug, Clone, Serialize)]
pub struct Story {
    id: StoryId,
    project_id: Option<ProjectId>,
    title: Option<String>,
    task_type: Option<String>,
    state: Option<StoryState>,
    state_events: Vec<String>,
    points: i64,
    position: Option<i64>,
    assignee_name: Option<String>,
    user_name: Option<String>,
    idea_subject: Option<String>,
    comments_count: Option<i64>,
    design_needed: bool,
    development_needed: bool,
    archived: bool,
    deleted: bool,
    created_at: Option<DateTime<Utc>>,
    updated_at: Option<DateTime<Utc>>,
}

impl Story {
    /// Build a story from a raw API record.
    pub fn from_record(raw: &RawRecord) -> Result<Self> {
        let attrs = Attributes::new(EntityKind::Story, raw);

        Ok(Self {
            id: StoryId::new(attrs.require_i64("id")?),
            project_id: attrs.i64("project_id")?.map(ProjectId::new),
            title: attrs.string("title")?,
            task_type: attrs.string("task_type")?,
            state: attrs.string("state")?.map(|s| StoryState::from_token(&s)),
            state_events: attrs.string_list("state_events")?,
            points: attrs.i64("points")?.unwrap_or(0),
            position: attrs.i64("position")?,
            assignee_name: attrs.string("assignee_name")?,
            user_name: attrs.string("user_name")?,
            idea_subject: attrs.string("idea_subject")?,
            comments_count: attrs.i64("comments_count")?,
            design_needed: attrs.bool("design_needed")?,
            development_needed: attrs.bool("development_needed")?,
            archived: attrs.bool("archived")?,
            deleted: attrs.bool("deleted")?,
            created_at: attrs.timestamp("created_at")?,
            updated_at: attrs.timestamp("updated_at")?,
        })
    }

    /// Attach the story to its owning project, replacing any id from the record
    pub fn for_project(mut self, project_id: ProjectId) -> Self {
        self.project_id = Some(project_id);
        self
    }

    // ========== Getters ==========

    pub fn id(&self) -> StoryId {
        self.id
    }

    pub fn project_id(&self) -> Option<ProjectId> {
        self.project_id
    }

    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    pub fn task_type(&self) -> Option<&str> {
        self.task_type.as_deref()
    }

    pub fn state(&self) -> Option<&StoryState> {
        self.state.as_ref()
    }

    pub fn state_events(&self) -> &[String] {
        &self.state_events
    }

    /// Estimated points, 0 when the record carried none
    pub fn points(&self) -> i64 {
        self.points
    }

    pub fn position(&self) -> Option<i64> {
        self.position
    }

    pub fn assignee_name(&self) -> Option<&str> {
        self.assignee_name.as_deref()
    }

    pub fn user_name(&self) -> Option<&str> {
        self.user_name.as_deref()
    }

    pub fn idea_subject(&self) -> Option<&str> {
        self.idea_subject.as_deref()
    }

    pub fn comments_count(&self) -> Option<i64> {
        self.comments_count
    }

    pub fn design_needed(&self) -> bool {
        self.design_needed
    }

    pub fn development_needed(&self) -> bool {
        self.development_needed
    }

    pub fn is_archived(&self) -> bool {
        self.archived
    }

    pub fn is_deleted(&self) -> bool {
        self.deleted
    }

    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        self.created_at
    }

    pub fn updated_at(&self) -> Option<DateTime<Utc>> {
        self.updated_at
    }

    // ========== State Checks ==========

    pub fn is_started(&self) -> bool {
        self.state == Some(StoryState::Started)
    }

    pub fn is_unstarted(&self) -> bool {
        self.state == Some(StoryState::Unstarted)
    }

    /// A story with no state is not completed
    pub fn is_completed(&self) -> bool {
        self.state.as_ref().is_some_and(StoryState::is_completed)
    }

    // ========== Relations ==========

    /// Resolve the owning project.
    ///
    /// Returns `Ok(None)` when the story carries no project id or the
    /// project is not part of the account.
    pub async fn project<R>(&self, relations: &R) -> std::result::Result<Option<Arc<Project>>, R::Error>
    where
        R: Relations + ?Sized,
    {
        match self.project_id {
            Some(id) => relations.find_project_by_id(id).await,
            None => Ok(None),
        }
    }
}

impl PartialEq for Story {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Story {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DomainError;
    use crate::record::test_record as record;
    use serde_json::json;

    #[test]
    fn test_story_from_record() {
        let story = Story::from_record(&record(json!({
            "id": 101,
            "project_id": 7,
            "title": "Sign up form",
            "task_type": "Feature",
            "state": "started",
            "state_events": ["finish", "reject"],
            "points": 3,
            "position": 2,
            "assignee_name": "Ada",
            "user_name": "Grace",
            "idea_subject": "Onboarding",
            "comments_count": 4,
            "design_needed": true,
            "development_needed": "true",
            "archived": false,
            "deleted": 0,
            "created_at": "2012-05-01T10:00:00Z",
            "updated_at": "2012-05-02T10:00:00Z",
        })))
        .unwrap();

        assert_eq!(story.id(), StoryId::new(101));
        assert_eq!(story.project_id(), Some(ProjectId::new(7)));
        assert_eq!(story.title(), Some("Sign up form"));
        assert_eq!(story.task_type(), Some("Feature"));
        assert_eq!(story.state(), Some(&StoryState::Started));
        assert_eq!(story.state_events(), &["finish", "reject"]);
        assert_eq!(story.points(), 3);
        assert_eq!(story.position(), Some(2));
        assert_eq!(story.assignee_name(), Some("Ada"));
        assert_eq!(story.user_name(), Some("Grace"));
        assert_eq!(story.idea_subject(), Some("Onboarding"));
        assert_eq!(story.comments_count(), Some(4));
        assert!(story.design_needed());
        assert!(story.development_needed());
        assert!(!story.is_archived());
        assert!(!story.is_deleted());
        assert!(story.created_at().unwrap() < story.updated_at().unwrap());
    }

    #[test]
    fn test_missing_id_fails() {
        let err = Story::from_record(&record(json!({ "title": "orphan" }))).unwrap_err();
        assert_eq!(
            err,
            DomainError::MissingRequiredField {
                entity: EntityKind::Story,
                field: "id"
            }
        );
    }

    #[test]
    fn test_for_project_overrides_record() {
        let story = Story::from_record(&record(json!({ "id": 1, "project_id": 99 })))
            .unwrap()
            .for_project(ProjectId::new(7));
        assert_eq!(story.project_id(), Some(ProjectId::new(7)));
    }

    #[test]
    fn test_state_tokens() {
        assert_eq!(StoryState::from_token("Accepted"), StoryState::Accepted);
        assert_eq!(
            StoryState::from_token("icebox"),
            StoryState::Other("icebox".to_string())
        );

        let completed: Vec<_> = ["unstarted", "started", "finished", "delivered", "accepted", "rejected"]
            .iter()
            .map(|t| StoryState::from_token(t).is_completed())
            .collect();
        assert_eq!(completed, vec![false, false, true, true, true, false]);
    }

    #[test]
    fn test_stateless_story_predicates() {
        let story = Story::from_record(&record(json!({ "id": 1 }))).unwrap();
        assert!(!story.is_started());
        assert!(!story.is_unstarted());
        assert!(!story.is_completed());
        assert_eq!(story.points(), 0);
    }

    #[test]
    fn test_state_serializes_as_token() {
        let story = Story::from_record(&record(json!({ "id": 1, "state": "delivered" }))).unwrap();
        let value = serde_json::to_value(&story).unwrap();
        assert_eq!(value["state"], "delivered");
        assert_eq!(value["id"], 1);
    }
}
