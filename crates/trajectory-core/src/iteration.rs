//! Iteration membership.

use crate::story::{Story, StoryId};
use std::collections::HashSet;

/// A time-boxed work cycle that stories may be assigned to.
///
/// Only membership is needed by the story filters; how an iteration knows
/// its stories is up to the implementation.
pub trait Iteration {
    /// True if `story` is assigned to this iteration
    fn includes(&self, story: &Story) -> bool;
}

/// Iteration described by the ids of its stories
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IterationMembership {
    story_ids: HashSet<StoryId>,
}

impl IterationMembership {
    pub fn new(story_ids: impl IntoIterator<Item = StoryId>) -> Self {
        Self {
            story_ids: story_ids.into_iter().collect(),
        }
    }
}

impl Iteration for IterationMembership {
    fn includes(&self, story: &Story) -> bool {
        self.story_ids.contains(&story.id())
    }
}
