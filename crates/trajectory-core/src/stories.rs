//! Story collection.

use crate::error::Result;
use crate::iteration::Iteration;
use crate::record::RawRecord;
use crate::story::Story;
use serde::Serialize;
use std::ops::Deref;

/// Ordered stories in source order.
///
/// Dereferences to a slice, so iteration, `len`, indexing and folds work as
/// on any sequence. Every filter returns a new collection and leaves `self`
/// untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Stories(Vec<Story>);

impl Stories {
    pub fn new(stories: Vec<Story>) -> Self {
        Self(stories)
    }

    /// Build stories from raw records, failing on the first bad record
    pub fn from_records<'a, I>(records: I) -> Result<Self>
    where
        I: IntoIterator<Item = &'a RawRecord>,
    {
        records
            .into_iter()
            .map(Story::from_record)
            .collect::<Result<Vec<_>>>()
            .map(Self)
    }

    /// Stories currently being worked on
    pub fn started(&self) -> Stories {
        self.select(Story::is_started)
    }

    /// Stories not picked up yet
    pub fn unstarted(&self) -> Stories {
        self.select(Story::is_unstarted)
    }

    /// Stories outside the terminal states (finished, delivered, accepted)
    pub fn not_completed(&self) -> Stories {
        self.select(|story| !story.is_completed())
    }

    /// Stories in a terminal state
    pub fn completed(&self) -> Stories {
        self.select(Story::is_completed)
    }

    /// Stories assigned to `iteration`
    pub fn in_iteration<I>(&self, iteration: &I) -> Stories
    where
        I: Iteration + ?Sized,
    {
        self.select(|story| iteration.includes(story))
    }

    /// Sum of story points (0 when empty), widened so it cannot overflow
    pub fn total_points(&self) -> i128 {
        self.0.iter().map(|s| i128::from(s.points())).sum()
    }

    fn select<F>(&self, predicate: F) -> Stories
    where
        F: Fn(&Story) -> bool,
    {
        self.0.iter().filter(|s| predicate(s)).cloned().collect()
    }
}

impl Deref for Stories {
    type Target = [Story];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl From<Vec<Story>> for Stories {
    fn from(stories: Vec<Story>) -> Self {
        Self(stories)
    }
}

impl FromIterator<Story> for Stories {
    fn from_iter<T: IntoIterator<Item = Story>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl IntoIterator for Stories {
    type Item = Story;
    type IntoIter = std::vec::IntoIter<Story>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a Stories {
    type Item = &'a Story;
    type IntoIter = std::slice::Iter<'a, Story>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::iteration::IterationMembership;
    use crate::record::test_record as record;
    use crate::story::StoryId;
    use serde_json::json;

    fn stories() -> Stories {
        let records: Vec<_> = [
            json!({ "id": 1, "state": "unstarted", "points": 3 }),
            json!({ "id": 2, "state": "started", "points": 5 }),
            json!({ "id": 3, "state": "finished", "points": 1 }),
            json!({ "id": 4, "state": "delivered", "points": 2 }),
            json!({ "id": 5, "state": "accepted", "points": 8 }),
            json!({ "id": 6, "state": "rejected", "points": 2 }),
            json!({ "id": 7 }),
        ]
        .into_iter()
        .map(record)
        .collect();

        Stories::from_records(&records).unwrap()
    }

    fn ids(stories: &Stories) -> Vec<i64> {
        stories.iter().map(|s| s.id().get()).collect()
    }

    #[test]
    fn test_state_filters() {
        let all = stories();
        assert_eq!(ids(&all.started()), vec![2]);
        assert_eq!(ids(&all.unstarted()), vec![1]);
        assert_eq!(ids(&all.not_completed()), vec![1, 2, 6, 7]);
        assert_eq!(ids(&all.completed()), vec![3, 4, 5]);
    }

    #[test]
    fn test_filters_do_not_mutate_source() {
        let all = stories();
        let _ = all.started();
        let _ = all.not_completed();
        assert_eq!(all.len(), 7);
    }

    #[test]
    fn test_sequence_operations() {
        let all = stories();
        assert_eq!(all[0].id(), StoryId::new(1));
        assert_eq!(all.total_points(), 21);
        assert_eq!(all.iter().fold(0, |acc, s| acc + s.points()), 21);
        assert_eq!((&all).into_iter().count(), 7);
        assert!(Stories::default().is_empty());
        assert_eq!(Stories::default().total_points(), 0);
    }

    #[test]
    fn test_in_iteration() {
        let all = stories();
        let iteration = IterationMembership::new([StoryId::new(2), StoryId::new(5)]);
        assert_eq!(ids(&all.in_iteration(&iteration)), vec![2, 5]);
    }

    #[test]
    fn test_total_points_beyond_i64() {
        let records = vec![
            record(json!({ "id": 1, "points": i64::MAX })),
            record(json!({ "id": 2, "points": 1 })),
        ];
        let stories = Stories::from_records(&records).unwrap();
        assert_eq!(stories.total_points(), i128::from(i64::MAX) + 1);
    }

    #[test]
    fn test_from_records_aborts_on_bad_record() {
        let records = vec![
            record(json!({ "id": 1 })),
            record(json!({ "title": "no id" })),
        ];
        assert!(Stories::from_records(&records).is_err());
    }
}
