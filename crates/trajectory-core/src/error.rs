//! Domain error types.

use crate::project::ProjectId;
use std::fmt;
use thiserror::Error;

/// Kind of entity a record was being converted into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Project,
    Story,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityKind::Project => write!(f, "project"),
            EntityKind::Story => write!(f, "story"),
        }
    }
}

/// Errors raised while building entities or computing estimates
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomainError {
    /// A required attribute was absent or null in the raw record
    #[error("Missing required field '{field}' on {entity}")]
    MissingRequiredField {
        entity: EntityKind,
        field: &'static str,
    },

    /// An attribute was present but could not be coerced to its type
    #[error("Invalid value for field '{field}' on {entity}: {reason}")]
    InvalidField {
        entity: EntityKind,
        field: &'static str,
        reason: String,
    },

    /// Completion percentage of a project with no points at all
    #[error("Division by zero: project has no story points")]
    DivisionByZero,

    /// Projection requested for a project whose estimated velocity is zero
    #[error("Estimated velocity of project {project_id} is zero")]
    VelocityEqualToZero { project_id: ProjectId },

    /// Historic velocity has never been above zero
    #[error("Project {project_id} has never recorded a non-zero velocity")]
    VelocityNeverStarted { project_id: ProjectId },

    /// Projected end date falls past the last representable date
    #[error("Estimated end date of project {project_id} is out of range")]
    EndDateOutOfRange { project_id: ProjectId },
}

pub type Result<T> = std::result::Result<T, DomainError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_field_display() {
        let err = DomainError::MissingRequiredField {
            entity: EntityKind::Story,
            field: "id",
        };
        let msg = err.to_string();
        assert!(msg.contains("'id'"));
        assert!(msg.contains("story"));
    }

    #[test]
    fn test_velocity_error_names_project() {
        let err = DomainError::VelocityEqualToZero {
            project_id: ProjectId::new(42),
        };
        assert!(err.to_string().contains("42"));
    }

    #[test]
    fn test_end_date_error_names_project() {
        let err = DomainError::EndDateOutOfRange {
            project_id: ProjectId::new(7),
        };
        assert!(err.to_string().contains("project 7"));
    }
}
