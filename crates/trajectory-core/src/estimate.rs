//! Estimation engine.
//!
//! [`ProjectMetrics`] borrows a project and its resolved stories and derives
//! progress and completion projections from them. Day and iteration counts
//! are computed with exact integer ceiling division so that a quotient that
//! lands on a whole number is never pushed up by float error.

use crate::error::{DomainError, Result};
use crate::project::{Project, ProjectId};
use crate::stories::Stories;
use chrono::{Days, Local, NaiveDate};
use serde::Serialize;

/// Calendar days in a week
pub const DAYS_PER_WEEK: f64 = 7.0;

/// Working days in a week
pub const WORKING_DAYS_PER_WEEK: f64 = 5.0;

// Integer forms of the constants above, used for exact ceilings.
const DAYS_PER_WEEK_INT: i128 = 7;
const WORKING_DAYS_PER_WEEK_INT: i128 = 5;

/// Borrowed metrics view over a project and its stories
#[derive(Debug, Clone, Copy)]
pub struct ProjectMetrics<'a> {
    project: &'a Project,
    stories: &'a Stories,
}

impl<'a> ProjectMetrics<'a> {
    pub fn new(project: &'a Project, stories: &'a Stories) -> Self {
        Self { project, stories }
    }

    // ========== Points ==========

    /// Sum of points over every story
    pub fn total_points(&self) -> i128 {
        self.stories.total_points()
    }

    /// Sum of points over stories that are not completed
    pub fn remaining_points(&self) -> i128 {
        self.stories.not_completed().total_points()
    }

    pub fn accepted_points(&self) -> i128 {
        self.total_points() - self.remaining_points()
    }

    /// Share of accepted points, in percent, rounded to one decimal.
    ///
    /// Fails with [`DomainError::DivisionByZero`] when the project has no
    /// points at all.
    pub fn percent_complete(&self) -> Result<f64> {
        let total = self.total_points();
        if total == 0 {
            return Err(DomainError::DivisionByZero);
        }

        let percent = self.accepted_points() as f64 / total as f64 * 100.0;
        Ok((percent * 10.0).round() / 10.0)
    }

    // ========== Velocity ==========

    pub fn estimated_velocity_per_day(&self) -> f64 {
        self.project.estimated_velocity_per_day()
    }

    pub fn estimated_velocity_per_working_day(&self) -> f64 {
        self.project.estimated_velocity_per_working_day()
    }

    pub fn has_started(&self) -> bool {
        self.project.has_started()
    }

    pub fn last_non_null_velocity(&self) -> Result<i64> {
        self.project.last_non_null_velocity()
    }

    // ========== Projections ==========

    /// Calendar days left at the estimated velocity
    pub fn remaining_days(&self) -> Result<u64> {
        self.project_remaining(DAYS_PER_WEEK_INT)
    }

    /// Working days left at the estimated velocity
    pub fn remaining_working_days(&self) -> Result<u64> {
        self.project_remaining(WORKING_DAYS_PER_WEEK_INT)
    }

    /// Iterations left at the estimated velocity
    pub fn remaining_iterations(&self) -> Result<u64> {
        self.project_remaining(1)
    }

    /// Day the remaining work is expected to be done, counted from `today`.
    ///
    /// Fails with [`DomainError::EndDateOutOfRange`] when that day is past
    /// the last representable date.
    pub fn estimated_end_date_from(&self, today: NaiveDate) -> Result<NaiveDate> {
        let days = self.remaining_days()?;
        today
            .checked_add_days(Days::new(days))
            .ok_or(DomainError::EndDateOutOfRange {
                project_id: self.project.id(),
            })
    }

    /// Same as [`estimated_end_date_from`](Self::estimated_end_date_from)
    /// starting from the local calendar date
    pub fn estimated_end_date(&self) -> Result<NaiveDate> {
        self.estimated_end_date_from(Local::now().date_naive())
    }

    /// Snapshot of every metric as of `today`
    pub fn summary_at(&self, today: NaiveDate) -> MetricsSummary {
        MetricsSummary {
            project_id: self.project.id(),
            keyword: self.project.keyword().map(str::to_string),
            name: self.project.name().map(str::to_string),
            story_count: self.stories.len(),
            total_points: self.total_points(),
            remaining_points: self.remaining_points(),
            accepted_points: self.accepted_points(),
            percent_complete: self.percent_complete().ok(),
            estimated_velocity: self.project.estimated_velocity(),
            estimated_velocity_per_day: self.estimated_velocity_per_day(),
            estimated_velocity_per_working_day: self.estimated_velocity_per_working_day(),
            remaining_days: self.remaining_days().ok(),
            remaining_working_days: self.remaining_working_days().ok(),
            remaining_iterations: self.remaining_iterations().ok(),
            estimated_end_date: self.estimated_end_date_from(today).ok(),
            has_started: self.has_started(),
            last_non_null_velocity: self.last_non_null_velocity().ok(),
        }
    }

    pub fn summary(&self) -> MetricsSummary {
        self.summary_at(Local::now().date_naive())
    }

    // ceil(remaining * units_per_iteration / velocity)
    fn project_remaining(&self, units_per_iteration: i128) -> Result<u64> {
        let velocity = self.project.estimated_velocity();
        if velocity == 0 {
            return Err(DomainError::VelocityEqualToZero {
                project_id: self.project.id(),
            });
        }

        let remaining = self.remaining_points().saturating_mul(units_per_iteration);
        Ok(ceil_div(remaining, i128::from(velocity)))
    }
}

/// Ceiling of `numerator / denominator`, clamped to `0..=u64::MAX`.
/// `denominator` must be non-zero.
fn ceil_div(numerator: i128, denominator: i128) -> u64 {
    let quotient = numerator / denominator;
    let remainder = numerator % denominator;
    let quotient = if remainder != 0 && ((remainder > 0) == (denominator > 0)) {
        quotient + 1
    } else {
        quotient
    };

    u64::try_from(quotient.max(0)).unwrap_or(u64::MAX)
}

/// Every metric of a project at a point in time.
///
/// A metric that cannot be computed (no points, zero velocity, no history)
/// is `None`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricsSummary {
    pub project_id: ProjectId,
    pub keyword: Option<String>,
    pub name: Option<String>,
    pub story_count: usize,
    pub total_points: i128,
    pub remaining_points: i128,
    pub accepted_points: i128,
    pub percent_complete: Option<f64>,
    pub estimated_velocity: i64,
    pub estimated_velocity_per_day: f64,
    pub estimated_velocity_per_working_day: f64,
    pub remaining_days: Option<u64>,
    pub remaining_working_days: Option<u64>,
    pub remaining_iterations: Option<u64>,
    pub estimated_end_date: Option<NaiveDate>,
    pub has_started: bool,
    pub last_non_null_velocity: Option<i64>,
}
