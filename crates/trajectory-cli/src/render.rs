//! Plain-text report formatting.

use std::fmt::{Display, Write};
use trajectory_core::{MetricsSummary, Projects, Stories};

const NONE: &str = "-";

fn or_none<T: Display>(value: Option<T>) -> String {
    value.map_or_else(|| NONE.to_string(), |v| v.to_string())
}

/// One line per project: id, keyword, name and an archived marker
pub fn projects(projects: &Projects) -> String {
    let mut out = String::new();
    for project in projects {
        let _ = writeln!(
            out,
            "{:>8}  {:<16}  {}{}",
            project.id().get(),
            project.keyword().unwrap_or(NONE),
            project.name().unwrap_or(NONE),
            if project.is_archived() { "  [archived]" } else { "" },
        );
    }
    if out.is_empty() {
        out.push_str("No projects.\n");
    }
    out
}

/// One line per story: id, state, points and title
pub fn stories(stories: &Stories) -> String {
    let mut out = String::new();
    for story in stories {
        let _ = writeln!(
            out,
            "{:>8}  {:<10}  {:>3}  {}",
            story.id().get(),
            or_none(story.state()),
            story.points(),
            story.title().unwrap_or(NONE),
        );
    }
    let _ = writeln!(
        out,
        "{} stories, {} points",
        stories.len(),
        stories.total_points()
    );
    out
}

pub fn summary(summary: &MetricsSummary) -> String {
    let title = summary
        .name
        .as_deref()
        .or(summary.keyword.as_deref())
        .unwrap_or(NONE);

    let rows = [
        ("Project", format!("{} (#{})", title, summary.project_id)),
        ("Stories", summary.story_count.to_string()),
        ("Total points", summary.total_points.to_string()),
        ("Accepted points", summary.accepted_points.to_string()),
        ("Remaining points", summary.remaining_points.to_string()),
        (
            "Complete",
            or_none(summary.percent_complete.map(|p| format!("{:.1}%", p))),
        ),
        ("Estimated velocity", summary.estimated_velocity.to_string()),
        (
            "Velocity per day",
            format!(
                "{:.2} ({:.2} per working day)",
                summary.estimated_velocity_per_day, summary.estimated_velocity_per_working_day
            ),
        ),
        ("Last velocity", or_none(summary.last_non_null_velocity)),
        ("Remaining days", or_none(summary.remaining_days)),
        ("Remaining working days", or_none(summary.remaining_working_days)),
        ("Remaining iterations", or_none(summary.remaining_iterations)),
        ("Estimated end date", or_none(summary.estimated_end_date)),
        ("Started", if summary.has_started { "yes" } else { "no" }.to_string()),
    ];

    let mut out = String::new();
    for (label, value) in rows {
        let _ = writeln!(out, "{:<24}{}", format!("{}:", label), value);
    }
    out
}
