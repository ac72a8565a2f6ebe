//! Cross-user aggregates for the team dashboard.

use crate::catalog::Catalog;
use crate::config::ProgressSettings;
use crate::models::{CategoryProgress, TaskRecord, TeamProgress, TeamSummary};
use crate::progress::{is_satisfied, row_progress, task_stats};
use chrono::NaiveDate;
use std::collections::BTreeMap;

fn partition_by_user(rows: &[TaskRecord]) -> BTreeMap<&str, Vec<TaskRecord>> {
    let mut by_user: BTreeMap<&str, Vec<TaskRecord>> = BTreeMap::new();
    for row in rows {
        by_user.entry(row.user_id.as_str()).or_default().push(row.clone());
    }
    by_user
}

/// Row-level progress per user, ordered by user id.
pub fn team_progress(rows: &[TaskRecord], names: &BTreeMap<String, String>) -> Vec<TeamProgress> {
    partition_by_user(rows)
        .into_iter()
        .map(|(user_id, records)| {
            let progress = row_progress(&records);
            TeamProgress {
                user_id: user_id.to_string(),
                display_name: names
                    .get(user_id)
                    .cloned()
                    .unwrap_or_else(|| user_id.to_string()),
                records,
                completed: progress.completed,
                total: progress.total,
                percentage: progress.percentage,
            }
        })
        .collect()
}

pub fn team_average(members: &[TeamProgress]) -> u32 {
    if members.is_empty() {
        return 0;
    }
    let sum: u64 = members.iter().map(|member| u64::from(member.percentage)).sum();
    let count = members.len() as u64;
    ((2 * sum + count) / (2 * count)) as u32
}

pub fn top_performers(members: &[TeamProgress], threshold: u32) -> Vec<String> {
    members
        .iter()
        .filter(|member| member.percentage >= threshold)
        .map(|member| member.user_id.clone())
        .collect()
}

/// Per-template view across every user's rows.
pub fn category_breakdown(catalog: &Catalog, rows: &[TaskRecord]) -> Vec<CategoryProgress> {
    let by_user = partition_by_user(rows);
    catalog
        .templates()
        .iter()
        .map(|template| CategoryProgress {
            template_id: template.id.clone(),
            name: template.name.clone(),
            icon: template.icon.clone(),
            satisfied_users: by_user
                .values()
                .filter(|records| is_satisfied(template, records))
                .count() as u32,
            user_count: by_user.len() as u32,
            stats: task_stats(template, rows),
        })
        .collect()
}

pub fn team_summary(
    catalog: &Catalog,
    date: NaiveDate,
    rows: &[TaskRecord],
    names: &BTreeMap<String, String>,
    settings: &ProgressSettings,
) -> TeamSummary {
    let day_rows: Vec<TaskRecord> = rows.iter().filter(|row| row.date == date).cloned().collect();
    let members = team_progress(&day_rows, names);
    TeamSummary {
        date,
        average: team_average(&members),
        top_performers: top_performers(&members, settings.top_performer_threshold),
        categories: category_breakdown(catalog, &day_rows),
        members,
    }
}
