//! Template completion rules and single-user daily progress.
//!
//! Everything here is a pure function over an already-fetched row snapshot.
//! Missing rows never produce errors: they simply count as not done.

use crate::catalog::{Catalog, CompletionKind, TaskTemplate};
use crate::models::{DerivedProgress, TaskRecord, TaskStats};

/// `round(100 * completed / total)` with halves rounded up; 0 when `total` is 0.
pub fn percentage(completed: u32, total: u32) -> u32 {
    if total == 0 {
        return 0;
    }
    let completed = u64::from(completed);
    let total = u64::from(total);
    ((200 * completed + total) / (2 * total)) as u32
}

pub fn progress(completed: u32, total: u32) -> DerivedProgress {
    DerivedProgress {
        completed,
        total,
        percentage: percentage(completed, total),
    }
}

/// Sub-task rows of `template`: parented to it and naming one of its sub-tasks.
pub fn subtask_rows<'a>(
    template: &'a TaskTemplate,
    rows: &'a [TaskRecord],
) -> impl Iterator<Item = &'a TaskRecord> + 'a {
    rows.iter().filter(move |row| {
        row.parent_id.as_deref() == Some(template.id.as_str()) && template.has_subtask(&row.task_id)
    })
}

pub fn is_satisfied(template: &TaskTemplate, rows: &[TaskRecord]) -> bool {
    match template.kind {
        CompletionKind::Simple => rows
            .iter()
            .filter(|row| row.parent_id.is_none() && row.task_id == template.id)
            .any(|row| row.completed),
        CompletionKind::AllOf => {
            let mut subs = subtask_rows(template, rows).peekable();
            // No sub-rows means not provisioned, which must not read as done.
            subs.peek().is_some() && subs.all(|row| row.completed)
        }
        CompletionKind::AnyOf => subtask_rows(template, rows).any(|row| row.completed),
    }
}

/// Sub-task breakdown for composite templates; `None` for simple ones.
pub fn task_stats(template: &TaskTemplate, rows: &[TaskRecord]) -> Option<TaskStats> {
    if !template.kind.is_composite() {
        return None;
    }
    let (completed, total) = subtask_rows(template, rows).fold((0u32, 0u32), |(done, all), row| {
        (done + u32::from(row.completed), all + 1)
    });
    Some(TaskStats {
        completed,
        total,
        kind: template.kind,
    })
}

/// Template-level progress for one user and date.
pub fn daily_progress(catalog: &Catalog, rows: &[TaskRecord]) -> DerivedProgress {
    let completed = catalog
        .templates()
        .iter()
        .filter(|template| is_satisfied(template, rows))
        .count() as u32;
    progress(completed, catalog.len() as u32)
}

/// Row-level progress: every row counts once, regardless of the catalog.
pub fn row_progress(rows: &[TaskRecord]) -> DerivedProgress {
    let completed = rows.iter().filter(|row| row.completed).count() as u32;
    progress(completed, rows.len() as u32)
}
