use crate::catalog::{CompletionKind, TaskTemplate};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One completion fact for a user, task (or sub-task) and date.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TaskRecord {
    pub id: u64,
    pub user_id: String,
    pub task_id: String,
    #[serde(default)]
    pub parent_id: Option<String>,
    pub date: NaiveDate,
    pub completed: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UserProfile {
    pub id: String,
    pub email: String,
    #[serde(default)]
    pub name: Option<String>,
}

/// Everything persisted to the data file.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppData {
    #[serde(default)]
    pub users: BTreeMap<String, UserProfile>,
    #[serde(default)]
    pub rows: Vec<TaskRecord>,
    #[serde(default)]
    pub next_row_id: u64,
    #[serde(default)]
    pub next_user_seq: u64,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct DerivedProgress {
    pub completed: u32,
    pub total: u32,
    pub percentage: u32,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct TaskStats {
    pub completed: u32,
    pub total: u32,
    pub kind: CompletionKind,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct WeeklyPoint {
    pub date: NaiveDate,
    pub label: String,
    pub percentage: u32,
    pub completed: u32,
    pub total: u32,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct Streak {
    pub current: u32,
    pub best: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TeamProgress {
    pub user_id: String,
    pub display_name: String,
    pub records: Vec<TaskRecord>,
    pub completed: u32,
    pub total: u32,
    pub percentage: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CategoryProgress {
    pub template_id: String,
    pub name: String,
    pub icon: String,
    pub satisfied_users: u32,
    pub user_count: u32,
    pub stats: Option<TaskStats>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TeamSummary {
    pub date: NaiveDate,
    pub members: Vec<TeamProgress>,
    pub average: u32,
    pub top_performers: Vec<String>,
    pub categories: Vec<CategoryProgress>,
}

/// A template together with today's rows and derived state, for rendering.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskView {
    pub template: TaskTemplate,
    pub satisfied: bool,
    pub stats: Option<TaskStats>,
    pub rows: Vec<TaskRecord>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TodayResponse {
    pub date: NaiveDate,
    pub user: UserProfile,
    pub progress: DerivedProgress,
    pub tasks: Vec<TaskView>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeeklyResponse {
    pub user_id: String,
    pub points: Vec<WeeklyPoint>,
    pub streak: Streak,
}

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ToggleRequest {
    pub completed: bool,
}

#[derive(Debug, Deserialize, Default)]
pub struct IndexQuery {
    #[serde(default)]
    pub user: Option<String>,
}
