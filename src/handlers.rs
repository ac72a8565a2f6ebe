use crate::catalog::{Catalog, TaskTemplate};
use crate::errors::AppError;
use crate::models::{
    AppData, IndexQuery, RegisterRequest, TaskRecord, TaskView, TeamSummary, TodayResponse,
    ToggleRequest, UserProfile, WeeklyResponse,
};
use crate::names::resolve_names;
use crate::progress::{daily_progress, is_satisfied, task_stats};
use crate::state::AppState;
use crate::stats::{build_weekly_at, WINDOW_DAYS};
use crate::storage::{persist_data, TaskStore};
use crate::team::team_summary;
use crate::ui::render_index;
use axum::{
    extract::{Path, Query, State},
    response::{Html, Redirect},
    Form, Json,
};
use chrono::{Duration, Local, NaiveDate};
use tracing::{info, warn};

pub async fn index(
    State(state): State<AppState>,
    Query(query): Query<IndexQuery>,
) -> Result<Html<String>, AppError> {
    let date = today();
    let mut data = state.data.lock().await;

    let selected = match query.user.as_deref().and_then(|id| data.users.get(id).cloned()) {
        Some(user) => {
            let rows = ensure_rows(&state, &mut data, &user.id, date).await?;
            let view = build_today(&state.catalog, user, date, &rows);
            let weekly = weekly_for(&state, &data, &view.user.id, date);
            Some((view, weekly))
        }
        None => None,
    };
    let team = team_for(&state, &data, date);
    let users: Vec<UserProfile> = data.users.values().cloned().collect();

    Ok(Html(render_index(date, &users, selected.as_ref(), &team)))
}

pub async fn get_catalog(State(state): State<AppState>) -> Json<Vec<TaskTemplate>> {
    Json(state.catalog.templates().to_vec())
}

pub async fn list_users(State(state): State<AppState>) -> Json<Vec<UserProfile>> {
    let data = state.data.lock().await;
    Json(data.users.values().cloned().collect())
}

pub async fn register_user(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> Result<Json<UserProfile>, AppError> {
    let profile = apply_register(&state, payload).await?;
    Ok(Json(profile))
}

pub async fn register_form(
    State(state): State<AppState>,
    Form(payload): Form<RegisterRequest>,
) -> Result<Redirect, AppError> {
    let profile = apply_register(&state, payload).await?;
    Ok(Redirect::to(&format!("/?user={}", profile.id)))
}

pub async fn get_today(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<TodayResponse>, AppError> {
    let date = today();
    let mut data = state.data.lock().await;
    let user = find_user(&data, &user_id)?;
    let rows = ensure_rows(&state, &mut data, &user.id, date).await?;
    Ok(Json(build_today(&state.catalog, user, date, &rows)))
}

pub async fn set_row(
    State(state): State<AppState>,
    Path((user_id, row_id)): Path<(String, u64)>,
    Json(payload): Json<ToggleRequest>,
) -> Result<Json<TodayResponse>, AppError> {
    let response = apply_toggle(&state, &user_id, row_id, Some(payload.completed)).await?;
    Ok(Json(response))
}

pub async fn toggle_form(
    State(state): State<AppState>,
    Path((user_id, row_id)): Path<(String, u64)>,
) -> Result<Redirect, AppError> {
    apply_toggle(&state, &user_id, row_id, None).await?;
    Ok(Redirect::to(&format!("/?user={user_id}")))
}

pub async fn get_weekly(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<WeeklyResponse>, AppError> {
    let data = state.data.lock().await;
    let user = find_user(&data, &user_id)?;
    Ok(Json(weekly_for(&state, &data, &user.id, today())))
}

pub async fn get_team(State(state): State<AppState>) -> Json<TeamSummary> {
    let data = state.data.lock().await;
    Json(team_for(&state, &data, today()))
}

async fn apply_register(state: &AppState, payload: RegisterRequest) -> Result<UserProfile, AppError> {
    let email = payload.email.trim();
    if !email.contains('@') {
        return Err(AppError::bad_request("email must contain '@'"));
    }
    let name = payload
        .name
        .map(|name| name.trim().to_string())
        .filter(|name| !name.is_empty());

    let mut data = state.data.lock().await;
    let known = data.users.len();
    let profile = data.register_user(email, name);
    if data.users.len() != known {
        persist_data(&state.data_path, &data).await?;
    }
    Ok(profile)
}

/// Sets (or with `None`, flips) a row and keeps the owning composite row in step.
async fn apply_toggle(
    state: &AppState,
    user_id: &str,
    row_id: u64,
    completed: Option<bool>,
) -> Result<TodayResponse, AppError> {
    let mut data = state.data.lock().await;
    let user = find_user(&data, user_id)?;

    let row = data
        .row(row_id)
        .filter(|row| row.user_id == user.id)
        .cloned()
        .ok_or_else(|| AppError::not_found(format!("row {row_id} not found")))?;

    if row.parent_id.is_none()
        && state
            .catalog
            .find(&row.task_id)
            .is_some_and(|template| template.kind.is_composite())
    {
        return Err(AppError::bad_request(
            "composite tasks are completed through their sub-tasks",
        ));
    }

    let completed = completed.unwrap_or(!row.completed);
    data.set_completed(row_id, completed);

    if let Some(template) = row
        .parent_id
        .as_ref()
        .and_then(|_| state.catalog.find_owner(&row.task_id))
    {
        sync_parent_row(&mut data, template, &user.id, row.date);
    }

    persist_data(&state.data_path, &data).await?;
    info!(user_id = %user.id, row_id, completed, "toggled task");

    let rows = data.fetch_rows(&user.id, row.date);
    Ok(build_today(&state.catalog, user, row.date, &rows))
}

fn sync_parent_row(data: &mut AppData, template: &TaskTemplate, user_id: &str, date: NaiveDate) {
    let rows = data.fetch_rows(user_id, date);
    let satisfied = is_satisfied(template, &rows);
    let parent = rows
        .iter()
        .find(|row| row.parent_id.is_none() && row.task_id == template.id);
    match parent {
        Some(parent) if parent.completed != satisfied => {
            data.set_completed(parent.id, satisfied);
        }
        Some(_) => {}
        None => warn!(user_id, template = %template.id, %date, "composite task has no parent row"),
    }
}

async fn ensure_rows(
    state: &AppState,
    data: &mut AppData,
    user_id: &str,
    date: NaiveDate,
) -> Result<Vec<TaskRecord>, AppError> {
    let rows = data.fetch_rows(user_id, date);
    if !rows.is_empty() {
        return Ok(rows);
    }
    let rows = data.provision_default_rows(user_id, date, &state.catalog);
    persist_data(&state.data_path, data).await?;
    Ok(rows)
}

fn find_user(data: &AppData, user_id: &str) -> Result<UserProfile, AppError> {
    data.users
        .get(user_id)
        .cloned()
        .ok_or_else(|| AppError::not_found(format!("user {user_id} not found")))
}

fn build_today(catalog: &Catalog, user: UserProfile, date: NaiveDate, rows: &[TaskRecord]) -> TodayResponse {
    let tasks = catalog
        .templates()
        .iter()
        .map(|template| TaskView {
            template: template.clone(),
            satisfied: is_satisfied(template, rows),
            stats: task_stats(template, rows),
            rows: rows
                .iter()
                .filter(|row| {
                    row.task_id == template.id || row.parent_id.as_deref() == Some(template.id.as_str())
                })
                .cloned()
                .collect(),
        })
        .collect();

    TodayResponse {
        date,
        user,
        progress: daily_progress(catalog, rows),
        tasks,
    }
}

fn weekly_for(state: &AppState, data: &AppData, user_id: &str, date: NaiveDate) -> WeeklyResponse {
    let start = date - Duration::days(WINDOW_DAYS - 1);
    let rows: Vec<TaskRecord> = data
        .fetch_rows_between(user_id, start, date)
        .into_values()
        .flatten()
        .collect();
    build_weekly_at(date, user_id, &rows, &state.settings)
}

fn team_for(state: &AppState, data: &AppData, date: NaiveDate) -> TeamSummary {
    let rows = data.fetch_all_rows_for_date(date);
    let names = resolve_names(&data.users, rows.iter().map(|row| row.user_id.as_str()));
    team_summary(&state.catalog, date, &rows, &names, &state.settings)
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}
