use crate::catalog::Catalog;
use crate::errors::AppError;
use crate::models::{AppData, TaskRecord, UserProfile};
use chrono::NaiveDate;
use std::collections::BTreeMap;
use std::path::Path;
use tokio::fs;
use tracing::{debug, error, info};

/// Row store consumed by the service layer.
pub trait TaskStore {
    fn fetch_rows(&self, user_id: &str, date: NaiveDate) -> Vec<TaskRecord>;

    /// Rows for `start..=end`, grouped by date. Dates without rows are absent.
    fn fetch_rows_between(
        &self,
        user_id: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> BTreeMap<NaiveDate, Vec<TaskRecord>>;

    fn fetch_all_rows_for_date(&self, date: NaiveDate) -> Vec<TaskRecord>;

    /// Creates the catalog's rows for the user and date when none exist yet.
    fn provision_default_rows(&mut self, user_id: &str, date: NaiveDate, catalog: &Catalog) -> Vec<TaskRecord>;

    fn set_completed(&mut self, row_id: u64, completed: bool) -> Option<TaskRecord>;
}

impl TaskStore for AppData {
    fn fetch_rows(&self, user_id: &str, date: NaiveDate) -> Vec<TaskRecord> {
        self.rows
            .iter()
            .filter(|row| row.user_id == user_id && row.date == date)
            .cloned()
            .collect()
    }

    fn fetch_rows_between(
        &self,
        user_id: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> BTreeMap<NaiveDate, Vec<TaskRecord>> {
        let mut grouped: BTreeMap<NaiveDate, Vec<TaskRecord>> = BTreeMap::new();
        for row in self
            .rows
            .iter()
            .filter(|row| row.user_id == user_id && row.date >= start && row.date <= end)
        {
            grouped.entry(row.date).or_default().push(row.clone());
        }
        grouped
    }

    fn fetch_all_rows_for_date(&self, date: NaiveDate) -> Vec<TaskRecord> {
        self.rows.iter().filter(|row| row.date == date).cloned().collect()
    }

    fn provision_default_rows(&mut self, user_id: &str, date: NaiveDate, catalog: &Catalog) -> Vec<TaskRecord> {
        let existing = self.fetch_rows(user_id, date);
        if !existing.is_empty() {
            return existing;
        }

        let mut created = Vec::with_capacity(catalog.flattened_len());
        for template in catalog.templates() {
            created.push(self.new_row(user_id, &template.id, None, date));
            for sub in &template.subtasks {
                created.push(self.new_row(user_id, &sub.id, Some(template.id.as_str()), date));
            }
        }
        self.rows.extend(created.iter().cloned());

        info!(user_id, %date, rows = created.len(), "provisioned default tasks");
        created
    }

    fn set_completed(&mut self, row_id: u64, completed: bool) -> Option<TaskRecord> {
        let row = self.rows.iter_mut().find(|row| row.id == row_id)?;
        row.completed = completed;
        debug!(row_id, completed, "updated task row");
        Some(row.clone())
    }
}

impl AppData {
    fn new_row(&mut self, user_id: &str, task_id: &str, parent_id: Option<&str>, date: NaiveDate) -> TaskRecord {
        self.next_row_id = self.next_row_id.saturating_add(1);
        TaskRecord {
            id: self.next_row_id,
            user_id: user_id.to_string(),
            task_id: task_id.to_string(),
            parent_id: parent_id.map(str::to_string),
            date,
            completed: false,
        }
    }

    pub fn row(&self, row_id: u64) -> Option<&TaskRecord> {
        self.rows.iter().find(|row| row.id == row_id)
    }

    pub fn find_user_by_email(&self, email: &str) -> Option<&UserProfile> {
        self.users
            .values()
            .find(|user| user.email.eq_ignore_ascii_case(email))
    }

    /// Returns the existing profile when the email is already registered.
    pub fn register_user(&mut self, email: &str, name: Option<String>) -> UserProfile {
        if let Some(existing) = self.find_user_by_email(email) {
            return existing.clone();
        }
        self.next_user_seq = self.next_user_seq.saturating_add(1);
        let profile = UserProfile {
            id: format!("user-{}", self.next_user_seq),
            email: email.to_string(),
            name,
        };
        self.users.insert(profile.id.clone(), profile.clone());
        info!(user_id = %profile.id, "registered user");
        profile
    }
}

pub async fn load_data(path: &Path) -> AppData {
    match fs::read(path).await {
        Ok(bytes) => match serde_json::from_slice(&bytes) {
            Ok(data) => data,
            Err(err) => {
                error!("failed to parse data file: {err}");
                AppData::default()
            }
        },
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => AppData::default(),
        Err(err) => {
            error!("failed to read data file: {err}");
            AppData::default()
        }
    }
}

pub async fn persist_data(path: &Path, data: &AppData) -> Result<(), AppError> {
    let payload = serde_json::to_vec_pretty(data).map_err(AppError::internal)?;
    fs::write(path, payload).await?;
    Ok(())
}
