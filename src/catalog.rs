use crate::errors::CatalogError;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum CompletionKind {
    Simple,
    /// Done when every sub-task is done.
    AllOf,
    /// Done when any one sub-task is done.
    AnyOf,
}

impl CompletionKind {
    pub fn is_composite(self) -> bool {
        !matches!(self, Self::Simple)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SubTask {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TaskTemplate {
    pub id: String,
    pub name: String,
    pub icon: String,
    pub kind: CompletionKind,
    #[serde(default)]
    pub subtasks: Vec<SubTask>,
}

impl TaskTemplate {
    pub fn simple(id: &str, name: &str, icon: &str) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            icon: icon.to_string(),
            kind: CompletionKind::Simple,
            subtasks: Vec::new(),
        }
    }

    pub fn composite(
        id: &str,
        name: &str,
        icon: &str,
        kind: CompletionKind,
        subtasks: Vec<SubTask>,
    ) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            icon: icon.to_string(),
            kind,
            subtasks,
        }
    }

    pub fn has_subtask(&self, task_id: &str) -> bool {
        self.subtasks.iter().any(|sub| sub.id == task_id)
    }

    /// The template's own id followed by its sub-task ids, in catalog order.
    pub fn flatten_ids(&self) -> Vec<&str> {
        std::iter::once(self.id.as_str())
            .chain(self.subtasks.iter().map(|sub| sub.id.as_str()))
            .collect()
    }
}

impl SubTask {
    pub fn new(id: &str, name: &str) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            link: None,
        }
    }

    pub fn with_link(mut self, link: &str) -> Self {
        self.link = Some(link.to_string());
        self
    }
}

/// Ordered, validated set of templates shared by every user.
#[derive(Debug, Clone)]
pub struct Catalog {
    templates: Vec<TaskTemplate>,
}

impl Catalog {
    pub fn new(templates: Vec<TaskTemplate>) -> Result<Self, CatalogError> {
        let mut seen = HashSet::new();
        for template in &templates {
            if !template.kind.is_composite() && !template.subtasks.is_empty() {
                return Err(CatalogError::SimpleWithSubtasks(template.id.clone()));
            }
            for id in template.flatten_ids() {
                if !seen.insert(id.to_string()) {
                    return Err(CatalogError::DuplicateId(id.to_string()));
                }
            }
        }
        Ok(Self { templates })
    }

    pub fn builtin() -> Self {
        Self {
            templates: builtin_templates(),
        }
    }

    pub fn from_path(path: &Path) -> Result<Self, CatalogError> {
        let bytes = std::fs::read(path)?;
        let templates: Vec<TaskTemplate> = serde_json::from_slice(&bytes)?;
        if templates.is_empty() {
            return Err(CatalogError::Empty);
        }
        Self::new(templates)
    }

    pub fn templates(&self) -> &[TaskTemplate] {
        &self.templates
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }

    pub fn find(&self, id: &str) -> Option<&TaskTemplate> {
        self.templates.iter().find(|template| template.id == id)
    }

    /// Template that owns the given sub-task id.
    pub fn find_owner(&self, subtask_id: &str) -> Option<&TaskTemplate> {
        self.templates
            .iter()
            .find(|template| template.has_subtask(subtask_id))
    }

    pub fn flattened_len(&self) -> usize {
        self.templates
            .iter()
            .map(|template| 1 + template.subtasks.len())
            .sum()
    }
}

fn builtin_templates() -> Vec<TaskTemplate> {
    vec![
        TaskTemplate::simple("hydrate", "Drink 2L of water", "💧"),
        TaskTemplate::simple("workout", "Workout", "🏋️"),
        TaskTemplate::simple("reading", "Read 20 pages", "📖"),
        TaskTemplate::composite(
            "standup",
            "Daily standup prep",
            "🗒️",
            CompletionKind::AllOf,
            vec![
                SubTask::new("standup_yesterday", "Write yesterday's summary"),
                SubTask::new("standup_blockers", "List blockers"),
                SubTask::new("standup_plan", "Plan today"),
            ],
        ),
        TaskTemplate::composite(
            "learning",
            "Learn something",
            "🎓",
            CompletionKind::AnyOf,
            vec![
                SubTask::new("learning_course", "Course lesson")
                    .with_link("https://www.coursera.org"),
                SubTask::new("learning_article", "Technical article"),
                SubTask::new("learning_podcast", "Podcast episode"),
            ],
        ),
        TaskTemplate::simple("journal", "Evening journal", "✍️"),
    ]
}
