//! The task store.
//!
//! `TaskStore` owns the in-memory task list and mirrors it to a `Storage`
//! backend after every mutation. Writes always replace the whole list; the
//! backend has no notion of partial updates.
//!
//! Failures never tear down the caller. A load that cannot be parsed leaves the
//! list exactly as it was, and a save that fails keeps the in-memory change.
//! Both are logged and handed back as a `BoardError`.

use std::collections::HashSet;
use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, error, warn};

use crate::error::{BoardError, Result};
use crate::fields::Status;
use crate::storage::Storage;
use crate::task::{Task, TaskFields};

pub const DEFAULT_KEY: &str = "tasks";

/// Largest id a task may carry. Keeping `u64::MAX` free means `next_id` never overflows.
pub const MAX_TASK_ID: u64 = u64::MAX - 1;

pub struct TaskStore {
    tasks: Vec<Task>,
    storage: Arc<dyn Storage>,
    key: String,
}

impl TaskStore {
    /// Empty store persisting under `key`. Call `load_all` to pick up saved data.
    pub fn new(storage: Arc<dyn Storage>, key: impl Into<String>) -> Self {
        TaskStore {
            tasks: Vec::new(),
            storage,
            key: key.into(),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Task> {
        self.tasks.get(index)
    }

    /// Index of the task with `id`.
    pub fn position_of(&self, id: u64) -> Option<usize> {
        self.tasks.iter().position(|t| t.id == id)
    }

    /// Replace the in-memory list with the persisted one.
    ///
    /// Returns the number of tasks now held. A missing value is a first run and
    /// leaves the list alone. Anything unreadable is a `Load` error and also
    /// leaves the list alone.
    pub async fn load_all(&mut self) -> Result<usize> {
        let raw = match self.storage.get_item(&self.key).await {
            Ok(Some(raw)) => raw,
            Ok(None) => {
                debug!(key = %self.key, "nothing stored yet");
                return Ok(self.tasks.len());
            }
            Err(e) => {
                error!(key = %self.key, "loading error: {e}");
                return Err(e);
            }
        };
        match parse_tasks(&raw) {
            Ok(tasks) => {
                debug!(key = %self.key, count = tasks.len(), "loaded tasks");
                self.tasks = tasks;
                Ok(self.tasks.len())
            }
            Err(e) => {
                error!(key = %self.key, "loading error: {e}");
                Err(e)
            }
        }
    }

    /// Next free id: one past the largest id held, or 0 for an empty store.
    ///
    /// Every held id is at most `MAX_TASK_ID`, so the result fits in a `u64`.
    /// Once the largest id is `MAX_TASK_ID` the returned id is rejected by
    /// `create`.
    pub fn next_id(&self) -> u64 {
        self.tasks.iter().map(|t| t.id).max().map_or(0, |max| max + 1)
    }

    /// Append `task` and persist.
    pub async fn create(&mut self, task: Task) -> Result<()> {
        check_id(task.id)?;
        if self.position_of(task.id).is_some() {
            return Err(BoardError::Validation(format!("task id {} already in use", task.id)));
        }
        self.tasks.push(task);
        self.save().await
    }

    /// Patch the task at `index` in place and persist.
    pub async fn update(&mut self, index: usize, fields: TaskFields) -> Result<()> {
        if let Some(id) = fields.id {
            check_id(id)?;
            if self.tasks.iter().enumerate().any(|(i, t)| i != index && t.id == id) {
                return Err(BoardError::Validation(format!("task id {id} already in use")));
            }
        }
        let task = self.task_mut(index)?;
        task.apply(fields);
        self.save().await
    }

    /// Delete the task at `index` and persist. Returns the removed task.
    pub async fn remove(&mut self, index: usize) -> Result<Task> {
        self.task_mut(index)?;
        let removed = self.tasks.remove(index);
        self.save().await?;
        Ok(removed)
    }

    /// Move the task at `index` to another column and persist.
    pub async fn move_to(&mut self, index: usize, status: Status) -> Result<()> {
        self.task_mut(index)?.status = status;
        self.save().await
    }

    /// Flip the completion flag of subtask `position` on task `id` and persist.
    /// Returns the new flag.
    pub async fn toggle_subtask(&mut self, id: u64, position: usize) -> Result<bool> {
        let Some(index) = self.position_of(id) else {
            warn!(id, "toggle target not found");
            return Err(BoardError::NotFound(format!("task {id}")));
        };
        let subtasks = &mut self.tasks[index].subtasks;
        let len = subtasks.len();
        let Some(subtask) = subtasks.get_mut(position) else {
            return Err(BoardError::Index { index: position, len });
        };
        subtask.clicked = !subtask.clicked;
        let clicked = subtask.clicked;
        self.save().await?;
        Ok(clicked)
    }

    /// Tasks in `status`, in store order.
    pub fn filter_by_status(&self, status: Status) -> impl Iterator<Item = &Task> + '_ {
        self.tasks.iter().filter(move |t| t.status == status)
    }

    /// Tasks whose name or description contains `query`, ignoring case.
    pub fn search<'a>(&'a self, query: &str) -> impl Iterator<Item = &'a Task> + 'a {
        let needle = query.trim().to_lowercase();
        self.tasks.iter().filter(move |t| {
            needle.is_empty()
                || t.name.to_lowercase().contains(&needle)
                || t.description.to_lowercase().contains(&needle)
        })
    }

    fn task_mut(&mut self, index: usize) -> Result<&mut Task> {
        let len = self.tasks.len();
        match self.tasks.get_mut(index) {
            Some(task) => Ok(task),
            None => {
                warn!(index, len, "task not found");
                Err(BoardError::NotFound(format!("task at position {index}")))
            }
        }
    }

    async fn save(&self) -> Result<()> {
        let data = serde_json::to_string(&self.tasks)
            .map_err(|e| BoardError::Storage(e.to_string()))?;
        match self.storage.set_item(&self.key, &data).await {
            Ok(()) => {
                debug!(key = %self.key, count = self.tasks.len(), "saved tasks");
                Ok(())
            }
            Err(e) => {
                warn!(key = %self.key, "failed to save tasks: {e}");
                Err(e)
            }
        }
    }
}

/// Decode a persisted payload: either a list of tasks or a map whose values are
/// tasks. Ids must be unique.
pub fn parse_tasks(raw: &str) -> Result<Vec<Task>> {
    let value: Value = serde_json::from_str(raw).map_err(|e| BoardError::Load(e.to_string()))?;
    let items = match value {
        Value::Array(items) => items,
        Value::Object(map) => map.into_iter().map(|(_, v)| v).collect(),
        other => {
            return Err(BoardError::Load(format!(
                "expected a list or map of tasks, found {}",
                json_kind(&other)
            )))
        }
    };
    let tasks = items
        .into_iter()
        .enumerate()
        .map(|(i, v)| serde_json::from_value::<Task>(v).map_err(|e| BoardError::Load(format!("task #{i}: {e}"))))
        .collect::<Result<Vec<_>>>()?;

    let mut seen = HashSet::new();
    for t in &tasks {
        if t.id > MAX_TASK_ID {
            return Err(BoardError::Load(format!("task id {} out of range", t.id)));
        }
        if !seen.insert(t.id) {
            return Err(BoardError::Load(format!("duplicate task id {}", t.id)));
        }
    }
    Ok(tasks)
}

fn check_id(id: u64) -> Result<()> {
    if id > MAX_TASK_ID {
        return Err(BoardError::Validation(format!("task id {id} out of range")));
    }
    Ok(())
}

fn json_kind(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a list",
        Value::Object(_) => "a map",
    }
}
