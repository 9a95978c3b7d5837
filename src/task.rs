//! Task data structures.
//!
//! This module defines the `Task` record persisted on the board, the `Subtask`
//! entries it carries and the `TaskFields` patch used when editing a task in place.

use serde::{Deserialize, Serialize};

use crate::fields::*;

pub const DEFAULT_CATEGORY: &str = "category";
pub const DEFAULT_CATEGORY_COLOR: &str = "#000000";

/// A card on the board.
///
/// Field names on the wire follow the persisted board layout, hence the renames.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: u64,
    pub name: String,
    #[serde(rename = "subtask", default)]
    pub subtasks: Vec<Subtask>,
    #[serde(rename = "tasktext", default)]
    pub description: String,
    #[serde(default = "default_category")]
    pub category: String,
    #[serde(rename = "categoryBackgroundColor", default = "default_category_color")]
    pub category_color: String,
    #[serde(rename = "user", default)]
    pub assignees: Vec<String>,
    #[serde(default)]
    pub date: String,
    pub priority: Priority,
    pub status: Status,
}

fn default_category() -> String {
    DEFAULT_CATEGORY.to_string()
}

fn default_category_color() -> String {
    DEFAULT_CATEGORY_COLOR.to_string()
}

/// Completion summary of a task's subtasks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Progress {
    pub done: usize,
    pub total: usize,
}

impl Progress {
    /// Completed share in whole percent; 0 when there are no subtasks.
    pub fn percent(&self) -> u8 {
        if self.total == 0 {
            return 0;
        }
        ((self.done * 100) / self.total) as u8
    }
}

impl Task {
    /// Count completed subtasks.
    pub fn progress(&self) -> Progress {
        Progress {
            done: self.subtasks.iter().filter(|s| s.clicked).count(),
            total: self.subtasks.len(),
        }
    }

    /// Apply an edit patch. Fields left `None` keep their current value.
    pub fn apply(&mut self, fields: TaskFields) {
        let TaskFields {
            id,
            name,
            description,
            category,
            category_color,
            assignees,
            date,
            priority,
            subtasks,
            status,
        } = fields;
        if let Some(v) = id {
            self.id = v;
        }
        if let Some(v) = name {
            self.name = v;
        }
        if let Some(v) = description {
            self.description = v;
        }
        if let Some(v) = category {
            self.category = v;
        }
        if let Some(v) = category_color {
            self.category_color = v;
        }
        if let Some(v) = assignees {
            self.assignees = v;
        }
        if let Some(v) = date {
            self.date = v;
        }
        if let Some(v) = priority {
            self.priority = v;
        }
        if let Some(v) = subtasks {
            self.subtasks = v;
        }
        if let Some(v) = status {
            self.status = v;
        }
    }
}

/// A checklist entry on a task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subtask {
    pub name: String,
    #[serde(with = "flag", default)]
    pub clicked: bool,
}

impl Subtask {
    pub fn new(name: impl Into<String>) -> Self {
        Subtask {
            name: name.into(),
            clicked: false,
        }
    }
}

/// Partial update for `Task::apply`. Id and status only change when set here.
#[derive(Debug, Clone, Default)]
pub struct TaskFields {
    pub id: Option<u64>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub category_color: Option<String>,
    pub assignees: Option<Vec<String>>,
    pub date: Option<String>,
    pub priority: Option<Priority>,
    pub subtasks: Option<Vec<Subtask>>,
    pub status: Option<Status>,
}

/// `"true"`/`"false"` string encoding of the subtask completion flag.
mod flag {
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &bool, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(if *value { "true" } else { "false" })
    }

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Bool(bool),
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
        match Raw::deserialize(deserializer)? {
            Raw::Bool(b) => Ok(b),
            Raw::Text(s) => match s.as_str() {
                "true" => Ok(true),
                "false" => Ok(false),
                other => Err(de::Error::custom(format!("invalid completion flag '{other}'"))),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> Task {
        Task {
            id: 4,
            name: "Write spec".into(),
            subtasks: vec![Subtask::new("Outline"), Subtask { name: "Review".into(), clicked: true }],
            description: "First draft".into(),
            category: "Design".into(),
            category_color: "#ff7a00".into(),
            assignees: vec!["Anna Berg".into(), "Tom Lee".into()],
            date: "2024-05-01".into(),
            priority: Priority::Low,
            status: Status::ToDo,
        }
    }

    #[test]
    fn test_wire_layout() {
        let value = serde_json::to_value(sample()).unwrap();
        assert_eq!(
            value,
            json!({
                "id": 4,
                "name": "Write spec",
                "subtask": [
                    {"name": "Outline", "clicked": "false"},
                    {"name": "Review", "clicked": "true"}
                ],
                "tasktext": "First draft",
                "category": "Design",
                "categoryBackgroundColor": "#ff7a00",
                "user": ["Anna Berg", "Tom Lee"],
                "date": "2024-05-01",
                "priority": "assets/img/priolow.png",
                "status": "toDo"
            })
        );
    }

    #[test]
    fn test_clicked_accepts_native_bool() {
        let s: Subtask = serde_json::from_str(r#"{"name": "x", "clicked": true}"#).unwrap();
        assert!(s.clicked);
        assert!(serde_json::from_str::<Subtask>(r#"{"name": "x", "clicked": "yes"}"#).is_err());
    }

    #[test]
    fn test_progress() {
        let task = sample();
        let p = task.progress();
        assert_eq!((p.done, p.total), (1, 2));
        assert_eq!(p.percent(), 50);
        assert_eq!(Progress { done: 0, total: 0 }.percent(), 0);
    }

    #[test]
    fn test_apply_keeps_id_and_status_unless_set() {
        let mut task = sample();
        task.apply(TaskFields {
            name: Some("Renamed".into()),
            priority: Some(Priority::High),
            ..Default::default()
        });
        assert_eq!(task.id, 4);
        assert_eq!(task.status, Status::ToDo);
        assert_eq!(task.name, "Renamed");
        assert_eq!(task.priority, Priority::High);

        task.apply(TaskFields { status: Some(Status::Done), ..Default::default() });
        assert_eq!(task.status, Status::Done);
    }
}
