//! Enumerations and field types for board tasks.
//!
//! This module defines the categorical values a task carries: the status column
//! it sits in and its priority marker. Both serialise to the exact strings the
//! persisted board data uses.

use std::fmt;

use clap::ValueEnum;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Status column a task lives in.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, ValueEnum, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub enum Status {
    #[value(alias = "todo")]
    ToDo,
    InProgress,
    #[value(alias = "feedback")]
    AwaitingFeedback,
    Done,
}

impl Status {
    /// Columns in board order, left to right.
    pub const COLUMNS: [Status; 4] = [
        Status::ToDo,
        Status::InProgress,
        Status::AwaitingFeedback,
        Status::Done,
    ];

    /// Wire name used in persisted data.
    pub fn as_str(self) -> &'static str {
        match self {
            Status::ToDo => "toDo",
            Status::InProgress => "inProgress",
            Status::AwaitingFeedback => "awaitingFeedback",
            Status::Done => "done",
        }
    }

    /// Column heading shown to users.
    pub fn title(self) -> &'static str {
        match self {
            Status::ToDo => "To Do",
            Status::InProgress => "In Progress",
            Status::AwaitingFeedback => "Awaiting Feedback",
            Status::Done => "Done",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Task urgency.
///
/// Persisted as an opaque marker (the icon path of the original board), so the
/// serialised form is never a display string. Reading also accepts the plain
/// words `urgent`, `high`, `medium` and `low`.
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq, Hash)]
pub enum Priority {
    #[value(alias = "urgent")]
    High,
    Medium,
    Low,
}

pub const HIGH_MARKER: &str = "assets/img/priohigh.png";
pub const MEDIUM_MARKER: &str = "assets/img/priomedium.png";
pub const LOW_MARKER: &str = "assets/img/priolow.png";

impl Priority {
    /// Marker written to persisted data.
    pub fn marker(self) -> &'static str {
        match self {
            Priority::High => HIGH_MARKER,
            Priority::Medium => MEDIUM_MARKER,
            Priority::Low => LOW_MARKER,
        }
    }

    /// Resolve a marker or priority word.
    pub fn from_marker(s: &str) -> Option<Priority> {
        match s {
            HIGH_MARKER | "urgent" | "high" => Some(Priority::High),
            MEDIUM_MARKER | "medium" => Some(Priority::Medium),
            LOW_MARKER | "low" => Some(Priority::Low),
            _ => None,
        }
    }
}

/// Format a priority for display.
pub fn format_priority(p: Priority) -> &'static str {
    match p {
        Priority::High => "Urgent",
        Priority::Medium => "Medium",
        Priority::Low => "Low",
    }
}

impl Serialize for Priority {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.marker())
    }
}

impl<'de> Deserialize<'de> for Priority {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Priority::from_marker(&raw)
            .ok_or_else(|| serde::de::Error::custom(format!("unknown priority marker '{raw}'")))
    }
}
