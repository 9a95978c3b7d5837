//! Assignee lookups.
//!
//! Tasks store assignees by full name only. Showing them needs a color and
//! initials, which come from the contact directory when the person is known
//! and from a fixed palette otherwise.

use std::collections::HashMap;

use serde::Deserialize;
use tracing::warn;

use crate::storage::Storage;
use crate::task::Task;

pub const CONTACTS_KEY: &str = "contacts";

/// Fallback colors for assignees without a contact entry.
pub const PALETTE: [&str; 10] = [
    "#ff7a00", "#9327ff", "#29abe2", "#fc71ff", "#ffbb2b",
    "#1fd7c1", "#462f8a", "#ff4646", "#00bee8", "#6e52ff",
];

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Contact {
    pub name: String,
    pub color: String,
}

pub trait ContactDirectory {
    fn find_contact_by_name(&self, name: &str) -> Option<Contact>;
}

/// In-memory directory keyed by full name.
#[derive(Debug, Default)]
pub struct StaticDirectory {
    contacts: HashMap<String, Contact>,
}

impl StaticDirectory {
    pub fn new(contacts: impl IntoIterator<Item = Contact>) -> Self {
        StaticDirectory {
            contacts: contacts.into_iter().map(|c| (c.name.clone(), c)).collect(),
        }
    }
}

/// Directory stored under `key`, a list of `{name, color, ...}` records.
/// Missing or unreadable data gives an empty directory.
pub async fn load_contacts(storage: &dyn Storage, key: &str) -> StaticDirectory {
    let raw = match storage.get_item(key).await {
        Ok(Some(raw)) => raw,
        Ok(None) => return StaticDirectory::default(),
        Err(e) => {
            warn!(key, "cannot read contacts: {e}");
            return StaticDirectory::default();
        }
    };
    match serde_json::from_str::<Vec<Contact>>(&raw) {
        Ok(contacts) => StaticDirectory::new(contacts),
        Err(e) => {
            warn!(key, "cannot parse contacts: {e}");
            StaticDirectory::default()
        }
    }
}

impl ContactDirectory for StaticDirectory {
    fn find_contact_by_name(&self, name: &str) -> Option<Contact> {
        self.contacts.get(name).cloned()
    }
}

/// What a card shows for one assignee.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Badge {
    pub name: String,
    pub initials: String,
    pub color: String,
}

/// Badges for every assignee of `task`, in assignment order.
pub fn assignee_badges(task: &Task, directory: &dyn ContactDirectory) -> Vec<Badge> {
    task.assignees
        .iter()
        .map(|name| {
            let color = directory
                .find_contact_by_name(name)
                .map(|c| c.color)
                .unwrap_or_else(|| fallback_color(name).to_string());
            Badge {
                name: name.clone(),
                initials: initials(name),
                color,
            }
        })
        .collect()
}

/// First letter of the first and last word, uppercased.
pub fn initials(name: &str) -> String {
    let words: Vec<&str> = name.split_whitespace().collect();
    let first = words.first().and_then(|w| w.chars().next());
    let last = if words.len() > 1 {
        words.last().and_then(|w| w.chars().next())
    } else {
        None
    };
    first.into_iter().chain(last).flat_map(char::to_uppercase).collect()
}

/// Palette entry picked from the name, stable across runs.
pub fn fallback_color(name: &str) -> &'static str {
    let sum = name.bytes().fold(0usize, |acc, b| acc.wrapping_mul(31).wrapping_add(b as usize));
    PALETTE[sum % PALETTE.len()]
}
