//! Task composition sessions.
//!
//! A `Composer` gathers the fields of one new or edited task and commits it to
//! the store. It holds the store by exclusive borrow for its whole lifetime, so
//! only one composition session can be open at a time and nothing else can
//! change the task list (and with it `next_id`) while the form is open.

use tracing::{info, warn};

use crate::error::{BoardError, Result};
use crate::fields::{Priority, Status};
use crate::store::TaskStore;
use crate::subtasks::SubtaskDrafts;
use crate::task::{Task, TaskFields, DEFAULT_CATEGORY, DEFAULT_CATEGORY_COLOR};

/// How the composer was opened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// New task with a preassigned id, landing in `status`.
    Create { id: u64, status: Status },
    /// Existing task at `index`; its id and status carry over.
    Edit { index: usize, id: u64, status: Status },
}

/// Result of a successful commit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Committed {
    pub id: u64,
    pub index: usize,
    pub created: bool,
}

pub struct Composer<'a> {
    store: &'a mut TaskStore,
    mode: Mode,
    pub title: String,
    pub description: String,
    category: Option<(String, String)>,
    assignees: Vec<String>,
    pub date: String,
    priority: Option<Priority>,
    drafts: SubtaskDrafts,
    committed: bool,
}

impl<'a> Composer<'a> {
    /// Open a composer for a new task in `status`.
    ///
    /// The store is reloaded first so the id is computed from the persisted list.
    /// If the reload fails the tasks already in memory are used.
    pub async fn open_create(store: &'a mut TaskStore, status: Status) -> Composer<'a> {
        if let Err(e) = store.load_all().await {
            warn!("continuing with tasks in memory: {e}");
        }
        let id = store.next_id();
        Composer::new(store, Mode::Create { id, status })
    }

    /// Open a composer on the task at `index`, pre-filled from it.
    pub fn open_edit(store: &'a mut TaskStore, index: usize) -> Result<Composer<'a>> {
        let Some(task) = store.get(index).cloned() else {
            warn!(index, "task not found");
            return Err(BoardError::NotFound(format!("task at position {index}")));
        };
        let mut composer = Composer::new(
            store,
            Mode::Edit { index, id: task.id, status: task.status },
        );
        composer.title = task.name;
        composer.description = task.description;
        composer.category = Some((task.category, task.category_color));
        composer.assignees = task.assignees;
        composer.date = task.date;
        composer.priority = Some(task.priority);
        composer.drafts = SubtaskDrafts::from_subtasks(&task.subtasks);
        Ok(composer)
    }

    fn new(store: &'a mut TaskStore, mode: Mode) -> Self {
        Composer {
            store,
            mode,
            title: String::new(),
            description: String::new(),
            category: None,
            assignees: Vec::new(),
            date: String::new(),
            priority: None,
            drafts: SubtaskDrafts::new(),
            committed: false,
        }
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Read access to the board while the form is open.
    pub fn store(&self) -> &TaskStore {
        &*self.store
    }

    pub fn drafts(&self) -> &SubtaskDrafts {
        &self.drafts
    }

    pub fn drafts_mut(&mut self) -> &mut SubtaskDrafts {
        &mut self.drafts
    }

    pub fn set_category(&mut self, label: impl Into<String>, color: impl Into<String>) {
        self.category = Some((label.into(), color.into()));
    }

    /// Category label and color, defaulted when none was picked.
    pub fn category(&self) -> (&str, &str) {
        match &self.category {
            Some((label, color)) => (label.as_str(), color.as_str()),
            None => (DEFAULT_CATEGORY, DEFAULT_CATEGORY_COLOR),
        }
    }

    pub fn assignees(&self) -> &[String] {
        &self.assignees
    }

    pub fn assign(&mut self, name: impl Into<String>) {
        self.assignees.push(name.into());
    }

    /// Drop every assignment of `name`. Returns whether any was removed.
    pub fn unassign(&mut self, name: &str) -> bool {
        let before = self.assignees.len();
        self.assignees.retain(|a| a != name);
        self.assignees.len() != before
    }

    pub fn select_priority(&mut self, priority: Priority) {
        self.priority = Some(priority);
    }

    pub fn priority(&self) -> Option<Priority> {
        self.priority
    }

    /// Write the task to the store.
    ///
    /// Refused until a priority is selected. On success, or when only the save
    /// failed, the drafts and assignees are cleared and the composer is spent.
    pub async fn commit(&mut self) -> Result<Committed> {
        if self.committed {
            return Err(BoardError::Session("task already committed".into()));
        }
        let Some(priority) = self.priority else {
            return Err(BoardError::Validation("select a priority first".into()));
        };
        let (category, category_color) = {
            let (label, color) = self.category();
            (label.to_string(), color.to_string())
        };

        let (result, committed) = match self.mode {
            Mode::Create { id, status } => {
                let task = Task {
                    id,
                    name: self.title.clone(),
                    subtasks: self.drafts.to_subtasks(),
                    description: self.description.clone(),
                    category,
                    category_color,
                    assignees: self.assignees.clone(),
                    date: self.date.clone(),
                    priority,
                    status,
                };
                let result = self.store.create(task).await;
                let index = self.store.len().saturating_sub(1);
                (result, Committed { id, index, created: true })
            }
            Mode::Edit { index, id, .. } => {
                let fields = TaskFields {
                    name: Some(self.title.clone()),
                    description: Some(self.description.clone()),
                    category: Some(category),
                    category_color: Some(category_color),
                    assignees: Some(self.assignees.clone()),
                    date: Some(self.date.clone()),
                    priority: Some(priority),
                    subtasks: Some(self.drafts.to_subtasks()),
                    ..Default::default()
                };
                let result = self.store.update(index, fields).await;
                (result, Committed { id, index, created: false })
            }
        };

        match result {
            Ok(()) | Err(BoardError::Storage(_)) => {
                self.committed = true;
                self.drafts.clear_drafts();
                self.assignees.clear();
            }
            Err(_) => {}
        }
        result?;
        if committed.created {
            info!(id = committed.id, "task added to board");
        } else {
            info!(id = committed.id, "task updated");
        }
        Ok(committed)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::storage::{MemoryStorage, Storage};
    use crate::store::tests::{task, BrokenStorage};
    use crate::store::DEFAULT_KEY;
    use crate::task::Subtask;

    fn store() -> TaskStore {
        TaskStore::new(Arc::new(MemoryStorage::new()), DEFAULT_KEY)
    }

    #[tokio::test]
    async fn test_create_flow() {
        let mut store = store();
        {
            let mut c = Composer::open_create(&mut store, Status::InProgress).await;
            assert_eq!(c.mode(), Mode::Create { id: 0, status: Status::InProgress });
            c.title = "Write spec".into();
            c.assign("Anna Berg");
            c.drafts_mut().add_draft("Outline").unwrap();
            c.drafts_mut().toggle_draft_done(0).unwrap();

            assert!(matches!(c.commit().await, Err(BoardError::Validation(_))));
            assert_eq!(c.store().len(), 0);

            c.select_priority(Priority::Low);
            let done = c.commit().await.unwrap();
            assert_eq!(done, Committed { id: 0, index: 0, created: true });
            assert!(c.drafts().is_empty());
            assert!(c.assignees().is_empty());
            assert!(matches!(c.commit().await, Err(BoardError::Session(_))));
        }

        let t = store.get(0).unwrap();
        assert_eq!(t.name, "Write spec");
        assert_eq!(t.status, Status::InProgress);
        assert_eq!(t.category, DEFAULT_CATEGORY);
        assert_eq!(t.category_color, DEFAULT_CATEGORY_COLOR);
        assert_eq!(t.assignees, ["Anna Berg"]);
        assert_eq!(t.subtasks, vec![Subtask { name: "Outline".into(), clicked: true }]);
    }

    #[tokio::test]
    async fn test_create_picks_up_persisted_ids() {
        let storage = Arc::new(MemoryStorage::new());
        let mut other = TaskStore::new(storage.clone(), DEFAULT_KEY);
        other.create(task(0, "a", Status::ToDo)).await.unwrap();
        other.create(task(4, "b", Status::ToDo)).await.unwrap();

        let mut stale = TaskStore::new(storage, DEFAULT_KEY);
        let c = Composer::open_create(&mut stale, Status::Done).await;
        assert_eq!(c.mode(), Mode::Create { id: 5, status: Status::Done });
    }

    #[tokio::test]
    async fn test_edit_flow_keeps_id_and_status() {
        let mut store = store();
        let mut t = task(7, "old", Status::AwaitingFeedback);
        t.subtasks = vec![Subtask { name: "done bit".into(), clicked: true }];
        t.assignees = vec!["Tom Lee".into()];
        store.create(t).await.unwrap();

        {
            let mut c = Composer::open_edit(&mut store, 0).unwrap();
            assert_eq!(c.title, "old");
            assert_eq!(c.priority(), Some(Priority::Low));
            assert_eq!(c.drafts().len(), 1);
            assert_eq!(c.assignees(), ["Tom Lee"]);

            c.title = "new".into();
            assert!(c.unassign("Tom Lee"));
            c.assign("Anna Berg");
            c.set_category("Backend", "#29abe2");
            c.drafts_mut().add_draft("extra").unwrap();
            let done = c.commit().await.unwrap();
            assert_eq!(done, Committed { id: 7, index: 0, created: false });
        }

        assert_eq!(store.len(), 1);
        let t = store.get(0).unwrap();
        assert_eq!((t.id, t.status), (7, Status::AwaitingFeedback));
        assert_eq!(t.name, "new");
        assert_eq!(t.category, "Backend");
        assert_eq!(t.assignees, ["Anna Berg"]);
        assert_eq!(t.subtasks.len(), 2);
        assert!(t.subtasks[0].clicked);
    }

    #[test]
    fn test_edit_unknown_index() {
        let mut store = store();
        assert!(matches!(Composer::open_edit(&mut store, 0), Err(BoardError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_failed_save_spends_composer() {
        let mut store = TaskStore::new(Arc::new(BrokenStorage), DEFAULT_KEY);
        let mut c = Composer::open_create(&mut store, Status::ToDo).await;
        c.select_priority(Priority::Medium);
        c.drafts_mut().add_draft("x").unwrap();
        assert!(matches!(c.commit().await, Err(BoardError::Storage(_))));
        assert!(c.drafts().is_empty());
        assert_eq!(c.store().len(), 1);
        assert!(matches!(c.commit().await, Err(BoardError::Session(_))));
    }

    #[tokio::test]
    async fn test_round_trip_through_storage() {
        let storage = Arc::new(MemoryStorage::new());
        let mut store = TaskStore::new(storage.clone(), DEFAULT_KEY);
        let mut c = Composer::open_create(&mut store, Status::ToDo).await;
        c.title = "persisted".into();
        c.select_priority(Priority::High);
        c.commit().await.unwrap();

        let raw = storage.get_item(DEFAULT_KEY).await.unwrap().unwrap();
        assert!(raw.contains("assets/img/priohigh.png"));
        assert!(raw.contains("\"status\":\"toDo\""));
    }
}
