//! Draft subtasks for the task being composed.
//!
//! Drafts are addressed by a `DraftId` handed out on add, so editing or deleting
//! one entry is unaffected by other entries sharing its name. The composer's
//! subtask input box is modelled as `input`.

use std::fmt;

use tracing::warn;

use crate::error::{BoardError, Result};
use crate::task::Subtask;

/// Maximum number of subtasks on one task.
pub const MAX_SUBTASKS: usize = 3;

/// Stable handle to a draft within one composition session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DraftId(u32);

impl fmt::Display for DraftId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone)]
struct Draft {
    id: DraftId,
    subtask: Subtask,
}

#[derive(Debug, Default)]
pub struct SubtaskDrafts {
    drafts: Vec<Draft>,
    next_handle: u32,
    editing: Option<DraftId>,
    input: String,
}

impl SubtaskDrafts {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drafts pre-filled from a task's saved subtasks, completion flags included.
    pub fn from_subtasks(subtasks: &[Subtask]) -> Self {
        let mut drafts = SubtaskDrafts::new();
        for s in subtasks {
            drafts.push(s.clone());
        }
        drafts
    }

    pub fn len(&self) -> usize {
        self.drafts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.drafts.is_empty()
    }

    /// Current contents of the subtask input box.
    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn set_input(&mut self, text: impl Into<String>) {
        self.input = text.into();
    }

    /// Draft being edited, if any.
    pub fn editing(&self) -> Option<DraftId> {
        self.editing
    }

    /// Handles and subtasks in list order.
    pub fn iter(&self) -> impl Iterator<Item = (DraftId, &Subtask)> + '_ {
        self.drafts.iter().map(|d| (d.id, &d.subtask))
    }

    pub fn get(&self, id: DraftId) -> Option<&Subtask> {
        self.drafts.iter().find(|d| d.id == id).map(|d| &d.subtask)
    }

    /// Handle of the draft at `position`.
    pub fn handle_at(&self, position: usize) -> Option<DraftId> {
        self.drafts.get(position).map(|d| d.id)
    }

    /// First draft named `name`.
    pub fn find(&self, name: &str) -> Option<DraftId> {
        self.drafts.iter().find(|d| d.subtask.name == name).map(|d| d.id)
    }

    /// Append a new, not yet completed draft and clear the input box.
    pub fn add_draft(&mut self, name: &str) -> Result<DraftId> {
        if name.trim().is_empty() {
            return Err(BoardError::Validation("subtask name must not be empty".into()));
        }
        if self.drafts.len() >= MAX_SUBTASKS {
            return Err(BoardError::LimitExceeded { limit: MAX_SUBTASKS });
        }
        let id = self.push(Subtask::new(name));
        self.input.clear();
        Ok(id)
    }

    /// Enter edit mode for `id` and pre-fill the input box with its name.
    /// Replaces any edit already in progress.
    pub fn edit_draft(&mut self, id: DraftId) -> Result<()> {
        let Some(name) = self.get(id).map(|s| s.name.clone()) else {
            warn!(draft = %id, "subtask not found");
            return Err(BoardError::NotFound(format!("subtask {id}")));
        };
        self.input = name;
        self.editing = Some(id);
        Ok(())
    }

    /// Rename the draft under edit and leave edit mode.
    ///
    /// An empty name is rejected and edit mode stays on. If the draft vanished
    /// since `edit_draft`, nothing changes and edit mode ends.
    pub fn commit_edit(&mut self, new_name: &str) -> Result<()> {
        let Some(target) = self.editing else {
            return Err(BoardError::Session("no subtask is being edited".into()));
        };
        if new_name.trim().is_empty() {
            return Err(BoardError::Validation("subtask name must not be empty".into()));
        }
        self.editing = None;
        let Some(draft) = self.drafts.iter_mut().find(|d| d.id == target) else {
            warn!(draft = %target, "subtask not found");
            return Err(BoardError::NotFound(format!("subtask {target}")));
        };
        draft.subtask.name = new_name.to_string();
        self.input.clear();
        Ok(())
    }

    /// Leave edit mode without renaming.
    pub fn cancel_edit(&mut self) {
        self.editing = None;
        self.input.clear();
    }

    /// Remove draft `id`. Remaining drafts keep their order.
    pub fn delete_draft(&mut self, id: DraftId) -> Result<Subtask> {
        let Some(pos) = self.drafts.iter().position(|d| d.id == id) else {
            warn!(draft = %id, "subtask not found");
            return Err(BoardError::NotFound(format!("subtask {id}")));
        };
        Ok(self.drafts.remove(pos).subtask)
    }

    /// Flip the completion flag at `position`, returning the new flag.
    pub fn toggle_draft_done(&mut self, position: usize) -> Result<bool> {
        let len = self.drafts.len();
        let draft = self
            .drafts
            .get_mut(position)
            .ok_or(BoardError::Index { index: position, len })?;
        draft.subtask.clicked = !draft.subtask.clicked;
        Ok(draft.subtask.clicked)
    }

    /// Empty the list and reset edit state.
    pub fn clear_drafts(&mut self) {
        self.drafts.clear();
        self.editing = None;
        self.input.clear();
    }

    /// Copy of the drafts as task subtasks.
    pub fn to_subtasks(&self) -> Vec<Subtask> {
        self.drafts.iter().map(|d| d.subtask.clone()).collect()
    }

    fn push(&mut self, subtask: Subtask) -> DraftId {
        let id = DraftId(self.next_handle);
        self.next_handle += 1;
        self.drafts.push(Draft { id, subtask });
        id
    }
}
