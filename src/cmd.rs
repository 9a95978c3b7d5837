//! Command implementations for the CLI interface.
//!
//! Each subcommand stands in for one board gesture: add, edit, delete, move a
//! card, tick a subtask. Add and edit go through a `Composer` exactly like the
//! board's task form does.

use clap::Subcommand;
use clap_complete::{generate, Shell};

use crate::compose::{Committed, Composer};
use crate::contacts::{assignee_badges, ContactDirectory};
use crate::dates::normalise_date;
use crate::error::{BoardError, Result};
use crate::fields::*;
use crate::store::TaskStore;
use crate::subtasks::{DraftId, SubtaskDrafts};
use crate::task::{Task, DEFAULT_CATEGORY_COLOR};

#[derive(Subcommand)]
pub enum Commands {
    /// Add a new task.
    Add {
        /// Short title for the task.
        title: String,
        /// Longer description.
        #[arg(long)]
        desc: Option<String>,
        /// Category label.
        #[arg(long)]
        category: Option<String>,
        /// Category color, e.g. #ff7a00.
        #[arg(long, requires = "category")]
        color: Option<String>,
        /// Assignee full name. May be repeated.
        #[arg(long = "assign")]
        assignees: Vec<String>,
        /// Due date: YYYY-MM-DD, "today", "tomorrow", "in Nd" or "in Nw".
        #[arg(long)]
        date: Option<String>,
        /// Priority: high | medium | low.
        #[arg(long, value_enum)]
        priority: Option<Priority>,
        /// Column to add the task to.
        #[arg(long, value_enum, default_value_t = Status::ToDo)]
        status: Status,
        /// Subtask name. May be repeated, at most three.
        #[arg(long = "subtask")]
        subtasks: Vec<String>,
    },

    /// List tasks by column.
    List {
        /// Only this column.
        #[arg(long, value_enum)]
        status: Option<Status>,
        /// Only tasks whose title or description contains this text.
        #[arg(long)]
        search: Option<String>,
    },

    /// Show one task in full.
    View {
        /// Task ID.
        id: u64,
    },

    /// Edit fields of a task.
    Edit {
        /// Task ID.
        id: u64,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        desc: Option<String>,
        #[arg(long)]
        category: Option<String>,
        #[arg(long, requires = "category")]
        color: Option<String>,
        /// Add an assignee. May be repeated.
        #[arg(long = "assign")]
        assign: Vec<String>,
        /// Remove an assignee. May be repeated.
        #[arg(long = "unassign")]
        unassign: Vec<String>,
        #[arg(long)]
        date: Option<String>,
        #[arg(long, value_enum)]
        priority: Option<Priority>,
        /// Add a subtask. May be repeated.
        #[arg(long = "add-subtask")]
        add_subtasks: Vec<String>,
        /// Remove the subtask at this position (1-based). May be repeated.
        #[arg(long = "rm-subtask")]
        rm_subtasks: Vec<usize>,
        /// Rename a subtask: "<position>=<new name>". May be repeated.
        #[arg(long = "rename-subtask")]
        rename_subtasks: Vec<String>,
    },

    /// Delete a task.
    Delete {
        /// Task ID.
        id: u64,
    },

    /// Move a task to another column.
    Move {
        /// Task ID.
        id: u64,
        /// Target column.
        #[arg(value_enum)]
        status: Status,
    },

    /// Tick or untick a subtask.
    Toggle {
        /// Task ID.
        id: u64,
        /// Subtask position (1-based).
        position: usize,
    },

    /// Generate shell completions.
    Completions {
        #[arg(value_enum)]
        shell: Shell,
    },
}

pub async fn cmd_add(
    store: &mut TaskStore,
    title: String,
    desc: Option<String>,
    category: Option<String>,
    color: Option<String>,
    assignees: Vec<String>,
    date: Option<String>,
    priority: Option<Priority>,
    status: Status,
    subtasks: Vec<String>,
) -> Result<()> {
    let mut composer = Composer::open_create(store, status).await;
    composer.title = title;
    composer.description = desc.unwrap_or_default();
    if let Some(label) = category {
        composer.set_category(label, color.unwrap_or_else(|| DEFAULT_CATEGORY_COLOR.to_string()));
    }
    for name in assignees {
        composer.assign(name);
    }
    composer.date = date.as_deref().map(normalise_date).unwrap_or_default();
    if let Some(p) = priority {
        composer.select_priority(p);
    }
    for name in &subtasks {
        composer.drafts_mut().add_draft(name)?;
    }

    let Committed { id, .. } = composer.commit().await?;
    println!("Task added to board ({id}, {})", status.title());
    Ok(())
}

pub fn cmd_list(store: &TaskStore, status: Option<Status>, search: Option<String>) {
    let query = search.unwrap_or_default();
    let columns: Vec<Status> = match status {
        Some(s) => vec![s],
        None => Status::COLUMNS.to_vec(),
    };
    for column in columns {
        let tasks: Vec<&Task> = store
            .search(&query)
            .filter(|t| t.status == column)
            .collect();
        println!("== {} ({})", column.title(), tasks.len());
        if tasks.is_empty() {
            println!("   No tasks");
            continue;
        }
        for t in tasks {
            print_row(t);
        }
    }
}

fn print_row(t: &Task) {
    let p = t.progress();
    let progress = if p.total == 0 {
        String::from("-")
    } else {
        format!("{}/{}", p.done, p.total)
    };
    println!(
        "{:<5} {:<7} {:<12} {:<5} {:<14} {}",
        t.id,
        format_priority(t.priority),
        truncate(&t.date, 12),
        progress,
        truncate(&t.category, 14),
        t.name
    );
}

pub fn cmd_view(store: &TaskStore, directory: &dyn ContactDirectory, id: u64) -> Result<()> {
    let task = find(store, id)?;
    println!("ID:          {}", task.id);
    println!("Title:       {}", task.name);
    println!("Status:      {}", task.status.title());
    println!("Priority:    {}", format_priority(task.priority));
    println!("Category:    {} ({})", task.category, task.category_color);
    println!("Due:         {}", if task.date.is_empty() { "-" } else { task.date.as_str() });
    if !task.description.is_empty() {
        println!("Description: {}", task.description);
    }
    let badges = assignee_badges(task, directory);
    if !badges.is_empty() {
        println!("Assigned to:");
        for b in badges {
            println!("  [{}] {} {}", b.initials, b.name, b.color);
        }
    }
    if !task.subtasks.is_empty() {
        println!("Subtasks ({}%):", task.progress().percent());
        for (i, s) in task.subtasks.iter().enumerate() {
            let mark = if s.clicked { "x" } else { " " };
            println!("  {}. [{}] {}", i + 1, mark, s.name);
        }
    }
    Ok(())
}

pub async fn cmd_edit(
    store: &mut TaskStore,
    id: u64,
    title: Option<String>,
    desc: Option<String>,
    category: Option<String>,
    color: Option<String>,
    assign: Vec<String>,
    unassign: Vec<String>,
    date: Option<String>,
    priority: Option<Priority>,
    add_subtasks: Vec<String>,
    rm_subtasks: Vec<usize>,
    rename_subtasks: Vec<String>,
) -> Result<()> {
    let index = index_of(store, id)?;
    let mut composer = Composer::open_edit(store, index)?;
    if let Some(v) = title {
        composer.title = v;
    }
    if let Some(v) = desc {
        composer.description = v;
    }
    if let Some(label) = category {
        let color = color.unwrap_or_else(|| composer.category().1.to_string());
        composer.set_category(label, color);
    }
    for name in &unassign {
        if !composer.unassign(name) {
            eprintln!("{name} was not assigned to task {id}");
        }
    }
    for name in assign {
        composer.assign(name);
    }
    if let Some(v) = date {
        composer.date = normalise_date(&v);
    }
    if let Some(p) = priority {
        composer.select_priority(p);
    }

    // Resolve positions to handles before anything moves.
    let mut renames = Vec::new();
    for spec in &rename_subtasks {
        let (pos, name) = parse_rename(spec)?;
        renames.push((draft_handle(composer.drafts(), pos)?, name));
    }
    let removals = rm_subtasks
        .iter()
        .map(|&pos| draft_handle(composer.drafts(), pos))
        .collect::<Result<Vec<_>>>()?;

    let drafts = composer.drafts_mut();
    for (handle, name) in renames {
        drafts.edit_draft(handle)?;
        drafts.commit_edit(&name)?;
    }
    for handle in removals {
        drafts.delete_draft(handle)?;
    }
    for name in &add_subtasks {
        drafts.add_draft(name)?;
    }

    composer.commit().await?;
    println!("Updated task {id}");
    Ok(())
}

pub async fn cmd_delete(store: &mut TaskStore, id: u64) -> Result<()> {
    let index = index_of(store, id)?;
    let removed = store.remove(index).await?;
    println!("Deleted task {} ({})", removed.id, removed.name);
    Ok(())
}

pub async fn cmd_move(store: &mut TaskStore, id: u64, status: Status) -> Result<()> {
    let index = index_of(store, id)?;
    store.move_to(index, status).await?;
    println!("Moved task {id} to {}", status.title());
    Ok(())
}

pub async fn cmd_toggle(store: &mut TaskStore, id: u64, position: usize) -> Result<()> {
    let zero_based = position.checked_sub(1).ok_or(BoardError::Index { index: 0, len: 0 })?;
    let clicked = store.toggle_subtask(id, zero_based).await?;
    let state = if clicked { "done" } else { "open" };
    println!("Subtask {position} of task {id} is now {state}");
    Ok(())
}

pub fn cmd_completions(shell: Shell) {
    use clap::CommandFactory;
    let mut cmd = crate::cli::Cli::command();
    generate(shell, &mut cmd, "board", &mut std::io::stdout());
}

fn find(store: &TaskStore, id: u64) -> Result<&Task> {
    store
        .position_of(id)
        .and_then(|i| store.get(i))
        .ok_or_else(|| BoardError::NotFound(format!("task {id}")))
}

fn index_of(store: &TaskStore, id: u64) -> Result<usize> {
    store
        .position_of(id)
        .ok_or_else(|| BoardError::NotFound(format!("task {id}")))
}

fn draft_handle(drafts: &SubtaskDrafts, position: usize) -> Result<DraftId> {
    position
        .checked_sub(1)
        .and_then(|p| drafts.handle_at(p))
        .ok_or(BoardError::Index { index: position, len: drafts.len() })
}

/// Split `"<position>=<name>"`.
fn parse_rename(spec: &str) -> Result<(usize, String)> {
    let (pos, name) = spec
        .split_once('=')
        .ok_or_else(|| BoardError::Validation(format!("expected <position>=<name>, got '{spec}'")))?;
    let pos = pos
        .trim()
        .parse::<usize>()
        .map_err(|_| BoardError::Validation(format!("invalid subtask position '{pos}'")))?;
    Ok((pos, name.trim().to_string()))
}

/// Truncate a string to a maximum width, adding ellipsis if needed.
pub fn truncate(s: &str, width: usize) -> String {
    if s.chars().count() <= width {
        s.to_string()
    } else {
        let mut out = String::new();
        for (i, ch) in s.chars().enumerate() {
            if i + 1 >= width {
                out.push('…');
                break;
            }
            out.push(ch);
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::storage::MemoryStorage;
    use crate::store::DEFAULT_KEY;

    fn store() -> TaskStore {
        TaskStore::new(Arc::new(MemoryStorage::new()), DEFAULT_KEY)
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("a long category", 6), "a lon…");
    }

    #[test]
    fn test_parse_rename() {
        assert_eq!(parse_rename("2=Polish copy").unwrap(), (2, "Polish copy".to_string()));
        assert!(matches!(parse_rename("Polish"), Err(BoardError::Validation(_))));
        assert!(matches!(parse_rename("x=y"), Err(BoardError::Validation(_))));
    }

    #[tokio::test]
    async fn test_add_requires_priority() {
        let mut store = store();
        let err = cmd_add(&mut store, "t".into(), None, None, None, vec![], None, None, Status::ToDo, vec![])
            .await
            .unwrap_err();
        assert!(matches!(err, BoardError::Validation(_)));
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_add_rejects_fourth_subtask() {
        let mut store = store();
        let subtasks = vec!["a".into(), "b".into(), "c".into(), "d".into()];
        let err = cmd_add(&mut store, "t".into(), None, None, None, vec![], None, Some(Priority::Low), Status::ToDo, subtasks)
            .await
            .unwrap_err();
        assert!(matches!(err, BoardError::LimitExceeded { .. }));
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_edit_subtasks_by_position() {
        let mut store = store();
        let subtasks = vec!["same".into(), "same".into()];
        cmd_add(&mut store, "t".into(), None, None, None, vec!["Anna Berg".into()], Some("2024-05-01".into()),
            Some(Priority::Medium), Status::InProgress, subtasks)
            .await
            .unwrap();

        cmd_edit(&mut store, 0, None, None, None, None, vec![], vec![], None, None,
            vec!["new".into()], vec![1], vec!["2=renamed".into()])
            .await
            .unwrap();

        let t = store.get(0).unwrap();
        let names: Vec<&str> = t.subtasks.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, ["renamed", "new"]);
        assert_eq!(t.status, Status::InProgress);
        assert_eq!(t.assignees, ["Anna Berg"]);
        assert_eq!(t.date, "2024-05-01");
    }

    #[tokio::test]
    async fn test_move_toggle_delete() {
        let mut store = store();
        cmd_add(&mut store, "t".into(), None, None, None, vec![], None, Some(Priority::High), Status::ToDo, vec!["a".into()])
            .await
            .unwrap();
        cmd_move(&mut store, 0, Status::Done).await.unwrap();
        cmd_toggle(&mut store, 0, 1).await.unwrap();
        assert!(matches!(cmd_toggle(&mut store, 0, 0).await, Err(BoardError::Index { .. })));
        assert_eq!(store.filter_by_status(Status::Done).count(), 1);
        assert!(store.get(0).unwrap().subtasks[0].clicked);

        cmd_delete(&mut store, 0).await.unwrap();
        assert!(matches!(cmd_delete(&mut store, 0).await, Err(BoardError::NotFound(_))));
    }
}
