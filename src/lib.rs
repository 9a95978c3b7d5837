//! # Board - Kanban task board core
//!
//! Tasks with subtasks, assignees, a priority and a category, moved across four
//! status columns: To Do, In Progress, Awaiting Feedback and Done.
//!
//! ## Key Features
//!
//! - **Task Store**: in-memory task list mirrored to a single key-value entry after
//!   every change, tolerant of missing or corrupt saved data
//! - **Composition Sessions**: one open task form at a time, with a draft list of
//!   up to three subtasks addressed by stable handles
//! - **Pluggable Persistence**: any async `Storage` backend; files on disk for the
//!   command line, memory for tests
//! - **Compatible Data**: reads and writes the board's existing JSON layout,
//!   including icon-path priority markers and `"true"`/`"false"` subtask flags
//!
//! ## Quick Start
//!
//! ```bash
//! # Add a task to the In Progress column
//! board add "Write spec" --priority low --status in-progress --subtask Outline
//!
//! # Show the board
//! board list
//!
//! # Tick the first subtask and finish the task
//! board toggle 0 1
//! board move 0 done
//! ```
//!
//! Data is stored in `~/.board/tasks.json` unless `--dir` or `BOARD_DIR` says otherwise.

pub mod cli;
pub mod cmd;
pub mod compose;
pub mod config;
pub mod contacts;
pub mod dates;
pub mod error;
pub mod fields;
pub mod storage;
pub mod store;
pub mod subtasks;
pub mod task;

pub use error::{BoardError, Result};
