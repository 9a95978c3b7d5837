use std::path::PathBuf;

use clap::Parser;

use crate::cmd::Commands;
use crate::config::{Config, DIR_ENV, KEY_ENV};

/// Kanban task board backed by a local key-value store.
/// Storage defaults to ~/.board/tasks.json.
#[derive(Parser)]
#[command(name = "board", version, about = "Kanban task board")]
pub struct Cli {
    /// Directory holding board data.
    #[arg(long, global = true, env = DIR_ENV)]
    pub dir: Option<PathBuf>,

    /// Storage key of the task list.
    #[arg(long, global = true, env = KEY_ENV)]
    pub key: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    pub fn config(&self) -> Config {
        Config::resolve(self.dir.clone(), self.key.clone())
    }
}
