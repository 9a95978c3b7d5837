//! Runtime settings for the command line.
//!
//! Resolution order for each value is flag, then environment variable, then
//! default. Clap handles the first two; this module fills in the defaults.

use std::path::PathBuf;

use crate::store::DEFAULT_KEY;

pub const DIR_ENV: &str = "BOARD_DIR";
pub const KEY_ENV: &str = "BOARD_KEY";
pub const DEFAULT_LOG_FILTER: &str = "warn";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Directory holding the storage files.
    pub data_dir: PathBuf,
    /// Storage key the task list lives under.
    pub key: String,
}

impl Config {
    /// Fill in defaults for anything not given on the command line.
    pub fn resolve(dir: Option<PathBuf>, key: Option<String>) -> Self {
        let data_dir = dir.unwrap_or_else(default_data_dir);
        let key = key
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty())
            .unwrap_or_else(|| DEFAULT_KEY.to_string());
        Config { data_dir, key }
    }
}

/// `$HOME/.board`, or `./.board` without a home directory.
pub fn default_data_dir() -> PathBuf {
    let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
    PathBuf::from(home).join(".board")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_prefers_given_values() {
        let cfg = Config::resolve(Some(PathBuf::from("/tmp/b")), Some("sprint".into()));
        assert_eq!(cfg.data_dir, PathBuf::from("/tmp/b"));
        assert_eq!(cfg.key, "sprint");
    }

    #[test]
    fn test_resolve_defaults() {
        let cfg = Config::resolve(None, Some("  ".into()));
        assert_eq!(cfg.key, DEFAULT_KEY);
        assert!(cfg.data_dir.ends_with(".board"));
    }
}
