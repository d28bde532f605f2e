//! Store configuration: where the task file lives and how ids and
//! unreadable files are handled.

use clap::ValueEnum;
use std::path::PathBuf;

pub const DEFAULT_TASK_FILE: &str = "tasks.json";

/// How `add` picks the id of a new task.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum IdPolicy {
    /// `number of tasks + 1`. Compatible with files written by older
    /// versions, but may hand out an id that is still in use after a delete.
    Count,
    /// `highest existing id + 1`.
    #[default]
    NextAfterMax,
}

/// What to do when the task file exists but cannot be parsed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum LoadPolicy {
    /// Warn, move the file aside to `<file>.corrupt` and start empty.
    #[default]
    Recover,
    /// Fail with `StoreError::Corrupt`.
    Strict,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    pub path: PathBuf,
    pub id_policy: IdPolicy,
    pub load_policy: LoadPolicy,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from(DEFAULT_TASK_FILE),
            id_policy: IdPolicy::default(),
            load_policy: LoadPolicy::default(),
        }
    }
}

impl StoreConfig {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            ..Self::default()
        }
    }

    pub fn with_id_policy(mut self, id_policy: IdPolicy) -> Self {
        self.id_policy = id_policy;
        self
    }

    pub fn with_load_policy(mut self, load_policy: LoadPolicy) -> Self {
        self.load_policy = load_policy;
        self
    }

    /// Sibling path the unreadable file is moved to under `LoadPolicy::Recover`:
    /// `<file>.corrupt`, or `<file>.corrupt.N` for the first free `N` so
    /// earlier backups are never overwritten.
    pub fn corrupt_backup_path(&self) -> PathBuf {
        let mut base = self.path.as_os_str().to_os_string();
        base.push(".corrupt");
        let first = PathBuf::from(&base);
        if !first.exists() {
            return first;
        }
        (1u32..)
            .map(|n| {
                let mut name = base.clone();
                name.push(format!(".{}", n));
                PathBuf::from(name)
            })
            .find(|candidate| !candidate.exists())
            .unwrap_or(first)
    }
}
