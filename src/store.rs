use crate::config::{IdPolicy, LoadPolicy, StoreConfig};
use crate::error::{Result, StoreError};
use crate::task::{Task, TaskStatus};
use chrono::NaiveDate;
use std::{
    fs, io,
    path::{Path, PathBuf},
};
use tracing::{debug, info, warn};

/// What happened when the task file could not be parsed and the store
/// started empty instead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Recovery {
    /// Why the file was rejected.
    pub reason: String,
    /// Where the unreadable file was moved, if the move succeeded.
    pub backup: Option<PathBuf>,
}

impl Recovery {
    pub const MESSAGE: &'static str = "Error loading task data. Starting with empty task list.";

    /// User-facing report, one line per fact.
    pub fn message(&self) -> String {
        let mut lines = vec![Self::MESSAGE.to_string(), self.reason.clone()];
        match &self.backup {
            Some(path) => lines.push(format!("Unreadable file saved as {}", path.display())),
            None => lines.push("Unreadable file could not be moved aside.".to_string()),
        }
        lines.join("\n")
    }
}

/// The task list and the file backing it. Every mutation rewrites the whole
/// file before returning, and is undone in memory if that write fails.
/// There is no file locking: one process at a time.
#[derive(Debug)]
pub struct TaskStore {
    tasks: Vec<Task>,
    path: PathBuf,
    id_policy: IdPolicy,
    recovery: Option<Recovery>,
}

impl TaskStore {
    /// Loads the task list from `config.path`. A missing file is an empty
    /// list; an unparseable one is handled according to `config.load_policy`.
    pub fn open(config: &StoreConfig) -> Result<Self> {
        let mut recovery = None;
        let tasks = match Self::load_from_file(&config.path) {
            Ok(tasks) => tasks,
            Err(err @ StoreError::Corrupt { .. }) => match config.load_policy {
                LoadPolicy::Strict => return Err(err),
                LoadPolicy::Recover => {
                    warn!("{}. Starting with empty task list.", err);
                    recovery = Some(Recovery {
                        reason: err.to_string(),
                        backup: Self::move_aside(config),
                    });
                    Vec::new()
                }
            },
            Err(err) => return Err(err),
        };

        debug!(path = %config.path.display(), count = tasks.len(), "loaded tasks");
        Ok(Self {
            tasks,
            path: config.path.clone(),
            id_policy: config.id_policy,
            recovery,
        })
    }

    fn move_aside(config: &StoreConfig) -> Option<PathBuf> {
        let backup = config.corrupt_backup_path();
        match fs::rename(&config.path, &backup) {
            Ok(()) => {
                warn!("Unreadable task file moved to {}", backup.display());
                Some(backup)
            }
            Err(e) => {
                warn!(
                    "Failed to move unreadable task file to {}: {}",
                    backup.display(),
                    e
                );
                None
            }
        }
    }

    /// Set when the file was unreadable and the store started empty.
    pub fn recovery(&self) -> Option<&Recovery> {
        self.recovery.as_ref()
    }

    fn load_from_file(path: &Path) -> Result<Vec<Task>> {
        let data = match fs::read_to_string(path) {
            Ok(data) => data,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(source) => {
                return Err(StoreError::Io {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };
        if data.trim().is_empty() {
            return Ok(Vec::new());
        }

        serde_json::from_str(&data).map_err(|source| StoreError::Corrupt {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Overwrites the task file with the full in-memory list.
    pub fn persist(&self) -> Result<()> {
        let data = serde_json::to_string_pretty(&self.tasks)?;
        fs::write(&self.path, data).map_err(|source| StoreError::Io {
            path: self.path.clone(),
            source,
        })?;
        debug!(path = %self.path.display(), count = self.tasks.len(), "saved tasks");
        Ok(())
    }

    fn next_id(&self) -> Result<u32> {
        let last = match self.id_policy {
            IdPolicy::Count => u32::try_from(self.tasks.len()).ok(),
            IdPolicy::NextAfterMax => Some(self.tasks.iter().map(|t| t.id).max().unwrap_or(0)),
        };
        last.and_then(|n| n.checked_add(1)).ok_or(StoreError::IdsExhausted)
    }

    pub fn add(
        &mut self,
        title: impl Into<String>,
        description: impl Into<String>,
        due_date: Option<NaiveDate>,
    ) -> Result<&Task> {
        let title = title.into();
        if title.trim().is_empty() {
            return Err(StoreError::EmptyTitle);
        }

        let task = Task::new(self.next_id()?, title, description.into(), due_date);
        self.tasks.push(task);
        if let Err(err) = self.persist() {
            self.tasks.pop();
            return Err(err);
        }

        let task = &self.tasks[self.tasks.len() - 1];
        info!(id = task.id, "Task '{}' added successfully!", task.title);
        Ok(task)
    }

    /// Tasks ordered by due date, undated ones last. Ties keep insertion order.
    pub fn list(&self) -> Vec<&Task> {
        let mut sorted: Vec<&Task> = self.tasks.iter().collect();
        // `None < Some(_)` for Option, so key on "has no date" first.
        sorted.sort_by_key(|t| (t.due_date.is_none(), t.due_date));
        sorted
    }

    pub fn mark_complete(&mut self, id: u32) -> Result<&Task> {
        let index = self.position(id)?;
        let previous = std::mem::replace(&mut self.tasks[index].status, TaskStatus::Completed);
        if let Err(err) = self.persist() {
            self.tasks[index].status = previous;
            return Err(err);
        }

        let task = &self.tasks[index];
        info!(id, "Task '{}' marked as completed!", task.title);
        Ok(task)
    }

    pub fn delete(&mut self, id: u32) -> Result<Task> {
        let index = self.position(id)?;
        let removed = self.tasks.remove(index);
        if let Err(err) = self.persist() {
            self.tasks.insert(index, removed);
            return Err(err);
        }

        info!(id, "Task '{}' deleted successfully!", removed.title);
        Ok(removed)
    }

    fn position(&self, id: u32) -> Result<usize> {
        self.tasks.iter().position(|t| t.id == id).ok_or_else(|| {
            info!(id, "Task with ID {} not found.", id);
            StoreError::NotFound(id)
        })
    }

    pub fn get(&self, id: u32) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    /// Tasks in insertion order.
    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}
