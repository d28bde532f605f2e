//! Command-line interface: `tasktrack [add|list|done|delete]`.
//!
//! Running without a subcommand opens the interactive board in [`crate::ui`].

use crate::config::{IdPolicy, LoadPolicy, StoreConfig, DEFAULT_TASK_FILE};
use crate::error::StoreError;
use crate::input::{self, DueDateInput};
use crate::store::TaskStore;
use crate::table;
use anyhow::Result;
use clap::{Parser, Subcommand};
use std::io::Write;
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "tasktrack", version, about = "Personal task tracker")]
pub struct Cli {
    /// Task file to read and write
    #[arg(short, long, global = true, env = "TASKTRACK_FILE", default_value = DEFAULT_TASK_FILE)]
    pub file: PathBuf,

    /// How ids are assigned to new tasks
    #[arg(
        long,
        global = true,
        value_enum,
        env = "TASKTRACK_ID_POLICY",
        default_value = "next-after-max"
    )]
    pub id_policy: IdPolicy,

    /// Fail instead of starting empty when the task file is unreadable
    #[arg(long, global = true, env = "TASKTRACK_STRICT")]
    pub strict: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Add a new task
    Add {
        title: String,

        #[arg(short, long, default_value = "")]
        description: String,

        /// Due date as YYYY-MM-DD
        #[arg(long)]
        due: Option<String>,
    },

    /// List tasks ordered by due date
    #[command(alias = "ls")]
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Mark a task as completed
    #[command(alias = "complete")]
    Done {
        #[arg(value_parser = parse_id_arg)]
        id: u32,
    },

    /// Delete a task
    #[command(alias = "rm")]
    Delete {
        #[arg(value_parser = parse_id_arg)]
        id: u32,
    },
}

fn parse_id_arg(raw: &str) -> std::result::Result<u32, String> {
    input::parse_task_id(raw).ok_or_else(|| input::INVALID_ID_MESSAGE.to_string())
}

impl Cli {
    pub fn store_config(&self) -> StoreConfig {
        let load_policy = if self.strict {
            LoadPolicy::Strict
        } else {
            LoadPolicy::Recover
        };
        StoreConfig::new(&self.file)
            .with_id_policy(self.id_policy)
            .with_load_policy(load_policy)
    }
}

/// Tells the user the task file was unreadable and the store started empty.
pub fn report_recovery(store: &TaskStore, out: &mut impl Write) -> Result<()> {
    if let Some(recovery) = store.recovery() {
        writeln!(out, "{}", recovery.message())?;
    }
    Ok(())
}

/// Runs one subcommand against `store`, writing user-facing messages to `out`.
/// Unknown ids are reported, not treated as failures.
pub fn execute(command: Commands, store: &mut TaskStore, out: &mut impl Write) -> Result<()> {
    match command {
        Commands::Add {
            title,
            description,
            due,
        } => {
            let Some(title) = input::parse_title(&title) else {
                return Err(StoreError::EmptyTitle.into());
            };
            let due = due.as_deref().map(input::parse_due_date).unwrap_or(DueDateInput::Blank);
            if due == DueDateInput::Invalid {
                writeln!(out, "{}", input::INVALID_DATE_MESSAGE)?;
            }
            let task = store.add(title, description, due.date())?;
            writeln!(out, "Task '{}' added successfully!", task.title)?;
        }
        Commands::List { json } => {
            let tasks = store.list();
            if json {
                writeln!(out, "{}", serde_json::to_string_pretty(&tasks)?)?;
            } else {
                write!(out, "{}", table::render_table(&tasks))?;
            }
        }
        Commands::Done { id } => match store.mark_complete(id) {
            Ok(task) => writeln!(out, "Task '{}' marked as completed!", task.title)?,
            Err(err @ StoreError::NotFound(_)) => writeln!(out, "{}", err)?,
            Err(err) => return Err(err.into()),
        },
        Commands::Delete { id } => match store.delete(id) {
            Ok(task) => writeln!(out, "Task '{}' deleted successfully!", task.title)?,
            Err(err @ StoreError::NotFound(_)) => writeln!(out, "{}", err)?,
            Err(err) => return Err(err.into()),
        },
    }
    Ok(())
}
