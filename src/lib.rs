//! tasktrack - a personal task list persisted to a single JSON file.
//!
//! [`TaskStore`] owns the tasks and rewrites the file after every change.
//! [`cli`] and [`ui`] are the two front ends built on top of it.

pub mod cli;
pub mod config;
pub mod error;
pub mod input;
pub mod store;
pub mod table;
pub mod task;
pub mod ui;

pub use config::{IdPolicy, LoadPolicy, StoreConfig};
pub use error::{Result, StoreError};
pub use store::{Recovery, TaskStore};
pub use task::{Task, TaskStatus};
