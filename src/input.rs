//! Validation of raw user input before it reaches the store.

use crate::task::DUE_DATE_FORMAT;
use chrono::NaiveDate;

pub const EMPTY_TITLE_MESSAGE: &str = "Error: Task title cannot be empty.";
pub const INVALID_DATE_MESSAGE: &str = "Invalid date format! Task will be added without due date.";
pub const INVALID_ID_MESSAGE: &str = "Invalid ID. Please enter a number.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DueDateInput {
    Blank,
    Date(NaiveDate),
    Invalid,
}

impl DueDateInput {
    /// Invalid input degrades to "no due date".
    pub fn date(self) -> Option<NaiveDate> {
        match self {
            DueDateInput::Date(d) => Some(d),
            DueDateInput::Blank | DueDateInput::Invalid => None,
        }
    }
}

pub fn parse_title(raw: &str) -> Option<String> {
    if raw.trim().is_empty() {
        None
    } else {
        Some(raw.to_string())
    }
}

pub fn parse_due_date(raw: &str) -> DueDateInput {
    let raw = raw.trim();
    if raw.is_empty() {
        return DueDateInput::Blank;
    }
    match NaiveDate::parse_from_str(raw, DUE_DATE_FORMAT) {
        Ok(d) => DueDateInput::Date(d),
        Err(_) => DueDateInput::Invalid,
    }
}

pub fn parse_task_id(raw: &str) -> Option<u32> {
    raw.trim().parse().ok()
}
