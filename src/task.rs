use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;

pub const CREATED_DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
pub const DUE_DATE_FORMAT: &str = "%Y-%m-%d";
pub const NO_DUE_DATE: &str = "No due date";

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
pub enum TaskStatus {
    Pending,
    Completed,
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TaskStatus::Pending => f.write_str("Pending"),
            TaskStatus::Completed => f.write_str("Completed"),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Task {
    pub id: u32,
    pub title: String,
    pub description: String,
    pub status: TaskStatus,
    pub created_date: String,
    #[serde(with = "due_date_format", default)]
    pub due_date: Option<NaiveDate>,
}

impl Task {
    /// A fresh `Pending` task stamped with the current local time.
    pub fn new(id: u32, title: String, description: String, due_date: Option<NaiveDate>) -> Self {
        Self {
            id,
            title,
            description,
            status: TaskStatus::Pending,
            created_date: Local::now().format(CREATED_DATE_FORMAT).to_string(),
            due_date,
        }
    }

    pub fn is_completed(&self) -> bool {
        self.status == TaskStatus::Completed
    }

    pub fn due_label(&self) -> String {
        self.due_date
            .map(|d| d.format(DUE_DATE_FORMAT).to_string())
            .unwrap_or_else(|| NO_DUE_DATE.to_string())
    }
}

// Absent due dates are stored as "" rather than null.
mod due_date_format {
    use super::DUE_DATE_FORMAT;
    use chrono::NaiveDate;
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(date: &Option<NaiveDate>, s: S) -> Result<S::Ok, S::Error> {
        match date {
            Some(d) => s.serialize_str(&d.format(DUE_DATE_FORMAT).to_string()),
            None => s.serialize_str(""),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<NaiveDate>, D::Error> {
        let raw = Option::<String>::deserialize(d)?.unwrap_or_default();
        if raw.is_empty() {
            return Ok(None);
        }
        NaiveDate::parse_from_str(&raw, DUE_DATE_FORMAT)
            .map(Some)
            .map_err(|e| de::Error::custom(format!("invalid due_date {:?}: {}", raw, e)))
    }
}
