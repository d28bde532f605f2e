//! Fixed-width text table for `tasktrack list`.

use crate::task::Task;

const TABLE_WIDTH: usize = 100;
const COL_ID: usize = 5;
const COL_TITLE: usize = 20;
const COL_STATUS: usize = 10;
const COL_CREATED: usize = 20;
const COL_DUE: usize = 12;
const COL_DESCRIPTION: usize = 30;

pub const TITLE_MAX_CHARS: usize = 18;
pub const DESCRIPTION_MAX_CHARS: usize = 28;
pub const NO_TASKS_MESSAGE: &str = "No tasks found.";

/// Cuts `s` to at most `max` characters.
pub fn truncate(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

fn row(id: &str, title: &str, status: &str, created: &str, due: &str, description: &str) -> String {
    format!(
        "{:<id_w$} {:<title_w$} {:<status_w$} {:<created_w$} {:<due_w$} {:<desc_w$}",
        id,
        title,
        status,
        created,
        due,
        description,
        id_w = COL_ID,
        title_w = COL_TITLE,
        status_w = COL_STATUS,
        created_w = COL_CREATED,
        due_w = COL_DUE,
        desc_w = COL_DESCRIPTION,
    )
}

pub fn render_table(tasks: &[&Task]) -> String {
    if tasks.is_empty() {
        return format!("{}\n", NO_TASKS_MESSAGE);
    }

    let mut lines = vec![
        String::new(),
        "=".repeat(TABLE_WIDTH),
        row("ID", "TITLE", "STATUS", "CREATED DATE", "DUE DATE", "DESCRIPTION"),
        "-".repeat(TABLE_WIDTH),
    ];
    lines.extend(tasks.iter().map(|task| {
        row(
            &task.id.to_string(),
            truncate(&task.title, TITLE_MAX_CHARS),
            &task.status.to_string(),
            &task.created_date,
            &task.due_label(),
            truncate(&task.description, DESCRIPTION_MAX_CHARS),
        )
    }));
    lines.push("=".repeat(TABLE_WIDTH));
    lines.push(String::new());
    lines.push(String::new());
    lines.join("\n")
}
