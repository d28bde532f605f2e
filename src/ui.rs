use crate::error::StoreError;
use crate::input::{self, DueDateInput};
use crate::store::TaskStore;
use crate::table;
use anyhow::Result;
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    layout::{Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState},
    Frame, Terminal,
};
use std::io;

const HELP: &str = " a:add  c/Enter:complete  d:delete  ↑↓:move  q:quit ";
pub const GOODBYE_MESSAGE: &str = "Exiting Task Manager. Goodbye!";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AddStep {
    Title,
    Description,
    DueDate,
}

impl AddStep {
    fn prompt(self) -> &'static str {
        match self {
            AddStep::Title => "Enter task title: ",
            AddStep::Description => "Enter task description: ",
            AddStep::DueDate => "Enter due date (YYYY-MM-DD) or leave blank: ",
        }
    }
}

#[derive(Debug)]
struct AddForm {
    step: AddStep,
    input: String,
    title: String,
    description: String,
}

impl AddForm {
    fn new() -> Self {
        Self {
            step: AddStep::Title,
            input: String::new(),
            title: String::new(),
            description: String::new(),
        }
    }
}

#[derive(Debug)]
enum Mode {
    Normal,
    Adding(AddForm),
}

/// Board state. `selected` indexes into `store.list()`, not insertion order.
pub struct App<'a> {
    store: &'a mut TaskStore,
    selected: usize,
    mode: Mode,
    message: Option<String>,
}

impl<'a> App<'a> {
    pub fn new(store: &'a mut TaskStore) -> Self {
        let message = store.recovery().map(|r| r.message().replace('\n', " "));
        Self {
            store,
            selected: 0,
            mode: Mode::Normal,
            message,
        }
    }

    #[cfg(test)]
    fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    #[cfg(test)]
    fn selected(&self) -> usize {
        self.selected
    }

    #[cfg(test)]
    fn is_adding(&self) -> bool {
        matches!(self.mode, Mode::Adding(_))
    }

    /// Returns `false` once the user asked to quit.
    pub fn handle_key(&mut self, code: KeyCode) -> Result<bool> {
        if let Mode::Adding(form) = &mut self.mode {
            match code {
                KeyCode::Esc => {
                    self.mode = Mode::Normal;
                    self.message = Some("Add cancelled.".to_string());
                }
                KeyCode::Backspace => {
                    form.input.pop();
                }
                KeyCode::Char(c) => form.input.push(c),
                KeyCode::Enter => self.advance_form()?,
                _ => {}
            }
            return Ok(true);
        }

        match code {
            KeyCode::Char('q') | KeyCode::Esc => return Ok(false),
            KeyCode::Char('a') => {
                self.mode = Mode::Adding(AddForm::new());
                self.message = None;
            }
            KeyCode::Up | KeyCode::Char('k') => {
                self.selected = self.selected.saturating_sub(1);
            }
            KeyCode::Down | KeyCode::Char('j') => {
                if self.selected + 1 < self.store.len() {
                    self.selected += 1;
                }
            }
            KeyCode::Char('c') | KeyCode::Enter => self.complete_selected()?,
            KeyCode::Char('d') => self.delete_selected()?,
            _ => {}
        }
        Ok(true)
    }

    fn advance_form(&mut self) -> Result<()> {
        let Mode::Adding(form) = &mut self.mode else {
            return Ok(());
        };
        let raw = std::mem::take(&mut form.input);
        let step = form.step;

        match step {
            AddStep::Title => match input::parse_title(&raw) {
                Some(title) => {
                    form.title = title;
                    form.step = AddStep::Description;
                }
                None => {
                    self.mode = Mode::Normal;
                    self.message = Some(input::EMPTY_TITLE_MESSAGE.to_string());
                }
            },
            AddStep::Description => {
                form.description = raw;
                form.step = AddStep::DueDate;
            }
            AddStep::DueDate => {
                let due = input::parse_due_date(&raw);
                let title = std::mem::take(&mut form.title);
                let description = std::mem::take(&mut form.description);
                self.mode = Mode::Normal;

                let task = self.store.add(title, description, due.date())?;
                let added = format!("Task '{}' added successfully!", task.title);
                self.message = Some(if due == DueDateInput::Invalid {
                    format!("{} {}", input::INVALID_DATE_MESSAGE, added)
                } else {
                    added
                });
            }
        }
        Ok(())
    }

    fn selected_id(&self) -> Option<u32> {
        self.store.list().get(self.selected).map(|t| t.id)
    }

    fn complete_selected(&mut self) -> Result<()> {
        let Some(id) = self.selected_id() else {
            self.message = Some(table::NO_TASKS_MESSAGE.to_string());
            return Ok(());
        };
        self.message = Some(match self.store.mark_complete(id) {
            Ok(task) => format!("Task '{}' marked as completed!", task.title),
            Err(err @ StoreError::NotFound(_)) => err.to_string(),
            Err(err) => return Err(err.into()),
        });
        Ok(())
    }

    fn delete_selected(&mut self) -> Result<()> {
        let Some(id) = self.selected_id() else {
            self.message = Some(table::NO_TASKS_MESSAGE.to_string());
            return Ok(());
        };
        self.message = Some(match self.store.delete(id) {
            Ok(task) => format!("Task '{}' deleted successfully!", task.title),
            Err(err @ StoreError::NotFound(_)) => err.to_string(),
            Err(err) => return Err(err.into()),
        });
        if self.selected >= self.store.len() {
            self.selected = self.store.len().saturating_sub(1);
        }
        Ok(())
    }
}

pub fn draw(f: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(vec![Constraint::Min(3), Constraint::Length(3)])
        .split(f.area());

    let tasks = app.store.list();
    let header = Row::new(vec![
        "ID",
        "TITLE",
        "STATUS",
        "CREATED DATE",
        "DUE DATE",
        "DESCRIPTION",
    ])
    .style(Style::default().add_modifier(Modifier::BOLD));

    let rows: Vec<Row> = tasks
        .iter()
        .map(|t| {
            let status_style = if t.is_completed() {
                Style::default().fg(Color::Green)
            } else {
                Style::default().fg(Color::Yellow)
            };
            Row::new(vec![
                Cell::from(t.id.to_string()),
                Cell::from(t.title.as_str()).style(Style::default().fg(Color::White)),
                Cell::from(t.status.to_string()).style(status_style),
                Cell::from(t.created_date.as_str()),
                Cell::from(t.due_label()),
                Cell::from(t.description.as_str()),
            ])
        })
        .collect();

    let widths = [
        Constraint::Length(5),
        Constraint::Percentage(25),
        Constraint::Length(10),
        Constraint::Length(20),
        Constraint::Length(12),
        Constraint::Percentage(35),
    ];
    let table = Table::new(rows, widths)
        .header(header)
        .block(
            Block::default()
                .title(format!(" Tasks ({}) ", tasks.len()))
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Cyan)),
        )
        .row_highlight_style(Style::default().add_modifier(Modifier::BOLD | Modifier::REVERSED));

    let mut state = TableState::default();
    if !tasks.is_empty() {
        state.select(Some(app.selected));
    }
    f.render_stateful_widget(table, chunks[0], &mut state);

    let status = match &app.mode {
        Mode::Adding(form) => Line::from(vec![
            Span::styled(form.step.prompt(), Style::default().fg(Color::Cyan)),
            Span::raw(form.input.as_str()),
            Span::raw("_"),
        ]),
        Mode::Normal if tasks.is_empty() && app.message.is_none() => {
            Line::from(table::NO_TASKS_MESSAGE)
        }
        Mode::Normal => Line::from(app.message.as_deref().unwrap_or_default()),
    };
    let footer = Paragraph::new(status).block(Block::default().title(HELP).borders(Borders::ALL));
    f.render_widget(footer, chunks[1]);
}

pub fn run_app<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> Result<()> {
    loop {
        terminal.draw(|f| draw(f, app))?;

        if let Event::Key(key) = event::read()? {
            if key.kind != KeyEventKind::Press {
                continue;
            }
            if !app.handle_key(key.code)? {
                return Ok(());
            }
        }
    }
}

/// Opens the full-screen board and restores the terminal on exit.
pub fn run(store: &mut TaskStore) -> Result<()> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(store);
    let result = run_app(&mut terminal, &mut app);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result?;
    println!("{}", GOODBYE_MESSAGE);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StoreConfig;
    use crate::task::TaskStatus;
    use ratatui::backend::TestBackend;
    use tempfile::{tempdir, TempDir};

    fn setup() -> (TempDir, TaskStore) {
        let temp = tempdir().unwrap();
        let store = TaskStore::open(&StoreConfig::new(temp.path().join("tasks.json"))).unwrap();
        (temp, store)
    }

    fn type_line(app: &mut App, text: &str) {
        for c in text.chars() {
            app.handle_key(KeyCode::Char(c)).unwrap();
        }
        app.handle_key(KeyCode::Enter).unwrap();
    }

    fn screen(app: &App) -> String {
        let mut terminal = Terminal::new(TestBackend::new(120, 12)).unwrap();
        terminal.draw(|f| draw(f, app)).unwrap();
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|c| c.symbol())
            .collect()
    }

    #[test]
    fn test_add_flow() {
        let (_temp, mut store) = setup();
        {
            let mut app = App::new(&mut store);
            app.handle_key(KeyCode::Char('a')).unwrap();
            assert!(app.is_adding());
            type_line(&mut app, "Pay bills");
            type_line(&mut app, "electricity");
            type_line(&mut app, "2024-01-01");
            assert!(!app.is_adding());
            assert_eq!(app.message(), Some("Task 'Pay bills' added successfully!"));
        }
        let task = store.get(1).unwrap();
        assert_eq!(task.description, "electricity");
        assert!(task.due_date.is_some());
    }

    #[test]
    fn test_add_blank_title_returns_to_board() {
        let (_temp, mut store) = setup();
        {
            let mut app = App::new(&mut store);
            app.handle_key(KeyCode::Char('a')).unwrap();
            type_line(&mut app, "   ");
            assert!(!app.is_adding());
            assert_eq!(app.message(), Some(input::EMPTY_TITLE_MESSAGE));
        }
        assert!(store.is_empty());
    }

    #[test]
    fn test_add_invalid_date_adds_without_due_date() {
        let (_temp, mut store) = setup();
        {
            let mut app = App::new(&mut store);
            app.handle_key(KeyCode::Char('a')).unwrap();
            type_line(&mut app, "Buy milk");
            type_line(&mut app, "");
            type_line(&mut app, "31/12/2024");
            assert!(app.message().unwrap().starts_with(input::INVALID_DATE_MESSAGE));
        }
        assert_eq!(store.get(1).unwrap().due_date, None);
    }

    #[test]
    fn test_escape_cancels_add_and_backspace_edits() {
        let (_temp, mut store) = setup();
        let mut app = App::new(&mut store);
        app.handle_key(KeyCode::Char('a')).unwrap();
        app.handle_key(KeyCode::Char('x')).unwrap();
        app.handle_key(KeyCode::Backspace).unwrap();
        app.handle_key(KeyCode::Esc).unwrap();
        assert!(!app.is_adding());
        assert_eq!(app.message(), Some("Add cancelled."));
        assert!(!app.handle_key(KeyCode::Char('q')).unwrap());
    }

    #[test]
    fn test_complete_and_delete_follow_sorted_selection() {
        let (_temp, mut store) = setup();
        store.add("Buy milk", "", None).unwrap();
        store
            .add("Pay bills", "", chrono::NaiveDate::from_ymd_opt(2024, 1, 1))
            .unwrap();
        {
            let mut app = App::new(&mut store);
            // "Pay bills" sorts first.
            app.handle_key(KeyCode::Char('c')).unwrap();
            assert_eq!(app.message(), Some("Task 'Pay bills' marked as completed!"));

            app.handle_key(KeyCode::Down).unwrap();
            app.handle_key(KeyCode::Down).unwrap();
            assert_eq!(app.selected(), 1);
            app.handle_key(KeyCode::Char('d')).unwrap();
            assert_eq!(app.message(), Some("Task 'Buy milk' deleted successfully!"));
            assert_eq!(app.selected(), 0);
        }
        assert_eq!(store.len(), 1);
        assert_eq!(store.get(2).unwrap().status, TaskStatus::Completed);
    }

    #[test]
    fn test_actions_on_empty_board() {
        let (_temp, mut store) = setup();
        let mut app = App::new(&mut store);
        app.handle_key(KeyCode::Char('d')).unwrap();
        assert_eq!(app.message(), Some("No tasks found."));
        app.handle_key(KeyCode::Enter).unwrap();
        assert_eq!(app.message(), Some("No tasks found."));
    }

    #[test]
    fn test_draw_shows_tasks() {
        let (_temp, mut store) = setup();
        store.add("Buy milk", "two litres", None).unwrap();
        let app = App::new(&mut store);
        let text = screen(&app);
        assert!(text.contains("Tasks (1)"));
        assert!(text.contains("Buy milk"));
        assert!(text.contains("No due date"));
        assert!(text.contains("Pending"));
    }

    #[test]
    fn test_board_opens_with_recovery_message() {
        let temp = tempdir().unwrap();
        let config = StoreConfig::new(temp.path().join("tasks.json"));
        std::fs::write(&config.path, "[{").unwrap();
        let mut store = TaskStore::open(&config).unwrap();

        let app = App::new(&mut store);
        let message = app.message().unwrap();
        assert!(message.starts_with("Error loading task data. Starting with empty task list."));
        assert!(!message.contains('\n'));
        assert!(screen(&app).contains("Error loading task data."));
    }

    #[test]
    fn test_draw_empty_board() {
        let (_temp, mut store) = setup();
        let app = App::new(&mut store);
        assert!(screen(&app).contains("No tasks found."));
    }
}
