use crossterm::event::KeyCode;
use taskdeck_shared::{
    validation::{is_valid_description, is_valid_title, DESCRIPTION_MAX_CHARS, TITLE_MAX_CHARS},
    CreateTaskRequest, Task, TaskId, TaskListQuery, TaskPage, TaskPriority, TaskStats, TaskStatus,
    UpdateTaskRequest,
};
use tui::widgets::ListState;

/// What the event loop should do after a key press.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    None,
    Refresh,
    Create(CreateTaskRequest),
    Update(TaskId, UpdateTaskRequest),
    SetStatus(TaskId, TaskStatus),
    Delete(TaskId),
    Quit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Field {
    #[default]
    Title,
    Description,
}

/// Form state while creating a task or editing the selected one.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Draft {
    /// The task being edited; `None` while composing a new one.
    pub editing: Option<Task>,
    pub title: String,
    pub description: String,
    pub priority: TaskPriority,
    pub field: Field,
}

impl Draft {
    pub fn edit(task: &Task) -> Self {
        Self {
            editing: Some(task.clone()),
            title: task.title.clone(),
            description: task.description.clone().unwrap_or_default(),
            priority: task.priority,
            field: Field::Title,
        }
    }

    fn input(&mut self) -> &mut String {
        match self.field {
            Field::Title => &mut self.title,
            Field::Description => &mut self.description,
        }
    }

    fn switch_field(&mut self) {
        self.field = match self.field {
            Field::Title => Field::Description,
            Field::Description => Field::Title,
        };
    }

    fn next_priority(&mut self) {
        self.priority = cycle(Some(self.priority), &TaskPriority::ALL)
            .unwrap_or(TaskPriority::ALL[0]);
    }

    fn problem(&self) -> Option<String> {
        if !is_valid_title(&self.title) {
            return Some(format!("title must be 1 to {TITLE_MAX_CHARS} characters"));
        }
        if !is_valid_description(&self.description) {
            return Some(format!(
                "description must be at most {DESCRIPTION_MAX_CHARS} characters"
            ));
        }
        None
    }

    /// Builds the request for this draft. Edits only carry the fields that
    /// differ from the task as loaded.
    fn submit(self) -> Action {
        let title = self.title.trim().to_string();
        let description = self.description.trim().to_string();

        let Some(task) = self.editing else {
            return Action::Create(CreateTaskRequest {
                title,
                description: (!description.is_empty()).then_some(description),
                priority: Some(self.priority),
                due_date: None,
            });
        };

        let patch = UpdateTaskRequest {
            title: (title != task.title).then_some(title),
            description: (description != task.description.unwrap_or_default())
                .then_some(description),
            priority: (self.priority != task.priority).then_some(self.priority),
            ..UpdateTaskRequest::default()
        };
        if patch == UpdateTaskRequest::default() {
            return Action::None;
        }
        Action::Update(task.id, patch)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Mode {
    Browse,
    Compose(Draft),
}

pub struct App {
    pub tasks: Vec<Task>,
    pub stats: TaskStats,
    pub query: TaskListQuery,
    pub total: u64,
    pub total_pages: u64,
    pub list_state: ListState,
    pub mode: Mode,
    pub message: Option<String>,
}

impl Default for App {
    fn default() -> Self {
        Self {
            tasks: Vec::new(),
            stats: TaskStats::default(),
            query: TaskListQuery::default(),
            total: 0,
            total_pages: 0,
            list_state: ListState::default(),
            mode: Mode::Browse,
            message: None,
        }
    }
}

fn cycle<T: Copy + PartialEq>(current: Option<T>, all: &[T]) -> Option<T> {
    match current {
        None => all.first().copied(),
        Some(value) => all
            .iter()
            .position(|candidate| *candidate == value)
            .and_then(|index| all.get(index + 1))
            .copied(),
    }
}

impl App {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn load(&mut self, page: TaskPage, stats: TaskStats) {
        self.total = page.total;
        self.total_pages = page.total_pages;
        self.tasks = page.tasks;
        self.stats = stats;

        let selected = match self.list_state.selected() {
            _ if self.tasks.is_empty() => None,
            Some(index) => Some(index.min(self.tasks.len() - 1)),
            None => Some(0),
        };
        self.list_state.select(selected);
    }

    pub fn selected(&self) -> Option<&Task> {
        self.list_state.selected().and_then(|index| self.tasks.get(index))
    }

    pub fn page(&self) -> i64 {
        self.query.page()
    }

    fn move_selection(&mut self, forward: bool) {
        if self.tasks.is_empty() {
            return;
        }
        let last = self.tasks.len() - 1;
        let next = match (self.list_state.selected(), forward) {
            (None, _) => 0,
            (Some(index), true) if index >= last => 0,
            (Some(index), true) => index + 1,
            (Some(0), false) => last,
            (Some(index), false) => index - 1,
        };
        self.list_state.select(Some(next));
    }

    fn turn_page(&mut self, forward: bool) -> Action {
        let page = self.page();
        let last = i64::try_from(self.total_pages).unwrap_or(i64::MAX);
        let target = if forward {
            if page >= last {
                return Action::None;
            }
            page + 1
        } else {
            if page <= 1 {
                return Action::None;
            }
            page - 1
        };
        self.query.page = Some(target);
        self.list_state.select(None);
        Action::Refresh
    }

    fn filters_changed(&mut self) -> Action {
        self.query.page = None;
        self.list_state.select(None);
        Action::Refresh
    }

    pub fn handle_key(&mut self, code: KeyCode) -> Action {
        self.message = None;
        match self.mode {
            Mode::Compose(_) => self.compose_key(code),
            Mode::Browse => self.browse_key(code),
        }
    }

    fn compose_key(&mut self, code: KeyCode) -> Action {
        let Mode::Compose(draft) = &mut self.mode else {
            return Action::None;
        };
        match code {
            KeyCode::Char(c) => draft.input().push(c),
            KeyCode::Backspace => {
                draft.input().pop();
            }
            KeyCode::Up | KeyCode::Down => draft.switch_field(),
            KeyCode::Tab => draft.next_priority(),
            KeyCode::Esc => self.mode = Mode::Browse,
            KeyCode::Enter => {
                if let Some(problem) = draft.problem() {
                    self.message = Some(problem);
                    return Action::None;
                }
                let draft = std::mem::replace(&mut self.mode, Mode::Browse);
                if let Mode::Compose(draft) = draft {
                    return draft.submit();
                }
            }
            _ => {}
        }
        Action::None
    }

    fn browse_key(&mut self, code: KeyCode) -> Action {
        match code {
            KeyCode::Char('q') | KeyCode::Esc => Action::Quit,
            KeyCode::Char('r') => Action::Refresh,
            KeyCode::Down | KeyCode::Char('j') => {
                self.move_selection(true);
                Action::None
            }
            KeyCode::Up | KeyCode::Char('k') => {
                self.move_selection(false);
                Action::None
            }
            KeyCode::Right | KeyCode::Char('l') => self.turn_page(true),
            KeyCode::Left | KeyCode::Char('h') => self.turn_page(false),
            KeyCode::Char('s') => {
                self.query.status = cycle(self.query.status, &TaskStatus::ALL);
                self.filters_changed()
            }
            KeyCode::Char('p') => {
                self.query.priority = cycle(self.query.priority, &TaskPriority::ALL);
                self.filters_changed()
            }
            KeyCode::Char('n') => {
                self.mode = Mode::Compose(Draft::default());
                Action::None
            }
            KeyCode::Char('e') => {
                if let Some(draft) = self.selected().map(Draft::edit) {
                    self.mode = Mode::Compose(draft);
                }
                Action::None
            }
            KeyCode::Enter | KeyCode::Char(' ') => self.selected().map_or(Action::None, |task| {
                Action::SetStatus(task.id, task.status.next())
            }),
            KeyCode::Char('c') => self.selected().map_or(Action::None, |task| {
                Action::SetStatus(task.id, TaskStatus::Completed)
            }),
            KeyCode::Char('d') => self
                .selected()
                .map_or(Action::None, |task| Action::Delete(task.id)),
            _ => Action::None,
        }
    }
}
