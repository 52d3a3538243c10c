use taskdeck_shared::{Task, TaskPriority, TaskStatus};
use tui::{
    backend::Backend,
    layout::{Alignment, Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    text::{Span, Spans},
    widgets::{Block, Borders, List, ListItem, Paragraph},
    Frame,
};

use crate::app::{App, Draft, Field, Mode};

const HELP: &str = "q quit  r refresh  j/k move  h/l page  s status  p priority  n new  e edit  enter advance  c complete  d delete";
const FORM_HELP: &str = "up/down field  tab priority  enter save  esc cancel";

fn status_color(status: TaskStatus) -> Color {
    match status {
        TaskStatus::Todo => Color::Yellow,
        TaskStatus::InProgress => Color::LightBlue,
        TaskStatus::Completed => Color::Green,
    }
}

fn priority_color(priority: TaskPriority) -> Color {
    match priority {
        TaskPriority::Low => Color::Gray,
        TaskPriority::Medium => Color::White,
        TaskPriority::High => Color::LightRed,
        TaskPriority::Urgent => Color::Red,
    }
}

fn task_line(task: &Task) -> Spans<'static> {
    let mut spans = vec![
        Span::styled(
            format!("{:<12}", task.status.as_str()),
            Style::default().fg(status_color(task.status)),
        ),
        Span::styled(
            format!("{:<8}", task.priority.as_str()),
            Style::default().fg(priority_color(task.priority)),
        ),
        Span::raw(task.title.clone()),
    ];
    if let Some(description) = task.description.as_ref().filter(|d| !d.is_empty()) {
        spans.push(Span::raw(": "));
        spans.push(Span::styled(
            description.clone(),
            Style::default().fg(Color::DarkGray),
        ));
    }
    if let Some(due) = task.due_date {
        spans.push(Span::styled(
            format!("  due {}", due.format("%Y-%m-%d")),
            Style::default().fg(Color::Magenta),
        ));
    }
    Spans::from(spans)
}

fn stats_line(app: &App) -> Spans<'static> {
    let stats = app.stats;
    Spans::from(vec![
        Span::raw(format!("total {}  ", stats.total)),
        Span::styled(
            format!("todo {}  ", stats.todo),
            Style::default().fg(status_color(TaskStatus::Todo)),
        ),
        Span::styled(
            format!("in progress {}  ", stats.in_progress),
            Style::default().fg(status_color(TaskStatus::InProgress)),
        ),
        Span::styled(
            format!("completed {}  ", stats.completed),
            Style::default().fg(status_color(TaskStatus::Completed)),
        ),
        Span::styled(
            format!("({}% done)", stats.completion_rate()),
            Style::default().add_modifier(Modifier::BOLD),
        ),
    ])
}

fn draft_lines(draft: &Draft) -> Vec<Spans<'static>> {
    let field = |label: &str, value: &str, active: bool| {
        let cursor = if active { "_" } else { "" };
        let style = if active {
            Style::default().add_modifier(Modifier::BOLD)
        } else {
            Style::default()
        };
        Spans::from(vec![
            Span::styled(format!("{label:<13}"), style),
            Span::raw(format!("{value}{cursor}")),
        ])
    };
    vec![
        field("title", &draft.title, draft.field == Field::Title),
        field("description", &draft.description, draft.field == Field::Description),
        Spans::from(vec![
            Span::raw(format!("{:<13}", "priority")),
            Span::styled(
                draft.priority.as_str(),
                Style::default().fg(priority_color(draft.priority)),
            ),
        ]),
        Spans::from(Span::styled(FORM_HELP, Style::default().fg(Color::DarkGray))),
    ]
}

fn list_title(app: &App) -> String {
    let filter = |value: Option<String>| value.unwrap_or_else(|| "any".to_string());
    format!(
        "tasks [{} total] page {}/{}  status:{} priority:{}",
        app.total,
        app.page(),
        app.total_pages.max(1),
        filter(app.query.status.map(|s| s.to_string())),
        filter(app.query.priority.map(|p| p.to_string())),
    )
}

pub fn draw<B: Backend>(f: &mut Frame<B>, app: &mut App) {
    let footer_height = match app.mode {
        Mode::Browse => 3,
        Mode::Compose(_) => 7,
    };
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints(
            [
                Constraint::Length(3),
                Constraint::Min(3),
                Constraint::Length(footer_height),
            ]
            .as_ref(),
        )
        .split(f.size());

    let stats = Paragraph::new(stats_line(app))
        .block(Block::default().borders(Borders::ALL).title("taskdeck"))
        .alignment(Alignment::Left);
    f.render_widget(stats, chunks[0]);

    let items: Vec<ListItem> = app
        .tasks
        .iter()
        .map(|task| ListItem::new(task_line(task)))
        .collect();
    let list = List::new(items)
        .block(Block::default().borders(Borders::ALL).title(list_title(app)))
        .highlight_style(Style::default().add_modifier(Modifier::REVERSED))
        .highlight_symbol("> ");
    f.render_stateful_widget(list, chunks[1], &mut app.list_state);

    let block = Block::default().borders(Borders::ALL);
    let footer = match &app.mode {
        Mode::Compose(draft) => {
            let heading = if draft.editing.is_some() { "edit task" } else { "new task" };
            let mut lines = draft_lines(draft);
            if let Some(message) = &app.message {
                lines.pop();
                lines.push(Spans::from(Span::styled(
                    message.clone(),
                    Style::default().fg(Color::Red),
                )));
            }
            Paragraph::new(lines).block(block.title(heading))
        }
        Mode::Browse => {
            let text = match &app.message {
                Some(message) => Spans::from(Span::styled(
                    message.clone(),
                    Style::default().fg(Color::Red),
                )),
                None => Spans::from(HELP),
            };
            Paragraph::new(text).block(block)
        }
    };
    f.render_widget(footer, chunks[2]);
}
