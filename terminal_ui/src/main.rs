use std::io;
use std::time::Duration;

use crossterm::{
    event::{self, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use taskdeck_shared::UpdateTaskRequest;
use tokio::runtime::Runtime;
use tui::{
    backend::{Backend, CrosstermBackend},
    Terminal,
};

mod app;
mod client;
mod ui;

use app::{Action, App};
use client::{ClientError, TaskClient};

const TICK: Duration = Duration::from_millis(250);

async fn refresh(client: &TaskClient, app: &mut App) -> Result<(), ClientError> {
    let page = client.list(&app.query).await?;
    let stats = client.stats().await?;
    app.load(page, stats);
    Ok(())
}

/// Carries out an action against the server, then reloads the view.
async fn perform(client: &TaskClient, app: &mut App, action: Action) -> Result<(), ClientError> {
    match action {
        Action::None | Action::Quit => return Ok(()),
        Action::Refresh => {}
        Action::Create(request) => {
            client.create(&request).await?;
        }
        Action::Update(id, patch) => {
            client.update(id, &patch).await?;
        }
        Action::SetStatus(id, status) => {
            client
                .update(id, &UpdateTaskRequest::with_status(status))
                .await?;
        }
        Action::Delete(id) => client.delete(id).await?,
    }
    refresh(client, app).await
}

fn run<B: Backend>(
    terminal: &mut Terminal<B>,
    runtime: &Runtime,
    client: &TaskClient,
    app: &mut App,
) -> Result<(), Box<dyn std::error::Error>> {
    if let Err(error) = runtime.block_on(refresh(client, app)) {
        app.message = Some(error.to_string());
    }

    loop {
        terminal.draw(|f| ui::draw(f, app))?;

        if !event::poll(TICK)? {
            continue;
        }
        let Event::Key(key) = event::read()? else {
            continue;
        };
        if key.kind != KeyEventKind::Press {
            continue;
        }

        let action = app.handle_key(key.code);
        if action == Action::Quit {
            return Ok(());
        }
        if let Err(error) = runtime.block_on(perform(client, app, action)) {
            app.message = Some(error.to_string());
        }
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let client = TaskClient::from_env()?;
    let runtime = Runtime::new()?;

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    terminal.clear()?;

    let mut app = App::new();
    let result = run(&mut terminal, &runtime, &client, &mut app);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}
