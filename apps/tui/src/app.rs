//! Core TUI application state and event loop.

use std::io;
use std::path::PathBuf;
use std::time::Duration;

use color_eyre::eyre::Result;
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind, KeyModifiers},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Paragraph};
use scout_core::pipeline::{DefaultResearcher, SilentProgress};
use scout_core::report;
use scout_shared::{load_config, validate_config};
use tokio::runtime::Runtime;

use crate::screens::{Action, ResearchScreen};
use crate::widgets::status_bar;

/// Application state.
pub(crate) struct App {
    /// Whether the app should quit.
    pub should_quit: bool,
    /// Status message shown in bottom bar.
    pub status: String,
    /// Pending research, run after the "Gathering insights…" frame is drawn.
    pub pending: Option<String>,
    /// Where `s` writes reports.
    pub output_dir: PathBuf,
    pub screen: ResearchScreen,
}

impl App {
    pub(crate) fn new(output_dir: PathBuf) -> Self {
        Self {
            should_quit: false,
            status: "Ready".to_string(),
            pending: None,
            output_dir,
            screen: ResearchScreen::new(),
        }
    }

    fn save(&mut self) {
        let Some(current) = self.screen.report() else {
            return;
        };
        self.status = match report::save_to_dir(current, &self.output_dir) {
            Ok(path) => format!("Report saved to {}", path.display()),
            Err(e) => format!("Save failed: {e}"),
        };
    }
}

/// Entry point: loads config, sets up terminal, runs event loop, restores terminal.
pub(crate) fn run() -> Result<()> {
    // Anything that can fail before drawing fails on a normal terminal.
    let config = load_config()?;
    validate_config(&config)?;
    let runtime = Runtime::new()?;
    let researcher = DefaultResearcher::from_config(&config)?;
    let mut app = App::new(PathBuf::from(&config.defaults.output_dir));

    // Setup
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Run app
    let result = run_app(&mut terminal, &mut app, &runtime, &researcher);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    runtime: &Runtime,
    researcher: &DefaultResearcher,
) -> Result<()> {
    loop {
        terminal.draw(|f| draw(f, app))?;

        if let Some(company) = app.pending.take() {
            let report = runtime.block_on(researcher.research(&company, &SilentProgress));
            app.status = format!("Research for {company} complete. Press s to save.");
            app.screen.set_report(report);
            continue;
        }

        // Poll for events with 100ms timeout for responsive UI
        if event::poll(Duration::from_millis(100))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    handle_key(app, key.code, key.modifiers);
                }
            }
        }

        if app.should_quit {
            break;
        }
    }

    Ok(())
}

fn handle_key(app: &mut App, code: KeyCode, modifiers: KeyModifiers) {
    if let KeyCode::Char('c') = code {
        if modifiers.contains(KeyModifiers::CONTROL) {
            app.should_quit = true;
            return;
        }
    }

    match app.screen.handle_key(code, modifiers) {
        Action::None => {}
        Action::Research(company) => {
            app.status = "Gathering insights…".to_string();
            app.pending = Some(company);
        }
        Action::Save => app.save(),
        Action::Notify(msg) => app.status = msg,
        Action::Quit => app.should_quit = true,
    }
}

fn draw(f: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Title
            Constraint::Min(1),    // Content
            Constraint::Length(1), // Status bar
        ])
        .split(f.area());

    let title = Paragraph::new("Company research from public sources and a local model")
        .style(Style::default().fg(Color::White))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" scout ")
                .title_style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)),
        );
    f.render_widget(title, chunks[0]);

    app.screen.draw(f, chunks[1]);

    let bar = status_bar(&app.status);
    f.render_widget(bar, chunks[2]);
}
