mod app;
mod input;
mod surface;
mod ui;

use std::io::{self, Stdout};
use std::time::Duration;

use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use kerbside_rest::BinsClient;
use ratatui::prelude::*;
use tracing::{info, warn};

use app::MapApp;
pub use surface::{DEFAULT_CENTER, Viewport};

use crate::config::Settings;
use crate::error::KerbError;

/// Raw mode, alternate screen and mouse capture for one map session.
///
/// Released on drop, so an early return or a panic unwinding through
/// [`run`] still restores the terminal.
struct TerminalSession {
    terminal: Terminal<CrosstermBackend<Stdout>>,
}

impl TerminalSession {
    fn acquire() -> Result<Self, KerbError> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        if let Err(e) = execute!(stdout, EnterAlternateScreen, EnableMouseCapture) {
            let _ = disable_raw_mode();
            return Err(e.into());
        }
        let terminal = Terminal::new(CrosstermBackend::new(stdout))?;
        Ok(Self { terminal })
    }
}

impl Drop for TerminalSession {
    fn drop(&mut self) {
        if let Err(e) = disable_raw_mode() {
            warn!("failed to leave raw mode: {}", e);
        }
        if let Err(e) = execute!(
            self.terminal.backend_mut(),
            LeaveAlternateScreen,
            DisableMouseCapture
        ) {
            warn!("failed to restore terminal: {}", e);
        }
        let _ = self.terminal.show_cursor();
    }
}

pub async fn run(settings: &Settings, viewport: Viewport) -> Result<(), KerbError> {
    let client = BinsClient::from_config(&settings.client)?;
    let api_base = client.base_url().to_string();
    info!("opening map against {}", api_base);

    let mut app = MapApp::new(
        viewport,
        client,
        settings.role,
        api_base,
        settings.default_priority,
    );

    let mut session = TerminalSession::acquire()?;
    app.mount();
    let result = run_loop(&mut session.terminal, &mut app).await;
    drop(session);

    let surface = app.unmount();
    info!("map closed, {} marker(s) left on the surface", surface.marker_count());

    result
}

async fn run_loop(
    terminal: &mut Terminal<CrosstermBackend<Stdout>>,
    app: &mut MapApp<BinsClient>,
) -> Result<(), KerbError> {
    loop {
        terminal.draw(|f| {
            app.resize(f.area());
            ui::render(f, app);
        })?;

        // Poll for input with a timeout so completions are picked up promptly
        if event::poll(Duration::from_millis(50))? {
            let event = event::read()?;
            input::handle_event(app, event);
        }

        app.poll_completions();

        if app.should_quit {
            break;
        }
    }

    Ok(())
}
