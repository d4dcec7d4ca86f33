//! Main event loop for the TUI.
//!
//! Multiplexes terminal input, background task completions, and a periodic
//! tick. The tick drives debounced search dispatch and status line expiry,
//! so no dedicated timer tasks are needed.

use crate::app::{App, AppEvent};
use anyhow::Result;
use crossterm::{
    event::Event,
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use futures::StreamExt;
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io::{self, Stdout};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::Instant;

#[cfg(unix)]
use tokio::signal::unix::{signal, SignalKind};

use super::input::handle_input;
use super::render::render;

/// Result of handling a key press event.
pub enum Action {
    /// Continue the event loop and process more events.
    Continue,
    /// Exit the application and restore the terminal.
    Quit,
}

/// Runs the TUI application event loop.
///
/// Uses `tokio::select!` to multiplex three event sources:
/// - **Terminal input**: key presses from crossterm's async event stream
/// - **Background tasks**: category/company/suggestion completions via the
///   `AppEvent` channel
/// - **Periodic tick**: 100ms timer for debounced search and status expiry
///
/// # Panic Safety
///
/// Installs a panic hook that restores terminal state before unwinding,
/// ensuring the terminal is not left in raw mode on panic.
pub async fn run(
    app: &mut App,
    event_tx: mpsc::Sender<AppEvent>,
    mut event_rx: mpsc::Receiver<AppEvent>,
) -> Result<()> {
    // Install panic hook BEFORE setting up terminal
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
        original_hook(panic_info);
    }));

    let mut terminal = setup_terminal()?;
    let mut event_stream = crossterm::event::EventStream::new();
    let mut tick_interval = tokio::time::interval(Duration::from_millis(100));

    // Signal handlers for graceful shutdown (Unix only)
    #[cfg(unix)]
    let mut sigterm = signal(SignalKind::terminate())?;
    #[cfg(unix)]
    let mut sigint = signal(SignalKind::interrupt())?;

    loop {
        if app.needs_redraw {
            terminal.draw(|f| render(f, app))?;
            app.needs_redraw = false;
        }

        if app.clear_expired_status() {
            app.needs_redraw = true;
        }

        // Drain pending completions before blocking, so rapid typing cannot
        // starve display updates.
        while let Ok(event) = event_rx.try_recv() {
            app.needs_redraw = true;
            app.on_event(event);
        }

        #[cfg(unix)]
        let sigterm_fut = sigterm.recv();
        #[cfg(not(unix))]
        let sigterm_fut = std::future::pending::<Option<()>>();

        #[cfg(unix)]
        let sigint_fut = sigint.recv();
        #[cfg(not(unix))]
        let sigint_fut = std::future::pending::<Option<()>>();

        tokio::select! {
            biased;  // Process in order listed for predictable behavior

            _ = sigterm_fut => {
                tracing::info!("Received SIGTERM, shutting down gracefully");
                break;
            }

            _ = sigint_fut => {
                tracing::info!("Received SIGINT, shutting down gracefully");
                break;
            }

            maybe_event = event_stream.next() => {
                if let Some(Ok(Event::Key(key))) = maybe_event {
                    app.needs_redraw = true;
                    match handle_input(app, key.code, key.modifiers, &event_tx) {
                        Action::Quit => break,
                        Action::Continue => {}
                    }
                }
            }

            Some(event) = event_rx.recv() => {
                app.needs_redraw = true;
                app.on_event(event);
            }

            _ = tick_interval.tick() => {
                app.tick(Instant::now(), &event_tx);
            }
        }
    }

    restore_terminal(terminal)?;
    Ok(())
}

/// Set up the terminal for TUI rendering.
fn setup_terminal() -> Result<Terminal<CrosstermBackend<Stdout>>> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let terminal = Terminal::new(backend)?;
    Ok(terminal)
}

/// Restore terminal to normal state.
fn restore_terminal(mut terminal: Terminal<CrosstermBackend<Stdout>>) -> Result<()> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    Ok(())
}
