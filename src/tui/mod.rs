//! Terminal UI for the tic-tac-toe client

mod app;
mod input;
mod ui;

use anyhow::{Context, Result};
use app::App;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io;
use std::sync::Arc;
use tictactoe_client::{ClientConfig, HttpMoveClient, Interaction, MatchDriver, MatchSnapshot};
use tokio::sync::{mpsc, watch};
use tokio::time::Duration;
use tracing::{debug, error, info, instrument};

/// Run the TUI client
pub async fn run_tui(config: ClientConfig) -> Result<()> {
    // Log to file to avoid interfering with the TUI
    let log_file = std::fs::File::create(config.log_file())
        .with_context(|| format!("Failed to create log file {}", config.log_file()))?;
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info,tictactoe_client=debug")),
        )
        .with_writer(Arc::new(log_file))
        .with_ansi(false)
        .try_init();

    info!(server_url = %config.server_url(), "Starting tic-tac-toe TUI");

    let client = HttpMoveClient::new(config.server_url(), config.request_timeout())?;
    let (driver, snapshots) = MatchDriver::new(
        Arc::new(client),
        config.build_failure_policy(),
        config.timings(),
    );

    let (interaction_tx, interaction_rx) = mpsc::unbounded_channel();
    let driver_task = tokio::spawn(driver.run(interaction_rx));

    let (key_tx, key_rx) = mpsc::unbounded_channel();
    let reader = tokio::task::spawn_blocking(move || read_keys(key_tx));

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = run_app(&mut terminal, snapshots, key_rx, &interaction_tx).await;

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    // Dropping the sender stops the driver even if the loop failed before Quit.
    drop(interaction_tx);
    if let Err(e) = driver_task.await {
        error!(error = %e, "Driver task failed");
    }
    match reader.await {
        Ok(Err(e)) => error!(error = %e, "Key reader failed"),
        Err(e) => error!(error = %e, "Key reader task failed"),
        Ok(Ok(())) => {}
    }

    if let Err(err) = &res {
        error!(error = ?err, "TUI loop error");
    }
    res
}

/// Renders snapshots and forwards key presses until the user quits.
#[instrument(skip_all)]
async fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    mut snapshots: watch::Receiver<MatchSnapshot>,
    mut keys: mpsc::UnboundedReceiver<KeyCode>,
    interactions: &mpsc::UnboundedSender<Interaction>,
) -> Result<()> {
    let mut app = App::new(snapshots.borrow_and_update().clone());

    loop {
        terminal.draw(|f| ui::draw(f, &app))?;

        tokio::select! {
            changed = snapshots.changed() => {
                if changed.is_err() {
                    info!("Driver stopped publishing");
                    return Ok(());
                }
                app.update(snapshots.borrow_and_update().clone());
            }
            key = keys.recv() => {
                let Some(key) = key else {
                    info!("Key reader closed");
                    return Ok(());
                };
                if let Some(interaction) = app.handle_key(key) {
                    debug!(?interaction, "Forwarding interaction");
                    let quit = interaction == Interaction::Quit;
                    interactions
                        .send(interaction)
                        .context("Match driver is not running")?;
                    if quit {
                        info!("User quit");
                        return Ok(());
                    }
                }
            }
        }
    }
}

/// Blocking key reader; runs until the receiving side goes away.
fn read_keys(tx: mpsc::UnboundedSender<KeyCode>) -> io::Result<()> {
    while !tx.is_closed() {
        if event::poll(Duration::from_millis(100))?
            && let Event::Key(key) = event::read()?
            && key.kind == KeyEventKind::Press
            && tx.send(key.code).is_err()
        {
            break;
        }
    }
    Ok(())
}
