//! Main application loops.
//!
//! Two front ends share one `Session`:
//! - full-screen board: key events edit the search box, frames redraw
//! - plain output: each stdin line is a new query, card changes are printed

use crate::config::AppConfig;
use crate::error::AppResult;
use crate::session::Session;
use crossterm::event::{Event, EventStream};
use futures_util::StreamExt;
use std::io::{self, Stdout};
use tickr_dashboard::{InputAction, PlainSurface, TerminalGuard, TerminalSurface};
use tickr_registry::{HttpSnapshotProvider, InstrumentRegistry};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::time::{self, Instant, MissedTickBehavior};
use tracing::{info, warn};

/// Front end selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiMode {
    Terminal,
    Plain,
}

/// Main application.
pub struct Application {
    config: AppConfig,
    mode: UiMode,
    registry: InstrumentRegistry,
    provider: HttpSnapshotProvider,
}

impl Application {
    pub fn new(config: AppConfig, mode: UiMode) -> AppResult<Self> {
        let registry = InstrumentRegistry::new(&config.instruments)?;
        let provider = HttpSnapshotProvider::new(&config.snapshot_url, config.snapshot_timeout())?;

        info!(
            instruments = registry.len(),
            snapshot_url = %provider.url(),
            ws_url = %config.ws_url,
            ?mode,
            "Application configured"
        );

        Ok(Self {
            config,
            mode,
            registry,
            provider,
        })
    }

    /// Run until the user quits or Ctrl-C.
    pub async fn run(self) -> AppResult<()> {
        match self.mode {
            UiMode::Terminal => self.run_terminal().await,
            UiMode::Plain => self.run_plain().await,
        }
    }

    async fn run_terminal(self) -> AppResult<()> {
        let mut guard = TerminalGuard::enter()?;
        let surface = TerminalSurface::new(self.config.display.title.clone());
        let (mut session, mut feed_rx) =
            Session::new(&self.config, self.registry, self.provider, surface);

        session.begin_loading();
        guard.draw(session.surface())?;

        // Keys are not read while loading; Ctrl-C still aborts.
        let loaded = tokio::select! {
            result = session.fetch_snapshot() => Some(result),
            _ = tokio::signal::ctrl_c() => None,
        };
        let Some(result) = loaded else {
            info!("Interrupted while loading");
            return Ok(());
        };
        session.complete_start(result);
        guard.draw(session.surface())?;

        let mut events = EventStream::new();
        let mut frames = time::interval(self.config.display.frame_interval());
        frames.set_missed_tick_behavior(MissedTickBehavior::Skip);

        info!("Entering main event loop");
        loop {
            tokio::select! {
                Some(envelope) = feed_rx.recv() => session.handle_feed(envelope),

                event = events.next() => match event {
                    Some(Ok(Event::Key(key))) => match session.surface_mut().handle_key(key) {
                        InputAction::QueryChanged(query) => {
                            session.apply_filter(&query);
                        }
                        InputAction::Quit => break,
                        InputAction::None => {}
                    },
                    // Resize and others are picked up by the next frame
                    Some(Ok(_)) => {}
                    Some(Err(e)) => {
                        warn!(error = %e, "Terminal input error");
                        break;
                    }
                    None => break,
                },

                _ = frames.tick() => guard.draw(session.surface())?,

                _ = reconnect_timer(session.reconnect_deadline()) => session.reconnect(),

                _ = tokio::signal::ctrl_c() => {
                    info!("Shutdown signal received");
                    break;
                }
            }
        }

        session.shutdown().await;
        drop(guard);
        Ok(())
    }

    async fn run_plain(self) -> AppResult<()> {
        let surface: PlainSurface<Stdout> = PlainSurface::new(io::stdout());
        let (mut session, mut feed_rx) =
            Session::new(&self.config, self.registry, self.provider, surface);

        session.begin_loading();
        let loaded = tokio::select! {
            result = session.fetch_snapshot() => Some(result),
            _ = tokio::signal::ctrl_c() => None,
        };
        let Some(result) = loaded else {
            info!("Interrupted while loading");
            return Ok(());
        };
        session.complete_start(result);
        session.surface_mut().flush()?;

        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        let mut stdin_open = true;

        info!("Entering main event loop");
        loop {
            tokio::select! {
                Some(envelope) = feed_rx.recv() => session.handle_feed(envelope),

                line = lines.next_line(), if stdin_open => match line {
                    Ok(Some(query)) => {
                        let visible = session.apply_filter(&query);
                        info!(query = %query.trim(), visible, "Filter changed");
                    }
                    Ok(None) => stdin_open = false,
                    Err(e) => {
                        warn!(error = %e, "Failed to read stdin");
                        stdin_open = false;
                    }
                },

                _ = reconnect_timer(session.reconnect_deadline()) => session.reconnect(),

                _ = tokio::signal::ctrl_c() => {
                    info!("Shutdown signal received");
                    break;
                }
            }
            session.surface_mut().flush()?;
        }

        session.shutdown().await;
        session.surface_mut().flush()?;
        Ok(())
    }
}

/// Resolves at `deadline`, or never when there is none.
async fn reconnect_timer(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => time::sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}
