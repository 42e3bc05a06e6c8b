//! muxlink - local surface for tmux control mode
//!
//! Attaches to a tmux session over the control-mode protocol, mirrors pane
//! output into local terminal state, and forwards keystrokes back. The
//! surface tiles up to four panes and redraws whenever output arrives.

use std::io::Write;
use std::time::Duration;

use clap::Parser;
use crossterm::event::{self, Event as CrosstermEvent, KeyCode, KeyEvent, KeyModifiers};
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, Clear, ClearType, EnterAlternateScreen,
    LeaveAlternateScreen,
};
use crossterm::{cursor, queue};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use muxlink_protocol::{PaneId, SessionTarget};
use muxlink_utils::{init_logging_with_config, LogConfig, MuxlinkError, Result};

mod config;
mod grid;
mod input;
mod layout;
mod link;
mod render;
mod session;
mod terminal;

use config::ClientConfig;
use input::{map_key, KeyAction};
use link::ControlLink;
use session::PaneRouter;

/// Attach to a tmux session in control mode
#[derive(Debug, Parser)]
#[command(name = "muxlink", version)]
struct Args {
    /// Session (or pane) to attach to
    target: String,

    /// Override the configured surface width
    #[arg(long)]
    cols: Option<u16>,

    /// Override the configured surface height
    #[arg(long)]
    rows: Option<u16>,
}

/// Events driving the surface loop
#[derive(Debug)]
enum AppEvent {
    /// Key press from the local terminal
    Key(KeyEvent),
    /// Local terminal resized
    Resize { cols: u16, rows: u16 },
    /// Pane output arrived, repaint
    Redraw,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Log to file; the surface owns stderr's terminal.
    init_logging_with_config(LogConfig::client())?;
    info!("muxlink starting");

    match run_app(args).await {
        Ok(()) => {
            info!("muxlink exiting normally");
            Ok(())
        }
        Err(e) => {
            tracing::error!("muxlink error: {}", e);
            eprintln!("Error: {}", e);
            Err(e)
        }
    }
}

async fn run_app(args: Args) -> Result<()> {
    let config = ClientConfig::load();
    let cols = args.cols.unwrap_or(config.default_cols);
    let rows = args.rows.unwrap_or(config.default_rows);
    let target = SessionTarget::new(args.target);

    let mut link = ControlLink::open(&config.link_config(), target, cols, rows)?;
    let events = link
        .events()
        .ok_or_else(|| MuxlinkError::internal("event stream already taken"))?;
    info!(target = %link.target(), cols, rows, "attached");

    let (tx, mut rx) = mpsc::unbounded_channel();
    let router = PaneRouter::new(cols, rows);

    let redraw_tx = tx.clone();
    let consumer = session::spawn_consumer(events, router.clone(), move || {
        let _ = redraw_tx.send(AppEvent::Redraw);
    });

    start_input_polling(tx);

    let _guard = SurfaceGuard::enter()?;
    let mut stdout = std::io::stdout();
    let mut active: Option<PaneId> = None;

    while let Some(app_event) = rx.recv().await {
        match app_event {
            AppEvent::Key(key) => {
                // Quit and pane-cycling combos belong to the surface and are
                // never forwarded.
                if key.modifiers.contains(KeyModifiers::CONTROL) {
                    match key.code {
                        KeyCode::Char('q') => break,
                        KeyCode::Char('w') => {
                            active = next_pane(&router, active);
                            draw(&mut stdout, &router, active)?;
                            continue;
                        }
                        _ => {}
                    }
                }
                match map_key(&key) {
                    KeyAction::NoOp => {}
                    action => {
                        if let Err(e) = input::dispatch(&link, action) {
                            if e.is_link_dead() {
                                break;
                            }
                            warn!("dispatch failed: {}", e);
                        }
                    }
                }
            }
            AppEvent::Resize { cols, rows } => {
                debug!(cols, rows, "surface resized");
                if let Err(e) = link.resize(cols, rows) {
                    if e.is_link_dead() {
                        break;
                    }
                    warn!("resize failed: {}", e);
                }
                draw(&mut stdout, &router, active)?;
            }
            AppEvent::Redraw => {
                if active.is_none() {
                    active = router.pane_ids().first().copied();
                }
                draw(&mut stdout, &router, active)?;
            }
        }
    }

    link.close();
    let _ = consumer.await;
    Ok(())
}

/// Poll the local terminal for input on a dedicated thread.
///
/// Blocking reads cannot share the async runtime; events are forwarded over
/// the app channel and the thread exits when the receiver is gone.
fn start_input_polling(tx: mpsc::UnboundedSender<AppEvent>) {
    std::thread::spawn(move || loop {
        if event::poll(Duration::from_millis(100)).unwrap_or(false) {
            let forwarded = match event::read() {
                Ok(CrosstermEvent::Key(key)) => tx.send(AppEvent::Key(key)),
                Ok(CrosstermEvent::Resize(cols, rows)) => {
                    tx.send(AppEvent::Resize { cols, rows })
                }
                Ok(_) => Ok(()),
                Err(e) => {
                    warn!("input read failed: {}", e);
                    Ok(())
                }
            };
            if forwarded.is_err() {
                break;
            }
        } else if tx.is_closed() {
            break;
        }
    });
}

fn next_pane(router: &PaneRouter, active: Option<PaneId>) -> Option<PaneId> {
    let ids = router.pane_ids();
    if ids.is_empty() {
        return None;
    }
    let next = match active.and_then(|a| ids.iter().position(|&id| id == a)) {
        Some(pos) => ids[(pos + 1) % ids.len()],
        None => ids[0],
    };
    Some(next)
}

/// Repaint the whole surface.
///
/// Panes are tiled by the layout engine; each pane's terminal is kept sized
/// to its tile so serialized rows fit exactly. Pane counts the tiling does
/// not support fall back to a full-screen view of the active pane.
fn draw(stdout: &mut impl Write, router: &PaneRouter, active: Option<PaneId>) -> Result<()> {
    let (width, height) = crossterm::terminal::size()?;
    let mut ids = router.pane_ids();
    let mut rects = layout::layout(ids.len(), width, height);
    if rects.is_empty() && !ids.is_empty() {
        ids = active.or_else(|| ids.first().copied()).into_iter().collect();
        rects = layout::layout(1, width, height);
    }

    queue!(stdout, Clear(ClearType::All))?;

    let mut cursor_target = None;
    for (id, rect) in ids.iter().zip(rects.iter()) {
        let pane = match router.get(*id) {
            Some(pane) => pane,
            None => continue,
        };
        pane.resize(rect.width(), rect.height());
        let snapshot = pane.snapshot();
        let frame = render::serialize(&snapshot);
        for (row, line) in frame.split('\n').enumerate() {
            queue!(stdout, cursor::MoveTo(rect.x0, rect.y0 + row as u16))?;
            stdout.write_all(line.as_bytes())?;
        }
        if active == Some(*id) && snapshot.cursor_visible {
            let (cx, cy) = snapshot.cursor;
            cursor_target = Some((rect.x0 + cx, rect.y0 + cy));
        }
    }

    match cursor_target {
        Some((x, y)) => queue!(stdout, cursor::MoveTo(x, y), cursor::Show)?,
        None => queue!(stdout, cursor::Hide)?,
    }
    stdout.flush()?;
    Ok(())
}

/// Raw-mode and alternate-screen guard; restores the terminal on drop so an
/// error path cannot leave the user's shell unusable.
struct SurfaceGuard;

impl SurfaceGuard {
    fn enter() -> Result<SurfaceGuard> {
        enable_raw_mode()?;
        crossterm::execute!(std::io::stdout(), EnterAlternateScreen)?;
        Ok(SurfaceGuard)
    }
}

impl Drop for SurfaceGuard {
    fn drop(&mut self) {
        let _ = crossterm::execute!(std::io::stdout(), LeaveAlternateScreen);
        let _ = disable_raw_mode();
    }
}
