//! Output event consumption
//!
//! The consumer half of the bridge's two units of concurrency: it drains the
//! link's bounded event queue, routes each payload into the owning pane's
//! terminal state, and nudges the UI to redraw. Panes appear on the wire
//! before anything announces them, so terminals are created on demand.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::debug;

use muxlink_protocol::{OutputEvent, PaneId};

use crate::terminal::TerminalState;

/// Shared registry of per-pane terminal state.
#[derive(Clone)]
pub struct PaneRouter {
    cols: u16,
    rows: u16,
    panes: Arc<Mutex<HashMap<PaneId, TerminalState>>>,
}

impl PaneRouter {
    /// New router; terminals it creates are sized `cols` x `rows`.
    pub fn new(cols: u16, rows: u16) -> PaneRouter {
        PaneRouter {
            cols,
            rows,
            panes: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Terminal for `pane`, created on first sight.
    pub fn terminal(&self, pane: PaneId) -> TerminalState {
        self.panes
            .lock()
            .entry(pane)
            .or_insert_with(|| {
                debug!(%pane, "new pane terminal");
                TerminalState::new(self.cols, self.rows)
            })
            .clone()
    }

    /// Terminal for `pane` if one exists.
    pub fn get(&self, pane: PaneId) -> Option<TerminalState> {
        self.panes.lock().get(&pane).cloned()
    }

    /// Panes seen so far, in id order.
    pub fn pane_ids(&self) -> Vec<PaneId> {
        let mut ids: Vec<PaneId> = self.panes.lock().keys().copied().collect();
        ids.sort();
        ids
    }
}

/// Spawn the consumer task.
///
/// Runs until the event sequence ends (link EOF or close). Each event is fed
/// to its pane's terminal under that terminal's own lock, then `redraw` is
/// invoked; the link's send lock is never touched here.
pub fn spawn_consumer(
    mut events: mpsc::Receiver<OutputEvent>,
    router: PaneRouter,
    redraw: impl Fn() + Send + 'static,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(event) = events.recv().await {
            let terminal = router.terminal(event.pane);
            terminal.write(&event.data);
            redraw();
        }
        debug!("event consumer exiting");
    })
}
