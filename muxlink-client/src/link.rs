//! Control link to the tmux control-mode subprocess
//!
//! Owns the `tmux -C` child and its pseudo-terminal. Outbound commands are
//! encoded as single lines and serialized through one exclusive lock so two
//! concurrent sends can never interleave on the wire. Inbound lines are read
//! by a background task that classifies them and hands decoded `%output`
//! payloads to a bounded event channel.

use std::io::{BufRead, BufReader, Read, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use portable_pty::{native_pty_system, Child, CommandBuilder, MasterPty, PtySize};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace, warn};

use muxlink_protocol::{Command, Notification, OutputEvent, SessionTarget};
use muxlink_utils::{MuxlinkError, Result};

/// Default bound of the output event queue
const DEFAULT_EVENT_CAPACITY: usize = 100;

/// Configuration for attaching a control link
#[derive(Debug, Clone)]
pub struct LinkConfig {
    /// Binary to spawn (normally `tmux`)
    pub tmux_bin: String,
    /// Bound of the output event queue; the reader blocks on a full queue
    pub event_capacity: usize,
}

impl Default for LinkConfig {
    fn default() -> Self {
        Self {
            tmux_bin: "tmux".into(),
            event_capacity: DEFAULT_EVENT_CAPACITY,
        }
    }
}

type SharedReader = Arc<Mutex<BufReader<Box<dyn Read + Send>>>>;

/// Handle to an attached control-mode session.
///
/// Created by [`ControlLink::open`]; destroyed by the idempotent
/// [`ControlLink::close`]. All send operations are short, synchronous, and
/// safe to call from a UI event handler.
pub struct ControlLink {
    target: SessionTarget,
    /// Exclusive send lock; commands go out whole lines at a time
    writer: Arc<Mutex<Box<dyn Write + Send>>>,
    closed: Arc<AtomicBool>,
    cancel: CancellationToken,
    child: Mutex<Option<Box<dyn Child + Send + Sync>>>,
    /// Keeps the pty master alive until close; dropping it ends the reader
    master: Mutex<Option<Box<dyn MasterPty + Send>>>,
    events: Option<mpsc::Receiver<OutputEvent>>,
    reader_task: JoinHandle<()>,
}

impl ControlLink {
    /// Attach to `target` by spawning the control-mode subprocess on a pty
    /// sized `cols` x `rows`.
    ///
    /// Control mode does not emit an initial snapshot, so a successful open
    /// immediately sends a resize/refresh and a repaint nudge.
    ///
    /// Must be called from within a tokio runtime; the inbound reader runs as
    /// a background task.
    pub fn open(
        config: &LinkConfig,
        target: SessionTarget,
        cols: u16,
        rows: u16,
    ) -> Result<ControlLink> {
        let pty_system = native_pty_system();
        let pair = pty_system
            .openpty(PtySize {
                rows,
                cols,
                pixel_width: 0,
                pixel_height: 0,
            })
            .map_err(|e| MuxlinkError::channel_start(format!("Failed to open PTY: {}", e)))?;

        let mut cmd = CommandBuilder::new(&config.tmux_bin);
        cmd.args(["-C", "attach-session", "-t", target.as_str()]);

        let child = pair
            .slave
            .spawn_command(cmd)
            .map_err(|e| MuxlinkError::channel_start(format!("Failed to spawn: {}", e)))?;

        let reader = pair
            .master
            .try_clone_reader()
            .map_err(|e| MuxlinkError::channel_start(format!("Failed to clone reader: {}", e)))?;

        let writer = pair
            .master
            .take_writer()
            .map_err(|e| MuxlinkError::channel_start(format!("Failed to get writer: {}", e)))?;

        let link = Self::from_parts(
            reader,
            writer,
            Some(child),
            Some(pair.master),
            target,
            config.event_capacity,
        );

        link.resize(cols, rows)?;
        link.redraw_nudge()?;

        debug!(target = %link.target, cols, rows, "control link opened");
        Ok(link)
    }

    /// Assemble a link from raw transport halves.
    ///
    /// The spawn path goes through here with the pty reader/writer; tests
    /// inject doubles.
    fn from_parts(
        reader: Box<dyn Read + Send>,
        writer: Box<dyn Write + Send>,
        child: Option<Box<dyn Child + Send + Sync>>,
        master: Option<Box<dyn MasterPty + Send>>,
        target: SessionTarget,
        event_capacity: usize,
    ) -> ControlLink {
        let (event_tx, event_rx) = mpsc::channel(event_capacity.max(1));
        let cancel = CancellationToken::new();
        let shared: SharedReader = Arc::new(Mutex::new(BufReader::new(reader)));
        let reader_task = tokio::spawn(read_loop(shared, event_tx, cancel.clone()));

        ControlLink {
            target,
            writer: Arc::new(Mutex::new(writer)),
            closed: Arc::new(AtomicBool::new(false)),
            cancel,
            child: Mutex::new(child),
            master: Mutex::new(master),
            events: Some(event_rx),
            reader_task,
        }
    }

    /// Take the output event receiver.
    ///
    /// The sequence is lazy, finite, and non-restartable: this returns
    /// `Some` exactly once. The stream ends when the subprocess exits, the
    /// pty closes, or the link is closed.
    pub fn events(&mut self) -> Option<mpsc::Receiver<OutputEvent>> {
        self.events.take()
    }

    /// The session target this link controls
    pub fn target(&self) -> &SessionTarget {
        &self.target
    }

    /// Whether [`close`](Self::close) has been called
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    /// Send a resize/refresh for the notional control terminal
    pub fn resize(&self, cols: u16, rows: u16) -> Result<()> {
        self.send(Command::RefreshClient { cols, rows })
    }

    /// Send a named key (`Enter`, `Up`, `C-a`, ...)
    pub fn send_named_key(&self, name: &str) -> Result<()> {
        self.send(Command::SendKey {
            target: self.target.clone(),
            key: name.into(),
        })
    }

    /// Send literal text, preserving the exact rune sequence
    pub fn send_literal_text(&self, text: &str) -> Result<()> {
        self.send(Command::SendLiteral {
            target: self.target.clone(),
            text: text.into(),
        })
    }

    /// Ask the pane to repaint itself
    pub fn redraw_nudge(&self) -> Result<()> {
        self.send(Command::RedrawNudge {
            target: self.target.clone(),
        })
    }

    fn send(&self, command: Command) -> Result<()> {
        if self.is_closed() {
            return Err(MuxlinkError::LinkClosed);
        }
        let line = command.encode();
        let mut writer = self.writer.lock();
        writer
            .write_all(line.as_bytes())
            .and_then(|_| writer.flush())
            .map_err(|e| MuxlinkError::send(e.to_string()))
    }

    /// Close the link: signal shutdown, terminate the subprocess, close the
    /// pty, and end the event sequence. Idempotent; a second call does
    /// nothing and never double-terminates the subprocess.
    pub fn close(&self) {
        if self.closed.swap(true, Ordering::SeqCst) {
            return;
        }

        self.cancel.cancel();

        if let Some(mut child) = self.child.lock().take() {
            if let Err(e) = child.kill() {
                warn!(error = %e, "failed to kill control subprocess");
            }
        }

        // Dropping the master closes the pty and unblocks any in-flight read
        *self.master.lock() = None;

        debug!(target = %self.target, "control link closed");
    }
}

impl Drop for ControlLink {
    fn drop(&mut self) {
        self.close();
        self.reader_task.abort();
    }
}

/// Outcome of one blocking line read
enum ReadResult {
    Line(Vec<u8>),
    Eof,
    Error(String),
}

/// Inbound reader: drains the pty line by line until EOF, error, or
/// cancellation. Decoded `%output` payloads go to the bounded event channel;
/// enqueueing on a full channel blocks, but always races the cancellation
/// token so shutdown is never stuck behind a slow consumer.
async fn read_loop(
    reader: SharedReader,
    event_tx: mpsc::Sender<OutputEvent>,
    cancel: CancellationToken,
) {
    loop {
        if cancel.is_cancelled() {
            break;
        }

        let reader_clone = reader.clone();
        let result = tokio::task::spawn_blocking(move || {
            let mut buf = Vec::new();
            let mut guard = reader_clone.lock();
            match guard.read_until(b'\n', &mut buf) {
                Ok(0) => ReadResult::Eof,
                Ok(_) => ReadResult::Line(buf),
                Err(e) => {
                    if e.kind() == std::io::ErrorKind::BrokenPipe
                        || e.kind() == std::io::ErrorKind::UnexpectedEof
                    {
                        ReadResult::Eof
                    } else {
                        ReadResult::Error(e.to_string())
                    }
                }
            }
        })
        .await;

        match result {
            Ok(ReadResult::Line(mut line)) => {
                while line.last() == Some(&b'\n') || line.last() == Some(&b'\r') {
                    line.pop();
                }
                match Notification::parse(&line) {
                    Notification::Output { pane, data } => {
                        let event = OutputEvent { pane, data };
                        tokio::select! {
                            _ = cancel.cancelled() => break,
                            sent = event_tx.send(event) => {
                                if sent.is_err() {
                                    // Consumer gone; nothing left to feed
                                    break;
                                }
                            }
                        }
                    }
                    Notification::Exit => {
                        debug!("control session sent %exit");
                    }
                    other => {
                        trace!(?other, "ignored control-mode line");
                    }
                }
            }
            Ok(ReadResult::Eof) => {
                debug!("control channel EOF");
                break;
            }
            Ok(ReadResult::Error(e)) => {
                // Pty reads commonly fail with EIO once the child is gone;
                // either way the stream is over.
                warn!(error = %e, "control channel read error");
                break;
            }
            Err(e) => {
                warn!(error = %e, "blocking read task failed");
                break;
            }
        }
    }

    debug!("control link reader exiting");
    // event_tx drops here, terminating the event sequence
}


#[cfg(test)]
mod tests {
    use super::test_support::capturing_link as test_link;
    use super::*;
    use muxlink_protocol::PaneId;

    #[tokio::test]
    async fn events_arrive_in_order_and_terminate() {
        let inbound: &[u8] = b"%begin 1700000000 1 1\n\
            %output %1 hi\\040there\n\
            %end 1700000000 1 1\n\
            %layout-change @0 b25f,80x24,0,0,2\n\
            %output %2 ok\n";
        let (mut link, _captured) = test_link(inbound);
        let mut rx = link.events().expect("first take succeeds");

        let first = rx.recv().await.expect("first event");
        assert_eq!(first.pane, PaneId(1));
        assert_eq!(first.data, b"hi there");

        let second = rx.recv().await.expect("second event");
        assert_eq!(second.pane, PaneId(2));
        assert_eq!(second.data, b"ok");

        // Cursor hits EOF, the sender drops, the sequence ends.
        assert!(rx.recv().await.is_none());
    }

    #[tokio::test]
    async fn events_receiver_taken_once() {
        let (mut link, _captured) = test_link(b"");
        assert!(link.events().is_some());
        assert!(link.events().is_none());
    }

    #[tokio::test]
    async fn sends_encode_full_command_lines() {
        let (link, captured) = test_link(b"");
        link.resize(120, 40).unwrap();
        link.send_named_key("Enter").unwrap();
        link.send_literal_text("a").unwrap();
        link.redraw_nudge().unwrap();

        let bytes = captured.lock().clone();
        let text = String::from_utf8(bytes).unwrap();
        assert_eq!(
            text,
            "refresh-client -C 120,40\n\
             send-keys -t main Enter\n\
             send-keys -t main -l 'a'\n\
             send-keys -t main C-l\n"
        );
    }

    #[tokio::test]
    async fn concurrent_literal_sends_never_interleave() {
        let (link, captured) = test_link(b"");
        let link = Arc::new(link);

        let a = {
            let link = link.clone();
            std::thread::spawn(move || {
                for _ in 0..50 {
                    link.send_literal_text("aaaaaaaaaaaaaaaa").unwrap();
                }
            })
        };
        let b = {
            let link = link.clone();
            std::thread::spawn(move || {
                for _ in 0..50 {
                    link.send_literal_text("bbbbbbbbbbbbbbbb").unwrap();
                }
            })
        };
        a.join().unwrap();
        b.join().unwrap();

        let bytes = captured.lock().clone();
        let text = String::from_utf8(bytes).unwrap();
        let expected_a = "send-keys -t main -l 'aaaaaaaaaaaaaaaa'";
        let expected_b = "send-keys -t main -l 'bbbbbbbbbbbbbbbb'";
        let mut count = 0;
        for line in text.lines() {
            assert!(
                line == expected_a || line == expected_b,
                "interleaved line: {:?}",
                line
            );
            count += 1;
        }
        assert_eq!(count, 100);
    }

    #[tokio::test]
    async fn close_is_idempotent_and_fails_later_sends() {
        let (link, _captured) = test_link(b"");
        assert!(!link.is_closed());

        link.close();
        assert!(link.is_closed());
        link.close(); // second close is a no-op

        let err = link.send_named_key("Enter").unwrap_err();
        assert!(matches!(err, MuxlinkError::LinkClosed));
        let err = link.resize(80, 24).unwrap_err();
        assert!(matches!(err, MuxlinkError::LinkClosed));
    }

    #[tokio::test]
    async fn close_unblocks_reader_on_full_queue() {
        // More output lines than the queue holds, and nothing consuming:
        // the reader fills the queue and blocks on the next enqueue. Close
        // must still wind it down instead of leaving it stuck.
        let mut inbound = Vec::new();
        for i in 0..20 {
            inbound.extend_from_slice(format!("%output %1 line{}\n", i).as_bytes());
        }
        let (link, _captured) = test_link(Box::leak(inbound.into_boxed_slice()));

        tokio::time::sleep(std::time::Duration::from_millis(100)).await;
        assert!(!link.reader_task.is_finished());

        link.close();

        let stopped = tokio::time::timeout(std::time::Duration::from_secs(5), async {
            while !link.reader_task.is_finished() {
                tokio::time::sleep(std::time::Duration::from_millis(10)).await;
            }
        })
        .await;
        assert!(stopped.is_ok(), "reader should stop once shutdown is signalled");
    }

    #[tokio::test]
    async fn close_ends_event_sequence() {
        // A reader with no data pending: after close, the channel must end
        // rather than hang.
        let (mut link, _captured) = test_link(b"");
        let mut rx = link.events().unwrap();
        link.close();
        assert!(rx.recv().await.is_none());
    }

    #[tokio::test]
    async fn pty_backed_link_sends_and_closes() {
        // `cat` on a real pty stands in for tmux: it holds the channel open,
        // echoes lines that parse as unrecognized, and produces no events.
        let pty_system = native_pty_system();
        let pair = pty_system
            .openpty(PtySize {
                rows: 24,
                cols: 80,
                pixel_width: 0,
                pixel_height: 0,
            })
            .unwrap();
        let child = pair.slave.spawn_command(CommandBuilder::new("cat")).unwrap();
        let reader = pair.master.try_clone_reader().unwrap();
        let writer = pair.master.take_writer().unwrap();

        let mut link = ControlLink::from_parts(
            reader,
            writer,
            Some(child),
            Some(pair.master),
            SessionTarget::new("main"),
            16,
        );
        let mut rx = link.events().unwrap();

        link.send_named_key("Enter").unwrap();
        link.close();
        link.close(); // must not double-terminate

        // Killing the child closes the pty slave; the reader winds down and
        // the event sequence ends rather than hanging.
        let next = tokio::time::timeout(std::time::Duration::from_secs(5), rx.recv())
            .await
            .expect("reader should terminate after close");
        assert!(next.is_none());
    }

    #[tokio::test]
    async fn open_missing_binary_is_channel_start_failure() {
        let config = LinkConfig {
            tmux_bin: "/nonexistent/muxlink-test-binary".into(),
            ..LinkConfig::default()
        };
        let result = ControlLink::open(&config, SessionTarget::new("main"), 80, 24);
        match result {
            Err(MuxlinkError::ChannelStart(_)) => {}
            other => panic!("expected ChannelStart, got {:?}", other.map(|_| ())),
        }
    }
}
