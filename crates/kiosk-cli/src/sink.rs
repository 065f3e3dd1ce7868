//! Console stand-ins for the kiosk's screen and buttons.
//!
//! Notifications are printed to stdout, one line each. Button presses are
//! read from stdin as `logout` or `door`.

use std::io::Write;

use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio::sync::mpsc;
use tracing::{debug, warn};

use kiosk_session::{ControlRequest, Notification};

/// Print notifications to `out` until the controller drops its notifier.
pub async fn run_console_sink<W: Write>(
    mut notifications: mpsc::UnboundedReceiver<Notification>,
    mut out: W,
) {
    while let Some(notification) = notifications.recv().await {
        debug!(?notification, "Display update");
        if let Err(e) = writeln!(out, "{notification}").and_then(|()| out.flush()) {
            warn!(error = %e, "Failed to write to console");
        }
    }
}

/// Forward control lines from `input` until it ends or the controller stops.
pub async fn forward_control<R>(input: R, requests: mpsc::Sender<ControlRequest>)
where
    R: AsyncBufRead + Unpin,
{
    let mut lines = input.lines();

    loop {
        let line = match lines.next_line().await {
            Ok(Some(line)) => line,
            Ok(None) => break,
            Err(e) => {
                warn!(error = %e, "Failed to read control input");
                break;
            }
        };

        if line.trim().is_empty() {
            continue;
        }

        match line.parse::<ControlRequest>() {
            Ok(request) => {
                if requests.send(request).await.is_err() {
                    break;
                }
            }
            Err(e) => warn!(error = %e, "Ignoring control line"),
        }
    }

    debug!("Control input closed");
}
