//! Command input for the engine.
//!
//! Lines read from stdin are parsed into [`Command`]s and forwarded to the
//! runner over a channel. The channel closes when stdin does. Ctrl-C is
//! reported through [`interrupted`], which holds no sender, so it cannot
//! keep the channel open.

use heatgrid_types::Command;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

/// Spawn a task forwarding commands from `reader` until it is exhausted.
///
/// The sender is dropped when the task ends, closing the channel once no
/// other sender remains.
pub fn spawn_command_reader<R>(reader: R, commands: mpsc::Sender<Command>) -> JoinHandle<()>
where
    R: AsyncBufRead + Unpin + Send + 'static,
{
    tokio::spawn(async move {
        let forwarded = forward_commands(reader, &commands).await;
        debug!(forwarded, "command reader finished");
    })
}

/// Resolve on Ctrl-C.
///
/// If the signal handler cannot be installed, this never resolves and the
/// run ends through its other conditions.
pub async fn interrupted() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => debug!("interrupt received"),
        Err(e) => {
            warn!(error = %e, "failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    }
}

/// Parse commands line by line and forward them.
///
/// Blank lines are skipped and unknown commands are logged and ignored.
/// Returns the number of commands forwarded once the reader is exhausted,
/// fails, or the receiving side hangs up.
pub async fn forward_commands<R>(reader: R, commands: &mpsc::Sender<Command>) -> usize
where
    R: AsyncBufRead + Unpin,
{
    let mut lines = reader.lines();
    let mut forwarded: usize = 0;
    loop {
        let line = match lines.next_line().await {
            Ok(Some(line)) => line,
            Ok(None) => break,
            Err(e) => {
                warn!(error = %e, "failed to read command input");
                break;
            }
        };
        if line.trim().is_empty() {
            continue;
        }
        match line.parse::<Command>() {
            Ok(command) => {
                if commands.send(command).await.is_err() {
                    break;
                }
                forwarded = forwarded.saturating_add(1);
            }
            Err(e) => {
                warn!(error = %e, "ignoring input (try start, stop, toggle, quit)");
            }
        }
    }
    forwarded
}
