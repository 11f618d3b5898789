//! Exchange event source replayed from JSON lines.
//!
//! One [`ExchangeEvent`] per line. Blank lines are skipped; lines that fail
//! to parse are logged and skipped so one bad record never stops a session.

use pairmaker_core::ExchangeEvent;
use pairmaker_telemetry::Metrics;
use tokio::fs::File;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::app::AppEvent;
use crate::error::AppResult;

/// Boxed line source.
pub type EventReader = Box<dyn AsyncBufRead + Unpin + Send>;

/// Open the event source: `-` reads stdin, anything else is a file path.
pub async fn open(path: &str) -> AppResult<EventReader> {
    if path == "-" {
        info!("Reading exchange events from stdin");
        return Ok(Box::new(BufReader::new(tokio::io::stdin())));
    }
    info!(path, "Reading exchange events from file");
    let file = File::open(path).await?;
    Ok(Box::new(BufReader::new(file)))
}

/// Counters for one replay run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReplayStats {
    pub forwarded: u64,
    pub skipped: u64,
}

/// Read events until end of input, shutdown, or the receiver going away.
pub async fn run_reader<R>(
    reader: R,
    tx: mpsc::Sender<AppEvent>,
    shutdown: CancellationToken,
) -> AppResult<ReplayStats>
where
    R: AsyncBufRead + Unpin,
{
    let mut lines = reader.lines();
    let mut stats = ReplayStats::default();
    let mut line_number = 0u64;

    loop {
        let line = tokio::select! {
            biased;
            () = shutdown.cancelled() => {
                debug!("Replay stopped by shutdown");
                break;
            }
            line = lines.next_line() => line?,
        };
        let Some(line) = line else {
            break;
        };
        line_number += 1;

        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        let event = match ExchangeEvent::from_json_line(trimmed) {
            Ok(event) => event,
            Err(e) => {
                warn!(line_number, error = %e, "Skipping malformed event");
                Metrics::malformed_event();
                stats.skipped += 1;
                continue;
            }
        };

        if tx.send(AppEvent::Exchange(event)).await.is_err() {
            debug!("Event loop closed, stopping replay");
            break;
        }
        stats.forwarded += 1;
    }

    info!(
        forwarded = stats.forwarded,
        skipped = stats.skipped,
        "Replay finished"
    );
    Ok(stats)
}
