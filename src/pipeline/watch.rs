//! Dispatch loop: take one event, run it to completion, repeat.

use std::time::Duration;
use tracing::{error, info};

use super::transfer::TransferPipeline;
use crate::errors::RelayError;
use crate::events::{EventSource, SourcePoll};
use crate::shutdown;

/// Feed events from `source` into `pipeline` until shutdown is requested or
/// the source closes. The stop flag is checked between events only; a
/// transfer in progress always finishes. `tick` bounds how long a quiet
/// source can delay noticing the flag.
///
/// Returns the number of events handled. A source failure is logged and
/// returned.
pub fn run_watch_loop<S>(
    source: &mut S,
    pipeline: &TransferPipeline,
    tick: Duration,
) -> Result<usize, RelayError>
where
    S: EventSource + ?Sized,
{
    info!(watch = %pipeline.roots().watch.display(), "Watch started");
    let mut handled = 0usize;
    let result = loop {
        if shutdown::is_requested() {
            info!("Shutdown requested");
            break Ok(handled);
        }
        match source.next_event(tick) {
            Ok(SourcePoll::Event(event)) => {
                pipeline.handle(&event);
                handled += 1;
            }
            Ok(SourcePoll::Idle) => {}
            Ok(SourcePoll::Closed) => {
                info!("Event source closed");
                break Ok(handled);
            }
            Err(e) => {
                error!(code = e.code(), kind = e.kind(), error = %e, "Event source failed");
                break Err(e);
            }
        }
    };
    info!(handled, "Watch stopped");
    result
}
