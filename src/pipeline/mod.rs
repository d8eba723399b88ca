//! Transfer pipeline: turns a "file created" event into a verified copy and
//! a deleted (or quarantined) original.

mod outcome;
mod request;
mod resolver;
mod transfer;
mod watch;

pub use outcome::TransferOutcome;
pub use request::{Roots, TransferRequest};
pub use resolver::resolve;
pub use transfer::TransferPipeline;
pub use watch::run_watch_loop;
