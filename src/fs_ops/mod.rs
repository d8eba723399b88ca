//! Filesystem operations used by a transfer: stability wait, copy, hash, move.

mod atomic;
mod copy;
mod hasher;
mod helpers;
mod io_copy;
mod metadata;
mod relocate;
mod stability;
mod util;

pub use copy::copy_preserving_metadata;
pub use hasher::{digest, Digest};
pub use helpers::io_hint;
pub use relocate::relocate_file;
pub use stability::{StabilityDetector, StabilityStrategy};
