//! Platform-specific helpers.
//! This module hides OS differences (Unix/Windows) behind a uniform API so
//! the rest of the codebase can remain platform-agnostic.

mod temp;

#[cfg(unix)]
mod common_unix;
#[cfg(unix)]
mod unix;
#[cfg(not(unix))]
mod windows;

#[cfg(unix)]
pub use unix::{is_lock_contention, set_dir_mode_0700, write_config_secure_new_0600, write_pid_file};

#[cfg(not(unix))]
pub use windows::{
    is_lock_contention, set_dir_mode_0700, write_config_secure_new_0600, write_pid_file,
};
