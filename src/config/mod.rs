//! Config module.
//! Provides configuration types, default paths, XML loading, and validation.

pub mod paths;
pub mod types;
mod validate;
pub mod xml;

use std::time::Duration;

pub use paths::{default_config_path, default_log_dir, path_has_symlink_ancestor};
pub use types::{Config, LogLevel};
pub use validate::validate_and_normalize;
pub use xml::{apply_xml_file, create_template_config, load_or_default};

/// Environment variable naming an explicit config.xml.
pub const CONFIG_ENV: &str = "FOLDER_RELAY_CONFIG";
/// Budget for a single file to stop growing before the transfer is abandoned.
pub const STABILITY_TIMEOUT_DEFAULT: Duration = Duration::from_secs(600);
/// Gap between two stability samples.
pub const POLL_INTERVAL_DEFAULT: Duration = Duration::from_secs(1);
/// Fixed-name file receiving the process id at startup.
pub const PID_FILE_NAME: &str = "pid";
