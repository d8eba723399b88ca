//! XML configuration support.
//! - Overlays settings from config.xml (quick_xml) onto a Config.
//! - Writes a commented template on request (`--init-config`).
//!
//! Notes:
//! - This module only reads/writes the config file; directory validation happens elsewhere.
//! - Unknown XML fields are an error so typos surface before the watcher starts.

use anyhow::{anyhow, bail, Context, Result};
use quick_xml::de::from_str as from_xml_str;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info};

use super::paths::{default_config_path, path_has_symlink_ancestor};
use super::types::{Config, LogLevel};
use super::{POLL_INTERVAL_DEFAULT, STABILITY_TIMEOUT_DEFAULT};
use crate::fs_ops::StabilityStrategy;
use crate::platform::{set_dir_mode_0700, write_config_secure_new_0600};

/// Struct mirroring the XML config for deserialization.
#[derive(Debug, Deserialize)]
#[serde(rename = "config")]
#[serde(deny_unknown_fields)]
struct XmlConfig {
    watch_path: Option<String>,
    copy_to_path: Option<String>,
    backup_path: Option<String>,
    log_level: Option<String>,
    log_dir: Option<String>,
    pid_file: Option<String>,
    strategy: Option<String>,
    #[serde(default, deserialize_with = "de_u64_trimmed_opt")]
    timeout_secs: Option<u64>,
    #[serde(default, deserialize_with = "de_u64_trimmed_opt")]
    poll_interval_ms: Option<u64>,
}

// Optional u64 with surrounding whitespace trimmed; an empty element is unset,
// anything else that is not a number is an error.
fn de_u64_trimmed_opt<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let opt: Option<String> = Option::deserialize(deserializer)?;
    match opt.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(t) => t
            .parse::<u64>()
            .map(Some)
            .map_err(|e| serde::de::Error::custom(format!("invalid number '{t}': {e}"))),
    }
}

fn non_empty_path(s: Option<&str>) -> Option<PathBuf> {
    s.map(str::trim)
        .filter(|t| !t.is_empty())
        .map(PathBuf::from)
}

/// Overlay values present in `path` onto `cfg`; absent fields keep their value.
pub fn apply_xml_file(cfg: &mut Config, path: &Path) -> Result<()> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("read config xml '{}'", path.display()))?;
    let parsed: XmlConfig = from_xml_str(&contents)
        .with_context(|| format!("parse config xml '{}'", path.display()))?;

    if let Some(p) = non_empty_path(parsed.watch_path.as_deref()) {
        cfg.watch_base = p;
    }
    if let Some(p) = non_empty_path(parsed.copy_to_path.as_deref()) {
        cfg.copy_base = p;
    }
    if let Some(p) = non_empty_path(parsed.backup_path.as_deref()) {
        cfg.quarantine_base = p;
    }
    if let Some(p) = non_empty_path(parsed.log_dir.as_deref()) {
        cfg.log_dir = Some(p);
    }
    if let Some(p) = non_empty_path(parsed.pid_file.as_deref()) {
        cfg.pid_file = Some(p);
    }
    if let Some(s) = parsed.log_level.as_deref() {
        cfg.log_level = s
            .parse::<LogLevel>()
            .map_err(|e| anyhow!("{} in '{}'", e, path.display()))?;
    }
    if let Some(s) = parsed.strategy.as_deref() {
        cfg.stability = StabilityStrategy::parse(s).ok_or_else(|| {
            anyhow!("invalid strategy '{}' in '{}'", s.trim(), path.display())
        })?;
    }
    if let Some(secs) = parsed.timeout_secs {
        if secs == 0 {
            bail!("timeout_secs must be greater than zero in '{}'", path.display());
        }
        cfg.stability_timeout = Duration::from_secs(secs);
    }
    if let Some(ms) = parsed.poll_interval_ms {
        if ms == 0 {
            bail!("poll_interval_ms must be greater than zero in '{}'", path.display());
        }
        cfg.poll_interval = Duration::from_millis(ms);
    }
    debug!(path = %path.display(), "applied config xml");
    Ok(())
}

/// Start from defaults and overlay the config file if one exists.
/// Returns the config and the file that was read, if any.
pub fn load_or_default() -> Result<(Config, Option<PathBuf>)> {
    let mut cfg = Config::default();
    let path = default_config_path()?;
    if !path.exists() {
        return Ok((cfg, None));
    }
    apply_xml_file(&mut cfg, &path)?;
    Ok((cfg, Some(path)))
}

/// Write a commented template config to `path`. Refuses to follow symlinked
/// ancestors or to overwrite an existing file.
pub fn create_template_config(path: &Path) -> Result<()> {
    if path_has_symlink_ancestor(path)? {
        bail!(
            "Refusing to create config: ancestor of {} is a symlink",
            path.display()
        );
    }
    if path.exists() {
        bail!("Config file already exists: {}", path.display());
    }

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
        let _ = set_dir_mode_0700(parent);
    }

    let content = format!(
        "<!--\n  folder_relay configuration (XML)\n\n    watch_path        -> directory watched for arriving files (required)\n    copy_to_path      -> directory receiving verified copies (required)\n    backup_path       -> quarantine for originals whose copy did not verify (required)\n    log_level         -> quiet | normal | info | debug\n    log_dir           -> directory for daily rotated log files\n    pid_file          -> file receiving the process id\n    strategy          -> size | rename\n    timeout_secs      -> give up on a file still being written after this long\n    poll_interval_ms  -> gap between stability samples\n\n  CLI flags override XML values.\n-->\n<config>\n  <watch_path>/path/to/watch</watch_path>\n  <copy_to_path>/path/to/copy</copy_to_path>\n  <backup_path>/path/to/backup</backup_path>\n  <log_level>normal</log_level>\n  <strategy>size</strategy>\n  <timeout_secs>{}</timeout_secs>\n  <poll_interval_ms>{}</poll_interval_ms>\n</config>\n",
        STABILITY_TIMEOUT_DEFAULT.as_secs(),
        POLL_INTERVAL_DEFAULT.as_millis(),
    );

    write_config_secure_new_0600(path, content.as_bytes())?;
    info!("Created template config at {}", path.display());
    Ok(())
}
