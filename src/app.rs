//! Application orchestrator.
//! Loads/merges config, initializes logging, writes the pid file, validates the
//! three roots, installs the interrupt handler, then runs the watch loop.

use anyhow::{Context, Result};
use std::time::Duration;
use tracing::{debug, error, info, warn};

use folder_relay::cli::Args;
use folder_relay::config::{CONFIG_ENV, create_template_config, load_or_default};
use folder_relay::output as out;
use folder_relay::platform::write_pid_file;
use folder_relay::{
    NotifySource, RelayError, TransferPipeline, default_config_path, run_watch_loop, shutdown,
    validate_and_normalize,
};

use crate::logging::init_tracing;

/// Upper bound on how long an idle watcher delays noticing Ctrl-C.
const DISPATCH_TICK: Duration = Duration::from_millis(500);

/// Run the CLI application.
pub fn run(args: Args) -> Result<()> {
    // Both informational modes run before logging init.
    if args.print_config {
        print_config_location();
        return Ok(());
    }
    if args.init_config {
        let path = default_config_path()?;
        create_template_config(&path)?;
        out::print_success(&format!("A template config was written to: {}", path.display()));
        out::print_info("Set watch_path, copy_to_path and backup_path, then start folder_relay again.");
        return Ok(());
    }

    let (mut cfg, cfg_file) = load_or_default()?;
    args.apply_overrides(&mut cfg);

    // Held until the end of run() so buffered lines reach the file.
    let _guard = init_tracing(&cfg, cfg.json).map_err(|e| {
        out::print_error(&format!("Failed to initialize logging: {e}"));
        e
    })?;

    match &cfg_file {
        Some(p) => info!(config = %p.display(), "Loaded config file"),
        None => debug!("No config file found; using defaults and CLI flags"),
    }

    if let Some(pid_path) = cfg.pid_file.as_deref() {
        match write_pid_file(pid_path) {
            Ok(()) => debug!(path = %pid_path.display(), pid = std::process::id(), "Wrote pid file"),
            Err(e) => warn!(path = %pid_path.display(), error = %e, "Could not write pid file"),
        }
    }

    if let Err(e) = validate_and_normalize(&mut cfg) {
        match e.downcast_ref::<RelayError>() {
            Some(re) => error!(code = re.code(), kind = re.kind(), "{re}"),
            None => error!(error = ?e, "Configuration rejected"),
        }
        out::print_error(&format!("{e:#}"));
        return Err(e);
    }

    ctrlc::set_handler(|| {
        shutdown::request();
        out::print_warn("Received interrupt; stopping after the current file...");
    })
    .context("failed to install interrupt handler")?;

    info!(
        watch = %cfg.watch_base.display(),
        copy_to = %cfg.copy_base.display(),
        backup = %cfg.quarantine_base.display(),
        strategy = %cfg.stability,
        timeout_secs = cfg.stability_timeout.as_secs(),
        "Starting folder_relay"
    );

    let pipeline = TransferPipeline::from_config(&cfg);
    let mut source = NotifySource::watch(&cfg.watch_base).inspect_err(|e| {
        error!(code = e.code(), kind = e.kind(), "{e}");
    })?;
    out::print_info(&format!("Watching {} (Ctrl-C to stop)", cfg.watch_base.display()));

    let handled = run_watch_loop(&mut source, &pipeline, DISPATCH_TICK)?;
    debug!(handled, "Exiting");
    Ok(())
}

fn print_config_location() {
    if let Ok(cfg_env) = std::env::var(CONFIG_ENV) {
        out::print_info(&format!("Using {CONFIG_ENV} (explicit):\n  {cfg_env}\n"));
        out::print_info(&format!("To override, unset {CONFIG_ENV} or set it to another file."));
        return;
    }
    match default_config_path() {
        Ok(p) => {
            out::print_info(&format!("Default folder_relay config path:\n  {}\n", p.display()));
            if p.exists() {
                out::print_info("A config file already exists at that location.");
            } else {
                out::print_info("No config file exists there yet. Run with --init-config to create a template.");
            }
        }
        Err(e) => out::print_error(&format!("Could not determine a default config path: {e}")),
    }
}
