//! Console notices for the operator who started the watcher.
//! Startup failures and interrupt acknowledgements go here; everything else
//! belongs in the tracing stream. Colors are enabled only on a TTY.

use owo_colors::OwoColorize;

#[derive(Clone, Copy)]
enum Tone {
    Info,
    Ok,
    Warn,
    Error,
}

impl Tone {
    fn label(self) -> &'static str {
        match self {
            Tone::Info => "info:",
            Tone::Ok => "ok:",
            Tone::Warn => "warn:",
            Tone::Error => "error:",
        }
    }

    fn to_stderr(self) -> bool {
        matches!(self, Tone::Warn | Tone::Error)
    }
}

fn emit(tone: Tone, msg: &str) {
    let stream = if tone.to_stderr() {
        atty::Stream::Stderr
    } else {
        atty::Stream::Stdout
    };
    let line = if atty::is(stream) {
        let label = match tone {
            Tone::Info => tone.label().cyan().bold().to_string(),
            Tone::Ok => tone.label().green().bold().to_string(),
            Tone::Warn => tone.label().yellow().bold().to_string(),
            Tone::Error => tone.label().red().bold().to_string(),
        };
        format!("{label} {msg}")
    } else {
        format!("{} {msg}", tone.label())
    };
    if tone.to_stderr() {
        eprintln!("{line}");
    } else {
        println!("{line}");
    }
}

pub fn print_info(msg: &str) {
    emit(Tone::Info, msg);
}

pub fn print_success(msg: &str) {
    emit(Tone::Ok, msg);
}

pub fn print_warn(msg: &str) {
    emit(Tone::Warn, msg);
}

pub fn print_error(msg: &str) {
    emit(Tone::Error, msg);
}
