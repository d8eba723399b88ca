use anyhow::Result;

mod app;
mod logging;

fn main() -> Result<()> {
    let args = folder_relay::cli::parse();
    app::run(args)
}
