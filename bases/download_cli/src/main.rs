// bases/download_cli/src/main.rs
mod app;
mod args;
mod output;
mod settings;

use app::App;
use args::Args;
use clap::Parser;
use color_eyre::Result;
use tracing_subscriber::EnvFilter;

/// Exit code for a run cut short by Ctrl-C
const EXIT_INTERRUPTED: i32 = 3;

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;

    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| args.log_filter().into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let app = App::new(args);

    tokio::select! {
        result = app.run() => {
            if let Err(error) = result {
                app.print_error(&error);
                std::process::exit(1);
            }
        }
        _ = tokio::signal::ctrl_c() => {
            app.print_interrupted();
            std::process::exit(EXIT_INTERRUPTED);
        }
    }

    Ok(())
}
