//! apacal — mirror the color DisplayCAL's web interface asks for onto an
//! APA102 LED strip.

use std::path::PathBuf;

use clap::Parser;
use tokio_util::sync::CancellationToken;

mod cli;

#[derive(Parser)]
#[command(
    name = "apacal",
    version,
    about = "Mirror DisplayCAL's requested color onto an APA102 LED strip"
)]
struct Args {
    /// Log every request and received color
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Read settings from this file instead of the default config path
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: cli::Command,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    let filter = if args.verbose {
        "warn,apacal=debug,apacal_lib=debug"
    } else {
        "warn,apacal_lib=info"
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(filter))
        .format_timestamp(None)
        .format_target(false)
        .init();

    // Ctrl+C cancels whatever the subcommand is waiting on.
    let cancel = CancellationToken::new();
    {
        let cancel = cancel.clone();
        if let Err(e) = ctrlc::set_handler(move || cancel.cancel()) {
            log::warn!("could not install Ctrl+C handler: {e}");
        }
    }

    if let Err(e) = cli::run(args.command, args.config.as_deref(), &cancel).await {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
