use anyhow::Result;
use clap::Parser;
use tasktrack::cli::{self, Cli};
use tasktrack::{ui, TaskStore};
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    if std::env::var("TASKTRACK_DEBUG").is_ok() {
        let filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("tasktrack=debug"));
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    }

    let cli = Cli::parse();
    let mut store = TaskStore::open(&cli.store_config())?;
    cli::report_recovery(&store, &mut std::io::stderr().lock())?;

    match cli.command {
        Some(command) => cli::execute(command, &mut store, &mut std::io::stdout().lock()),
        None => ui::run(&mut store),
    }
}
