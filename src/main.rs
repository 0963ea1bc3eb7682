mod advisor;
mod aggregate;
mod cli;
mod error;
mod fmt;
mod ledger;
mod models;
mod prompts;
mod session;
mod settings;
mod tui;

use std::fs::OpenOptions;
use std::sync::Mutex;

use clap::CommandFactory;
use tracing::Level;

use cli::{Cli, Commands};

fn main() {
    // A missing .env is fine; the credential may come from the environment.
    dotenv::dotenv().ok();

    let cli = Cli::parse_args();
    init_logging(cli.verbose, cli.is_interactive());
    let model = cli.model.as_deref();

    let result = match cli.command {
        None => cli::dashboard::run(cli.file.as_deref(), model),
        Some(Commands::Dashboard { ref file }) => cli::dashboard::run(file.as_deref(), model),
        Some(Commands::Summary { ref file }) => cli::summary::run(file),
        Some(Commands::Advice { ref file }) => cli::advise::advice(file, model),
        Some(Commands::Subscriptions { ref file }) => cli::advise::subscriptions(file, model),
        Some(Commands::Goal {
            ref file,
            ref amount,
            ref by,
        }) => cli::advise::goal(file, amount, by, model),
        Some(Commands::Deals {
            ref file,
            ref occupation,
            ref age,
        }) => cli::advise::deals(file, occupation, age, model),
        Some(Commands::Completions { shell }) => {
            clap_complete::generate(
                shell,
                &mut Cli::command(),
                "budget-buddy",
                &mut std::io::stdout(),
            );
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}

/// Log to stderr, or to a file while the dashboard owns the terminal.
fn init_logging(verbosity: u8, interactive: bool) {
    let level = match verbosity {
        0 => Level::WARN,
        1 => Level::INFO,
        _ => Level::DEBUG,
    };
    let builder = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false);

    if !interactive {
        builder.with_writer(std::io::stderr).init();
        return;
    }

    let path = settings::log_path();
    let file = std::fs::create_dir_all(settings::config_dir())
        .and_then(|_| OpenOptions::new().create(true).append(true).open(&path));
    match file {
        Ok(file) => builder.with_ansi(false).with_writer(Mutex::new(file)).init(),
        Err(_) => builder.with_writer(std::io::sink).init(),
    }
}
