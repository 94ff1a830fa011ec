//! cvagent CLI: the main entry point.
//!
//! Commands:
//! - `onboard`: write a default config file
//! - `ask`: interactive chat or single-question mode
//! - `subjects`: list configured subjects and test routing
//! - `doctor`: diagnose configuration

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(
    name = "cvagent",
    about = "cvagent: ask questions about a team's résumés",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize configuration
    Onboard,

    /// Ask questions about the indexed résumés
    Ask {
        /// Ask a single question instead of entering interactive mode
        #[arg(short, long)]
        message: Option<String>,
    },

    /// List configured subjects
    Subjects {
        /// Show which subjects this text would be routed to
        #[arg(short, long)]
        resolve: Option<String>,
    },

    /// Diagnose configuration problems
    Doctor,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with_target(false)
        .init();

    match cli.command {
        Commands::Onboard => commands::onboard::run().await?,
        Commands::Ask { message } => commands::ask::run(message, cli.verbose).await?,
        Commands::Subjects { resolve } => commands::subjects::run(resolve).await?,
        Commands::Doctor => commands::doctor::run().await?,
    }

    Ok(())
}
