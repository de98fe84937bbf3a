//! jobboard-notify - command-line client for job-board notifications.

mod commands;
mod output;
mod session_file;

use anyhow::Result;
use board_config_and_utils::{init_logging, Config, Paths};
use clap::{Parser, Subcommand};
use commands::Context;

/// Sign in to the job board and follow your notifications.
#[derive(Parser)]
#[command(name = "jobboard-notify")]
#[command(about = "Job-board notification client")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format (text or json)
    #[arg(short, long, default_value = "text", global = true)]
    format: output::OutputFormat,

    /// Log level (trace, debug, info, warn, error); defaults to the configured level
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// API base URL, e.g. https://jobs.example.com/api
    #[arg(long, global = true, env = "JOBBOARD_API_URL")]
    api_url: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Login with email and password
    Login {
        /// Account email (prompted if omitted)
        #[arg(short, long)]
        email: Option<String>,
        /// Password (prompted without echo if omitted)
        #[arg(short, long)]
        password: Option<String>,
    },

    /// Logout and clear the saved session
    Logout,

    /// Check authentication status
    Status,

    /// List notifications
    List {
        /// Page number, starting at 1
        #[arg(short, long, default_value = "1")]
        page: u32,
    },

    /// Show the unread notification count
    Count,

    /// Mark one notification as read
    MarkRead {
        /// Notification ID
        id: String,
    },

    /// Mark every notification as read
    MarkAllRead,

    /// Follow notifications in real time until interrupted
    Watch,
}

async fn run(cli: Cli, config: Config, paths: Paths) -> Result<()> {
    let ctx = Context::new(config, paths, cli.format)?;

    match cli.command {
        Commands::Login { email, password } => commands::login(&ctx, email, password).await,
        Commands::Logout => commands::logout(&ctx).await,
        Commands::Status => commands::status(&ctx).await,
        Commands::List { page } => commands::list(&ctx, page).await,
        Commands::Count => commands::count(&ctx).await,
        Commands::MarkRead { id } => commands::mark_read(&ctx, &id).await,
        Commands::MarkAllRead => commands::mark_all_read(&ctx).await,
        Commands::Watch => commands::watch(&ctx).await,
    }
}

fn load_config(cli: &Cli) -> Result<(Config, Paths)> {
    let paths = Paths::new()?;
    paths.ensure_dirs()?;

    let mut config = Config::load(&paths)?;
    if let Some(url) = &cli.api_url {
        config.api_base_url = url.clone();
    }
    Ok((config, paths))
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let format = cli.format;

    let (config, paths) = match load_config(&cli) {
        Ok(loaded) => loaded,
        Err(e) => {
            output::print_error(&format!("{:#}", e), format);
            std::process::exit(1);
        }
    };

    let level = cli.log_level.clone().unwrap_or_else(|| config.log_level.clone());
    init_logging(&level, true);
    tracing::debug!(api_url = %config.api_base_url, "Configuration loaded");

    if let Err(e) = run(cli, config, paths).await {
        output::print_error(&format!("{:#}", e), format);
        std::process::exit(1);
    }
}
