//! `clubhouse`: command-line client for the club administration API.

mod commands;
mod config;
mod entity;
mod error;

use clap::{Parser, Subcommand};
use clubhouse_access::RouteTable;
use clubhouse_api::ApiClient;
use clubhouse_session::SessionStore;
use clubhouse_storage::FileStore;
use rootcause::prelude::Report;
use std::sync::Arc;
use tracing::{info, warn};

use crate::commands::{Console, parse_filter};
use crate::config::ConsoleConfig;
use crate::entity::EntityKind;
use crate::error::ConsoleError;

#[derive(Parser)]
#[command(name = "clubhouse", version)]
#[command(about = "Command-line client for the clubhouse administration API")]
#[command(after_help = concat!(
    "Environment:\n",
    "  CLUBHOUSE_API__BASE_URL   REST API base URL (required)\n",
    "  CLUBHOUSE_STORAGE__PATH   Session file\n",
    "  RUST_LOG                  Log filter",
))]
struct Cli {
    /// Print machine-readable JSON.
    #[arg(long, global = true, default_value_t = false)]
    json: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Sign in and store the credentials.
    Login {
        #[arg(long)]
        email: String,
        #[arg(long, env = "CLUBHOUSE_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Forget the stored credentials.
    Logout,
    /// Show the current session.
    Status,
    /// List the views the current session may open.
    Routes,
    /// Check whether the current session may open a view.
    Can { path: String },
    /// List a collection.
    List {
        #[arg(value_enum)]
        entity: EntityKind,
        /// Query filter, repeatable.
        #[arg(long = "filter", value_name = "KEY=VALUE", value_parser = parse_filter)]
        filters: Vec<(String, String)>,
    },
    /// Fetch one item.
    Get {
        #[arg(value_enum)]
        entity: EntityKind,
        id: String,
    },
    /// Delete one item.
    Delete {
        #[arg(value_enum)]
        entity: EntityKind,
        id: String,
    },
}

#[tokio::main]
async fn main() {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    if let Err(report) = run(cli).await {
        eprintln!("error: {report}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Report<ConsoleError>> {
    let config = ConsoleConfig::from_env().map_err(|e| ConsoleError::Config {
        details: e.to_string(),
    })?;

    let api = ApiClient::new(&config.api).map_err(|e| ConsoleError::Client {
        details: e.to_string(),
    })?;
    let storage = Arc::new(FileStore::new(config.storage.path.clone()));
    let session = SessionStore::bootstrap(api, storage).await;
    info!(phase = %session.phase().await, base_url = %config.api.base_url, "session ready");

    if config.session.revalidate_on_start
        && session.is_authenticated().await
        && !matches!(cli.command, Command::Login { .. } | Command::Logout)
    {
        if let Err(e) = session.revalidate(&config.session.profile_path).await {
            warn!(error = %e, "could not revalidate the stored session; keeping it");
        }
    }

    let console = Console {
        session,
        guard: config.guard.guard(),
        routes: RouteTable::default(),
        json: cli.json,
    };

    match cli.command {
        Command::Login { email, password } => console.login(&email, &password).await,
        Command::Logout => {
            console.logout().await;
            Ok(())
        }
        Command::Status => console.status().await,
        Command::Routes => console.routes().await,
        Command::Can { path } => console.can(&path).await,
        Command::List { entity, filters } => console.list(entity, &filters).await,
        Command::Get { entity, id } => console.get(entity, &id).await,
        Command::Delete { entity, id } => console.delete(entity, &id).await,
    }
}
