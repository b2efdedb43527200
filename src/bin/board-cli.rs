//! Command-line client for a running status board.

use clap::{Parser, Subcommand};
use serde_json::{json, Value};
use status_board_sdk::{BoardClient, CheckUpdate, StatusUpdate};

#[derive(Parser)]
#[command(name = "board-cli")]
#[command(about = "Query and update a status board", long_about = None)]
struct Cli {
    /// Base URL of the board.
    #[arg(short, long, default_value = "http://127.0.0.1:9091")]
    url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List services
    List {
        /// Omit health checks
        #[arg(long)]
        summary: bool,
    },
    /// Show one service
    Get { name: String },
    /// Register a service
    Create {
        #[arg(long)]
        name: String,
        #[arg(long = "tag")]
        tags: Vec<String>,
        /// 0 OPERATIONAL, 1 DEGRADED, 2 DOWN, 3 UNKNOWN
        #[arg(long, default_value_t = 0)]
        status: i64,
    },
    /// Remove a service
    Delete { name: String },
    /// Set the status of one health check
    SetCheck {
        service: String,
        title: String,
        /// 0 OK, 1 WARN, 2 CRITICAL, 3 UNKNOWN
        status: i64,
        #[arg(long, default_value = "")]
        details: String,
    },
    /// List dependency edges touching a service
    Deps { name: String },
    /// Check that the board is up
    Health,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = BoardClient::new(&cli.url)?;

    let output: Value = match cli.command {
        Commands::List { summary } => Value::Array(client.list_services(summary).await?),
        Commands::Get { name } => client.get_service(&name).await?,
        Commands::Create { name, tags, status } => {
            let id = client
                .create_service(&json!({ "name": name, "tags": tags, "status": status }))
                .await?;
            json!({ "id": id })
        }
        Commands::Delete { name } => {
            let deleted = client.delete_service(&name).await?;
            if !deleted {
                eprintln!("No service named {:?}", name);
            }
            json!({ "deleted": deleted })
        }
        Commands::SetCheck {
            service,
            title,
            status,
            details,
        } => {
            let update = StatusUpdate {
                name: service,
                health_checks: vec![CheckUpdate { title, status, details }],
            };
            serde_json::to_value(client.push_checks(&update).await?)?
        }
        Commands::Deps { name } => Value::Array(client.dependencies(&name).await?),
        Commands::Health => client.health().await?,
    };

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
