//! Capacity Tracker Command Line Interface
//!
//! Usage:
//!   capacity init            - Create the database schema
//!   capacity seed            - Insert the default project into an empty database
//!   capacity start           - Start the API server
//!   capacity status          - Show health of a running server
//!   capacity export          - Write all data as JSON
//!   capacity import <file>   - Import an export document
//!   capacity totals          - Show capacity totals through the API
//!
//! The library half also exports [`CapacityClient`], a cache-owning client
//! for the HTTP API.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

pub mod client;
pub mod commands;

pub use client::{CapacityClient, ClientError, ClientResult, Listing, ResourceKind};

/// Default API URL for client commands
pub const DEFAULT_API_URL: &str = "http://localhost:3001";

#[derive(Parser, Debug)]
#[command(name = "capacity")]
#[command(about = "Capacity tracker: projects, employees and the capacity grid")]
#[command(version)]
pub struct Cli {
    /// SQLite database file
    #[arg(short, long, global = true, env = "CAPACITY_DATABASE_PATH")]
    pub database: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create the database schema
    Init,

    /// Insert the default project when no project exists
    Seed,

    /// Start the API server
    Start {
        /// Host to bind to
        #[arg(short = 'H', long, env = "CAPACITY_HOST")]
        host: Option<String>,
        /// Port to listen on
        #[arg(short, long, env = "CAPACITY_PORT")]
        port: Option<u16>,
        /// Serve front-end assets from the static directory
        #[arg(long)]
        production: bool,
        /// Directory of built front-end assets
        #[arg(long, env = "CAPACITY_STATIC_DIR")]
        static_dir: Option<PathBuf>,
        /// Skip seeding an empty database
        #[arg(long)]
        no_seed: bool,
        /// Disable the CORS layer
        #[arg(long)]
        no_cors: bool,
    },

    /// Show health and readiness of a running server
    Status {
        /// API server URL
        #[arg(short, long, env = "CAPACITY_API_URL", default_value = DEFAULT_API_URL)]
        api_url: String,
    },

    /// Export projects, employees and capacity as JSON
    Export {
        /// Output file; stdout when omitted
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Import an export document in one transaction
    Import {
        /// Export document
        file: PathBuf,
    },

    /// Show capacity totals for an employee on a project
    Totals {
        /// API server URL
        #[arg(short, long, env = "CAPACITY_API_URL", default_value = DEFAULT_API_URL)]
        api_url: String,
        /// Employee ID
        #[arg(short, long)]
        employee_id: String,
        /// Project ID
        #[arg(short, long)]
        project_id: String,
        /// Narrow to one country
        #[arg(short, long)]
        country: Option<String>,
        /// Narrow to one task group (requires --country)
        #[arg(short, long, requires = "country")]
        task_group_id: Option<String>,
    },
}

/// Run a parsed command
pub async fn run_command(cli: Cli) -> commands::CmdResult {
    let database = cli.database;
    match cli.command {
        Commands::Init => commands::handle_init(database).await,
        Commands::Seed => commands::handle_seed(database).await,
        Commands::Start {
            host,
            port,
            production,
            static_dir,
            no_seed,
            no_cors,
        } => {
            let options = commands::StartOptions {
                database,
                host,
                port,
                production,
                static_dir,
                no_seed,
                no_cors,
            };
            commands::handle_start(options).await
        }
        Commands::Status { api_url } => commands::handle_status(&api_url).await,
        Commands::Export { output } => commands::handle_export(database, output).await,
        Commands::Import { file } => commands::handle_import(database, &file).await,
        Commands::Totals {
            api_url,
            employee_id,
            project_id,
            country,
            task_group_id,
        } => {
            commands::handle_totals(&api_url, &employee_id, &project_id, country, task_group_id)
                .await
        }
    }
}
