//! Command handlers for the CLI

use capacity_api::{run_server, RunMode, ServerConfig};
use capacity_core::store::TransferStore;
use capacity_core::{CapacityScope, ImportBundle};
use capacity_db::{seed_if_empty, CapacityDatabase, TransferService};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::client::CapacityClient;

pub type CmdResult = Result<(), Box<dyn std::error::Error + Send + Sync>>;

/// Database path from the flag, else from the environment
fn database_path(database: Option<PathBuf>) -> PathBuf {
    database.unwrap_or_else(|| ServerConfig::from_env().database_path)
}

/// Open the database and make sure its schema exists
async fn open_database(database: Option<PathBuf>) -> Result<Arc<CapacityDatabase>, capacity_db::DbError> {
    let path = database_path(database);
    let database = CapacityDatabase::connect(&path).await?;
    database.init_schema().await?;
    Ok(Arc::new(database))
}

/// Handle init command
pub async fn handle_init(database: Option<PathBuf>) -> CmdResult {
    let path = database_path(database.clone());
    println!("Initializing capacity database at {}...", path.display());

    open_database(database).await?;

    println!("Database schema initialized successfully.");
    Ok(())
}

/// Handle seed command
pub async fn handle_seed(database: Option<PathBuf>) -> CmdResult {
    let database = open_database(database).await?;

    if seed_if_empty(&database).await? {
        println!("Default project seeded.");
    } else {
        println!("Projects already exist; nothing seeded.");
    }
    Ok(())
}

/// Flags of the start command
#[derive(Debug, Default)]
pub struct StartOptions {
    pub database: Option<PathBuf>,
    pub host: Option<String>,
    pub port: Option<u16>,
    pub production: bool,
    pub static_dir: Option<PathBuf>,
    pub no_seed: bool,
    pub no_cors: bool,
}

impl StartOptions {
    /// Apply the flags over `base`
    pub fn apply(self, mut base: ServerConfig) -> ServerConfig {
        if let Some(database) = self.database {
            base.database_path = database;
        }
        if let Some(host) = self.host {
            base.host = host;
        }
        if let Some(port) = self.port {
            base.port = port;
        }
        if self.production {
            base.mode = RunMode::Production;
        }
        if let Some(static_dir) = self.static_dir {
            base.static_dir = static_dir;
        }
        if self.no_seed {
            base.seed = false;
        }
        if self.no_cors {
            base.enable_cors = false;
        }
        base
    }
}

/// Handle start command
pub async fn handle_start(options: StartOptions) -> CmdResult {
    let config = options.apply(ServerConfig::from_env());
    println!(
        "Starting capacity API server on {} ({} mode)...",
        config.bind_address(),
        config.mode
    );

    run_server(config).await
}

/// Handle status command
pub async fn handle_status(api_url: &str) -> CmdResult {
    println!("Checking capacity server status at {}...", api_url);

    let client = CapacityClient::new(api_url)?;
    let health = client.health().await?;
    println!("Status: {} (version {})", health.status, health.version);

    let ready = client.ready().await?;
    println!("Readiness: {}", ready.status);
    for (check, ok) in ready.checks.unwrap_or_default() {
        println!("  {}: {}", check, if ok { "ok" } else { "FAILED" });
    }
    Ok(())
}

/// Handle export command
pub async fn handle_export(database: Option<PathBuf>, output: Option<PathBuf>) -> CmdResult {
    let database = open_database(database).await?;
    let bundle = TransferService::new(database).export_all().await?;
    let json = serde_json::to_string_pretty(&bundle)?;

    match output {
        Some(path) => {
            std::fs::write(&path, json)?;
            eprintln!(
                "Exported {} projects, {} employees, {} capacity entries to {}",
                bundle.projects.len(),
                bundle.employees.len(),
                bundle.capacity.len(),
                path.display()
            );
        }
        None => println!("{}", json),
    }
    Ok(())
}

/// Read an import document from disk
pub fn read_import_file(file: &Path) -> Result<ImportBundle, Box<dyn std::error::Error + Send + Sync>> {
    let raw = std::fs::read_to_string(file)
        .map_err(|e| format!("Cannot read {}: {}", file.display(), e))?;
    Ok(serde_json::from_str(&raw)?)
}

/// Handle import command
pub async fn handle_import(database: Option<PathBuf>, file: &Path) -> CmdResult {
    let bundle = read_import_file(file)?;
    let database = open_database(database).await?;

    let summary = TransferService::new(database).import_all(bundle).await?;

    println!("Import completed successfully!");
    println!("  Projects: {}", summary.projects);
    println!("  Employees: {}", summary.employees);
    println!("  Capacity entries: {}", summary.capacity);
    Ok(())
}

/// Handle totals command
pub async fn handle_totals(
    api_url: &str,
    employee_id: &str,
    project_id: &str,
    country: Option<String>,
    task_group_id: Option<String>,
) -> CmdResult {
    let client = CapacityClient::new(api_url)?;

    let mut scope = CapacityScope::project(employee_id, project_id);
    let mut label = format!("{} on {}", employee_id, project_id);
    if let Some(country) = country {
        label.push_str(&format!(" in {}", country));
        scope = scope.country(country);
    }
    if let Some(task_group_id) = task_group_id {
        label.push_str(&format!(" for task group {}", task_group_id));
        scope = scope.task_group(task_group_id);
    }

    let total = client.total(&scope).await?;
    println!("Total for {}: {}", label, total);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use capacity_api::DEFAULT_PORT;

    #[test]
    fn test_start_options_override_config() {
        let options = StartOptions {
            database: Some(PathBuf::from("other.db")),
            port: Some(4000),
            production: true,
            no_seed: true,
            ..Default::default()
        };
        let config = options.apply(ServerConfig::default());
        assert_eq!(config.database_path, PathBuf::from("other.db"));
        assert_eq!(config.port, 4000);
        assert_eq!(config.mode, RunMode::Production);
        assert!(!config.seed);
        assert!(config.enable_cors);
        assert_eq!(config.host, "0.0.0.0");
    }

    #[test]
    fn test_start_options_without_flags_keep_config() {
        let config = StartOptions::default().apply(ServerConfig::default());
        assert_eq!(config.port, DEFAULT_PORT);
        assert_eq!(config.mode, RunMode::Development);
        assert!(config.seed);
    }

    #[tokio::test]
    async fn test_export_then_import_between_files() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("source.db");
        let target = dir.path().join("target.db");
        let dump = dir.path().join("dump.json");

        handle_seed(Some(source.clone())).await.unwrap();
        handle_export(Some(source), Some(dump.clone())).await.unwrap();
        handle_import(Some(target.clone()), &dump).await.unwrap();

        let bundle = read_import_file(&dump).unwrap();
        assert_eq!(bundle.projects.len(), 1);

        let database = open_database(Some(target)).await.unwrap();
        let exported = TransferService::new(database).export_all().await.unwrap();
        assert_eq!(exported.projects.len(), 1);
        assert_eq!(exported.projects[0].id, capacity_db::SEED_PROJECT_ID);
    }

    #[tokio::test]
    async fn test_import_missing_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        let result = handle_import(
            Some(dir.path().join("t.db")),
            &dir.path().join("missing.json"),
        )
        .await;
        assert!(result.is_err());
    }
}
