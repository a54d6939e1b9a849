//! CLI command implementations
//!
//! `serve` startup sequence:
//! 1. Settings load (file, then environment)
//! 2. Logging init
//! 3. Validation
//! 4. Database connect
//! 5. Cache connect (non-fatal)
//! 6. Serve until Ctrl-C
//! 7. Cache close, then database close

use std::path::Path;
use std::sync::Arc;

use serde_json::json;

use crate::auth::{AuthGate, KeyVerifier};
use crate::cache;
use crate::http_server::{shutdown_signal, AppState, HttpServer};
use crate::observability::{init_logging, Event, MetricsRegistry};
use crate::query::{Dataset, FilterCriteria};
use crate::store::Database;

use super::args::Command;
use super::config::Settings;
use super::errors::{CliError, CliResult};
use super::io::write_json;

/// Main CLI entry point
///
/// Parses arguments and dispatches to the appropriate command.
/// This is the only function that main.rs should call.
pub fn run() -> CliResult<()> {
    let cli = super::args::Cli::parse_args();
    run_command(cli.command)
}

/// Run the appropriate command based on CLI args
pub fn run_command(cmd: Command) -> CliResult<()> {
    match cmd {
        Command::Serve { config } => serve(config.as_deref()),
        Command::CheckConfig { config } => check_config(config.as_deref()),
        Command::Explain { dataset, filters } => explain(dataset, &filters.to_criteria()),
    }
}

/// Start the HTTP server and block until shutdown
pub fn serve(config_path: Option<&Path>) -> CliResult<()> {
    let settings = Settings::from_sources(config_path, |key| std::env::var(key).ok())?;
    init_logging(&settings.log_level, settings.log_format());

    tracing::info!(
        event = %Event::BootStart,
        app = %settings.app_name,
        version = env!("CARGO_PKG_VERSION"),
        "Starting"
    );

    settings.validate()?;
    for warning in settings.warnings() {
        tracing::warn!(event = %Event::ConfigLoaded, "{}", warning);
    }
    tracing::info!(
        event = %Event::ConfigLoaded,
        environment = %settings.environment,
        debug = settings.debug,
        "Settings loaded"
    );

    let rt = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(|e| CliError::boot_failed(format!("Failed to create tokio runtime: {}", e)))?;

    rt.block_on(serve_until_shutdown(settings))
}

async fn serve_until_shutdown(settings: Settings) -> CliResult<()> {
    let database = Database::connect(&settings.database)
        .await
        .map_err(|e| CliError::boot_failed(format!("Database connection failed: {}", e)))?;

    let key_cache = cache::connect(&settings.cache).await;

    let metrics = Arc::new(MetricsRegistry::new());
    let verifier = KeyVerifier::new(Arc::new(settings.auth.key_set()), key_cache.clone())
        .with_cache_budget(settings.cache.command_timeout())
        .with_metrics(metrics.clone());
    let gate = AuthGate::new(verifier, settings.auth.proxy_secret.clone(), metrics.clone());

    let state = Arc::new(AppState::new(database.clone(), gate, metrics));
    let server = HttpServer::new(settings.server.clone(), state);

    let served = server.start(shutdown_signal()).await;

    if let Some(key_cache) = key_cache {
        match key_cache.close().await {
            Ok(()) => tracing::info!(event = %Event::CacheClosed, "Cache connection closed"),
            Err(e) => tracing::warn!(event = %Event::CacheClosed, error = %e, "Cache close failed"),
        }
    }

    if let Err(e) = database.close().await {
        tracing::warn!(event = %Event::DatabaseClosed, error = %e, "Database close failed");
    }

    served.map_err(|e| CliError::serve_failed(format!("HTTP server failed: {}", e)))?;

    tracing::info!(event = %Event::ShutdownComplete, "Shutdown complete");
    Ok(())
}

/// Print the effective settings with secrets redacted
pub fn check_config(config_path: Option<&Path>) -> CliResult<()> {
    let settings = Settings::load(config_path)?;

    let warnings = settings.warnings();
    write_json(&json!({
        "settings": serde_json::to_value(settings.redacted())?,
        "warnings": warnings,
    }))
}

/// Print the compiled filter and projection for `criteria`
pub fn explain(dataset: Dataset, criteria: &FilterCriteria) -> CliResult<()> {
    write_json(&explain_document(dataset, criteria))
}

fn explain_document(dataset: Dataset, criteria: &FilterCriteria) -> serde_json::Value {
    let compiler = dataset.compiler();
    let plan = compiler.compile(criteria);
    let documents = plan.to_documents();

    json!({
        "dataset": dataset.as_str(),
        "collection": dataset.collection(),
        "fallback": compiler.options().fallback.as_str(),
        "filter": documents["filter"],
        "projection": documents["projection"],
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_explain_document_for_range() {
        let criteria = FilterCriteria::new().country("Kenya").start_year(2010).end_year(2011);
        let doc = explain_document(Dataset::Economic, &criteria);

        assert_eq!(doc["collection"], "social_collection");
        assert_eq!(doc["fallback"], "default-window");
        assert_eq!(doc["projection"]["2010"], 1);
        assert_eq!(doc["projection"]["2011"], 1);
        assert_eq!(doc["projection"]["_id"], 0);
        assert!(doc["filter"]["$or"].is_array());
    }

    #[test]
    fn test_explain_document_electricity_without_years() {
        let doc = explain_document(Dataset::Electricity, &FilterCriteria::new());

        assert_eq!(doc["collection"], "electrical_collection");
        assert_eq!(doc["fallback"], "metadata-only");
        assert!(doc["projection"].get("2000").is_none());
    }

    #[test]
    fn test_check_config_rejects_bad_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("settings.json");
        fs::write(&path, "{not json").unwrap();

        let err = check_config(Some(&path)).unwrap_err();
        assert_eq!(err.code_str(), "ENERGY_CLI_CONFIG_ERROR");
    }
}
