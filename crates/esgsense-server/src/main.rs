//! esgsense: GDELT news-tone ESG sentiment pipeline.

use std::path::PathBuf;
use std::sync::Arc;

use esgsense_core::EsgSenseConfig;
use esgsense_server::{build_router, validate, AppState, Pipeline};
use tracing::info;
use tracing_subscriber::EnvFilter;

fn resolve_data_dir() -> PathBuf {
    std::env::var("ESGSENSE_DATA_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("data"))
}

fn print_help() {
    println!("esgsense: ESG sentiment analysis over GDELT news tone");
    println!();
    println!("Usage: esgsense <command>");
    println!();
    println!("Commands:");
    println!("  filter [gkg-file] [output]  Select rows mentioning the entity from a raw GKG export");
    println!("  run [input]                 Clean, analyze, store and export the filtered feed");
    println!("  validate [db]               Check the database tables");
    println!("  serve                       Serve the chart-feed API");
    println!("  help                        Show this help message");
    println!();
    println!("Environment:");
    println!("  ESGSENSE_DATA_DIR   data directory (default: data)");
    println!("  ESGSENSE_ENTITY     entity to filter for (default: TESLA)");
    println!("  ESGSENSE_GKG_FILE   raw GKG export (default: <data>/gkg.csv)");
    println!("  PORT                API port (default: 3004)");
    println!("  RUST_LOG            log filter (default: info)");
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args: Vec<String> = std::env::args().collect();
    let command = args.get(1).map(String::as_str).unwrap_or("help");

    let data_dir = resolve_data_dir();
    let config = EsgSenseConfig::from_env(&data_dir)?;
    let paths = &config.data_paths;

    match command {
        "filter" => {
            let input = args
                .get(2)
                .map(PathBuf::from)
                .unwrap_or_else(|| paths.gkg_export.clone());
            let output = args
                .get(3)
                .map(PathBuf::from)
                .unwrap_or_else(|| paths.filtered_csv.clone());
            let report = esgsense_ingest::filter_export(&input, &output, &config.entity)?;
            println!(
                "{} of {} rows mention {} -> {}",
                report.rows_matched,
                report.rows_read,
                config.entity,
                output.display()
            );
        }
        "run" => {
            let input = args
                .get(2)
                .map(PathBuf::from)
                .unwrap_or_else(|| paths.filtered_csv.clone());
            let report = Pipeline::run(paths, &input)?;
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        "validate" => {
            let db = args
                .get(2)
                .map(PathBuf::from)
                .unwrap_or_else(|| paths.database.clone());
            let report = validate::validate(&db);
            validate::print_report(&report);
            std::process::exit(if report.db_valid { 0 } else { 1 });
        }
        "serve" => {
            info!("Data directory: {}", data_dir.display());
            let store = esgsense_store::SqliteStore::open(&paths.database)
                .map_err(|e| anyhow::anyhow!("Failed to open store: {}", e))?;
            info!("Database: {}", store.path().display());
            let port = config.port;
            let state = Arc::new(AppState::new(config, store));
            let app = build_router(state);

            let addr = format!("0.0.0.0:{}", port);
            let listener = tokio::net::TcpListener::bind(&addr).await?;
            info!("esgsense API listening on {}", addr);
            axum::serve(listener, app).await?;
        }
        "--help" | "-h" | "help" => print_help(),
        other => {
            eprintln!("Unknown command: {}. Use 'esgsense help' for usage.", other);
            std::process::exit(1);
        }
    }

    Ok(())
}
