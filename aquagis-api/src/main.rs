//! Point d'entrée CLI pour aquagis-api

use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use aquagis_api::config::{LayersConfig, ServiceConfig};
use aquagis_api::request::DmaRequest;
use aquagis_api::store::{create_pool, test_connection, DatabaseConfig, PgAssetStore};
use aquagis_api::{AquagisServer, DmaSettings};
use clap::{Parser, Subcommand};
use tracing::{info, Level};
use tracing_subscriber::{fmt, EnvFilter};

// Charger .env au démarrage
fn load_env() {
    if dotenvy::dotenv().is_err() {
        // Essayer depuis le répertoire du binaire
        if let Ok(exe) = std::env::current_exe() {
            if let Some(dir) = exe.parent() {
                let _ = dotenvy::from_path(dir.join(".env"));
            }
        }
    }
}

/// Résumer les actifs AquaGIS contenus dans une zone DMA
#[derive(Parser)]
#[command(name = "aquagis-api")]
#[command(author, version)]
#[command(about = "Service HTTP de résumé des actifs AquaGIS par zone DMA")]
#[command(args_conflicts_with_subcommands = true)]
struct Cli {
    /// Augmenter la verbosité (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Mode silencieux
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Sous-commande (défaut: serve)
    #[command(subcommand)]
    command: Option<Commands>,

    /// Arguments du serveur (commande par défaut)
    #[command(flatten)]
    service: ServiceConfig,
}

#[derive(Subcommand)]
enum Commands {
    /// Démarrer le service HTTP
    Serve {
        #[command(flatten)]
        service: ServiceConfig,
    },

    /// Tester la connexion à l'entrepôt PostGIS
    CheckDb,

    /// Normaliser le polygone d'une requête sans interroger la base
    Normalize {
        /// Fichier JSON de requête, `-` pour stdin
        #[arg(short, long, default_value = "-")]
        request: PathBuf,

        /// CRS client par défaut
        #[arg(long, env = "DEFAULT_SOURCE_CRS", default_value = "4326")]
        default_crs: dma_geom::Epsg,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Charger .env avant tout
    load_env();

    let cli = Cli::parse();

    init_logging(cli.verbose, cli.quiet);

    match cli.command {
        Some(Commands::Serve { service }) => serve(service).await?,
        None => serve(cli.service).await?,
        Some(Commands::CheckDb) => check_db().await?,
        Some(Commands::Normalize {
            request,
            default_crs,
        }) => normalize(&request, default_crs)?,
    }

    Ok(())
}

async fn serve(service: ServiceConfig) -> Result<()> {
    let layers = LayersConfig::resolve(&service.layers)
        .with_context(|| format!("Failed to load layers: {}", service.layers))?;

    let db = DatabaseConfig::from_env();
    let pool = create_pool(&db)?;
    info!(database = %db.describe(), pool_size = db.pool_size, "Database pool created");

    let settings = DmaSettings {
        layers,
        default_source_crs: service.default_crs,
        default_result_crs: service.default_result_crs,
    };

    AquagisServer::new(Arc::new(PgAssetStore::new(pool)), settings)
        .run(service.listen_addr())
        .await
}

async fn check_db() -> Result<()> {
    let db = DatabaseConfig::from_env();
    let pool = create_pool(&db)?;
    test_connection(&pool).await?;
    info!(database = %db.describe(), "Database connection OK");
    Ok(())
}

fn normalize(path: &Path, default_crs: dma_geom::Epsg) -> Result<()> {
    let content = if path.as_os_str() == "-" {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("Failed to read request from stdin")?;
        buf
    } else {
        std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read request: {}", path.display()))?
    };

    let body: serde_json::Value =
        serde_json::from_str(&content).context("Failed to parse request JSON")?;

    let settings = DmaSettings {
        default_source_crs: default_crs,
        ..Default::default()
    };
    let request = DmaRequest::from_json(&body, &settings)?;
    let polygon = request.polygon.normalize()?;

    println!("{}", polygon.wkt);
    Ok(())
}

fn init_logging(verbose: u8, quiet: bool) {
    let level = match (quiet, verbose) {
        (true, _) => Level::WARN,
        (_, 0) => Level::INFO,
        (_, 1) => Level::DEBUG,
        (_, _) => Level::TRACE,
    };

    let filter = EnvFilter::from_default_env().add_directive(level.into());

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .init();
}
