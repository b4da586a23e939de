//! Pool de connexions PostgreSQL

use anyhow::{Context, Result};
use deadpool_postgres::{Config, Pool, PoolConfig, Runtime, Timeouts};
use std::time::Duration;
use tokio_postgres::NoTls;
use tokio_postgres_rustls::MakeRustlsConnect;

/// Mode SSL pour la connexion PostgreSQL
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SslMode {
    /// Pas de SSL (défaut)
    #[default]
    Disable,
    /// SSL préféré mais non requis
    Prefer,
    /// SSL requis
    Require,
}

impl std::str::FromStr for SslMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "disable" | "off" | "false" | "no" => Ok(SslMode::Disable),
            "prefer" => Ok(SslMode::Prefer),
            "require" | "on" | "true" | "yes" => Ok(SslMode::Require),
            _ => Err(format!("Invalid SSL mode: {}. Use: disable, prefer, require", s)),
        }
    }
}

/// Configuration de la base de données
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    /// URI complète, prioritaire sur les champs individuels
    pub uri: Option<String>,
    pub host: String,
    pub port: u16,
    pub dbname: String,
    pub user: Option<String>,
    pub password: Option<String>,
    pub pool_size: usize,
    pub ssl_mode: SslMode,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            uri: None,
            host: "localhost".into(),
            port: 5432,
            dbname: "aquagis_warehouse".into(),
            user: None,
            password: None,
            pool_size: 16,
            ssl_mode: SslMode::Disable,
        }
    }
}

impl DatabaseConfig {
    /// Charge la configuration depuis les variables d'environnement
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(var: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        Self {
            uri: var("GIS_DB_URI").filter(|s| !s.is_empty()),
            host: var("PG_DB_HOST").unwrap_or(defaults.host),
            port: var("PG_DB_PORT")
                .and_then(|p| p.parse().ok())
                .unwrap_or(defaults.port),
            dbname: var("PG_DB_NAME").unwrap_or(defaults.dbname),
            user: var("PG_DB_USER"),
            password: var("PG_DB_PASS"),
            pool_size: var("PG_POOL_SIZE")
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.pool_size),
            ssl_mode: var("PG_DB_SSLMODE")
                .and_then(|s| s.parse().ok())
                .unwrap_or_default(),
        }
    }

    /// Description loggable (sans mot de passe)
    pub fn describe(&self) -> String {
        match &self.uri {
            Some(_) => "GIS_DB_URI".to_string(),
            None => format!("{}:{}/{}", self.host, self.port, self.dbname),
        }
    }
}

impl SslMode {
    /// Mode transmis à tokio-postgres pour la négociation
    ///
    /// En `Prefer`, la connexion continue en clair si le serveur refuse TLS.
    pub fn to_postgres(self) -> deadpool_postgres::SslMode {
        match self {
            SslMode::Disable => deadpool_postgres::SslMode::Disable,
            SslMode::Prefer => deadpool_postgres::SslMode::Prefer,
            SslMode::Require => deadpool_postgres::SslMode::Require,
        }
    }
}

/// Connecteur rustls avec les racines webpki
fn tls_connector() -> MakeRustlsConnect {
    let roots = rustls::RootCertStore::from_iter(webpki_roots::TLS_SERVER_ROOTS.iter().cloned());
    MakeRustlsConnect::new(
        rustls::ClientConfig::builder()
            .with_root_certificates(roots)
            .with_no_client_auth(),
    )
}

/// Configuration deadpool équivalente à `config`
fn pool_config(config: &DatabaseConfig) -> Config {
    let mut cfg = Config::new();
    if let Some(uri) = &config.uri {
        cfg.url = Some(uri.clone());
    } else {
        cfg.host = Some(config.host.clone());
        cfg.port = Some(config.port);
        cfg.dbname = Some(config.dbname.clone());
        cfg.user = config.user.clone();
        cfg.password = config.password.clone();
    }
    cfg.application_name = Some(env!("CARGO_PKG_NAME").to_string());
    cfg.ssl_mode = Some(config.ssl_mode.to_postgres());
    cfg.pool = Some(PoolConfig {
        max_size: config.pool_size,
        timeouts: Timeouts {
            wait: Some(Duration::from_secs(30)),
            create: Some(Duration::from_secs(10)),
            recycle: Some(Duration::from_secs(30)),
        },
        ..Default::default()
    });
    cfg
}

/// Crée un pool de connexions
///
/// Aucune connexion n'est ouverte ici : les erreurs réseau remontent au
/// premier `pool.get()`.
pub fn create_pool(config: &DatabaseConfig) -> Result<Pool> {
    let cfg = pool_config(config);
    let runtime = Some(Runtime::Tokio1);

    if config.ssl_mode == SslMode::Disable {
        cfg.create_pool(runtime, NoTls)
            .context("Failed to create database pool")
    } else {
        cfg.create_pool(runtime, tls_connector())
            .with_context(|| format!("Failed to create database pool (sslmode {:?})", config.ssl_mode))
    }
}

/// Teste la connexion à la base
pub async fn test_connection(pool: &Pool) -> Result<()> {
    let client = pool
        .get()
        .await
        .context("Failed to get connection from pool")?;
    client
        .execute("SELECT 1", &[])
        .await
        .context("Connection test failed")?;
    Ok(())
}
