use anyhow::{Context, Result};
use clap::Parser;
use std::{env, str::FromStr};

/// Centralized application configuration.
/// Combines environment variables and CLI arguments.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    pub max_connections: u32,
    pub cors_origins: Vec<String>,
}

/// Command-line + environment configuration.
#[derive(Parser, Debug, Default)]
#[command(author, version, about = "GariWala car rental API")]
pub struct Args {
    /// Host to bind to (overrides GARIWALA_HOST)
    #[arg(long)]
    pub host: Option<String>,

    /// Port to bind to (overrides GARIWALA_PORT / PORT)
    #[arg(long)]
    pub port: Option<u16>,

    /// Database URL (overrides GARIWALA_DATABASE_URL)
    #[arg(long)]
    pub database_url: Option<String>,

    /// Maximum pooled connections (overrides GARIWALA_MAX_CONNECTIONS)
    #[arg(long)]
    pub max_connections: Option<u32>,

    /// Comma-separated allowed CORS origins (overrides GARIWALA_CORS_ORIGINS)
    #[arg(long)]
    pub cors_origins: Option<String>,

    /// Run migrations and exit
    #[arg(long)]
    pub migrate: bool,
}

impl AppConfig {
    /// Parse environment variables + CLI args into AppConfig and migrate flag.
    pub fn from_env_and_args() -> Result<(Self, bool)> {
        let args = Args::parse();
        Self::resolve(args, |key| env::var(key))
    }

    /// Merge `args` over values returned by `lookup`. CLI wins.
    fn resolve(
        args: Args,
        lookup: impl Fn(&str) -> Result<String, env::VarError>,
    ) -> Result<(Self, bool)> {
        let env_host = lookup("GARIWALA_HOST").unwrap_or_else(|_| "0.0.0.0".into());
        let env_port = match parse_var::<u16>(&lookup, "GARIWALA_PORT")? {
            Some(port) => port,
            None => parse_var::<u16>(&lookup, "PORT")?.unwrap_or(5000),
        };
        let env_db = lookup("GARIWALA_DATABASE_URL")
            .unwrap_or_else(|_| "sqlite://./data/gariwala.db".into());
        let env_max = parse_var::<u32>(&lookup, "GARIWALA_MAX_CONNECTIONS")?.unwrap_or(5);
        let env_origins =
            lookup("GARIWALA_CORS_ORIGINS").unwrap_or_else(|_| "http://localhost:5173".into());

        let cfg = Self {
            host: args.host.unwrap_or(env_host),
            port: args.port.unwrap_or(env_port),
            database_url: args.database_url.unwrap_or(env_db),
            max_connections: args.max_connections.unwrap_or(env_max),
            cors_origins: split_origins(&args.cors_origins.unwrap_or(env_origins)),
        };

        Ok((cfg, args.migrate))
    }

    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Read and parse an optional variable. Unset is `None`; garbage is an error.
fn parse_var<T>(
    lookup: &impl Fn(&str) -> Result<String, env::VarError>,
    key: &str,
) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(key) {
        Ok(value) => value
            .parse::<T>()
            .map(Some)
            .with_context(|| format!("parsing {} value `{}`", key, value)),
        Err(env::VarError::NotPresent) => Ok(None),
        Err(err) => Err(err).with_context(|| format!("reading {}", key)),
    }
}

fn split_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}
