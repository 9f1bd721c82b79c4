//! Application configuration management.
//!
//! Configuration is loaded from a YAML file with environment variable
//! overrides. The file path defaults to `config.yaml` and can be changed with
//! `-f` or the `HOSTDESK_CONFIG` environment variable.
//!
//! Sources are merged in order (later overrides earlier):
//!
//! 1. YAML config file
//! 2. Environment variables prefixed with `HOSTDESK_` (double underscore for
//!    nesting, e.g. `HOSTDESK_STORAGE__BUCKET`)
//! 3. `DATABASE_URL` - special case, overrides `database_url`

use clap::Parser;
use figment::{
    Figment,
    providers::{Env, Format, Yaml},
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Simple CLI args - just for specifying config file
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to configuration file
    #[arg(short = 'f', long, env = "HOSTDESK_CONFIG", default_value = "config.yaml")]
    pub config: String,

    /// Validate configuration and exit without starting the server.
    #[arg(long)]
    pub validate: bool,
}

/// Main application configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// HTTP server host to bind to (e.g., "0.0.0.0" for all interfaces)
    pub host: String,
    /// HTTP server port to bind to
    pub port: u16,
    /// PostgreSQL connection string
    pub database_url: String,
    /// Email address for the initial admin user (created on first startup)
    pub admin_email: String,
    /// Password for the initial admin user (optional, can be set via environment)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub admin_password: Option<String>,
    /// Secret key for JWT signing (required for production)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub secret_key: Option<String>,
    /// Session token lifetime in seconds
    pub jwt_expiry_secs: u64,
    /// Name of the session cookie
    pub session_cookie_name: String,
    /// Document/media storage backend
    pub storage: StorageConfig,
    /// Days of past checkouts still eligible for the suspected-cancelled flag
    pub reconcile_grace_days: i64,
    /// Maximum upload size for documents and media, in bytes
    pub max_upload_bytes: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3030,
            database_url: "postgres://localhost/hostdesk".to_string(),
            admin_email: "admin@localhost".to_string(),
            admin_password: None,
            secret_key: None,
            jwt_expiry_secs: 12 * 60 * 60,
            session_cookie_name: "hostdesk_session".to_string(),
            storage: StorageConfig::default(),
            reconcile_grace_days: 2,
            max_upload_bytes: 25 * 1024 * 1024,
        }
    }
}

/// Where uploaded documents and media are stored.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(tag = "backend", rename_all = "snake_case")]
pub enum StorageConfig {
    /// Amazon S3 (or any S3-compatible endpoint honoured by the AWS SDK)
    S3 {
        bucket: String,
        region: String,
        /// Key prefix inside the bucket, e.g. "unit-documents"
        #[serde(default)]
        prefix: String,
    },
    /// Local filesystem directory, for development and tests
    Local { path: PathBuf },
}

impl Default for StorageConfig {
    fn default() -> Self {
        StorageConfig::Local {
            path: PathBuf::from("./data/storage"),
        }
    }
}

impl Config {
    /// Load configuration from file and environment.
    pub fn load(args: &Args) -> anyhow::Result<Self> {
        let mut figment = Figment::new()
            .merge(Yaml::file(&args.config))
            .merge(Env::prefixed("HOSTDESK_").split("__"));

        // DATABASE_URL wins over everything for the main connection
        if let Ok(url) = std::env::var("DATABASE_URL") {
            figment = figment.merge(("database_url", url));
        }

        let config: Config = figment.extract()?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> anyhow::Result<()> {
        if self.database_url.is_empty() {
            anyhow::bail!("database_url must not be empty");
        }
        if self.jwt_expiry_secs == 0 {
            anyhow::bail!("jwt_expiry_secs must be positive");
        }
        if let StorageConfig::S3 { bucket, region, .. } = &self.storage {
            if bucket.is_empty() || region.is_empty() {
                anyhow::bail!("storage.bucket and storage.region are required for the s3 backend");
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.port, 3030);
        assert!(matches!(config.storage, StorageConfig::Local { .. }));
    }

    #[test]
    fn test_env_overrides_yaml() {
        figment::Jail::expect_with(|jail| {
            jail.create_file("config.yaml", "port: 4000\nhost: 127.0.0.1\n")?;
            jail.set_env("HOSTDESK_PORT", "5000");

            let args = Args {
                config: "config.yaml".to_string(),
                validate: false,
            };
            let config = Config::load(&args).expect("config should load");
            assert_eq!(config.port, 5000);
            assert_eq!(config.host, "127.0.0.1");
            Ok(())
        });
    }

    #[test]
    fn test_database_url_env_wins() {
        figment::Jail::expect_with(|jail| {
            jail.create_file("config.yaml", "database_url: postgres://yaml/db\n")?;
            jail.set_env("DATABASE_URL", "postgres://env/db");

            let args = Args {
                config: "config.yaml".to_string(),
                validate: false,
            };
            let config = Config::load(&args).expect("config should load");
            assert_eq!(config.database_url, "postgres://env/db");
            Ok(())
        });
    }

    #[test]
    fn test_s3_storage_requires_bucket() {
        let config = Config {
            storage: StorageConfig::S3 {
                bucket: String::new(),
                region: "us-east-2".to_string(),
                prefix: String::new(),
            },
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
