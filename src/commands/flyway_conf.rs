//! Flyway connection configuration
//!
//! Writes `<FLYWAY_CONF_PATH>/flyway.conf` with the fixed migration
//! settings plus credentials resolved from the config file (`FILE`) or the
//! secrets store (`AWSSECRET`).

use anyhow::{Context, Result};
use colored::Colorize;
use std::path::PathBuf;
use tracing::{debug, info, warn};

use crate::config::{Config, ConnectionType};
use crate::error::ConfError;
use crate::secrets::{self, SecretStore};

/// Name of the generated file
pub const CONF_FILE_NAME: &str = "flyway.conf";

/// Settings written regardless of connection type
const TEMPLATE: &str = "flyway.sqlMigrationSuffixes=.sql\n\
                        flyway.table=flyway_migrations\n\
                        flyway.baselineOnMigrate=true\n";

/// Credentials emitted into the conf file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlywayCredentials {
    pub user: String,
    pub password: String,
    pub url: String,
}

impl FlywayCredentials {
    /// Static credentials from `DB_USER`, `DB_PASS` and `DB_URL`
    pub fn from_config(config: &Config) -> Self {
        Self {
            user: config.db_user.clone().unwrap_or_default(),
            password: config.db_pass.clone().unwrap_or_default(),
            url: config.db_url.clone().unwrap_or_default(),
        }
    }

    /// Credentials read from the secrets store
    pub async fn from_store(store: &dyn SecretStore, secret_id: &str) -> Result<Self> {
        info!("Reading credentials from {} ({})", secret_id, store.name());

        let record = store
            .get_secret(secret_id)
            .await
            .with_context(|| format!("Failed to read secret {}", secret_id))?;
        debug!(
            "Secret {} resolved (engine={}, cluster={}, api key set={})",
            secret_id,
            record.engine,
            record.db_cluster_identifier,
            !record.datadog_key.is_empty()
        );

        let url = record.jdbc_url().ok_or_else(|| ConfError::MissingUrl {
            secret_id: secret_id.to_string(),
        })?;

        Ok(Self {
            user: record.username,
            password: record.password,
            url,
        })
    }
}

/// Render the conf file contents
pub fn render(credentials: Option<&FlywayCredentials>) -> String {
    let mut content = String::from(TEMPLATE);

    if let Some(credentials) = credentials {
        content.push_str(&format!("flyway.user={}\n", credentials.user));
        content.push_str(&format!("flyway.password={}\n", credentials.password));
        content.push_str(&format!("flyway.url={}\n", credentials.url));
    }

    content
}

/// Resolve credentials and render, with the store supplied by the caller
pub async fn generate(config: &Config, store: Option<&dyn SecretStore>) -> Result<String> {
    let credentials = match (&config.conn_type, store) {
        (ConnectionType::File, _) => Some(FlywayCredentials::from_config(config)),
        (ConnectionType::AwsSecret, Some(store)) => {
            Some(FlywayCredentials::from_store(store, secrets::secret_id(config)).await?)
        }
        (ConnectionType::AwsSecret, None) => {
            anyhow::bail!("CONN_TYPE=AWSSECRET requires a secrets store")
        }
        (ConnectionType::Other(kind), _) => {
            warn!(
                "Unknown CONN_TYPE '{}', writing {} without credentials",
                kind, CONF_FILE_NAME
            );
            None
        }
    };

    Ok(render(credentials.as_ref()))
}

/// Generate and write `flyway.conf`
pub async fn execute(config: &Config) -> Result<PathBuf> {
    println!(
        "{}",
        format!("Generating {} ({})...", CONF_FILE_NAME, config.conn_type).bold()
    );

    let store = match config.conn_type {
        ConnectionType::AwsSecret => Some(secrets::connect(config).await?),
        _ => None,
    };

    let content = generate(config, store.as_deref()).await?;

    let path = config.flyway_conf_path.join(CONF_FILE_NAME);
    tokio::fs::write(&path, content)
        .await
        .with_context(|| format!("Failed to write {}", path.display()))?;

    println!("   {} Wrote {}", "✅".green(), path.display());
    Ok(path)
}
