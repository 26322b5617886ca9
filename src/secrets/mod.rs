//! Secrets store access
//!
//! Credentials for `CONN_TYPE=AWSSECRET` come from a [`SecretStore`]:
//! - [`AwsSecretsManager`] for production
//! - [`LocalSecretsEmulator`] when `MODE=DEV`

mod aws;
mod record;

pub use aws::{AwsSecretsManager, LocalSecretsEmulator};
pub use record::SecretRecord;

use async_trait::async_trait;

use crate::config::{Config, Mode};
use crate::error::SecretsError;

/// Secret read when `CONN_INFO` does not name one
pub const DEFAULT_SECRET_ID: &str = "tst-aurorao-migrate";

/// Capability to look up a credential record by id
#[async_trait]
pub trait SecretStore: Send + Sync {
    /// Short backend name for logs
    fn name(&self) -> &'static str;

    async fn get_secret(&self, secret_id: &str) -> Result<SecretRecord, SecretsError>;
}

/// Which secrets backend a run talks to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SecretBackend {
    Local,
    Aws,
}

impl SecretBackend {
    pub fn for_mode(mode: Mode) -> Self {
        match mode {
            Mode::Dev => Self::Local,
            Mode::Prod => Self::Aws,
        }
    }
}

/// Secret id for this run
pub fn secret_id(config: &Config) -> &str {
    config.conn_info.as_deref().unwrap_or(DEFAULT_SECRET_ID)
}

/// Build the store selected by the config's mode
pub async fn connect(config: &Config) -> Result<Box<dyn SecretStore>, SecretsError> {
    match SecretBackend::for_mode(config.mode) {
        SecretBackend::Local => {
            let endpoint = config
                .local_url
                .as_deref()
                .ok_or(SecretsError::MissingEndpoint)?;
            Ok(Box::new(
                LocalSecretsEmulator::new(endpoint, config.aws_region.clone()).await,
            ))
        }
        SecretBackend::Aws => Ok(Box::new(
            AwsSecretsManager::new(config.aws_region.clone()).await,
        )),
    }
}
