//! AWS Secrets Manager clients
//!
//! Both stores speak the Secrets Manager API through the AWS SDK; the local
//! emulator variant only swaps endpoint, region and credentials so it can
//! talk to LocalStack-style emulators.

use async_trait::async_trait;
use aws_config::{BehaviorVersion, Region};
use aws_sdk_secretsmanager::config::Credentials;
use aws_sdk_secretsmanager::error::DisplayErrorContext;
use aws_sdk_secretsmanager::Client;
use tracing::{debug, info};

use super::{SecretRecord, SecretStore};
use crate::error::SecretsError;

/// Region used for the emulator when `AWSREGION` is unset
pub const DEFAULT_LOCAL_REGION: &str = "us-east-1";

/// Production Secrets Manager using the default credential chain
pub struct AwsSecretsManager {
    client: Client,
}

impl AwsSecretsManager {
    /// Create a client, overriding the region when one is given
    pub async fn new(region: Option<String>) -> Self {
        let mut loader = aws_config::defaults(BehaviorVersion::latest());
        if let Some(region) = region {
            loader = loader.region(Region::new(region));
        }

        let sdk_config = loader.load().await;
        info!("Using AWS Secrets Manager");

        Self {
            client: Client::new(&sdk_config),
        }
    }
}

#[async_trait]
impl SecretStore for AwsSecretsManager {
    fn name(&self) -> &'static str {
        "aws-secrets-manager"
    }

    async fn get_secret(&self, secret_id: &str) -> Result<SecretRecord, SecretsError> {
        fetch_secret(&self.client, secret_id).await
    }
}

/// Secrets Manager emulator reached at an explicit endpoint
pub struct LocalSecretsEmulator {
    client: Client,
}

impl LocalSecretsEmulator {
    /// Create a client for the emulator at `endpoint`
    pub async fn new(endpoint: &str, region: Option<String>) -> Self {
        let region = region.unwrap_or_else(|| DEFAULT_LOCAL_REGION.to_string());

        // Emulators accept any static key pair
        let credentials = Credentials::new("test", "test", None, None, "local-emulator");

        let sdk_config = aws_config::defaults(BehaviorVersion::latest())
            .endpoint_url(endpoint)
            .region(Region::new(region.clone()))
            .credentials_provider(credentials)
            .load()
            .await;
        info!("Using local secrets emulator at {} ({})", endpoint, region);

        Self {
            client: Client::new(&sdk_config),
        }
    }
}

#[async_trait]
impl SecretStore for LocalSecretsEmulator {
    fn name(&self) -> &'static str {
        "local-emulator"
    }

    async fn get_secret(&self, secret_id: &str) -> Result<SecretRecord, SecretsError> {
        fetch_secret(&self.client, secret_id).await
    }
}

async fn fetch_secret(client: &Client, secret_id: &str) -> Result<SecretRecord, SecretsError> {
    debug!("Fetching secret {}", secret_id);

    let output = client
        .get_secret_value()
        .secret_id(secret_id)
        .send()
        .await
        .map_err(|e| SecretsError::Request {
            secret_id: secret_id.to_string(),
            message: DisplayErrorContext(&e).to_string(),
        })?;

    let payload = output
        .secret_string()
        .ok_or_else(|| SecretsError::EmptySecret {
            secret_id: secret_id.to_string(),
        })?;

    SecretRecord::from_json(secret_id, payload)
}
