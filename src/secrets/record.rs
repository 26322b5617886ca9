//! Credential record stored in the secrets store

use serde::{Deserialize, Deserializer};
use serde_json::{Map, Value};

use crate::error::SecretsError;

/// Keys a record is read from. Payload keys are matched case-insensitively
/// against these, so `Username`, `username` and `USERNAME` all land on the
/// same field; when several spellings appear the last one wins.
const RECORD_KEYS: &[&str] = &[
    "username",
    "password",
    "engine",
    "host",
    "port",
    "dbname",
    "dbClusterIdentifier",
    "url",
    "DATADOG_KEY",
];

/// Database credentials as stored by RDS/Aurora-managed secrets
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct SecretRecord {
    pub username: String,

    pub password: String,

    pub engine: String,

    pub host: String,

    #[serde(deserialize_with = "deserialize_port")]
    pub port: Option<u16>,

    pub dbname: String,

    #[serde(rename = "dbClusterIdentifier")]
    pub db_cluster_identifier: String,

    pub url: String,

    #[serde(rename = "DATADOG_KEY")]
    pub datadog_key: String,
}

impl SecretRecord {
    /// Parse the secret's string payload
    pub fn from_json(secret_id: &str, payload: &str) -> Result<Self, SecretsError> {
        let parse_error = |e: serde_json::Error| SecretsError::Parse {
            secret_id: secret_id.to_string(),
            message: e.to_string(),
        };

        let value: Value = serde_json::from_str(payload).map_err(parse_error)?;
        serde_json::from_value(normalize_keys(value)).map_err(parse_error)
    }

    /// JDBC url for Flyway.
    ///
    /// Prefers the explicit `url`; otherwise builds one from engine, host,
    /// port and database name.
    pub fn jdbc_url(&self) -> Option<String> {
        if !self.url.is_empty() {
            return Some(self.url.clone());
        }

        if self.engine.is_empty() || self.host.is_empty() || self.dbname.is_empty() {
            return None;
        }

        let scheme = match self.engine.as_str() {
            "postgres" | "aurora-postgresql" => "postgresql",
            "aurora" | "aurora-mysql" => "mysql",
            other => other,
        };

        let authority = match self.port {
            Some(port) => format!("{}:{}", self.host, port),
            None => self.host.clone(),
        };

        Some(format!("jdbc:{}://{}/{}", scheme, authority, self.dbname))
    }
}

/// Rename object keys to their canonical spelling in [`RECORD_KEYS`]
fn normalize_keys(value: Value) -> Value {
    match value {
        Value::Object(object) => {
            let mut normalized = Map::with_capacity(object.len());
            for (key, field) in object {
                let key = RECORD_KEYS
                    .iter()
                    .find(|known| known.eq_ignore_ascii_case(&key))
                    .map(|known| known.to_string())
                    .unwrap_or(key);
                normalized.insert(key, field);
            }
            Value::Object(normalized)
        }
        other => other,
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum PortValue {
    Number(u16),
    Text(String),
}

/// Accept `5432`, `"5432"` or `null`
fn deserialize_port<'de, D>(deserializer: D) -> Result<Option<u16>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<PortValue>::deserialize(deserializer)? {
        None => Ok(None),
        Some(PortValue::Number(port)) => Ok(Some(port)),
        Some(PortValue::Text(s)) if s.trim().is_empty() => Ok(None),
        Some(PortValue::Text(s)) => s
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| serde::de::Error::custom(format!("invalid port: '{}'", s))),
    }
}
