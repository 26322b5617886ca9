//! # Validator Configuration
//!
//! Loads a `.env`-style file into an explicit [`Config`] value that is passed
//! to every command. The process environment is read for overrides but never
//! written.
//!
//! ## Keys
//!
//! | Key                | Meaning                                            |
//! |--------------------|----------------------------------------------------|
//! | `CONN_TYPE`        | `FILE` (static credentials) or `AWSSECRET`         |
//! | `DB_USER`          | Static database user (`FILE`)                      |
//! | `DB_PASS`          | Static database password (`FILE`)                  |
//! | `DB_URL`           | Static JDBC url (`FILE`)                           |
//! | `CONN_INFO`        | Connection-info path (`FILE`) or secret id         |
//! | `SQL_PATH`         | Directory holding the migration files              |
//! | `FLYWAY_CONF_PATH` | Directory `flyway.conf` is written to              |
//! | `OUTPUT`           | Lint error report path                             |
//! | `MODE`             | `DEV` selects the local secrets emulator           |
//! | `AWSREGION`        | Region for the secrets client                      |
//! | `LOCALURL`         | Endpoint of the local secrets emulator             |

use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::ConfigError;

/// Every key the validator reads, in the order they are documented.
pub const KNOWN_KEYS: &[&str] = &[
    "CONN_TYPE",
    "DB_USER",
    "DB_PASS",
    "DB_URL",
    "CONN_INFO",
    "SQL_PATH",
    "FLYWAY_CONF_PATH",
    "OUTPUT",
    "MODE",
    "AWSREGION",
    "LOCALURL",
];

/// How database credentials are obtained
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectionType {
    /// Credentials are literal values in the config file
    File,
    /// Credentials live in a secrets store
    AwsSecret,
    /// Unrecognized value; no credentials are emitted
    Other(String),
}

impl ConnectionType {
    pub fn parse(value: &str) -> Self {
        match value {
            "FILE" => Self::File,
            "AWSSECRET" => Self::AwsSecret,
            other => Self::Other(other.to_string()),
        }
    }
}

impl fmt::Display for ConnectionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::File => write!(f, "FILE"),
            Self::AwsSecret => write!(f, "AWSSECRET"),
            Self::Other(value) => write!(f, "{}", value),
        }
    }
}

/// Run mode, decides which secrets backend is used
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    /// Local development against an emulator
    Dev,
    /// Anything that is not `DEV`
    #[default]
    Prod,
}

impl Mode {
    pub fn parse(value: Option<&str>) -> Self {
        match value {
            Some("DEV") => Self::Dev,
            _ => Self::Prod,
        }
    }
}

/// Validator configuration loaded from an env file
#[derive(Debug, Clone)]
pub struct Config {
    pub conn_type: ConnectionType,
    pub db_user: Option<String>,
    pub db_pass: Option<String>,
    pub db_url: Option<String>,
    pub conn_info: Option<String>,
    pub sql_path: PathBuf,
    pub flyway_conf_path: PathBuf,
    pub output: Option<PathBuf>,
    pub mode: Mode,
    pub aws_region: Option<String>,
    pub local_url: Option<String>,
}

impl Config {
    /// Load and validate a config file.
    ///
    /// Values already present in the process environment win over the
    /// file, matching dotenv's non-overriding load.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::FileNotFound {
                path: path.display().to_string(),
            });
        }

        let mut vars = read_env_file(path)?;
        for key in KNOWN_KEYS {
            if let Ok(value) = std::env::var(key) {
                debug!("{} taken from process environment", key);
                vars.insert((*key).to_string(), value);
            }
        }

        let config = Self::from_vars(&vars);
        config.validate_paths()?;
        Ok(config)
    }

    /// Build a config from raw key/value pairs without touching the filesystem
    pub fn from_vars(vars: &HashMap<String, String>) -> Self {
        let get = |key: &str| vars.get(key).filter(|v| !v.is_empty()).cloned();

        Self {
            conn_type: ConnectionType::parse(get("CONN_TYPE").as_deref().unwrap_or_default()),
            db_user: get("DB_USER"),
            db_pass: get("DB_PASS"),
            db_url: get("DB_URL"),
            conn_info: get("CONN_INFO"),
            sql_path: get("SQL_PATH").map(PathBuf::from).unwrap_or_default(),
            flyway_conf_path: get("FLYWAY_CONF_PATH")
                .map(PathBuf::from)
                .unwrap_or_default(),
            output: get("OUTPUT").map(PathBuf::from),
            mode: Mode::parse(get("MODE").as_deref()),
            aws_region: get("AWSREGION"),
            local_url: get("LOCALURL"),
        }
    }

    /// Check that every path the selected connection type depends on exists
    pub fn validate_paths(&self) -> Result<(), ConfigError> {
        if self.conn_type == ConnectionType::File {
            let conn_info = self.conn_info.as_deref().unwrap_or_default();
            require_path("CONN_INFO", Path::new(conn_info))?;
        }

        require_path("SQL_PATH", &self.sql_path)?;
        require_path("FLYWAY_CONF_PATH", &self.flyway_conf_path)?;

        Ok(())
    }
}

fn read_env_file(path: &Path) -> Result<HashMap<String, String>, ConfigError> {
    let parse_error = |e: dotenvy::Error| ConfigError::ParseError {
        path: path.display().to_string(),
        message: e.to_string(),
    };

    let mut vars = HashMap::new();
    for item in dotenvy::from_path_iter(path).map_err(parse_error)? {
        let (key, value) = item.map_err(parse_error)?;
        vars.insert(key, value);
    }

    Ok(vars)
}

fn require_path(field: &str, path: &Path) -> Result<(), ConfigError> {
    if path.as_os_str().is_empty() || !path.exists() {
        return Err(ConfigError::PathNotFound {
            field: field.to_string(),
            path: path.display().to_string(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write_env(dir: &TempDir, name: &str, content: &str) -> PathBuf {
        let path = dir.path().join(name);
        std::fs::write(&path, content).unwrap();
        path
    }

    fn fixture() -> TempDir {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("test/sql")).unwrap();
        dir
    }

    #[test]
    fn test_load_file_connection() {
        let dir = fixture();
        let root = dir.path().display();
        let env = write_env(
            &dir,
            ".envTestFile",
            &format!(
                "CONN_TYPE=FILE\nCONN_INFO={root}/test/\nSQL_PATH={root}/test/sql\n\
                 FLYWAY_CONF_PATH={root}/test/\nDB_USER=root\nDB_PASS=localhost\nDB_URL=123456"
            ),
        );

        let config = Config::load(&env).unwrap();
        assert_eq!(config.conn_type, ConnectionType::File);
        assert_eq!(config.db_user.as_deref(), Some("root"));
        assert_eq!(config.db_url.as_deref(), Some("123456"));
    }

    #[test]
    fn test_load_fails_on_missing_sql_path() {
        let dir = fixture();
        let root = dir.path().display();
        let env = write_env(
            &dir,
            ".envTestFileInvalid",
            &format!(
                "CONN_TYPE=FILE\nCONN_INFO={root}/test/\nSQL_PATH={root}/missing\n\
                 FLYWAY_CONF_PATH={root}/test/"
            ),
        );

        let err = Config::load(&env).unwrap_err();
        assert!(matches!(err, ConfigError::PathNotFound { ref field, .. } if field == "SQL_PATH"));
    }

    #[test]
    fn test_load_secret_connection_skips_conn_info_check() {
        let dir = fixture();
        let root = dir.path().display();
        let env = write_env(
            &dir,
            ".envTestSecret",
            &format!(
                "CONN_TYPE=AWSSECRET\nCONN_INFO=test-secret\nSQL_PATH={root}/test/sql\n\
                 FLYWAY_CONF_PATH={root}/test/\nAWSREGION=us-east-1\nLOCALURL=http://localhost:4566"
            ),
        );

        let config = Config::load(&env).unwrap();
        assert_eq!(config.conn_type, ConnectionType::AwsSecret);
        assert_eq!(config.conn_info.as_deref(), Some("test-secret"));
        assert_eq!(config.local_url.as_deref(), Some("http://localhost:4566"));
    }

    #[test]
    fn test_load_fails_on_missing_conn_info_for_file() {
        let dir = fixture();
        let root = dir.path().display();
        let env = write_env(
            &dir,
            ".env",
            &format!(
                "CONN_TYPE=FILE\nCONN_INFO={root}/nowhere\nSQL_PATH={root}/test/sql\n\
                 FLYWAY_CONF_PATH={root}/test/"
            ),
        );

        let err = Config::load(&env).unwrap_err();
        assert!(matches!(err, ConfigError::PathNotFound { ref field, .. } if field == "CONN_INFO"));
    }

    #[test]
    fn test_load_fails_without_conf_path() {
        let dir = fixture();
        let root = dir.path().display();
        let env = write_env(
            &dir,
            ".env",
            &format!("CONN_TYPE=AWSSECRET\nSQL_PATH={root}/test/sql"),
        );

        let err = Config::load(&env).unwrap_err();
        assert!(
            matches!(err, ConfigError::PathNotFound { ref field, .. } if field == "FLYWAY_CONF_PATH")
        );
    }

    #[test]
    fn test_load_missing_file() {
        let err = Config::load(Path::new("/definitely/not/here/.env")).unwrap_err();
        assert!(matches!(err, ConfigError::FileNotFound { .. }));
    }

    #[test]
    fn test_load_unparseable_file() {
        let dir = fixture();
        let env = write_env(&dir, ".env", "NOT A VALID LINE\n");

        let err = Config::load(&env).unwrap_err();
        assert!(matches!(err, ConfigError::ParseError { .. }));
    }

    #[test]
    fn test_mode_parse() {
        assert_eq!(Mode::parse(Some("DEV")), Mode::Dev);
        assert_eq!(Mode::parse(Some("PROD")), Mode::Prod);
        assert_eq!(Mode::parse(Some("ANOTHER")), Mode::Prod);
        assert_eq!(Mode::parse(Some("dev")), Mode::Prod);
        assert_eq!(Mode::parse(None), Mode::Prod);
    }

    #[test]
    fn test_from_vars_treats_empty_as_unset() {
        let vars = HashMap::from([
            ("CONN_TYPE".to_string(), "SOMETHING".to_string()),
            ("OUTPUT".to_string(), String::new()),
        ]);

        let config = Config::from_vars(&vars);
        assert_eq!(config.conn_type, ConnectionType::Other("SOMETHING".to_string()));
        assert!(config.output.is_none());
        assert_eq!(config.mode, Mode::Prod);
    }
}
