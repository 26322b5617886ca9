//! Migration Filename Lint
//!
//! Checks every `.sql` file under `SQL_PATH` against the Flyway naming
//! convention `<prefix><version>__<description>.sql`:
//!
//! - Prefix must be `V` (versioned), `U` (undo) or `R` (repeatable)
//! - Name must contain the `__` separator
//! - Version (text between the prefix and the first `_`) must be unique
//!   across the file set; repeatables carry no version
//!
//! All violations are collected before reporting. On failure the combined
//! report is written to `OUTPUT`.

use anyhow::{Context, Result};
use colored::Colorize;
use std::collections::HashSet;
use std::path::Path;
use tracing::{info, warn};

use crate::config::Config;
use crate::files::{file_name, list_files};

/// Prefixes Flyway recognizes for SQL migrations
pub const VALID_PREFIXES: &[char] = &['V', 'U', 'R'];

/// Extension of migration files
pub const SQL_EXTENSION: &str = ".sql";

/// Naming problem found in a migration file
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NamingViolation {
    /// First character is not a Flyway prefix
    InvalidPrefix { file: String },
    /// No `__` between version and description
    MissingDoubleUnderscore { file: String },
    /// Version already used by an earlier file
    DuplicateVersion { file: String, version: String },
}

impl NamingViolation {
    pub fn format(&self) -> String {
        match self {
            NamingViolation::InvalidPrefix { file } => {
                format!(
                    "Wrong File Name: {}. These are the valids prefix [V,R,U]",
                    file
                )
            }
            NamingViolation::MissingDoubleUnderscore { file } => {
                format!("Wrong File Name: {}. Name is missing 2 underlines", file)
            }
            NamingViolation::DuplicateVersion { file, version } => {
                format!(
                    "Duplicate Version at file: {}. Increase version {}",
                    file, version
                )
            }
        }
    }
}

/// Result of linting a set of migration filenames
#[derive(Debug)]
pub struct LintReport {
    /// Number of filenames checked
    pub files_checked: usize,
    /// Violations in file order
    pub violations: Vec<NamingViolation>,
}

impl LintReport {
    pub fn is_valid(&self) -> bool {
        self.violations.is_empty()
    }

    /// Combined report, one blank line between violations
    pub fn message(&self) -> String {
        let mut message = String::from("\n");
        for violation in &self.violations {
            message.push_str(&violation.format());
            message.push_str("\n\n");
        }
        message
    }
}

/// Version token: text between the prefix character and the first `_`
pub fn version_token(name: &str) -> Option<&str> {
    let prefix_len = name.chars().next()?.len_utf8();
    let underscore = name.find('_')?;

    if underscore <= prefix_len {
        return None;
    }

    Some(&name[prefix_len..underscore])
}

/// Check filenames against the naming rules
pub fn validate_file_names<S: AsRef<str>>(names: &[S]) -> LintReport {
    let mut violations = Vec::new();
    let mut seen_versions: HashSet<String> = HashSet::new();

    for name in names {
        let name = name.as_ref();
        let prefix = name.chars().next();

        if !prefix.is_some_and(|c| VALID_PREFIXES.contains(&c)) {
            violations.push(NamingViolation::InvalidPrefix {
                file: name.to_string(),
            });
        }

        if !name.contains("__") {
            violations.push(NamingViolation::MissingDoubleUnderscore {
                file: name.to_string(),
            });
        }

        if let Some(version) = version_token(name) {
            if !seen_versions.insert(version.to_string()) {
                violations.push(NamingViolation::DuplicateVersion {
                    file: name.to_string(),
                    version: version.to_string(),
                });
            }
        }
    }

    LintReport {
        files_checked: names.len(),
        violations,
    }
}

/// Lint the migrations under `SQL_PATH`
pub async fn execute(config: &Config) -> Result<()> {
    println!(
        "{}",
        format!("Linting migrations in {}...", config.sql_path.display()).bold()
    );

    let files = list_files(&config.sql_path, SQL_EXTENSION)
        .await
        .context("Failed to list migration files")?;
    let names: Vec<String> = files.iter().map(|p| file_name(p)).collect();

    if names.is_empty() {
        println!("   No migration files found");
    } else {
        println!("   Found {} migration files", names.len());
    }

    let report = validate_file_names(&names);
    info!(
        "Checked {} files, {} violations",
        report.files_checked,
        report.violations.len()
    );

    if report.is_valid() {
        println!("   {} All migration names valid", "✅".green());
        return Ok(());
    }

    println!("   {} Found {} issues", "❌".red(), report.violations.len());
    for violation in &report.violations {
        println!("\n   {}", violation.format());
    }

    match &config.output {
        Some(output) => write_report(output, &report.message()).await?,
        None => warn!("OUTPUT not set, lint report not written"),
    }

    anyhow::bail!(
        "{} migration naming violation(s) in {}",
        report.violations.len(),
        config.sql_path.display()
    )
}

async fn write_report(path: &Path, message: &str) -> Result<()> {
    tokio::fs::write(path, message)
        .await
        .with_context(|| format!("Failed to write lint report: {}", path.display()))?;
    info!("Lint report written to {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_valid_names_pass() {
        let report = validate_file_names(&[
            "V1__init.sql",
            "V2__add_users.sql",
            "U3__undo_orders.sql",
            "R__refresh_views.sql",
        ]);
        assert!(report.is_valid(), "{:?}", report.violations);
        assert_eq!(report.files_checked, 4);
    }

    #[test]
    fn test_lowercase_prefixes_flagged() {
        for name in ["v1__init.sql", "u1__init.sql", "r__views.sql"] {
            let report = validate_file_names(&[name]);
            assert_eq!(
                report.violations,
                vec![NamingViolation::InvalidPrefix {
                    file: name.to_string()
                }],
                "{} should be flagged",
                name
            );
        }
    }

    #[test]
    fn test_unknown_prefix_flagged() {
        let report = validate_file_names(&["001__init.sql", "B1__baseline.sql"]);
        assert_eq!(report.violations.len(), 2);
        assert!(report
            .violations
            .iter()
            .all(|v| matches!(v, NamingViolation::InvalidPrefix { .. })));
    }

    #[test]
    fn test_missing_double_underscore_flagged() {
        let report = validate_file_names(&["V1_init.sql"]);
        assert_eq!(
            report.violations,
            vec![NamingViolation::MissingDoubleUnderscore {
                file: "V1_init.sql".to_string()
            }]
        );
    }

    #[test]
    fn test_duplicate_version_flagged() {
        let report = validate_file_names(&["V1__init.sql", "V1__users.sql"]);
        assert_eq!(
            report.violations,
            vec![NamingViolation::DuplicateVersion {
                file: "V1__users.sql".to_string(),
                version: "1".to_string(),
            }]
        );
    }

    #[test]
    fn test_duplicate_version_across_prefixes_flagged() {
        let report = validate_file_names(&["V3__orders.sql", "U3__orders.sql"]);
        assert_eq!(
            report.violations,
            vec![NamingViolation::DuplicateVersion {
                file: "U3__orders.sql".to_string(),
                version: "3".to_string(),
            }]
        );
    }

    #[test]
    fn test_repeatables_not_version_checked() {
        let report = validate_file_names(&["R__views.sql", "R__functions.sql"]);
        assert!(report.is_valid());
    }

    #[test]
    fn test_all_violations_collected() {
        let report = validate_file_names(&["v1_init.sql", "V2__a.sql", "V2__b.sql"]);
        assert_eq!(report.violations.len(), 3);
        assert!(matches!(
            report.violations[0],
            NamingViolation::InvalidPrefix { .. }
        ));
        assert!(matches!(
            report.violations[1],
            NamingViolation::MissingDoubleUnderscore { .. }
        ));
        assert!(matches!(
            report.violations[2],
            NamingViolation::DuplicateVersion { .. }
        ));
    }

    #[test]
    fn test_version_token() {
        assert_eq!(version_token("V1__init.sql"), Some("1"));
        assert_eq!(version_token("V2020_01__init.sql"), Some("2020"));
        assert_eq!(version_token("R__views.sql"), None);
        assert_eq!(version_token("Vinit.sql"), None);
        assert_eq!(version_token("_V1.sql"), None);
        assert_eq!(version_token(""), None);
    }

    #[test]
    fn test_message_format() {
        let report = validate_file_names(&["V1_init.sql"]);
        assert_eq!(
            report.message(),
            "\nWrong File Name: V1_init.sql. Name is missing 2 underlines\n\n"
        );
    }

    fn lint_config(sql_path: &Path, output: &Path) -> Config {
        let vars = HashMap::from([
            ("SQL_PATH".to_string(), sql_path.display().to_string()),
            ("OUTPUT".to_string(), output.display().to_string()),
        ]);
        Config::from_vars(&vars)
    }

    #[tokio::test]
    async fn test_execute_single_violation_fails_and_writes_report() {
        let dir = tempfile::tempdir().unwrap();
        let sql = dir.path().join("sql");
        std::fs::create_dir(&sql).unwrap();
        std::fs::write(sql.join("V1__init.sql"), "").unwrap();
        std::fs::write(sql.join("v2__users.sql"), "").unwrap();
        let output = dir.path().join("lint.txt");

        let result = execute(&lint_config(&sql, &output)).await;
        assert!(result.is_err());

        let report = std::fs::read_to_string(&output).unwrap();
        assert!(report.contains("v2__users.sql"));
        assert!(report.contains("[V,R,U]"));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_execute_lints_symlinked_migrations() {
        let dir = tempfile::tempdir().unwrap();
        let sql = dir.path().join("sql");
        std::fs::create_dir(&sql).unwrap();
        let shared = dir.path().join("shared.txt");
        std::fs::write(&shared, "select 1;").unwrap();
        std::os::unix::fs::symlink(&shared, sql.join("v1_bad.sql")).unwrap();
        let output = dir.path().join("lint.txt");

        let result = execute(&lint_config(&sql, &output)).await;
        assert!(result.is_err());

        let report = std::fs::read_to_string(&output).unwrap();
        assert!(report.contains("Wrong File Name: v1_bad.sql"));
    }

    #[tokio::test]
    async fn test_execute_clean_directory() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("V1__init.sql"), "").unwrap();
        std::fs::write(dir.path().join("notes.txt"), "").unwrap();
        let output = dir.path().join("lint.txt");

        execute(&lint_config(dir.path(), &output)).await.unwrap();
        assert!(!output.exists());
    }
}
