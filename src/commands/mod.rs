pub mod flyway_conf;
pub mod lint;

use std::fmt;

use crate::error::CommandError;

/// Actions accepted on the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Check migration filenames
    Lint,
    /// Write flyway.conf
    FlywayConf,
    /// Accepted; no checks attached yet
    Validate,
    /// Accepted; no log shipping attached yet
    SendLog,
}

impl Command {
    pub const ALL: [Command; 4] = [
        Command::Lint,
        Command::FlywayConf,
        Command::Validate,
        Command::SendLog,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Command::Lint => "lint",
            Command::FlywayConf => "flyway-conf",
            Command::Validate => "validate",
            Command::SendLog => "send-log",
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Check a command name against the whitelist. Matching is exact.
pub fn validate_command(command: &str) -> Result<Command, CommandError> {
    Command::ALL
        .into_iter()
        .find(|c| c.as_str() == command)
        .ok_or_else(|| CommandError::Invalid {
            command: command.to_string(),
        })
}
