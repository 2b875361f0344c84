//! Configuration loading and management.

use std::path::{Path, PathBuf};

use enklave_core::source::{
    DEFAULT_CHECK_IN_PATTERN, DEFAULT_CHECK_OUT_PATTERN, DEFAULT_DATE_FORMAT,
    DEFAULT_DATE_PATTERN, DEFAULT_FILE_PATTERN, DEFAULT_SENDER_PATTERN,
};
use enklave_core::{MailPatterns, PatternError};
use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use serde::{Deserialize, Serialize};

/// Application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Folder containing the notification mails.
    pub mail_dir: PathBuf,

    /// Regex a file name must match to be read.
    pub file_pattern: String,

    /// Regex the first line of a mail must match.
    pub sender_pattern: String,

    /// Regex for a line marking a check-in.
    pub check_in_pattern: String,

    /// Regex for a line marking a check-out.
    pub check_out_pattern: String,

    /// Regex for the date header; must capture a `datetime` group.
    pub date_pattern: String,

    /// chrono format of the captured date.
    pub date_format: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            mail_dir: default_mail_dir(),
            file_pattern: DEFAULT_FILE_PATTERN.to_string(),
            sender_pattern: DEFAULT_SENDER_PATTERN.to_string(),
            check_in_pattern: DEFAULT_CHECK_IN_PATTERN.to_string(),
            check_out_pattern: DEFAULT_CHECK_OUT_PATTERN.to_string(),
            date_pattern: DEFAULT_DATE_PATTERN.to_string(),
            date_format: DEFAULT_DATE_FORMAT.to_string(),
        }
    }
}

impl Config {
    /// Loads configuration, optionally from a specific file.
    #[expect(
        clippy::result_large_err,
        reason = "figment::Error is large but only returned at startup"
    )]
    pub fn load_from(config_path: Option<&Path>) -> Result<Self, figment::Error> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        // Load from default config location
        if let Some(config_dir) = dirs_config_path() {
            figment = figment.merge(Toml::file(config_dir.join("config.toml")));
        }

        // Load from specified config file
        if let Some(path) = config_path {
            figment = figment.merge(Toml::file(path));
        }

        // Load from environment variables (ENKLAVE_*)
        figment = figment.merge(Env::prefixed("ENKLAVE_"));

        figment.extract()
    }

    /// Compiles the configured mail patterns.
    pub fn mail_patterns(&self) -> Result<MailPatterns, PatternError> {
        MailPatterns::new(
            &self.file_pattern,
            &self.sender_pattern,
            &self.check_in_pattern,
            &self.check_out_pattern,
            &self.date_pattern,
            self.date_format.as_str(),
        )
    }
}

/// Returns the platform-specific config directory for enklave.
fn dirs_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("enklave"))
}

/// Default mail folder: `~/enklave`, or the working directory without a home.
fn default_mail_dir() -> PathBuf {
    dirs::home_dir().map_or_else(|| PathBuf::from("."), |p| p.join("enklave"))
}
