//! Configuration module
//!
//! Configuration is read once at process start, validated, and then handed to every
//! component constructor. Nothing reads the environment after startup.

use std::env;

use chrono_tz::Tz;

use crate::storage_types::StorageBackend;

// Common constants
const SERVER_PORT: u16 = 8080;
const HTTP_TIMEOUT_SECS: u64 = 60;
const SIGNATURE_MAX_AGE_SECS: u64 = 300;
const DEFAULT_SLACK_API_BASE_URL: &str = "https://slack.com/api";
const DEFAULT_SLACK_COMMAND: &str = "/lancamento";
const DEFAULT_SHEETS_TAB_NAME: &str = "Lancamentos";
const DEFAULT_SA_CREDENTIALS_PATH: &str = "service_account.json";
const DEFAULT_DRIVE_API_BASE_URL: &str = "https://www.googleapis.com";
const DEFAULT_SHEETS_API_BASE_URL: &str = "https://sheets.googleapis.com";
const DEFAULT_TIMEZONE: &str = "America/Sao_Paulo";

/// Process-level settings
#[derive(Clone, Debug)]
pub struct BaseConfig {
    pub server_port: u16,
    pub environment: String,
    /// `text` or `json`
    pub log_format: String,
    pub http_timeout_secs: u64,
    /// Timezone for ledger timestamps and the month-folder fallback
    pub timezone: Tz,
}

/// Chat platform settings
#[derive(Clone, Debug)]
pub struct SlackConfig {
    pub bot_token: String,
    /// When absent, inbound signatures are not verified (development only)
    pub signing_secret: Option<String>,
    pub api_base_url: String,
    /// Only message events from this channel are ingested, when set
    pub channel_filter: Option<String>,
    pub command: String,
    pub signature_max_age_secs: u64,
}

/// Google Drive / Sheets settings
#[derive(Clone, Debug)]
pub struct GoogleConfig {
    pub drive_root_folder_id: String,
    pub sheets_id: String,
    pub sheets_tab_name: String,
    /// Inline service account JSON; takes precedence over the path
    pub credentials_json: Option<String>,
    pub credentials_path: String,
    pub drive_api_base_url: String,
    pub sheets_api_base_url: String,
}

/// Local filesystem backend settings
#[derive(Clone, Debug)]
pub struct LocalStorageConfig {
    pub path: String,
    pub base_url: String,
}

/// Application configuration.
#[derive(Clone, Debug)]
pub struct Config {
    pub base: BaseConfig,
    pub slack: SlackConfig,
    pub storage_backend: StorageBackend,
    pub google: GoogleConfig,
    pub local: Option<LocalStorageConfig>,
}

impl Config {
    /// Load configuration from the process environment (and `.env`, when present).
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, anyhow::Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        // Empty values count as unset
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let environment = get("ENVIRONMENT")
            .or_else(|| get("APP_ENV"))
            .unwrap_or_else(|| "development".to_string());

        let server_port = match get("PORT") {
            Some(port) => port
                .parse()
                .map_err(|_| anyhow::anyhow!("PORT must be a valid number"))?,
            None => SERVER_PORT,
        };

        let timezone_name = get("LEDGER_TIMEZONE").unwrap_or_else(|| DEFAULT_TIMEZONE.to_string());
        let timezone: Tz = timezone_name.parse().map_err(|_| {
            anyhow::anyhow!(
                "LEDGER_TIMEZONE must be an IANA timezone name, got '{}'",
                timezone_name
            )
        })?;

        let base = BaseConfig {
            server_port,
            environment,
            log_format: get("LOG_FORMAT")
                .map(|s| s.to_lowercase())
                .unwrap_or_else(|| "text".to_string()),
            http_timeout_secs: get("HTTP_TIMEOUT_SECS")
                .and_then(|s| s.parse().ok())
                .unwrap_or(HTTP_TIMEOUT_SECS),
            timezone,
        };

        let slack = SlackConfig {
            bot_token: get("SLACK_BOT_TOKEN")
                .ok_or_else(|| anyhow::anyhow!("SLACK_BOT_TOKEN must be set"))?,
            signing_secret: get("SLACK_SIGNING_SECRET"),
            api_base_url: get("SLACK_API_BASE_URL")
                .unwrap_or_else(|| DEFAULT_SLACK_API_BASE_URL.to_string()),
            channel_filter: get("SLACK_CHANNEL_ID"),
            command: get("SLACK_COMMAND").unwrap_or_else(|| DEFAULT_SLACK_COMMAND.to_string()),
            signature_max_age_secs: get("SLACK_SIGNATURE_MAX_AGE_SECS")
                .and_then(|s| s.parse().ok())
                .unwrap_or(SIGNATURE_MAX_AGE_SECS),
        };

        let storage_backend = match get("STORAGE_BACKEND") {
            Some(value) => value.parse()?,
            None => StorageBackend::Google,
        };

        let google = GoogleConfig {
            drive_root_folder_id: get("GOOGLE_DRIVE_FOLDER_ID").unwrap_or_default(),
            sheets_id: get("GOOGLE_SHEETS_ID").unwrap_or_default(),
            sheets_tab_name: get("SHEETS_TAB_NAME")
                .unwrap_or_else(|| DEFAULT_SHEETS_TAB_NAME.to_string()),
            credentials_json: get("SA_CREDENTIALS_JSON"),
            credentials_path: get("SA_CREDENTIALS_PATH")
                .unwrap_or_else(|| DEFAULT_SA_CREDENTIALS_PATH.to_string()),
            drive_api_base_url: get("GOOGLE_DRIVE_API_BASE_URL")
                .unwrap_or_else(|| DEFAULT_DRIVE_API_BASE_URL.to_string()),
            sheets_api_base_url: get("GOOGLE_SHEETS_API_BASE_URL")
                .unwrap_or_else(|| DEFAULT_SHEETS_API_BASE_URL.to_string()),
        };

        let local = match (get("LOCAL_STORAGE_PATH"), get("LOCAL_STORAGE_BASE_URL")) {
            (Some(path), Some(base_url)) => Some(LocalStorageConfig { path, base_url }),
            _ => None,
        };

        Ok(Config {
            base,
            slack,
            storage_backend,
            google,
            local,
        })
    }

    /// Check if the application is running in production mode
    pub fn is_production(&self) -> bool {
        let env = self.base.environment.to_lowercase();
        env == "production" || env == "prod"
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if self.is_production() && self.slack.signing_secret.is_none() {
            return Err(anyhow::anyhow!(
                "SLACK_SIGNING_SECRET must be set in production"
            ));
        }

        if self.slack.signature_max_age_secs == 0 {
            return Err(anyhow::anyhow!(
                "SLACK_SIGNATURE_MAX_AGE_SECS must be greater than zero"
            ));
        }

        if !self.slack.command.starts_with('/') {
            return Err(anyhow::anyhow!(
                "SLACK_COMMAND must start with '/', got '{}'",
                self.slack.command
            ));
        }

        match self.storage_backend {
            StorageBackend::Google => {
                if self.google.drive_root_folder_id.is_empty() {
                    return Err(anyhow::anyhow!(
                        "GOOGLE_DRIVE_FOLDER_ID must be set when STORAGE_BACKEND=google"
                    ));
                }
                if self.google.sheets_id.is_empty() {
                    return Err(anyhow::anyhow!(
                        "GOOGLE_SHEETS_ID must be set when STORAGE_BACKEND=google"
                    ));
                }
            }
            StorageBackend::Local => {
                if self.local.is_none() {
                    return Err(anyhow::anyhow!(
                        "LOCAL_STORAGE_PATH and LOCAL_STORAGE_BASE_URL must be set when STORAGE_BACKEND=local"
                    ));
                }
            }
        }

        if self.base.log_format != "text" && self.base.log_format != "json" {
            return Err(anyhow::anyhow!(
                "LOG_FORMAT must be 'text' or 'json', got '{}'",
                self.base.log_format
            ));
        }

        Ok(())
    }

    // Convenience getters for common fields
    pub fn server_port(&self) -> u16 {
        self.base.server_port
    }

    pub fn environment(&self) -> &str {
        &self.base.environment
    }

    pub fn timezone(&self) -> Tz {
        self.base.timezone
    }

    pub fn http_timeout_secs(&self) -> u64 {
        self.base.http_timeout_secs
    }

    pub fn json_logs(&self) -> bool {
        self.base.log_format == "json"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> Result<Config, anyhow::Error> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    const GOOGLE_VARS: [(&str, &str); 3] = [
        ("SLACK_BOT_TOKEN", "xoxb-test"),
        ("GOOGLE_DRIVE_FOLDER_ID", "root-folder"),
        ("GOOGLE_SHEETS_ID", "sheet-id"),
    ];

    #[test]
    fn test_defaults() {
        let config = config_from(&GOOGLE_VARS).unwrap();
        assert_eq!(config.server_port(), 8080);
        assert_eq!(config.storage_backend, StorageBackend::Google);
        assert_eq!(config.google.sheets_tab_name, "Lancamentos");
        assert_eq!(config.google.credentials_path, "service_account.json");
        assert_eq!(config.slack.command, "/lancamento");
        assert_eq!(config.slack.signature_max_age_secs, 300);
        assert_eq!(config.timezone(), chrono_tz::America::Sao_Paulo);
        assert!(config.slack.signing_secret.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_missing_bot_token_fails() {
        let err = config_from(&[("GOOGLE_SHEETS_ID", "x")]).unwrap_err();
        assert!(err.to_string().contains("SLACK_BOT_TOKEN"));
    }

    #[test]
    fn test_empty_value_counts_as_unset() {
        let mut vars = GOOGLE_VARS.to_vec();
        vars.push(("SLACK_CHANNEL_ID", "  "));
        let config = config_from(&vars).unwrap();
        assert!(config.slack.channel_filter.is_none());
    }

    #[test]
    fn test_google_backend_requires_ids() {
        let config = config_from(&[("SLACK_BOT_TOKEN", "xoxb-test")]).unwrap();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("GOOGLE_DRIVE_FOLDER_ID"));
    }

    #[test]
    fn test_local_backend_requires_path() {
        let config = config_from(&[
            ("SLACK_BOT_TOKEN", "xoxb-test"),
            ("STORAGE_BACKEND", "local"),
        ])
        .unwrap();
        assert!(config.validate().is_err());

        let config = config_from(&[
            ("SLACK_BOT_TOKEN", "xoxb-test"),
            ("STORAGE_BACKEND", "local"),
            ("LOCAL_STORAGE_PATH", "/tmp/paynote"),
            ("LOCAL_STORAGE_BASE_URL", "http://localhost:8080/files"),
        ])
        .unwrap();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_production_requires_signing_secret() {
        let mut vars = GOOGLE_VARS.to_vec();
        vars.push(("ENVIRONMENT", "production"));
        let config = config_from(&vars).unwrap();
        assert!(config.is_production());
        assert!(config.validate().is_err());

        vars.push(("SLACK_SIGNING_SECRET", "secret"));
        let config = config_from(&vars).unwrap();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_invalid_timezone_fails() {
        let mut vars = GOOGLE_VARS.to_vec();
        vars.push(("LEDGER_TIMEZONE", "Mars/Olympus"));
        assert!(config_from(&vars).is_err());
    }

    #[test]
    fn test_invalid_port_fails() {
        let mut vars = GOOGLE_VARS.to_vec();
        vars.push(("PORT", "http"));
        assert!(config_from(&vars).is_err());
    }
}
