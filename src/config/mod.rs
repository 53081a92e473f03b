pub mod cli;
pub mod profile;

use crate::core::ConfigProvider;
use crate::utils::error::Result;
use crate::utils::validation::{
    validate_non_empty_string, validate_path, validate_positive_number, validate_range,
    validate_url, Validate,
};
use clap::Parser;
use profile::MailProfile;

pub const DEFAULT_UNIVERSE_URL: &str =
    "https://www.jpx.co.jp/markets/statistics-equities/misc/tvdivq0000001vg2-att/data_j.xls";
pub const DEFAULT_QUOTE_ENDPOINT: &str = "https://query2.finance.yahoo.com";

#[derive(Debug, Clone, Parser)]
#[command(name = "prime-screener")]
#[command(about = "Screens Tokyo-listed equities against value-investing thresholds")]
pub struct CliConfig {
    /// Listed-companies workbook published by the exchange.
    #[arg(long, default_value = DEFAULT_UNIVERSE_URL)]
    pub universe_url: String,

    /// Base URL of the quoteSummary-compatible market data API.
    #[arg(long, default_value = DEFAULT_QUOTE_ENDPOINT)]
    pub quote_endpoint: String,

    #[arg(long, default_value = ".")]
    pub output_path: String,

    /// Worker pool size for per-ticker fundamentals fetches.
    #[arg(long, default_value = "10")]
    pub concurrent_requests: usize,

    /// Optional TOML screen profile (thresholds, market segments, mail).
    #[arg(long)]
    pub profile: Option<String>,

    #[arg(long, default_value = "smtp.gmail.com")]
    pub smtp_host: String,

    #[arg(long, default_value = "587")]
    pub smtp_port: u16,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Log system stats per phase")]
    pub monitor: bool,
}

impl ConfigProvider for CliConfig {
    fn universe_url(&self) -> &str {
        &self.universe_url
    }

    fn quote_endpoint(&self) -> &str {
        &self.quote_endpoint
    }

    fn output_path(&self) -> &str {
        &self.output_path
    }

    fn concurrent_requests(&self) -> usize {
        self.concurrent_requests
    }
}

impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        validate_url("universe_url", &self.universe_url)?;
        validate_url("quote_endpoint", &self.quote_endpoint)?;
        validate_path("output_path", &self.output_path)?;
        validate_positive_number("concurrent_requests", self.concurrent_requests, 1)?;
        validate_non_empty_string("smtp_host", &self.smtp_host)?;
        validate_range("smtp_port", self.smtp_port, 1, u16::MAX)?;
        Ok(())
    }
}

/// Resolved mail delivery settings. `None` when the credential environment
/// variables are absent, which turns the notifier into a logged skip.
#[derive(Debug, Clone)]
pub struct MailSettings {
    pub user: String,
    pub password: String,
    pub to: String,
    pub smtp_host: String,
    pub smtp_port: u16,
    pub subject_prefix: String,
}

pub const USER_ENV: &str = "GMAIL_USER";
pub const PASSWORD_ENV: &str = "GMAIL_APP_PASSWORD";

impl MailSettings {
    /// Credentials come from the environment; addressing and subject from
    /// the profile. The sender receives the mail unless the profile says
    /// otherwise.
    pub fn from_env(config: &CliConfig, mail: &MailProfile) -> Option<Self> {
        let user = std::env::var(USER_ENV).ok().filter(|v| !v.is_empty())?;
        let password = std::env::var(PASSWORD_ENV).ok().filter(|v| !v.is_empty())?;
        let to = mail.to.clone().unwrap_or_else(|| user.clone());

        Some(Self {
            user,
            password,
            to,
            smtp_host: config.smtp_host.clone(),
            smtp_port: config.smtp_port,
            subject_prefix: mail.subject_prefix.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_config() -> CliConfig {
        CliConfig {
            universe_url: DEFAULT_UNIVERSE_URL.to_string(),
            quote_endpoint: DEFAULT_QUOTE_ENDPOINT.to_string(),
            output_path: ".".to_string(),
            concurrent_requests: 10,
            profile: None,
            smtp_host: "smtp.gmail.com".to_string(),
            smtp_port: 587,
            verbose: false,
            monitor: false,
        }
    }

    #[test]
    fn test_default_config_validates() {
        assert!(base_config().validate().is_ok());
    }

    #[test]
    fn test_zero_workers_rejected() {
        let mut config = base_config();
        config.concurrent_requests = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_bad_endpoint_rejected() {
        let mut config = base_config();
        config.quote_endpoint = "not a url".to_string();
        assert!(config.validate().is_err());
    }
}
