use crate::domain::model::Thresholds;
use crate::market::universe::DOMESTIC_MARKETS;
use crate::utils::error::{Result, ScreenerError};
use crate::utils::validation::{validate_non_empty_string, validate_range, Validate};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Screening profile loaded from a TOML file. Everything defaults to the
/// stock run: ROE>10 / PER<15 / PBR<1 over the three domestic segments,
/// mail sent back to the authenticated sender.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScreenProfile {
    pub screen: Thresholds,
    pub markets: Vec<String>,
    pub mail: MailProfile,
}

impl Default for ScreenProfile {
    fn default() -> Self {
        Self {
            screen: Thresholds::default(),
            markets: DOMESTIC_MARKETS.iter().map(|m| m.to_string()).collect(),
            mail: MailProfile::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MailProfile {
    /// Recipient override; defaults to the sending account.
    pub to: Option<String>,
    pub subject_prefix: String,
}

impl Default for MailProfile {
    fn default() -> Self {
        Self {
            to: None,
            subject_prefix: "【株価スクリーニング】".to_string(),
        }
    }
}

impl ScreenProfile {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(ScreenerError::IoError)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| ScreenerError::ConfigError {
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// Replaces `${VAR_NAME}` with the environment value; unknown variables
    /// are left in place so validation can flag them.
    fn substitute_env_vars(content: &str) -> Result<String> {
        use regex::Regex;
        let re = Regex::new(r"\$\{([^}]+)\}").unwrap();

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }
}

impl Validate for ScreenProfile {
    fn validate(&self) -> Result<()> {
        validate_range("screen.per_max", self.screen.per_max, 0.01, 10_000.0)?;
        validate_range("screen.pbr_max", self.screen.pbr_max, 0.01, 10_000.0)?;

        if self.markets.is_empty() {
            return Err(ScreenerError::InvalidConfigValueError {
                field: "markets".to_string(),
                value: "[]".to_string(),
                reason: "At least one market segment is required".to_string(),
            });
        }
        for market in &self.markets {
            validate_non_empty_string("markets", market)?;
        }

        if let Some(to) = &self.mail.to {
            validate_non_empty_string("mail.to", to)?;
        }
        validate_non_empty_string("mail.subject_prefix", &self.mail.subject_prefix)?;

        Ok(())
    }
}
