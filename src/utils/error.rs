use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScreenerError {
    #[error("API request failed: {0}")]
    ApiError(#[from] reqwest::Error),

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("Spreadsheet parsing error: {0}")]
    SpreadsheetError(#[from] calamine::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Mail message assembly failed: {0}")]
    MailBuildError(#[from] lettre::error::Error),

    #[error("Invalid mail address: {0}")]
    AddressError(#[from] lettre::address::AddressError),

    #[error("Invalid mail content type: {0}")]
    ContentTypeError(#[from] lettre::message::header::ContentTypeErr),

    #[error("SMTP transport error: {0}")]
    SmtpError(#[from] lettre::transport::smtp::Error),

    #[error("Ticker universe error: {message}")]
    UniverseError { message: String },

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Invalid value for {field}: '{value}' ({reason})")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Data processing error: {message}")]
    ProcessingError { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Network,
    Data,
    Config,
    Mail,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    /// Run still produced its output (e.g. mail delivery problems).
    Low,
    /// Transient-looking failure, rerun may succeed.
    Medium,
    /// Run failed to produce its output.
    High,
    /// Broken configuration or environment, rerun will not help.
    Critical,
}

impl ScreenerError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::ApiError(_) | Self::UniverseError { .. } => ErrorCategory::Network,
            Self::CsvError(_)
            | Self::SpreadsheetError(_)
            | Self::SerializationError(_)
            | Self::ProcessingError { .. } => ErrorCategory::Data,
            Self::ConfigError { .. }
            | Self::InvalidConfigValueError { .. }
            | Self::MissingConfigError { .. } => ErrorCategory::Config,
            Self::MailBuildError(_)
            | Self::AddressError(_)
            | Self::ContentTypeError(_)
            | Self::SmtpError(_) => ErrorCategory::Mail,
            Self::IoError(_) => ErrorCategory::System,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            Self::MailBuildError(_)
            | Self::AddressError(_)
            | Self::ContentTypeError(_)
            | Self::SmtpError(_) => ErrorSeverity::Low,
            Self::ApiError(_) => ErrorSeverity::Medium,
            Self::UniverseError { .. }
            | Self::CsvError(_)
            | Self::SpreadsheetError(_)
            | Self::SerializationError(_)
            | Self::ProcessingError { .. }
            | Self::IoError(_) => ErrorSeverity::High,
            Self::ConfigError { .. }
            | Self::InvalidConfigValueError { .. }
            | Self::MissingConfigError { .. } => ErrorSeverity::Critical,
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            Self::ApiError(e) => format!("ネットワークリクエストに失敗しました: {}", e),
            Self::UniverseError { message } => {
                format!("銘柄リストを取得できませんでした: {}", message)
            }
            Self::SpreadsheetError(e) => format!("銘柄リストの解析に失敗しました: {}", e),
            Self::CsvError(e) => format!("CSVの生成に失敗しました: {}", e),
            Self::IoError(e) => format!("ファイル操作に失敗しました: {}", e),
            Self::MailBuildError(_)
            | Self::AddressError(_)
            | Self::ContentTypeError(_)
            | Self::SmtpError(_) => format!("メール送信エラー: {}", self),
            Self::ConfigError { .. }
            | Self::InvalidConfigValueError { .. }
            | Self::MissingConfigError { .. } => format!("設定エラー: {}", self),
            other => other.to_string(),
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self.category() {
            ErrorCategory::Network => "Check network connectivity and the endpoint URLs, then rerun",
            ErrorCategory::Data => "The upstream data shape may have changed; inspect the response",
            ErrorCategory::Config => "Fix the flagged option or environment variable and rerun",
            ErrorCategory::Mail => "Verify GMAIL_USER / GMAIL_APP_PASSWORD and the SMTP relay settings",
            ErrorCategory::System => "Check the output directory exists and is writable",
        }
    }
}

pub type Result<T> = std::result::Result<T, ScreenerError>;
