//! Server configuration.
//!
//! Supports configuration via environment variables:
//!
//! ```bash
//! # Core settings
//! INTAKE_PUBLIC_URL=https://intake.example.com
//! INTAKE_INVITATION_TTL_DAYS=7
//! INTAKE_ADMIN_TOKEN=change-me
//!
//! # Provider: Resend
//! INTAKE_EMAIL_PROVIDER=resend
//! RESEND_API_KEY=re_...
//!
//! # Provider: SMTP
//! INTAKE_EMAIL_PROVIDER=smtp
//! SMTP_HOST=smtp.gmail.com
//! SMTP_PORT=587
//! SMTP_USERNAME=user@example.com
//! SMTP_PASSWORD=app_password
//! SMTP_USE_TLS=true
//!
//! # Sender config
//! INTAKE_EMAIL_FROM=noreply@example.com
//! INTAKE_EMAIL_FROM_NAME="IP Intake"
//!
//! # Uploaded documents
//! INTAKE_UPLOAD_DIR=./uploads
//! INTAKE_UPLOAD_BASE_URL=https://intake.example.com/uploads
//! INTAKE_UPLOAD_MAX_BYTES=10485760
//!
//! # Work-hour reminders
//! INTAKE_REMINDER_DAYS=mon,tue,wed,thu,fri
//! INTAKE_REMINDER_TIME=18:00
//! INTAKE_REMINDER_UTC_OFFSET_MINUTES=330
//! INTAKE_REMINDER_RECIPIENTS=a@example.com,b@example.com
//! ```

use std::env;
use std::path::PathBuf;

use chrono::Duration;
use intake_reminders::{parse_time, parse_weekdays, ReminderConfig};
use thiserror::Error;

const DEFAULT_PUBLIC_URL: &str = "http://localhost:3000";
const DEFAULT_TTL_DAYS: i64 = 7;
const DEFAULT_UPLOAD_MAX_BYTES: usize = 10 * 1024 * 1024;

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Base URL clients open; invitation links are `{public_url}/invitation/{token}`.
    pub public_url: String,
    /// How long an issued or resent invitation stays usable.
    pub invitation_ttl: Duration,
    /// Bearer secret for admin routes. `None` locks every admin route.
    pub admin_token: Option<String>,
    pub email: EmailConfig,
    pub uploads: UploadConfig,
    pub reminders: ReminderSettings,
}

/// Outbound email configuration
#[derive(Debug, Clone)]
pub struct EmailConfig {
    /// Email provider configuration
    pub provider: EmailProviderConfig,
    /// From email address
    pub from_address: String,
    /// Optional from name
    pub from_name: Option<String>,
}

/// Email provider configuration
#[derive(Debug, Clone)]
pub enum EmailProviderConfig {
    /// Log messages instead of sending them (development)
    Log,
    /// Resend email provider
    Resend {
        /// Resend API key
        #[allow(dead_code)] // Used when email-resend feature is enabled
        api_key: String,
    },
    /// SMTP email provider
    Smtp {
        /// SMTP host
        host: String,
        /// SMTP port
        port: u16,
        /// Optional username
        username: Option<String>,
        /// Optional password
        password: Option<String>,
        /// Whether to use TLS
        use_tls: bool,
    },
}

/// Where uploaded documents are written and how they are addressed.
#[derive(Debug, Clone)]
pub struct UploadConfig {
    pub dir: PathBuf,
    pub base_url: String,
    pub max_bytes: usize,
}

#[derive(Debug, Clone)]
pub struct ReminderSettings {
    pub schedule: ReminderConfig,
    /// Empty means the scheduler is not started.
    pub recipients: Vec<String>,
}

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid email provider: {0}. Expected 'resend', 'smtp' or 'log'")]
    InvalidProvider(String),

    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid port number: {0}")]
    InvalidPort(String),

    #[error("Invalid number for {name}: {value}")]
    InvalidNumber { name: String, value: String },

    #[error("Missing from address: INTAKE_EMAIL_FROM is required when email is configured")]
    MissingFromAddress,

    #[error("SMTP provider requires SMTP_HOST")]
    SmtpMissingHost,

    #[error("Invalid reminder settings: {0}")]
    InvalidReminders(String),
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            public_url: DEFAULT_PUBLIC_URL.to_string(),
            invitation_ttl: Duration::days(DEFAULT_TTL_DAYS),
            admin_token: None,
            email: EmailConfig {
                provider: EmailProviderConfig::Log,
                from_address: "noreply@localhost".to_string(),
                from_name: None,
            },
            uploads: UploadConfig {
                dir: PathBuf::from("./uploads"),
                base_url: format!("{DEFAULT_PUBLIC_URL}/uploads"),
                max_bytes: DEFAULT_UPLOAD_MAX_BYTES,
            },
            reminders: ReminderSettings {
                schedule: ReminderConfig {
                    enabled: false,
                    ..ReminderConfig::default()
                },
                recipients: vec![],
            },
        }
    }
}

impl ServerConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        let public_url = env::var("INTAKE_PUBLIC_URL")
            .unwrap_or_else(|_| DEFAULT_PUBLIC_URL.to_string())
            .trim_end_matches('/')
            .to_string();

        let ttl_days = parse_number("INTAKE_INVITATION_TTL_DAYS", DEFAULT_TTL_DAYS)?;
        let admin_token = env::var("INTAKE_ADMIN_TOKEN")
            .ok()
            .filter(|t| !t.trim().is_empty());

        Ok(Self {
            invitation_ttl: Duration::days(ttl_days),
            admin_token,
            email: email_from_env()?,
            uploads: UploadConfig {
                dir: env::var("INTAKE_UPLOAD_DIR")
                    .map(PathBuf::from)
                    .unwrap_or_else(|_| PathBuf::from("./uploads")),
                base_url: env::var("INTAKE_UPLOAD_BASE_URL")
                    .map(|u| u.trim_end_matches('/').to_string())
                    .unwrap_or_else(|_| format!("{public_url}/uploads")),
                max_bytes: parse_number("INTAKE_UPLOAD_MAX_BYTES", DEFAULT_UPLOAD_MAX_BYTES)?,
            },
            reminders: reminders_from_env()?,
            public_url,
        })
    }

    /// Client-facing link for a token.
    pub fn invitation_link(&self, token: &str) -> String {
        format!("{}/invitation/{}", self.public_url, token)
    }
}

fn parse_number<T: std::str::FromStr>(name: &str, default: T) -> Result<T, ConfigError> {
    match env::var(name) {
        Ok(value) => value.trim().parse::<T>().map_err(|_| ConfigError::InvalidNumber {
            name: name.to_string(),
            value,
        }),
        Err(_) => Ok(default),
    }
}

fn email_from_env() -> Result<EmailConfig, ConfigError> {
    let provider_type = env::var("INTAKE_EMAIL_PROVIDER").unwrap_or_else(|_| "log".to_string());

    let provider = match provider_type.to_lowercase().as_str() {
        "log" => EmailProviderConfig::Log,
        "resend" => {
            let api_key = env::var("RESEND_API_KEY")
                .map_err(|_| ConfigError::MissingEnvVar("RESEND_API_KEY".to_string()))?;
            EmailProviderConfig::Resend { api_key }
        }
        "smtp" => {
            let host = env::var("SMTP_HOST").map_err(|_| ConfigError::SmtpMissingHost)?;
            let port = match env::var("SMTP_PORT") {
                Ok(raw) => raw
                    .parse::<u16>()
                    .map_err(|_| ConfigError::InvalidPort(raw.clone()))?,
                Err(_) => 587,
            };
            let username = env::var("SMTP_USERNAME").ok();
            let password = env::var("SMTP_PASSWORD").ok();
            let use_tls = env::var("SMTP_USE_TLS")
                .map(|v| v.to_lowercase() == "true" || v == "1")
                .unwrap_or(true); // TLS by default

            EmailProviderConfig::Smtp {
                host,
                port,
                username,
                password,
                use_tls,
            }
        }
        other => return Err(ConfigError::InvalidProvider(other.to_string())),
    };

    let from_address = match (&provider, env::var("INTAKE_EMAIL_FROM")) {
        (_, Ok(addr)) => addr,
        (EmailProviderConfig::Log, Err(_)) => "noreply@localhost".to_string(),
        (_, Err(_)) => return Err(ConfigError::MissingFromAddress),
    };
    let from_name = env::var("INTAKE_EMAIL_FROM_NAME").ok();

    Ok(EmailConfig {
        provider,
        from_address,
        from_name,
    })
}

fn reminders_from_env() -> Result<ReminderSettings, ConfigError> {
    let defaults = ReminderConfig::default();
    let invalid = |e: intake_reminders::ReminderError| ConfigError::InvalidReminders(e.to_string());

    let days = match env::var("INTAKE_REMINDER_DAYS") {
        Ok(raw) => parse_weekdays(&raw).map_err(invalid)?,
        Err(_) => defaults.days.clone(),
    };
    let time = match env::var("INTAKE_REMINDER_TIME") {
        Ok(raw) => parse_time(&raw).map_err(invalid)?,
        Err(_) => defaults.time,
    };
    let offset = parse_number(
        "INTAKE_REMINDER_UTC_OFFSET_MINUTES",
        defaults.utc_offset_minutes,
    )?;
    let recipients: Vec<String> = env::var("INTAKE_REMINDER_RECIPIENTS")
        .map(|raw| {
            raw.split(',')
                .map(intake_storage::normalize_email)
                .filter(|r| !r.is_empty())
                .collect()
        })
        .unwrap_or_default();

    let schedule = ReminderConfig::new(!recipients.is_empty(), days, time, offset).map_err(invalid)?;

    Ok(ReminderSettings {
        schedule,
        recipients,
    })
}
