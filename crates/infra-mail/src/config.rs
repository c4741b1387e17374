// SMTP configuration

use crate::MailError;
use std::str::FromStr;

pub const DEFAULT_SMTP_PORT: u16 = 587;

/// Transport security
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TlsMode {
    /// Plain connection upgraded with STARTTLS
    #[default]
    StartTls,
    /// TLS from the first byte (SMTPS)
    Tls,
    /// No encryption (local relays and test servers only)
    None,
}

impl FromStr for TlsMode {
    type Err = MailError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "starttls" => Ok(TlsMode::StartTls),
            "tls" => Ok(TlsMode::Tls),
            "none" => Ok(TlsMode::None),
            other => Err(MailError::InvalidConfig {
                key: "SMTP_TLS".into(),
                value: other.into(),
            }),
        }
    }
}

#[derive(Debug, Clone)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    pub username: Option<String>,
    pub password: Option<String>,
    pub from: String,
    pub tls: TlsMode,
}

impl SmtpConfig {
    /// Read `SMTP_*` variables from the process environment
    pub fn from_env() -> Result<Self, MailError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup (lets tests avoid touching the real environment)
    pub fn from_lookup<F>(lookup: F) -> Result<Self, MailError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &str| {
            lookup(key)
                .filter(|v| !v.trim().is_empty())
                .ok_or_else(|| MailError::MissingConfig(key.to_string()))
        };

        let port: u16 = match lookup("SMTP_PORT") {
            Some(raw) => raw.parse().map_err(|_| MailError::InvalidConfig {
                key: "SMTP_PORT".into(),
                value: raw,
            })?,
            None => DEFAULT_SMTP_PORT,
        };
        let tls = match lookup("SMTP_TLS") {
            Some(raw) => raw.parse()?,
            None => TlsMode::default(),
        };

        Ok(Self {
            host: required("SMTP_HOST")?,
            port,
            username: lookup("SMTP_USER"),
            password: lookup("SMTP_PASSWORD"),
            from: required("SMTP_FROM")?,
            tls,
        })
    }
}
