//! IMAP connection configuration

use crate::error::{Error, Result};
use crate::folder::Folder;
use std::env;
use std::str::FromStr;

pub const DEFAULT_HOST: &str = "outlook.office365.com";
pub const DEFAULT_PORT: u16 = 993;

/// How the connection is secured.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Security {
    /// TLS from the first byte (IMAPS, port 993).
    #[default]
    Tls,
    /// Plain TCP upgraded with the STARTTLS command (port 143).
    StartTls,
}

impl FromStr for Security {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "tls" | "ssl" | "imaps" => Ok(Self::Tls),
            "starttls" => Ok(Self::StartTls),
            other => Err(Error::Config(format!("Invalid IMAP_SECURITY: {other}"))),
        }
    }
}

/// IMAP server settings
#[derive(Debug, Clone)]
pub struct ImapConfig {
    pub host: String,
    pub port: u16,
    pub security: Security,
    /// Folder selected after login.
    pub folder: Folder,
    /// Skip certificate verification. Only for self-signed test or
    /// bridge servers.
    pub accept_invalid_certs: bool,
}

impl Default for ImapConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            security: Security::Tls,
            folder: Folder::Inbox,
            accept_invalid_certs: false,
        }
    }
}

impl ImapConfig {
    /// Load server settings from environment variables
    ///
    /// Reads from `.env` file if present. All variables are optional:
    /// - `IMAP_HOST` (default: `outlook.office365.com`)
    /// - `IMAP_PORT` (default: `993`)
    /// - `IMAP_SECURITY` (`tls` or `starttls`, default: `tls`)
    /// - `IMAP_FOLDER` (default: `INBOX`)
    /// - `IMAP_ACCEPT_INVALID_CERTS` (default: `false`)
    ///
    /// # Errors
    ///
    /// Returns an error if a variable is set to an unparseable value.
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let defaults = Self::default();

        Ok(Self {
            host: lookup("IMAP_HOST").unwrap_or(defaults.host),
            port: lookup("IMAP_PORT")
                .map(|p| p.parse::<u16>())
                .transpose()
                .map_err(|e| Error::Config(format!("Invalid IMAP_PORT: {e}")))?
                .unwrap_or(defaults.port),
            security: lookup("IMAP_SECURITY")
                .map(|s| s.parse::<Security>())
                .transpose()?
                .unwrap_or(defaults.security),
            folder: lookup("IMAP_FOLDER").map_or(defaults.folder, Folder::from),
            accept_invalid_certs: lookup("IMAP_ACCEPT_INVALID_CERTS")
                .map(|v| parse_bool(&v))
                .transpose()?
                .unwrap_or(defaults.accept_invalid_certs),
        })
    }
}

/// Login credentials for the mailbox
#[derive(Clone)]
pub struct Credentials {
    pub address: String,
    pub password: String,
}

impl Credentials {
    /// Load credentials from `IMAP_USERNAME` and `IMAP_PASSWORD`
    ///
    /// Reads from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns an error if either variable is missing.
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        Ok(Self {
            address: env::var("IMAP_USERNAME")
                .map_err(|_| Error::Config("IMAP_USERNAME not set".into()))?,
            password: env::var("IMAP_PASSWORD")
                .map_err(|_| Error::Config("IMAP_PASSWORD not set".into()))?,
        })
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("address", &self.address)
            .field("password", &"<redacted>")
            .finish()
    }
}

fn parse_bool(value: &str) -> Result<bool> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" => Ok(true),
        "0" | "false" | "no" => Ok(false),
        other => Err(Error::Config(format!(
            "Invalid IMAP_ACCEPT_INVALID_CERTS: {other}"
        ))),
    }
}
