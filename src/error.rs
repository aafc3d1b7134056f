//! Error types for email-verifier

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Authentication failed: {0}")]
    Auth(String),

    #[error("IMAP error: {0}")]
    Imap(String),

    #[error("Email parsing error: {0}")]
    Parse(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TLS error: {0}")]
    Tls(String),

    #[error("Sender address must be US-ASCII: {0}")]
    InvalidSender(String),

    #[error("No authenticated session; call connect() first")]
    NotConnected,
}

pub type Result<T> = std::result::Result<T, Error>;
