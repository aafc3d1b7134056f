//! Email verification code retrieval over IMAP
//!
//! Connects to a mailbox (Outlook/Office 365 by default), finds
//! messages from a given sender, runs caller-supplied subject and body
//! filters, extracts a code or link from each matching body and flags
//! the processed messages `\Deleted`. Results come back keyed by
//! recipient address, which makes it easy to match codes to the
//! accounts they were sent to.
//!
//! ```no_run
//! use email_verifier::{Filters, ImapConfig, MailboxClient, Prefix, RegexExtractor};
//!
//! # async fn run() -> email_verifier::Result<()> {
//! let mut client = MailboxClient::new(ImapConfig::default());
//! client.connect("me@outlook.com", "app-password").await?;
//!
//! let subject = Prefix::new("Your code");
//! let code = RegexExtractor::new(r"(\d{6})\D*$")?;
//! let filters = Filters::new().subject(&subject).extractor(&code);
//!
//! let codes = client.fetch_filtered("noreply@example.com", &filters).await?;
//! client.close().await?;
//! # let _ = codes;
//! # Ok(())
//! # }
//! ```

mod client;
mod config;
mod connection;
mod error;
mod filter;
mod flag;
mod folder;
mod message;

pub use client::{MailboxClient, ResultMap, SessionState};
pub use config::{Credentials, DEFAULT_HOST, DEFAULT_PORT, ImapConfig, Security};
pub use error::{Error, Result};
pub use filter::{
    BodyFilter, CodeExtractor, Contains, Filters, Prefix, RegexExtractor, SubjectFilter,
};
pub use flag::Flag;
pub use folder::Folder;
pub use message::Message;
