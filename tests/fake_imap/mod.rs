//! Fake IMAP server for integration testing
//!
//! An in-process IMAP server that speaks enough of the protocol to
//! drive `MailboxClient` end-to-end over implicit TLS or STARTTLS:
//!
//! TCP -> TLS -> greeting -> LOGIN -> SELECT -> SEARCH/FETCH/STORE -> LOGOUT
//!
//! ## Module layout
//!
//! - `server` -- TCP listener, TLS setup, command log and dispatch
//! - `handlers/` -- one file per IMAP command
//! - `mailbox` -- test data model (folders, emails, flags, builder)
//! - `io` -- shared write helpers

// Each test binary uses a different subset of the harness.
#![allow(dead_code)]

mod handlers;
mod io;

pub use mailbox::MailboxBuilder;
pub use server::{FakeImapServer, PASSWORD, USERNAME};
