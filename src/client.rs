//! Verification-code mailbox client

use crate::config::ImapConfig;
use crate::connection::{self, ImapSession};
use crate::error::{Error, Result};
use crate::filter::Filters;
use crate::flag::Flag;
use crate::folder::Folder;
use crate::message::{self, Headers, Message};
use async_imap::types::Fetch;
use futures::TryStreamExt;
use std::collections::BTreeMap;
use tracing::{debug, info, warn};

/// Extracted values keyed by recipient address.
pub type ResultMap = BTreeMap<String, String>;

/// Lifecycle of the client's IMAP session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Never connected, or the last login was rejected.
    Disconnected,
    /// Logged in with a folder selected.
    Ready,
    /// Logged out.
    Closed,
}

/// IMAP client that collects verification codes from one mailbox.
///
/// Owns a single session. Every network call is awaited before the
/// next one is issued.
pub struct MailboxClient {
    config: ImapConfig,
    session: Option<ImapSession>,
    state: SessionState,
}

impl MailboxClient {
    #[must_use]
    pub const fn new(config: ImapConfig) -> Self {
        Self {
            config,
            session: None,
            state: SessionState::Disconnected,
        }
    }

    #[must_use]
    pub const fn state(&self) -> SessionState {
        self.state
    }

    #[must_use]
    pub fn host(&self) -> &str {
        &self.config.host
    }

    #[must_use]
    pub const fn port(&self) -> u16 {
        self.config.port
    }

    #[must_use]
    pub const fn is_authenticated(&self) -> bool {
        self.session.is_some()
    }

    /// The folder operations run against, once connected.
    #[must_use]
    pub fn selected_folder(&self) -> Option<&Folder> {
        self.session.as_ref().map(|_| &self.config.folder)
    }

    /// Connect, wait for the greeting, log in and select the folder
    ///
    /// A rejected login is logged and returned as [`Error::Auth`]; the
    /// client stays [`SessionState::Disconnected`] and may be
    /// connected again. Calling this on a ready client is a no-op.
    ///
    /// # Errors
    ///
    /// Returns an error if the connection, TLS handshake, LOGIN or
    /// SELECT fails.
    pub async fn connect(&mut self, address: &str, password: &str) -> Result<()> {
        if self.session.is_some() {
            debug!("Already connected to {}", self.config.host);
            return Ok(());
        }

        let client = connection::open(&self.config).await?;

        let mut session = match connection::login(client, address, password).await {
            Ok(session) => session,
            Err(e) => {
                warn!("Failed to login as {}: {}", address, e);
                return Err(e);
            }
        };

        if let Err(e) = connection::select(&mut session, &self.config.folder).await {
            session.logout().await.ok();
            return Err(e);
        }

        info!(
            "Connected to {} as {}, {} selected",
            self.config.host, address, self.config.folder
        );
        self.session = Some(session);
        self.state = SessionState::Ready;
        Ok(())
    }

    /// Log out and release the session
    ///
    /// Closing a client without a session does nothing.
    ///
    /// # Errors
    ///
    /// Returns an error if the LOGOUT command fails. The session is
    /// released either way.
    pub async fn close(&mut self) -> Result<()> {
        let Some(mut session) = self.session.take() else {
            debug!("close() called without an open session");
            return Ok(());
        };

        self.state = SessionState::Closed;
        session
            .logout()
            .await
            .map_err(|e| Error::Imap(format!("Logout failed: {e}")))?;

        info!("Logged out of {}", self.config.host);
        Ok(())
    }

    /// Find messages sent from `sender`
    ///
    /// Runs `SEARCH CHARSET US-ASCII (FROM "<sender>")` and returns the
    /// message sequence numbers in ascending order.
    ///
    /// # Errors
    ///
    /// Returns an error if the client is not connected, `sender` is not
    /// US-ASCII, or the SEARCH fails.
    pub async fn search(&mut self, sender: &str) -> Result<Vec<u32>> {
        let query = from_query(sender)?;
        let session = self.session_mut()?;

        let ids = session
            .search(&query)
            .await
            .map_err(|e| Error::Imap(format!("Search failed: {e}")))?;

        let mut ids: Vec<u32> = ids.into_iter().collect();
        ids.sort_unstable();

        info!("Found {} messages from {}", ids.len(), sender);
        Ok(ids)
    }

    /// Fetch and parse one message
    ///
    /// # Errors
    ///
    /// Returns an error if the client is not connected, the FETCH
    /// fails, or the message cannot be decoded.
    pub async fn fetch_by_id(&mut self, id: u32) -> Result<Message> {
        let raw = self.fetch_raw(id).await?;
        Message::parse(id, &raw)
    }

    /// Flag a message `\Deleted`
    ///
    /// The message is not expunged.
    ///
    /// # Errors
    ///
    /// Returns an error if the client is not connected or the STORE
    /// fails.
    pub async fn delete(&mut self, id: u32) -> Result<()> {
        let query = Flag::Deleted.add_query();
        let session = self.session_mut()?;

        let updates: Vec<Fetch> = session
            .store(id.to_string(), &query)
            .await
            .map_err(|e| Error::Imap(format!("Store failed: {e}")))?
            .try_collect()
            .await
            .map_err(|e| Error::Imap(format!("Store error: {e}")))?;

        debug!("Flagged message {} deleted ({} updates)", id, updates.len());
        Ok(())
    }

    /// Collect verification codes sent by `sender`
    ///
    /// For each message from `sender`, in order: skip it if the subject
    /// or body filter rejects it, otherwise compute its value (the
    /// extractor's output, or the whole body). A non-empty value flags
    /// the message deleted and is recorded under the message's
    /// recipient, replacing any earlier value for that recipient.
    /// Messages without a value are left untouched.
    ///
    /// # Errors
    ///
    /// Returns the first error hit, including [`Error::Parse`] for a
    /// subject or body that cannot be decoded. Messages flagged before
    /// the error stay flagged.
    pub async fn fetch_filtered(
        &mut self,
        sender: &str,
        filters: &Filters<'_>,
    ) -> Result<ResultMap> {
        info!("Fetching emails from {}", sender);
        let ids = self.search(sender).await?;

        let mut results = ResultMap::new();
        for id in ids {
            let raw = self.fetch_raw(id).await?;
            let mail = mailparse::parse_mail(&raw).map_err(|e| Error::Parse(e.to_string()))?;

            let headers = Headers::read(id, &mail)?;
            if !filters.subject_matches(&headers.subject) {
                debug!("Skipping email {} with subject: {}", id, headers.subject);
                continue;
            }

            let body = message::body_text(&mail)?;
            if !filters.body_matches(&body) {
                debug!("Skipping email {} with body: {}", id, body);
                continue;
            }

            let Some(value) = filters.value_for(&body) else {
                debug!("No value extracted from email {}", id);
                continue;
            };

            self.delete(id).await?;
            info!("Collected value for {} from email {}", headers.to, id);
            results.insert(headers.to, value);
        }

        Ok(results)
    }

    // -- private helpers --

    fn session_mut(&mut self) -> Result<&mut ImapSession> {
        self.session.as_mut().ok_or(Error::NotConnected)
    }

    async fn fetch_raw(&mut self, id: u32) -> Result<Vec<u8>> {
        let session = self.session_mut()?;

        let fetches: Vec<Fetch> = session
            .fetch(id.to_string(), "RFC822")
            .await
            .map_err(|e| Error::Imap(format!("Fetch failed: {e}")))?
            .try_collect()
            .await
            .map_err(|e| Error::Imap(format!("Fetch error: {e}")))?;

        fetches
            .iter()
            .find_map(Fetch::body)
            .map(<[u8]>::to_vec)
            .ok_or_else(|| Error::Imap(format!("No body found for message {id}")))
    }
}

/// Build the sender search, quoting the address as an IMAP
/// quoted-string.
fn from_query(sender: &str) -> Result<String> {
    if !sender.is_ascii() || sender.contains(['\r', '\n']) {
        return Err(Error::InvalidSender(sender.to_string()));
    }

    let escaped = sender.replace('\\', "\\\\").replace('"', "\\\"");
    Ok(format!("CHARSET US-ASCII (FROM \"{escaped}\")"))
}
