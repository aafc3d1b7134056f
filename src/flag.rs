//! IMAP flags and STORE queries
//!
//! Typed flag names plus the helper that renders the data item for a
//! `STORE` command, so callers never hand-assemble `+FLAGS (...)`.

use std::fmt;

/// An IMAP system flag set by this crate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Flag {
    /// Message is marked for deletion (`\Deleted`).
    ///
    /// Setting it does not remove anything; the message stays in the
    /// mailbox until some client issues EXPUNGE.
    Deleted,
}

impl Flag {
    #[must_use]
    pub const fn as_imap_str(self) -> &'static str {
        match self {
            Self::Deleted => "\\Deleted",
        }
    }

    /// Render the STORE data item that adds this flag, e.g.
    /// `+FLAGS (\Deleted)`.
    #[must_use]
    pub fn add_query(self) -> String {
        format!("+FLAGS ({self})")
    }
}

impl fmt::Display for Flag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_imap_str())
    }
}
