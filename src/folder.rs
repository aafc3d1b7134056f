//! IMAP folder types
//!
//! Verification mail usually lands in INBOX, but some providers file
//! it under junk. `Folder` names the mailbox selected after login.

use std::fmt;

/// The mailbox selected by [`MailboxClient::connect`](crate::MailboxClient::connect).
///
/// # Examples
///
/// ```
/// use email_verifier::Folder;
///
/// assert_eq!(Folder::Inbox.as_str(), "INBOX");
/// assert_eq!(Folder::from("Junk Email"), Folder::Junk);
/// assert_eq!(Folder::custom("Signups").as_str(), "Signups");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub enum Folder {
    /// The INBOX folder (RFC 3501 required, case-insensitive).
    #[default]
    Inbox,
    /// The junk folder, named `Junk Email` on Outlook/Exchange.
    Junk,
    /// Any other server folder.
    Custom(String),
}

impl Folder {
    #[must_use]
    pub fn custom(name: impl Into<String>) -> Self {
        Self::Custom(name.into())
    }

    /// The IMAP folder name as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Inbox => "INBOX",
            Self::Junk => "Junk Email",
            Self::Custom(name) => name,
        }
    }
}

impl fmt::Display for Folder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&str> for Folder {
    fn from(s: &str) -> Self {
        if s.eq_ignore_ascii_case("inbox") {
            Self::Inbox
        } else if s == "Junk Email" {
            Self::Junk
        } else {
            Self::Custom(s.to_string())
        }
    }
}

impl From<String> for Folder {
    fn from(s: String) -> Self {
        Self::from(s.as_str())
    }
}
