//! Subject/body filters and code extractors
//!
//! [`MailboxClient::fetch_filtered`](crate::MailboxClient::fetch_filtered)
//! takes its matching and extraction rules as trait objects bundled in
//! [`Filters`]. Plain closures work through blanket impls; [`Prefix`],
//! [`Contains`] and [`RegexExtractor`] cover the common cases.

use crate::error::{Error, Result};
use regex::Regex;
use std::fmt;

/// Decides whether a decoded subject is worth looking at.
pub trait SubjectFilter {
    fn matches(&self, subject: &str) -> bool;
}

/// Decides whether a decoded body is worth extracting from.
pub trait BodyFilter {
    fn matches(&self, body: &str) -> bool;
}

/// Pulls the code or link out of a decoded body.
///
/// Returning `None` or an empty string leaves the message untouched
/// on the server.
pub trait CodeExtractor {
    fn extract(&self, body: &str) -> Option<String>;
}

impl<F: Fn(&str) -> bool> SubjectFilter for F {
    fn matches(&self, subject: &str) -> bool {
        self(subject)
    }
}

impl<F: Fn(&str) -> bool> BodyFilter for F {
    fn matches(&self, body: &str) -> bool {
        self(body)
    }
}

impl<F: Fn(&str) -> Option<String>> CodeExtractor for F {
    fn extract(&self, body: &str) -> Option<String> {
        self(body)
    }
}

/// The rules applied to every message found by the sender search.
///
/// Every rule is optional. Without an extractor the whole body is
/// kept.
///
/// ```
/// use email_verifier::{Filters, Prefix, RegexExtractor};
///
/// let subject = Prefix::new("Your code");
/// let code = RegexExtractor::new(r"(\d{6})").unwrap();
/// let filters = Filters::new().subject(&subject).extractor(&code);
/// # let _ = filters;
/// ```
#[derive(Clone, Copy, Default)]
pub struct Filters<'a> {
    subject: Option<&'a dyn SubjectFilter>,
    body: Option<&'a dyn BodyFilter>,
    extractor: Option<&'a dyn CodeExtractor>,
}

impl<'a> Filters<'a> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn subject(mut self, filter: &'a dyn SubjectFilter) -> Self {
        self.subject = Some(filter);
        self
    }

    #[must_use]
    pub fn body(mut self, filter: &'a dyn BodyFilter) -> Self {
        self.body = Some(filter);
        self
    }

    #[must_use]
    pub fn extractor(mut self, extractor: &'a dyn CodeExtractor) -> Self {
        self.extractor = Some(extractor);
        self
    }

    pub(crate) fn subject_matches(&self, subject: &str) -> bool {
        self.subject.is_none_or(|f| f.matches(subject))
    }

    pub(crate) fn body_matches(&self, body: &str) -> bool {
        self.body.is_none_or(|f| f.matches(body))
    }

    /// The value to record for `body`, or `None` to leave the message.
    pub(crate) fn value_for(&self, body: &str) -> Option<String> {
        self.extractor
            .map_or_else(|| Some(body.to_string()), |e| e.extract(body))
            .filter(|value| !value.is_empty())
    }
}

impl fmt::Debug for Filters<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Filters")
            .field("subject", &self.subject.is_some())
            .field("body", &self.body.is_some())
            .field("extractor", &self.extractor.is_some())
            .finish()
    }
}

/// Matches text starting with a fixed prefix.
#[derive(Debug, Clone)]
pub struct Prefix(String);

impl Prefix {
    #[must_use]
    pub fn new(prefix: impl Into<String>) -> Self {
        Self(prefix.into())
    }
}

impl SubjectFilter for Prefix {
    fn matches(&self, subject: &str) -> bool {
        subject.starts_with(&self.0)
    }
}

impl BodyFilter for Prefix {
    fn matches(&self, body: &str) -> bool {
        body.starts_with(&self.0)
    }
}

/// Matches text containing a substring.
#[derive(Debug, Clone)]
pub struct Contains {
    needle: String,
    ignore_case: bool,
}

impl Contains {
    #[must_use]
    pub fn new(needle: impl Into<String>) -> Self {
        Self {
            needle: needle.into(),
            ignore_case: false,
        }
    }

    #[must_use]
    pub fn ignore_case(mut self) -> Self {
        self.needle = self.needle.to_lowercase();
        self.ignore_case = true;
        self
    }

    fn test(&self, text: &str) -> bool {
        if self.ignore_case {
            text.to_lowercase().contains(&self.needle)
        } else {
            text.contains(&self.needle)
        }
    }
}

impl SubjectFilter for Contains {
    fn matches(&self, subject: &str) -> bool {
        self.test(subject)
    }
}

impl BodyFilter for Contains {
    fn matches(&self, body: &str) -> bool {
        self.test(body)
    }
}

/// Extracts the first regex match from the body.
///
/// Yields capture group 1 when the pattern has groups, otherwise the
/// whole match. A match where group 1 did not participate yields
/// nothing.
#[derive(Debug, Clone)]
pub struct RegexExtractor(Regex);

impl RegexExtractor {
    /// # Errors
    ///
    /// Returns [`Error::Config`] if `pattern` is not a valid regex.
    pub fn new(pattern: &str) -> Result<Self> {
        Regex::new(pattern)
            .map(Self)
            .map_err(|e| Error::Config(format!("Invalid code pattern: {e}")))
    }
}

impl CodeExtractor for RegexExtractor {
    fn extract(&self, body: &str) -> Option<String> {
        let caps = self.0.captures(body)?;
        let group = usize::from(self.0.captures_len() > 1);
        caps.get(group).map(|m| m.as_str().to_string())
    }
}
