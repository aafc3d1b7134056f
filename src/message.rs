//! Parsed email messages
//!
//! Thin layer over `mailparse`, which handles MIME structure, RFC 2047
//! encoded words and transfer encodings. Charset decoding is strict:
//! bytes that are invalid in the declared charset are a parse error,
//! never replaced with U+FFFD.

use crate::error::{Error, Result};
use chrono::{DateTime, Utc};
use encoding_rs::{Encoding, UTF_8};
use mailparse::{MailAddr, MailHeader, MailHeaderMap, ParsedMail, addrparse_header};
use serde::Serialize;
use std::borrow::Cow;

const REPLACEMENT: char = char::REPLACEMENT_CHARACTER;

/// A fetched email.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Message {
    /// Message sequence number. Only meaningful within the session
    /// that fetched it.
    pub id: u32,
    pub from: String,
    /// Address of the first `To` recipient.
    pub to: String,
    pub subject: String,
    pub date: Option<DateTime<Utc>>,
    pub body: String,
}

impl Message {
    /// Parse a raw RFC 822 message.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Parse`] if the message structure, its subject
    /// or its body cannot be decoded.
    pub fn parse(id: u32, raw: &[u8]) -> Result<Self> {
        let mail = mailparse::parse_mail(raw).map_err(|e| Error::Parse(e.to_string()))?;
        let headers = Headers::read(id, &mail)?;
        let body = body_text(&mail)?;
        Ok(headers.with_body(body))
    }
}

/// Header fields of a message, decoded before the body is touched.
#[derive(Debug)]
pub(crate) struct Headers {
    pub id: u32,
    pub from: String,
    pub to: String,
    pub subject: String,
    pub date: Option<DateTime<Utc>>,
}

impl Headers {
    pub fn read(id: u32, mail: &ParsedMail<'_>) -> Result<Self> {
        let headers = &mail.headers;
        Ok(Self {
            id,
            from: headers
                .get_first_header("From")
                .map(first_address)
                .unwrap_or_default(),
            to: headers
                .get_first_header("To")
                .map(first_address)
                .unwrap_or_default(),
            subject: headers
                .get_first_header("Subject")
                .map(decoded_subject)
                .transpose()?
                .unwrap_or_default(),
            date: headers
                .get_first_value("Date")
                .and_then(|d| mailparse::dateparse(&d).ok())
                .and_then(|ts| DateTime::from_timestamp(ts, 0)),
        })
    }

    pub fn with_body(self, body: String) -> Message {
        Message {
            id: self.id,
            from: self.from,
            to: self.to,
            subject: self.subject,
            date: self.date,
            body,
        }
    }
}

/// Decode the message text.
///
/// Prefers the first `text/plain` part, then any `text/*` part, then
/// the top-level part.
pub(crate) fn body_text(mail: &ParsedMail<'_>) -> Result<String> {
    let part = find_leaf(mail, &|mime| mime == "text/plain")
        .or_else(|| find_leaf(mail, &|mime| mime.starts_with("text/")))
        .unwrap_or(mail);

    let raw = part.get_body_raw().map_err(|e| Error::Parse(e.to_string()))?;
    decode_strict(&raw, &part.ctype.charset)
}

/// Decode `bytes` as `charset`, failing on malformed input.
///
/// Unknown labels are read as UTF-8.
fn decode_strict(bytes: &[u8], charset: &str) -> Result<String> {
    let encoding = Encoding::for_label(charset.trim().as_bytes()).unwrap_or(UTF_8);
    encoding
        .decode_without_bom_handling_and_without_replacement(bytes)
        .map(Cow::into_owned)
        .ok_or_else(|| Error::Parse(format!("Body is not valid {}", encoding.name())))
}

/// The decoded subject, or an error if an encoded word held bytes
/// that are invalid in its charset.
///
/// `mailparse` substitutes U+FFFD for such bytes, so a replacement
/// character that is not present in the raw header marks a failed
/// decode.
fn decoded_subject(header: &MailHeader<'_>) -> Result<String> {
    let value = header.get_value();
    let raw = String::from_utf8_lossy(header.get_value_raw());
    if value.contains(REPLACEMENT) && !raw.contains(REPLACEMENT) {
        return Err(Error::Parse(format!("Malformed encoded subject: {raw}")));
    }
    Ok(value)
}

fn find_leaf<'m, 'a>(
    part: &'m ParsedMail<'a>,
    wanted: &dyn Fn(&str) -> bool,
) -> Option<&'m ParsedMail<'a>> {
    if part.subparts.is_empty() {
        return wanted(&part.ctype.mimetype).then_some(part);
    }
    part.subparts.iter().find_map(|sub| find_leaf(sub, wanted))
}

/// The bare address of the first mailbox in an address header, or the
/// decoded header value if it is not a valid address list.
fn first_address(header: &MailHeader<'_>) -> String {
    let first = addrparse_header(header)
        .ok()
        .and_then(|list| match list.first() {
            Some(MailAddr::Single(info)) => Some(info.addr.clone()),
            Some(MailAddr::Group(group)) => group.addrs.first().map(|info| info.addr.clone()),
            None => None,
        });

    first.unwrap_or_else(|| header.get_value().trim().to_string())
}
