//! SEARCH command handler.
//!
//! Matches emails against parsed `SearchKey` criteria from imap-types
//! and answers with sequence numbers. Only the keys the client sends
//! are supported:
//!
//! - `From(text)` -- case-insensitive substring of the From header,
//!   as RFC 3501 Section 6.4.4 specifies
//! - `And` -- a parenthesised list like `(FROM "x")` parses as `And`
//!
//! The response format (RFC 3501 Section 7.2.5):
//!
//! ```text
//! * SEARCH 1 2 3
//! A0003 OK SEARCH completed
//! ```

use crate::fake_imap::io::write_line;
use crate::fake_imap::mailbox::{Mailbox, TestEmail};
use imap_codec::imap_types::search::SearchKey;
use tokio::io::{AsyncRead, AsyncWrite, BufReader};

/// Handle the SEARCH command. Returns matching sequence numbers from
/// the selected folder in ascending order.
pub async fn handle_search<S: AsyncRead + AsyncWrite + Unpin>(
    tag: &str,
    criteria: &[SearchKey<'_>],
    mailbox: &Mailbox,
    selected_folder: Option<&str>,
    stream: &mut BufReader<S>,
) {
    let Some(folder_name) = selected_folder else {
        let resp = format!("{tag} BAD No folder selected\r\n");
        let _ = write_line(stream, &resp).await;
        return;
    };

    let Some(folder) = mailbox.get_folder(folder_name) else {
        let resp = format!("{tag} BAD Folder not found\r\n");
        let _ = write_line(stream, &resp).await;
        return;
    };

    let seqs: Vec<String> = folder
        .emails
        .iter()
        .zip(1u32..)
        .filter(|(e, _)| criteria.iter().all(|key| matches_key(e, key)))
        .map(|(_, seq)| seq.to_string())
        .collect();

    let search_line = if seqs.is_empty() {
        "* SEARCH\r\n".to_string()
    } else {
        format!("* SEARCH {}\r\n", seqs.join(" "))
    };
    if write_line(stream, &search_line).await.is_err() {
        return;
    }
    let resp = format!("{tag} OK SEARCH completed\r\n");
    let _ = write_line(stream, &resp).await;
}

/// Check if a test email matches a single `SearchKey`.
fn matches_key(email: &TestEmail, key: &SearchKey<'_>) -> bool {
    match key {
        SearchKey::From(text) => {
            let needle = String::from_utf8_lossy(text.as_ref()).to_lowercase();
            email
                .header("From")
                .is_some_and(|from| from.to_lowercase().contains(&needle))
        }
        SearchKey::And(keys) => keys.as_ref().iter().all(|k| matches_key(email, k)),
        // Unknown criteria match nothing, so a client relying on them
        // notices.
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fake_imap::mailbox::MailboxBuilder;
    use imap_codec::imap_types::core::AString;
    use tokio::io::BufReader;

    fn email_from(from: &str) -> Vec<u8> {
        format!("From: {from}\r\nSubject: Test\r\n\r\nBody").into_bytes()
    }

    fn from_key(text: &str) -> SearchKey<'_> {
        SearchKey::From(AString::try_from(text).unwrap())
    }

    async fn run(criteria: &[SearchKey<'_>], mailbox: &Mailbox, selected: Option<&str>) -> String {
        let (client, server) = tokio::io::duplex(4096);
        let mut stream = BufReader::new(server);

        handle_search("A1", criteria, mailbox, selected, &mut stream).await;
        drop(stream);

        let mut buf = Vec::new();
        tokio::io::AsyncReadExt::read_to_end(&mut BufReader::new(client), &mut buf)
            .await
            .unwrap();
        String::from_utf8(buf).unwrap()
    }

    fn three_senders() -> Mailbox {
        MailboxBuilder::new()
            .folder("INBOX")
            .email(&email_from("noreply@example.com"))
            .email(&email_from("alice@example.com"))
            .email(&email_from("Example <NoReply@Example.com>"))
            .build()
    }

    #[tokio::test]
    async fn from_is_case_insensitive_substring() {
        let output = run(
            &[from_key("noreply@example.com")],
            &three_senders(),
            Some("INBOX"),
        )
        .await;
        assert!(output.contains("* SEARCH 1 3\r\n"));
        assert!(output.contains("A1 OK SEARCH completed"));
    }

    #[tokio::test]
    async fn parenthesised_list_is_and() {
        let keys = vec![from_key("example.com"), from_key("alice")];
        let and = SearchKey::And(keys.try_into().unwrap());
        let output = run(&[and], &three_senders(), Some("INBOX")).await;
        assert!(output.contains("* SEARCH 2\r\n"));
    }

    #[tokio::test]
    async fn no_match_sends_empty_search() {
        let output = run(&[from_key("nobody@example.com")], &three_senders(), Some("INBOX")).await;
        assert!(output.contains("* SEARCH\r\n"));
        assert!(output.contains("A1 OK SEARCH completed"));
    }

    #[tokio::test]
    async fn no_folder_selected_returns_bad() {
        let output = run(&[from_key("alice")], &three_senders(), None).await;
        assert!(output.contains("A1 BAD No folder selected"));
    }
}
