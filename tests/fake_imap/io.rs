//! Write helpers for the fake IMAP server.
//!
//! Every write is flushed immediately so the client under test never
//! waits on buffered output.

use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};

/// Write a protocol line (caller supplies the trailing CRLF) and flush.
pub async fn write_line<S: AsyncRead + AsyncWrite + Unpin>(
    stream: &mut BufReader<S>,
    line: &str,
) -> std::io::Result<()> {
    let inner = stream.get_mut();
    inner.write_all(line.as_bytes()).await?;
    inner.flush().await
}

/// Write `prefix`, a counted literal holding `data`, and the closing
/// `)` of a FETCH response, then flush.
///
/// ```text
/// <prefix>{<len>}\r\n<data>)\r\n
/// ```
pub async fn write_literal<S: AsyncRead + AsyncWrite + Unpin>(
    stream: &mut BufReader<S>,
    prefix: &str,
    data: &[u8],
) -> std::io::Result<()> {
    let inner = stream.get_mut();
    inner
        .write_all(format!("{prefix}{{{}}}\r\n", data.len()).as_bytes())
        .await?;
    inner.write_all(data).await?;
    inner.write_all(b")\r\n").await?;
    inner.flush().await
}
