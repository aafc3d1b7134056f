//! IMAP connection and TLS helpers
//!
//! Provides the low-level `open()`, `login()` and `select()` steps that
//! `MailboxClient::connect` runs in sequence.

use crate::config::{ImapConfig, Security};
use crate::error::{Error, Result};
use crate::folder::Folder;
use async_imap::{Client, Session};
use rustls::pki_types::ServerName;
use std::sync::Arc;
use tokio::net::TcpStream;
use tokio_rustls::TlsConnector;
use tokio_rustls::client::TlsStream;
use tokio_util::compat::{Compat, TokioAsyncReadCompatExt};
use tracing::debug;

/// A TLS-wrapped, not yet authenticated IMAP client.
pub type ImapClient = Client<Compat<TlsStream<TcpStream>>>;

/// A TLS-wrapped, authenticated IMAP session.
pub type ImapSession = Session<Compat<TlsStream<TcpStream>>>;

/// Build a TLS connector for `config`.
///
/// Verifies the server against the Mozilla root set unless
/// `accept_invalid_certs` is set.
fn tls_connector(config: &ImapConfig) -> Result<TlsConnector> {
    let builder = rustls::ClientConfig::builder_with_provider(Arc::new(
        rustls::crypto::ring::default_provider(),
    ))
    .with_safe_default_protocol_versions()
    .map_err(|e| Error::Tls(e.to_string()))?;

    let tls_config = if config.accept_invalid_certs {
        builder
            .dangerous()
            .with_custom_certificate_verifier(Arc::new(DangerousVerifier))
            .with_no_client_auth()
    } else {
        let roots = rustls::RootCertStore {
            roots: webpki_roots::TLS_SERVER_ROOTS.to_vec(),
        };
        builder.with_root_certificates(roots).with_no_client_auth()
    };

    Ok(TlsConnector::from(Arc::new(tls_config)))
}

/// Open a TLS-wrapped connection and wait for the server greeting.
///
/// With [`Security::Tls`] the handshake happens immediately and the
/// greeting arrives over TLS. With [`Security::StartTls`] the greeting
/// arrives in plain text, then STARTTLS upgrades the stream.
pub async fn open(config: &ImapConfig) -> Result<ImapClient> {
    let addr = format!("{}:{}", config.host, config.port);
    debug!("Connecting to IMAP server at {} ({:?})", addr, config.security);

    let tcp_stream = TcpStream::connect(&addr).await?;
    let connector = tls_connector(config)?;
    let server_name = ServerName::try_from(config.host.clone())
        .map_err(|e| Error::Tls(format!("Invalid server name: {e}")))?;

    match config.security {
        Security::Tls => {
            let tls_stream = connector
                .connect(server_name, tcp_stream)
                .await
                .map_err(|e| Error::Tls(e.to_string()))?;

            let mut client = Client::new(tls_stream.compat());
            client
                .read_response()
                .await
                .map_err(|e| Error::Imap(format!("Failed to read server greeting: {e}")))?
                .ok_or_else(|| Error::Imap("Connection closed before server greeting".into()))?;
            debug!("Received server greeting");

            Ok(client)
        }
        Security::StartTls => {
            let mut client = Client::new(tcp_stream.compat());
            client
                .read_response()
                .await
                .map_err(|e| Error::Imap(format!("Failed to read server greeting: {e}")))?
                .ok_or_else(|| Error::Imap("Connection closed before server greeting".into()))?;
            debug!("Received server greeting, upgrading with STARTTLS");

            client
                .run_command_and_check_ok("STARTTLS", None)
                .await
                .map_err(|e| Error::Tls(format!("STARTTLS failed: {e}")))?;

            let inner = client.into_inner().into_inner();
            let tls_stream = connector
                .connect(server_name, inner)
                .await
                .map_err(|e| Error::Tls(e.to_string()))?;

            Ok(Client::new(tls_stream.compat()))
        }
    }
}

/// LOGIN with the mailbox address and password.
///
/// Any rejection is reported as [`Error::Auth`].
pub async fn login(client: ImapClient, address: &str, password: &str) -> Result<ImapSession> {
    client
        .login(address, password)
        .await
        .map_err(|(e, _)| Error::Auth(e.to_string()))
}

/// SELECT a folder on an existing session.
pub async fn select(session: &mut ImapSession, folder: &Folder) -> Result<()> {
    session
        .select(folder.as_str())
        .await
        .map_err(|e| Error::Imap(format!("Failed to select {folder}: {e}")))?;
    Ok(())
}

/// Certificate verifier that accepts all certificates
/// (for self-signed bridge and test servers).
#[derive(Debug)]
struct DangerousVerifier;

impl rustls::client::danger::ServerCertVerifier for DangerousVerifier {
    fn verify_server_cert(
        &self,
        _end_entity: &rustls::pki_types::CertificateDer<'_>,
        _intermediates: &[rustls::pki_types::CertificateDer<'_>],
        _server_name: &rustls::pki_types::ServerName<'_>,
        _ocsp_response: &[u8],
        _now: rustls::pki_types::UnixTime,
    ) -> std::result::Result<rustls::client::danger::ServerCertVerified, rustls::Error> {
        Ok(rustls::client::danger::ServerCertVerified::assertion())
    }

    fn verify_tls12_signature(
        &self,
        _message: &[u8],
        _cert: &rustls::pki_types::CertificateDer<'_>,
        _dss: &rustls::DigitallySignedStruct,
    ) -> std::result::Result<rustls::client::danger::HandshakeSignatureValid, rustls::Error> {
        Ok(rustls::client::danger::HandshakeSignatureValid::assertion())
    }

    fn verify_tls13_signature(
        &self,
        _message: &[u8],
        _cert: &rustls::pki_types::CertificateDer<'_>,
        _dss: &rustls::DigitallySignedStruct,
    ) -> std::result::Result<rustls::client::danger::HandshakeSignatureValid, rustls::Error> {
        Ok(rustls::client::danger::HandshakeSignatureValid::assertion())
    }

    fn supported_verify_schemes(&self) -> Vec<rustls::SignatureScheme> {
        rustls::crypto::ring::default_provider()
            .signature_verification_algorithms
            .supported_schemes()
    }
}
