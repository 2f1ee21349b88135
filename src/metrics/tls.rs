//! TLS handshake probe.
//!
//! Connects to the target host, completes a TLS handshake against the webpki
//! roots and summarizes the leaf certificate. Uses `tokio-rustls` for the
//! connection and `x509-parser` for the certificate.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, Result};
use chrono::{DateTime, Utc};
use log::debug;
use rustls::crypto::ring::default_provider;
use rustls::pki_types::ServerName;
use tokio::net::TcpStream;
use tokio_rustls::rustls::{ClientConfig, RootCertStore};
use tokio_rustls::TlsConnector;

use crate::config::{TCP_CONNECT_TIMEOUT_SECS, TLS_HANDSHAKE_TIMEOUT_SECS};

use super::types::CertificateSummary;

/// Performs a TLS handshake with `host:port` and summarizes the certificate.
///
/// # Errors
///
/// Returns an error if:
/// - The host name is not a valid server name
/// - The TCP connection fails or times out
/// - The TLS handshake fails (including untrusted or expired certificates)
/// - The server presents no parsable certificate
pub async fn get_certificate_summary(host: &str, port: u16) -> Result<CertificateSummary> {
    debug!("Probing TLS for {host}:{port}");

    let mut root_store = RootCertStore::empty();
    root_store.extend(webpki_roots::TLS_SERVER_ROOTS.iter().cloned());
    let config = ClientConfig::builder_with_provider(Arc::new(default_provider()))
        .with_safe_default_protocol_versions()?
        .with_root_certificates(root_store)
        .with_no_client_auth();

    let server_name = ServerName::try_from(host.to_string())
        .map_err(|e| anyhow!("Invalid server name {}: {}", host, e))?;

    let sock = tokio::time::timeout(
        Duration::from_secs(TCP_CONNECT_TIMEOUT_SECS),
        TcpStream::connect((host, port)),
    )
    .await
    .map_err(|_| {
        anyhow!(
            "TCP connection timeout for {}:{} ({}s)",
            host,
            port,
            TCP_CONNECT_TIMEOUT_SECS
        )
    })?
    .map_err(|e| anyhow!("Failed to connect to {}:{}: {}", host, port, e))?;

    let connector = TlsConnector::from(Arc::new(config));
    let tls_stream = tokio::time::timeout(
        Duration::from_secs(TLS_HANDSHAKE_TIMEOUT_SECS),
        connector.connect(server_name, sock),
    )
    .await
    .map_err(|_| {
        anyhow!(
            "TLS handshake timeout for {} ({}s)",
            host,
            TLS_HANDSHAKE_TIMEOUT_SECS
        )
    })?
    .map_err(|e| anyhow!("TLS handshake failed for {}: {}", host, e))?;

    let connection = tls_stream.get_ref().1;
    let tls_version = connection
        .protocol_version()
        .map(|v| format!("{v:?}"))
        .unwrap_or_else(|| "Unknown".to_string());

    let leaf = connection
        .peer_certificates()
        .and_then(|certs| certs.first())
        .ok_or_else(|| anyhow!("No certificate presented by {}", host))?;
    let (_, cert) = x509_parser::parse_x509_certificate(leaf.as_ref())
        .map_err(|e| anyhow!("Unparsable certificate from {}: {}", host, e))?;
    let tbs = &cert.tbs_certificate;

    Ok(CertificateSummary {
        tls_version,
        subject: tbs.subject.to_string(),
        issuer: tbs.issuer.to_string(),
        valid_to: DateTime::<Utc>::from_timestamp(tbs.validity.not_after.timestamp(), 0),
    })
}
