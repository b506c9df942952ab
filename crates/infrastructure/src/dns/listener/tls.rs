//! DNS over TLS: the TCP framing behind a rustls server handshake.

use super::tcp::serve_connection;
use super::TCP_IDLE_TIMEOUT;
use crate::dns::handler::QueryHandler;
use rustls::pki_types::{CertificateDer, PrivateKeyDer};
use rustls::ServerConfig;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::sync::Arc;
use subscriber_dns_domain::{DomainError, TlsConfig};
use tokio::net::TcpListener;
use tokio_rustls::TlsAcceptor;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Build an acceptor from the PEM certificate chain and private key.
pub fn load_acceptor(config: &TlsConfig) -> Result<TlsAcceptor, DomainError> {
    let _ = rustls::crypto::aws_lc_rs::default_provider().install_default();

    let certs = load_certs(&config.cert_path)?;
    let key = load_private_key(&config.key_path)?;

    let server_config = ServerConfig::builder()
        .with_no_client_auth()
        .with_single_cert(certs, key)
        .map_err(|e| DomainError::ConfigInvalid(format!("Invalid TLS certificate/key: {}", e)))?;

    Ok(TlsAcceptor::from(Arc::new(server_config)))
}

fn open(path: &Path) -> Result<BufReader<File>, DomainError> {
    File::open(path).map(BufReader::new).map_err(|e| {
        DomainError::ConfigInvalid(format!("Failed to open {}: {}", path.display(), e))
    })
}

fn load_certs(path: &Path) -> Result<Vec<CertificateDer<'static>>, DomainError> {
    let mut reader = open(path)?;
    let certs = rustls_pemfile::certs(&mut reader)
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| {
            DomainError::ConfigInvalid(format!(
                "Failed to parse certificates in {}: {}",
                path.display(),
                e
            ))
        })?;

    if certs.is_empty() {
        return Err(DomainError::ConfigInvalid(format!(
            "No certificates found in {}",
            path.display()
        )));
    }
    Ok(certs)
}

fn load_private_key(path: &Path) -> Result<PrivateKeyDer<'static>, DomainError> {
    let mut reader = open(path)?;
    rustls_pemfile::private_key(&mut reader)
        .map_err(|e| {
            DomainError::ConfigInvalid(format!(
                "Failed to parse private key in {}: {}",
                path.display(),
                e
            ))
        })?
        .ok_or_else(|| {
            DomainError::ConfigInvalid(format!("No private key found in {}", path.display()))
        })
}

/// Accept TLS connections until `shutdown` fires, one task per connection.
pub async fn serve_tls(
    listener: TcpListener,
    acceptor: TlsAcceptor,
    handler: Arc<dyn QueryHandler>,
    shutdown: CancellationToken,
) -> Result<(), DomainError> {
    if let Ok(local) = listener.local_addr() {
        info!(bind_address = %local, "TLS listener ready");
    }

    loop {
        let (stream, peer) = tokio::select! {
            _ = shutdown.cancelled() => break,
            accepted = listener.accept() => match accepted {
                Ok(accepted) => accepted,
                Err(e) => {
                    warn!(error = %e, "TLS accept error");
                    continue;
                }
            },
        };

        let acceptor = acceptor.clone();
        let handler = Arc::clone(&handler);
        let connection_shutdown = shutdown.child_token();

        tokio::spawn(async move {
            let stream = match tokio::time::timeout(TCP_IDLE_TIMEOUT, acceptor.accept(stream)).await
            {
                Ok(Ok(stream)) => stream,
                Ok(Err(e)) => {
                    debug!(client = %peer, error = %e, "TLS handshake failed");
                    return;
                }
                Err(_) => {
                    debug!(client = %peer, "TLS handshake timed out");
                    return;
                }
            };

            serve_connection(stream, peer, handler, connection_shutdown).await;
        });
    }

    debug!("TLS listener stopped");
    Ok(())
}
