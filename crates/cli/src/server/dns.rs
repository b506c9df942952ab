use anyhow::Context;
use std::sync::Arc;
use subscriber_dns_domain::{Config, Protocol};
use subscriber_dns_infrastructure::dns::listener::{load_acceptor, serve_tcp, serve_tls, serve_udp};
use subscriber_dns_infrastructure::dns::QueryHandler;
use tokio::net::{TcpListener, UdpSocket};
use tokio_util::sync::CancellationToken;
use tracing::{info, info_span, Instrument};

/// Serve `handler` on the configured address and protocol until `shutdown`
/// fires. Everything logged by the server carries its protocol and address.
pub async fn start_dns_server(
    config: &Config,
    handler: Arc<dyn QueryHandler>,
    shutdown: CancellationToken,
) -> anyhow::Result<()> {
    let socket_addr = config.bind_addr()?;
    let protocol = config.protocol;
    let span = info_span!("dns_server", %protocol, bind = %socket_addr);

    async move {
        info!("Starting DNS server");

        match protocol {
            Protocol::Udp => {
                let socket = UdpSocket::bind(socket_addr)
                    .await
                    .with_context(|| format!("Failed to bind UDP socket on {}", socket_addr))?;
                serve_udp(socket, handler, shutdown).await?;
            }
            Protocol::Tcp => {
                let listener = TcpListener::bind(socket_addr)
                    .await
                    .with_context(|| format!("Failed to bind TCP listener on {}", socket_addr))?;
                serve_tcp(listener, handler, shutdown).await?;
            }
            Protocol::TcpTls => {
                let tls = config
                    .tls
                    .as_ref()
                    .context("Protocol tcp-tls requires a [tls] section")?;
                let acceptor = load_acceptor(tls)?;
                let listener = TcpListener::bind(socket_addr)
                    .await
                    .with_context(|| format!("Failed to bind TLS listener on {}", socket_addr))?;
                serve_tls(listener, acceptor, handler, shutdown).await?;
            }
        }

        info!("DNS server stopped");
        Ok::<(), anyhow::Error>(())
    }
    .instrument(span)
    .await
}
