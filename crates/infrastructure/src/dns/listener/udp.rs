use super::{decode_query, MAX_MESSAGE_SIZE};
use crate::dns::handler::{QueryHandler, ResponseSink};
use crate::dns::query::InboundQuery;
use crate::dns::reply::DnsReply;
use async_trait::async_trait;
use std::net::SocketAddr;
use std::sync::Arc;
use subscriber_dns_domain::DomainError;
use tokio::net::UdpSocket;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Writes replies back to the datagram's sender.
pub struct UdpSink {
    socket: Arc<UdpSocket>,
    peer: SocketAddr,
}

impl UdpSink {
    pub fn new(socket: Arc<UdpSocket>, peer: SocketAddr) -> Self {
        Self { socket, peer }
    }
}

#[async_trait]
impl ResponseSink for UdpSink {
    async fn send_reply(&mut self, reply: DnsReply) -> Result<(), DomainError> {
        let wire = reply.to_wire()?;
        self.socket.send_to(&wire, self.peer).await.map_err(|e| {
            DomainError::ResponseWriteFailed(format!("UDP send to {} failed: {}", self.peer, e))
        })?;
        Ok(())
    }
}

/// Receive datagrams until `shutdown` fires, one task per query.
pub async fn serve_udp(
    socket: UdpSocket,
    handler: Arc<dyn QueryHandler>,
    shutdown: CancellationToken,
) -> Result<(), DomainError> {
    let socket = Arc::new(socket);
    if let Ok(local) = socket.local_addr() {
        info!(bind_address = %local, "UDP listener ready");
    }

    let mut recv_buf = vec![0u8; MAX_MESSAGE_SIZE];

    loop {
        let (len, src) = tokio::select! {
            _ = shutdown.cancelled() => break,
            received = socket.recv_from(&mut recv_buf) => match received {
                Ok(received) => received,
                Err(e) => {
                    warn!(error = %e, "UDP recv error");
                    continue;
                }
            },
        };

        let Some(message) = decode_query(&recv_buf[..len], src) else {
            continue;
        };

        let query = InboundQuery::new(message, src).with_cancellation(shutdown.child_token());
        let mut sink = UdpSink::new(Arc::clone(&socket), src);
        let handler = Arc::clone(&handler);

        tokio::spawn(async move {
            handler.handle_query(&query, &mut sink).await;
        });
    }

    debug!("UDP listener stopped");
    Ok(())
}
