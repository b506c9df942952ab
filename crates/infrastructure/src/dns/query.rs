use hickory_proto::op::{Message, Query};
use std::net::SocketAddr;
use tokio_util::sync::CancellationToken;

/// A parsed DNS request as delivered by a listener.
///
/// The cancellation token fires when a TCP or TLS client disconnects or the
/// server shuts down; handlers abandon in-flight work when it does.
#[derive(Debug, Clone)]
pub struct InboundQuery {
    message: Message,
    src: SocketAddr,
    cancellation: CancellationToken,
}

impl InboundQuery {
    pub fn new(message: Message, src: SocketAddr) -> Self {
        Self {
            message,
            src,
            cancellation: CancellationToken::new(),
        }
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = token;
        self
    }

    pub fn message(&self) -> &Message {
        &self.message
    }

    /// First question; the only one the responder acts on.
    pub fn question(&self) -> Option<&Query> {
        self.message.queries().first()
    }

    pub fn src(&self) -> SocketAddr {
        self.src
    }

    pub fn cancellation(&self) -> &CancellationToken {
        &self.cancellation
    }
}
