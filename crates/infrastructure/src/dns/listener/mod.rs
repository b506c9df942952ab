//! Socket front ends that turn wire messages into [`InboundQuery`] values and
//! hand them to a [`QueryHandler`].
//!
//! [`InboundQuery`]: super::query::InboundQuery
//! [`QueryHandler`]: super::handler::QueryHandler

pub mod tcp;
#[cfg(feature = "dns-over-rustls")]
pub mod tls;
pub mod udp;

pub use tcp::{serve_connection, serve_tcp, StreamSink};
#[cfg(feature = "dns-over-rustls")]
pub use tls::{load_acceptor, serve_tls};
pub use udp::{serve_udp, UdpSink};

use hickory_proto::op::{Message, MessageType};
use std::net::SocketAddr;
use std::time::Duration;
use tracing::debug;

/// Largest DNS message accepted or produced on any transport.
pub const MAX_MESSAGE_SIZE: usize = 65535;

/// Stream connections with no complete query for this long are closed.
pub const TCP_IDLE_TIMEOUT: Duration = Duration::from_secs(10);

/// Parse a request; malformed input and stray responses yield `None`.
pub(crate) fn decode_query(bytes: &[u8], src: SocketAddr) -> Option<Message> {
    match Message::from_vec(bytes) {
        Ok(message) if message.message_type() == MessageType::Query => Some(message),
        Ok(_) => {
            debug!(client = %src, "Ignoring DNS response sent to the server");
            None
        }
        Err(e) => {
            debug!(client = %src, len = bytes.len(), error = %e, "Dropping malformed DNS message");
            None
        }
    }
}
