//! DNS over TCP (RFC 1035 §4.2.2): every message is preceded by its length
//! as a big-endian `u16`.

use super::{decode_query, TCP_IDLE_TIMEOUT};
use crate::dns::handler::{QueryHandler, ResponseSink};
use crate::dns::query::InboundQuery;
use crate::dns::reply::DnsReply;
use async_trait::async_trait;
use std::io;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use subscriber_dns_domain::DomainError;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Frames read ahead of the one being answered.
const MAX_PENDING_FRAMES: usize = 16;

/// Writes length-prefixed replies to a stream connection.
pub struct StreamSink<'a, S> {
    stream: &'a mut S,
}

impl<'a, S> StreamSink<'a, S> {
    pub fn new(stream: &'a mut S) -> Self {
        Self { stream }
    }
}

#[async_trait]
impl<S> ResponseSink for StreamSink<'_, S>
where
    S: AsyncWrite + Unpin + Send,
{
    async fn send_reply(&mut self, reply: DnsReply) -> Result<(), DomainError> {
        let wire = reply.to_wire()?;
        write_frame(self.stream, &wire)
            .await
            .map_err(|e| DomainError::ResponseWriteFailed(format!("TCP write failed: {}", e)))
    }
}

/// Accept connections until `shutdown` fires, one task per connection.
pub async fn serve_tcp(
    listener: TcpListener,
    handler: Arc<dyn QueryHandler>,
    shutdown: CancellationToken,
) -> Result<(), DomainError> {
    if let Ok(local) = listener.local_addr() {
        info!(bind_address = %local, "TCP listener ready");
    }

    loop {
        let (stream, peer) = tokio::select! {
            _ = shutdown.cancelled() => break,
            accepted = listener.accept() => match accepted {
                Ok(accepted) => accepted,
                Err(e) => {
                    warn!(error = %e, "TCP accept error");
                    continue;
                }
            },
        };

        if let Err(e) = stream.set_nodelay(true) {
            debug!(client = %peer, error = %e, "Failed to set TCP_NODELAY");
        }

        tokio::spawn(serve_connection(
            stream,
            peer,
            Arc::clone(&handler),
            shutdown.child_token(),
        ));
    }

    debug!("TCP listener stopped");
    Ok(())
}

/// Answer framed queries on one connection, in order, until the peer closes,
/// goes idle or `shutdown` fires.
///
/// The read half keeps being polled while a query is answered, so a peer that
/// disconnects mid-lookup cancels the query it is waiting on.
pub async fn serve_connection<S>(
    stream: S,
    peer: SocketAddr,
    handler: Arc<dyn QueryHandler>,
    shutdown: CancellationToken,
) where
    S: AsyncRead + AsyncWrite + Unpin + Send,
{
    debug!(client = %peer, "Connection opened");

    let (mut reader, mut writer) = tokio::io::split(stream);
    let connection = shutdown.child_token();
    let busy = AtomicBool::new(false);
    let (frames_tx, mut frames_rx) = mpsc::channel::<Vec<u8>>(MAX_PENDING_FRAMES);

    let read_loop = read_frames(&mut reader, peer, frames_tx, &connection, &busy);

    let answer_loop = async {
        loop {
            let bytes = tokio::select! {
                _ = connection.cancelled() => break,
                bytes = frames_rx.recv() => match bytes {
                    Some(bytes) => bytes,
                    None => break,
                },
            };

            let Some(message) = decode_query(&bytes, peer) else {
                continue;
            };

            busy.store(true, Ordering::Release);
            let query =
                InboundQuery::new(message, peer).with_cancellation(connection.child_token());
            let mut sink = StreamSink::new(&mut writer);
            handler.handle_query(&query, &mut sink).await;
            busy.store(false, Ordering::Release);
        }
    };

    tokio::join!(read_loop, answer_loop);

    debug!(client = %peer, "Connection closed");
}

/// Feed frames to the answer loop; cancels `connection` once the peer is gone,
/// the connection idles out or a read fails.
async fn read_frames<R>(
    reader: &mut R,
    peer: SocketAddr,
    frames: mpsc::Sender<Vec<u8>>,
    connection: &CancellationToken,
    busy: &AtomicBool,
) where
    R: AsyncRead + Unpin,
{
    loop {
        let read = read_frame(reader);
        tokio::pin!(read);

        // The idle clock only runs while nothing is queued or being answered.
        let frame = loop {
            tokio::select! {
                _ = connection.cancelled() => return,
                frame = &mut read => break Some(frame),
                _ = tokio::time::sleep(TCP_IDLE_TIMEOUT) => {
                    let pending = frames.capacity() < frames.max_capacity();
                    if !busy.load(Ordering::Acquire) && !pending {
                        break None;
                    }
                }
            }
        };

        match frame {
            Some(Ok(Some(bytes))) => {
                let sent = tokio::select! {
                    _ = connection.cancelled() => return,
                    sent = frames.send(bytes) => sent,
                };
                if sent.is_err() {
                    break;
                }
            }
            Some(Ok(None)) => {
                debug!(client = %peer, "Peer closed the connection");
                break;
            }
            Some(Err(e)) => {
                debug!(client = %peer, error = %e, "Connection read failed");
                break;
            }
            None => {
                debug!(client = %peer, "Closing idle connection");
                break;
            }
        }
    }

    connection.cancel();
}

/// Next length-prefixed message; `None` on a clean close between messages.
pub(crate) async fn read_frame<S>(stream: &mut S) -> io::Result<Option<Vec<u8>>>
where
    S: AsyncRead + Unpin,
{
    let mut len_buf = [0u8; 2];
    match stream.read_exact(&mut len_buf).await {
        Ok(_) => {}
        Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => return Ok(None),
        Err(e) => return Err(e),
    }

    let len = u16::from_be_bytes(len_buf) as usize;
    let mut message = vec![0u8; len];
    stream.read_exact(&mut message).await?;
    Ok(Some(message))
}

pub(crate) async fn write_frame<S>(stream: &mut S, message: &[u8]) -> io::Result<()>
where
    S: AsyncWrite + Unpin,
{
    let len = u16::try_from(message.len()).map_err(|_| {
        io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("message of {} bytes does not fit a TCP frame", message.len()),
        )
    })?;

    stream.write_all(&len.to_be_bytes()).await?;
    stream.write_all(message).await?;
    stream.flush().await
}
