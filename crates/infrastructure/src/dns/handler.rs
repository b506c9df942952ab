use super::query::InboundQuery;
use super::reply::DnsReply;
use async_trait::async_trait;
use subscriber_dns_domain::DomainError;

/// Delivers a finished reply back to the querying client.
#[async_trait]
pub trait ResponseSink: Send {
    async fn send_reply(&mut self, reply: DnsReply) -> Result<(), DomainError>;
}

/// Answers queries routed to it by the mux.
///
/// Handlers own the whole exchange: they build the reply, write it through the
/// sink and log a failed write. Nothing is returned to the caller.
#[async_trait]
pub trait QueryHandler: Send + Sync {
    async fn handle_query(&self, query: &InboundQuery, sink: &mut dyn ResponseSink);
}
