use super::handler::{QueryHandler, ResponseSink};
use super::query::InboundQuery;
use super::reply::DnsReply;
use async_trait::async_trait;
use hickory_proto::op::ResponseCode;
use tracing::{debug, warn};

/// Catch-all handler: refuses anything no other binding claims.
#[derive(Debug, Default, Clone, Copy)]
pub struct RefuseHandler;

impl RefuseHandler {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl QueryHandler for RefuseHandler {
    async fn handle_query(&self, query: &InboundQuery, sink: &mut dyn ResponseSink) {
        for question in query.message().queries() {
            debug!(
                name = %question.name(),
                record_type = ?question.query_type(),
                client = %query.src(),
                "Received query"
            );
        }

        let reply = DnsReply::builder(query.message())
            .compress(false)
            .response_code(ResponseCode::Refused)
            .build();

        for question in reply.message().queries() {
            debug!(name = %question.name(), code = ?ResponseCode::Refused, "Sending answer");
        }

        if let Err(e) = sink.send_reply(reply).await {
            warn!(error = %e, "Failed to answer");
        }
    }
}
