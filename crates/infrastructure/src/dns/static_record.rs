use super::handler::{QueryHandler, ResponseSink};
use super::query::InboundQuery;
use super::reply::{a_record, DnsReply};
use async_trait::async_trait;
use hickory_proto::rr::Record;
use subscriber_dns_domain::{AddressRecord, DomainError, StaticRecordConfig};
use tracing::{info, warn};

/// Answers one configured name with one configured address.
#[derive(Debug, Clone)]
pub struct StaticRecordHandler {
    record: AddressRecord,
    answer: Record,
}

impl StaticRecordHandler {
    pub fn new(record: AddressRecord, ttl: u32) -> Result<Self, DomainError> {
        let answer = a_record(&record, ttl)?;
        Ok(Self { record, answer })
    }

    /// Build from a configured binding; a malformed binding is `InvalidRecord`.
    pub fn from_config(config: &StaticRecordConfig) -> Result<Self, DomainError> {
        let record = AddressRecord::parse(&config.host, &config.address)?;
        Self::new(record, config.ttl_or_default())
    }

    /// Absolute name this handler must be registered under.
    pub fn name(&self) -> &str {
        self.record.name()
    }

    pub fn record(&self) -> &AddressRecord {
        &self.record
    }
}

#[async_trait]
impl QueryHandler for StaticRecordHandler {
    async fn handle_query(&self, query: &InboundQuery, sink: &mut dyn ResponseSink) {
        for question in query.message().queries() {
            info!(
                name = %question.name(),
                record_type = ?question.query_type(),
                client = %query.src(),
                "Received query"
            );
        }

        let reply = DnsReply::builder(query.message())
            .authoritative(true)
            .compress(false)
            .answer(self.answer.clone())
            .build();

        info!(answer = %self.record, "Sending answer");

        if let Err(e) = sink.send_reply(reply).await {
            warn!(error = %e, "Failed to answer");
        }
    }
}
