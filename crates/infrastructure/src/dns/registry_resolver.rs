use super::handler::{QueryHandler, ResponseSink};
use super::query::InboundQuery;
use super::reply::DnsReply;
use crate::registry::HttpDeviceRegistry;
use async_trait::async_trait;
use hickory_proto::op::{OpCode, ResponseCode};
use hickory_proto::rr::rdata::A;
use hickory_proto::rr::{Name, RData, Record, RecordType};
use std::sync::Arc;
use subscriber_dns_application::ports::DeviceRegistry;
use subscriber_dns_application::use_cases::ResolveDeviceUseCase;
use subscriber_dns_domain::{DomainError, RegistryConfig};
use tracing::{debug, error, info, warn};

/// Answers `<device>.<domain>` A queries from the device registry.
pub struct RegistryResolver {
    use_case: ResolveDeviceUseCase,
    ttl: u32,
}

impl RegistryResolver {
    /// Resolver backed by the HTTP registry at `{config.url}/{site_id}/devices`.
    pub fn new(config: &RegistryConfig, site_id: &str) -> Result<Self, DomainError> {
        let registry = Arc::new(HttpDeviceRegistry::new(config, site_id)?);
        Ok(Self::with_registry(registry, config))
    }

    pub fn with_registry(registry: Arc<dyn DeviceRegistry>, config: &RegistryConfig) -> Self {
        Self {
            use_case: ResolveDeviceUseCase::from_config(registry, config),
            ttl: config.ttl,
        }
    }

    /// Answer record for `name`, or the response code explaining its absence.
    async fn lookup(&self, name: &Name) -> (ResponseCode, Option<Record>) {
        match self.use_case.execute(&name.to_ascii()).await {
            Ok(ip) => {
                let record = Record::from_rdata(name.clone(), self.ttl, RData::A(A(ip)));
                (ResponseCode::NoError, Some(record))
            }
            Err(e) => (response_code_for(&e), None),
        }
    }
}

/// DNS outcome of a failed device resolution.
pub fn response_code_for(error: &DomainError) -> ResponseCode {
    match error {
        DomainError::DeviceNotFound(device) => {
            warn!(device = %device, "Device does not exist");
            ResponseCode::NXDomain
        }
        e if e.is_not_found() => ResponseCode::NXDomain,
        DomainError::UpstreamUnreachable(_) | DomainError::CredentialExchange(_) => {
            error!(error = %error, "Registry request failed");
            ResponseCode::ServFail
        }
        e => {
            warn!(error = %e, "Failed to get device state");
            ResponseCode::ServFail
        }
    }
}

#[async_trait]
impl QueryHandler for RegistryResolver {
    async fn handle_query(&self, query: &InboundQuery, sink: &mut dyn ResponseSink) {
        let Some(question) = query.question() else {
            warn!(client = %query.src(), "Query without question");
            let reply = DnsReply::builder(query.message())
                .response_code(ResponseCode::FormErr)
                .build();
            if let Err(e) = sink.send_reply(reply).await {
                error!(error = %e, "Failed to answer");
            }
            return;
        };
        let name = question.name().to_ascii();
        info!(
            name = %name,
            record_type = ?question.query_type(),
            client = %query.src(),
            "Received query"
        );

        let builder = DnsReply::builder(query.message())
            .authoritative(true)
            .compress(false);

        let supported = query.message().op_code() == OpCode::Query
            && question.query_type() == RecordType::A;

        let reply = if supported {
            let outcome = tokio::select! {
                _ = query.cancellation().cancelled() => None,
                outcome = self.lookup(question.name()) => Some(outcome),
            };
            let Some((code, answer)) = outcome else {
                debug!(name = %name, "Query cancelled before the registry answered");
                return;
            };
            debug!(name = %name, code = ?code, "Device lookup result");

            match answer {
                Some(record) => {
                    info!(answer = %record, "Sending answer");
                    builder.answer(record).build()
                }
                None => {
                    info!(name = %name, code = ?code, "Sending answer");
                    builder.response_code(code).build()
                }
            }
        } else {
            warn!(
                op_code = ?query.message().op_code(),
                record_type = ?question.query_type(),
                "Unsupported query type"
            );
            builder.response_code(ResponseCode::NotImp).build()
        };

        if let Err(e) = sink.send_reply(reply).await {
            error!(error = %e, "Failed to answer");
        }
    }
}
