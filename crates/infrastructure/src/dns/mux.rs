//! Query dispatch by queried name.
//!
//! Bindings live in a [`NameTrie`]; a query goes to the handler registered
//! for the longest suffix of its name. The root binding always exists and
//! defaults to [`RefuseHandler`], so every routable query reaches a handler.
//!
//! The record type plays no part in selection; whether a type is supported is
//! up to the chosen handler. A query without a question never reaches a
//! handler and is answered FORMERR.

use super::handler::{QueryHandler, ResponseSink};
use super::name_trie::NameTrie;
use super::query::InboundQuery;
use super::refuse::RefuseHandler;
use super::reply::DnsReply;
use async_trait::async_trait;
use hickory_proto::op::ResponseCode;
use std::sync::Arc;
use subscriber_dns_domain::DomainError;
use tracing::{debug, warn};

/// Name pattern matching every query.
pub const ROOT: &str = ".";

pub struct QueryMux {
    bindings: NameTrie<Arc<dyn QueryHandler>>,
}

impl Default for QueryMux {
    fn default() -> Self {
        Self::new()
    }
}

impl QueryMux {
    pub fn new() -> Self {
        let mut bindings: NameTrie<Arc<dyn QueryHandler>> = NameTrie::new();
        bindings.insert(ROOT, Arc::new(RefuseHandler::new()));
        Self { bindings }
    }

    /// Bind `handler` to `name`; a second registration of a name replaces the
    /// first.
    pub fn register(
        &mut self,
        name: &str,
        handler: Arc<dyn QueryHandler>,
    ) -> Result<(), DomainError> {
        if name.is_empty() {
            return Err(DomainError::InvalidDomainName(
                "handler name must not be empty".to_string(),
            ));
        }

        if self.bindings.insert(name, handler).is_some() {
            debug!(name = %name, "Replaced existing handler binding");
        }
        Ok(())
    }

    /// Handler selected for `name`.
    pub fn handler_for(&self, name: &str) -> Arc<dyn QueryHandler> {
        match self.bindings.longest_match(name) {
            Some(handler) => Arc::clone(handler),
            None => Arc::new(RefuseHandler::new()),
        }
    }

    pub fn is_registered(&self, name: &str) -> bool {
        self.bindings.get(name).is_some()
    }

    /// Number of bindings, the root included.
    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    pub async fn dispatch(&self, query: &InboundQuery, sink: &mut dyn ResponseSink) {
        let Some(question) = query.question() else {
            warn!(client = %query.src(), "Query without question");
            return reject(query, ResponseCode::FormErr, sink).await;
        };

        let name = question.name().to_ascii();
        self.handler_for(&name).handle_query(query, sink).await;
    }
}

#[async_trait]
impl QueryHandler for QueryMux {
    async fn handle_query(&self, query: &InboundQuery, sink: &mut dyn ResponseSink) {
        self.dispatch(query, sink).await;
    }
}

async fn reject(query: &InboundQuery, code: ResponseCode, sink: &mut dyn ResponseSink) {
    let reply = DnsReply::builder(query.message())
        .compress(false)
        .response_code(code)
        .build();

    if let Err(e) = sink.send_reply(reply).await {
        warn!(error = %e, "Failed to answer");
    }
}
