#![allow(dead_code)]
use async_trait::async_trait;
use subscriber_dns_domain::DomainError;
use subscriber_dns_infrastructure::dns::{DnsReply, ResponseSink};

/// Keeps every reply written to it.
#[derive(Default)]
pub struct CollectingSink {
    pub replies: Vec<DnsReply>,
}

impl CollectingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn single(&self) -> &DnsReply {
        assert_eq!(self.replies.len(), 1, "expected exactly one reply");
        &self.replies[0]
    }
}

#[async_trait]
impl ResponseSink for CollectingSink {
    async fn send_reply(&mut self, reply: DnsReply) -> Result<(), DomainError> {
        self.replies.push(reply);
        Ok(())
    }
}

/// Rejects every write, counting the attempts.
#[derive(Default)]
pub struct FailingSink {
    pub attempts: usize,
}

#[async_trait]
impl ResponseSink for FailingSink {
    async fn send_reply(&mut self, _reply: DnsReply) -> Result<(), DomainError> {
        self.attempts += 1;
        Err(DomainError::ResponseWriteFailed(
            "client went away".to_string(),
        ))
    }
}
