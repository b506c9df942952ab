//! Reply construction and serialisation.
//!
//! Every reply mirrors the request's id, opcode, RD bit and question section,
//! never sets RA, and is written without name compression unless asked to.

use hickory_proto::op::{Message, MessageType, ResponseCode};
use hickory_proto::rr::rdata::A;
use hickory_proto::rr::{Name, RData, Record};
use hickory_proto::serialize::binary::{BinEncodable, BinEncoder, NameEncoding};
use std::str::FromStr;
use subscriber_dns_domain::{AddressRecord, DomainError};

/// A reply ready to hand to a response sink.
#[derive(Debug, Clone)]
pub struct DnsReply {
    message: Message,
    compress: bool,
}

impl DnsReply {
    pub fn builder(request: &Message) -> ReplyBuilder {
        ReplyBuilder::from_request(request)
    }

    pub fn message(&self) -> &Message {
        &self.message
    }

    pub fn response_code(&self) -> ResponseCode {
        self.message.response_code()
    }

    pub fn answers(&self) -> &[Record] {
        self.message.answers()
    }

    pub fn is_authoritative(&self) -> bool {
        self.message.authoritative()
    }

    pub fn is_compressed(&self) -> bool {
        self.compress
    }

    /// Serialise to wire format.
    pub fn to_wire(&self) -> Result<Vec<u8>, DomainError> {
        let mut buf = Vec::with_capacity(512);
        let mut encoder = BinEncoder::new(&mut buf);
        encoder.set_name_encoding(if self.compress {
            NameEncoding::Compressed
        } else {
            NameEncoding::Uncompressed
        });

        self.message.emit(&mut encoder).map_err(|e| {
            DomainError::ResponseWriteFailed(format!("Failed to serialize DNS reply: {}", e))
        })?;

        Ok(buf)
    }
}

pub struct ReplyBuilder {
    message: Message,
    compress: bool,
}

impl ReplyBuilder {
    pub fn from_request(request: &Message) -> Self {
        let mut message = Message::new(request.id(), MessageType::Response, request.op_code());
        message.set_recursion_desired(request.recursion_desired());
        message.set_recursion_available(false);
        message.add_queries(request.queries().iter().cloned());

        Self {
            message,
            compress: false,
        }
    }

    pub fn authoritative(mut self, authoritative: bool) -> Self {
        self.message.set_authoritative(authoritative);
        self
    }

    pub fn compress(mut self, compress: bool) -> Self {
        self.compress = compress;
        self
    }

    pub fn response_code(mut self, code: ResponseCode) -> Self {
        self.message.set_response_code(code);
        self
    }

    pub fn answer(mut self, record: Record) -> Self {
        self.message.add_answer(record);
        self
    }

    pub fn build(self) -> DnsReply {
        DnsReply {
            message: self.message,
            compress: self.compress,
        }
    }
}

/// Convert an address record into its wire representation.
pub fn a_record(record: &AddressRecord, ttl: u32) -> Result<Record, DomainError> {
    let name = Name::from_str(record.name()).map_err(|e| {
        DomainError::InvalidRecord(format!("invalid record name '{}': {}", record.name(), e))
    })?;

    Ok(Record::from_rdata(name, ttl, RData::A(A(record.address()))))
}
