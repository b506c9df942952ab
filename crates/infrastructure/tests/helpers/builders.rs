#![allow(dead_code)]
use hickory_proto::op::{Message, MessageType, OpCode, Query};
use hickory_proto::rr::{Name, RecordType};
use hickory_proto::serialize::binary::{BinEncodable, BinEncoder};
use std::net::SocketAddr;
use std::str::FromStr;
use subscriber_dns_infrastructure::dns::InboundQuery;

pub const CLIENT: &str = "192.0.2.10:5353";

pub fn client_addr() -> SocketAddr {
    CLIENT.parse().unwrap()
}

pub fn query_message(id: u16, name: &str, record_type: RecordType) -> Message {
    let mut message = Message::new(id, MessageType::Query, OpCode::Query);
    message.set_recursion_desired(true);
    message.add_query(Query::query(Name::from_str(name).unwrap(), record_type));
    message
}

pub fn query(name: &str, record_type: RecordType) -> InboundQuery {
    InboundQuery::new(query_message(4242, name, record_type), client_addr())
}

pub fn a_query(name: &str) -> InboundQuery {
    query(name, RecordType::A)
}

pub fn empty_query() -> InboundQuery {
    let message = Message::new(7, MessageType::Query, OpCode::Query);
    InboundQuery::new(message, client_addr())
}

pub fn encode(message: &Message) -> Vec<u8> {
    let mut buf = Vec::new();
    let mut encoder = BinEncoder::new(&mut buf);
    message.emit(&mut encoder).unwrap();
    buf
}

pub fn device_json(id: &str, attached: &str, ip: &str) -> String {
    serde_json::json!({
        "attached": attached,
        "description": "test device",
        "device_groups": null,
        "id": id,
        "imei": "123456789012345",
        "ip": ip,
        "name": id,
        "sim_iccid": null,
    })
    .to_string()
}
