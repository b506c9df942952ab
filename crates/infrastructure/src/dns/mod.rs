pub mod handler;
pub mod listener;
pub mod mux;
pub mod name_trie;
pub mod query;
pub mod refuse;
pub mod registry_resolver;
pub mod reply;
pub mod static_record;

pub use handler::{QueryHandler, ResponseSink};
pub use mux::{QueryMux, ROOT};
pub use name_trie::NameTrie;
pub use query::InboundQuery;
pub use refuse::RefuseHandler;
pub use registry_resolver::{response_code_for, RegistryResolver};
pub use reply::{a_record, DnsReply, ReplyBuilder};
pub use static_record::StaticRecordHandler;
