#![allow(dead_code)]
pub mod builders;
pub mod mock_registry;
pub mod sink;

pub use builders::*;
pub use mock_registry::{MockRegistryServer, MockTokenServer, RecordedRequest};
pub use sink::{CollectingSink, FailingSink};
