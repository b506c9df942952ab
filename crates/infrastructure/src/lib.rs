pub mod dns;
pub mod registry;
