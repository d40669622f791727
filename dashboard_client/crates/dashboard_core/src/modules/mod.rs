pub mod actor;
pub mod config;
pub mod error;
pub mod gateway;
pub mod normalizer;
pub mod protocol;
pub mod routing;
pub mod slug;
pub mod store;
pub mod toggle;
