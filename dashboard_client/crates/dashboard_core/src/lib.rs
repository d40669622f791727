mod modules;

pub use modules::{actor, config, error, gateway, normalizer, protocol, routing, slug, store, toggle};
