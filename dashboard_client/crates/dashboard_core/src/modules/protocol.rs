pub use dashboard_protocol::{OrderedMap, PluginRecord, RawPayload, TabRecord};
