#![allow(dead_code)]

use dashboard_core::gateway::{GatewayError, RemoteGateway};
use dashboard_core::protocol::{PluginRecord, RawPayload, TabRecord};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// One tab "Security": p1 active and disabled, p2 inactive.
pub fn security_payload() -> RawPayload {
    let mut raw = RawPayload::default();
    raw.tabs = vec!["security".to_string()];
    raw.tab_data.insert(
        "security",
        TabRecord::new("Security", "shield.png")
            .with_active(["p1"])
            .with_inactive(["p2"])
            .with_disabled(["p1"]),
    );
    raw.plugins
        .insert("p1", PluginRecord::new("Firewall", "Blocks unwanted traffic"));
    raw.plugins
        .insert("p2", PluginRecord::new("Scanner", "Scans uploads"));
    raw
}

/// Two tabs sharing nothing: "Site Tools" (t1, t2) and "Marketing" (m1).
pub fn two_tab_payload() -> RawPayload {
    let mut raw = RawPayload::default();
    raw.tabs = vec!["site".to_string(), "marketing".to_string()];
    raw.tab_data.insert(
        "site",
        TabRecord::new("Site Tools", "tools.png")
            .with_active(["t2"])
            .with_inactive(["t1"]),
    );
    raw.tab_data.insert(
        "marketing",
        TabRecord::new("Marketing", "megaphone.png").with_active(["m1"]),
    );
    raw.plugins.insert("t1", PluginRecord::new("Cache", "Page cache"));
    raw.plugins.insert("t2", PluginRecord::new("Minify", "Asset minifier"));
    raw.plugins.insert("m1", PluginRecord::new("Newsletter", "Mailing list"));
    raw
}

#[derive(Default)]
struct MemoryState {
    payload: RawPayload,
    fail_fetches: u32,
    fail_persists: u32,
    fetches: u32,
    persisted: Vec<RawPayload>,
    fetch_delay: Duration,
    persist_delay: Duration,
}

/// In-memory stand-in for the remote API with failure injection.
#[derive(Clone, Default)]
pub struct MemoryGateway {
    state: Arc<Mutex<MemoryState>>,
}

impl MemoryGateway {
    pub fn new(payload: RawPayload) -> Self {
        let gateway = Self::default();
        gateway.state.lock().unwrap().payload = payload;
        gateway
    }

    pub fn fail_next_fetches(&self, n: u32) {
        self.state.lock().unwrap().fail_fetches = n;
    }

    pub fn fail_next_persists(&self, n: u32) {
        self.state.lock().unwrap().fail_persists = n;
    }

    pub fn set_delays(&self, fetch: Duration, persist: Duration) {
        let mut s = self.state.lock().unwrap();
        s.fetch_delay = fetch;
        s.persist_delay = persist;
    }

    pub fn replace_remote(&self, payload: RawPayload) {
        self.state.lock().unwrap().payload = payload;
    }

    pub fn remote(&self) -> RawPayload {
        self.state.lock().unwrap().payload.clone()
    }

    pub fn fetch_count(&self) -> u32 {
        self.state.lock().unwrap().fetches
    }

    pub fn persisted(&self) -> Vec<RawPayload> {
        self.state.lock().unwrap().persisted.clone()
    }
}

impl RemoteGateway for MemoryGateway {
    async fn fetch(&self) -> Result<RawPayload, GatewayError> {
        let delay = self.state.lock().unwrap().fetch_delay;
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        let mut s = self.state.lock().unwrap();
        s.fetches += 1;
        if s.fail_fetches > 0 {
            s.fail_fetches -= 1;
            return Err(GatewayError::Unavailable("injected fetch failure".to_string()));
        }
        Ok(s.payload.clone())
    }

    async fn persist(&self, payload: &RawPayload) -> Result<(), GatewayError> {
        let delay = self.state.lock().unwrap().persist_delay;
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        let mut s = self.state.lock().unwrap();
        if s.fail_persists > 0 {
            s.fail_persists -= 1;
            return Err(GatewayError::Unavailable("injected persist failure".to_string()));
        }
        s.payload = payload.clone();
        s.persisted.push(payload.clone());
        Ok(())
    }
}
