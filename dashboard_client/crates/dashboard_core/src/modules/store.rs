use crate::modules::config::ReconcileMode;
use crate::modules::error::DashboardError;
use crate::modules::gateway::RemoteGateway;
use crate::modules::normalizer::{all_disabled, DashboardView, Plugin, Tab};
use crate::modules::protocol::RawPayload;
use crate::modules::toggle::{resolve_plugin, stage_toggle_all, stage_toggle_one, PluginRef};
use serde::Serialize;
use tokio::sync::watch;

/// Read-only copy of the store handed out to callers.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DashboardSnapshot {
    pub tabs: Vec<Tab>,
    pub plugins: Vec<Plugin>,
    pub default_tab: Option<String>,
    pub all_disabled: bool,
    pub loading: bool,
    pub loaded: bool,
    pub last_error: Option<String>,
}

impl DashboardSnapshot {
    pub fn view(&self) -> DashboardView {
        DashboardView {
            tabs: self.tabs.clone(),
            plugins: self.plugins.clone(),
            default_tab: self.default_tab.clone(),
            all_disabled: self.all_disabled,
        }
    }
}

/// Single owner of the raw payload and its derived view.
///
/// Mutations are staged on a copy, persisted, and only then committed. A
/// failed persist leaves both the raw payload and the view untouched.
pub struct DashboardStore<G> {
    gateway: G,
    reconcile: ReconcileMode,
    raw: Option<RawPayload>,
    view: DashboardView,
    loading: bool,
    last_error: Option<String>,
    publisher: Option<watch::Sender<DashboardSnapshot>>,
}

impl<G: RemoteGateway> DashboardStore<G> {
    pub fn new(gateway: G, reconcile: ReconcileMode) -> Self {
        Self {
            gateway,
            reconcile,
            raw: None,
            view: DashboardView::default(),
            loading: false,
            last_error: None,
            publisher: None,
        }
    }

    /// Every state change is also pushed to `publisher`.
    pub fn with_publisher(mut self, publisher: watch::Sender<DashboardSnapshot>) -> Self {
        self.publisher = Some(publisher);
        self
    }

    pub fn gateway(&self) -> &G {
        &self.gateway
    }

    pub fn raw(&self) -> Option<&RawPayload> {
        self.raw.as_ref()
    }

    pub fn view(&self) -> &DashboardView {
        &self.view
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn snapshot(&self) -> DashboardSnapshot {
        DashboardSnapshot {
            tabs: self.view.tabs.clone(),
            plugins: self.view.plugins.clone(),
            default_tab: self.view.default_tab.clone(),
            all_disabled: self.view.all_disabled,
            loading: self.loading,
            loaded: self.raw.is_some(),
            last_error: self.last_error.clone(),
        }
    }

    /// Fetches the payload and rebuilds the view. On failure the previous
    /// state stays in place and `last_error` is set.
    pub async fn load(&mut self) -> Result<DashboardSnapshot, DashboardError> {
        // Only a first load shows the loading flag; refreshes keep the old data on screen.
        if self.raw.is_none() {
            self.loading = true;
            self.publish();
        }
        let result = self.fetch_and_derive().await;
        self.loading = false;

        match result {
            Ok((raw, view)) => {
                self.commit(raw, view);
                Ok(self.snapshot())
            }
            Err(e) => {
                self.fail("load", &e);
                Err(e)
            }
        }
    }

    pub async fn toggle_one(&mut self, plugin: &PluginRef) -> Result<DashboardSnapshot, DashboardError> {
        let raw = self.raw.as_ref().ok_or(DashboardError::NotLoaded)?;
        let staged = match resolve_plugin(raw, plugin).and_then(|id| stage_toggle_one(raw, &id)) {
            Ok(staged) => staged,
            Err(e) => {
                let e = DashboardError::from(e);
                self.fail("toggle", &e);
                return Err(e);
            }
        };
        self.persist_and_commit("toggle", staged).await
    }

    /// Disables every plugin, or enables them all when all are disabled.
    ///
    /// The resulting `all_disabled` is re-derived rather than negated. A
    /// dashboard with no renderable plugins counts as all disabled, so it
    /// stays `true` after the call; only the `disabled` lists are cleared.
    pub async fn toggle_all(&mut self) -> Result<DashboardSnapshot, DashboardError> {
        let raw = self.raw.as_ref().ok_or(DashboardError::NotLoaded)?;
        let staged = stage_toggle_all(raw, all_disabled(&self.view.plugins));
        self.persist_and_commit("toggle all", staged).await
    }

    async fn fetch_and_derive(&self) -> Result<(RawPayload, DashboardView), DashboardError> {
        let raw = self.gateway.fetch().await?;
        let view = DashboardView::derive(&raw)?;
        Ok((raw, view))
    }

    async fn persist_and_commit(
        &mut self,
        what: &str,
        staged: RawPayload,
    ) -> Result<DashboardSnapshot, DashboardError> {
        let staged_view = match DashboardView::derive(&staged) {
            Ok(view) => view,
            Err(e) => {
                let e = DashboardError::from(e);
                self.fail(what, &e);
                return Err(e);
            }
        };

        if let Err(e) = self.gateway.persist(&staged).await {
            let e = DashboardError::from(e);
            self.fail(what, &e);
            return Err(e);
        }
        self.commit(staged, staged_view);

        if self.reconcile == ReconcileMode::Refetch {
            match self.fetch_and_derive().await {
                Ok((raw, view)) => self.commit(raw, view),
                Err(e) => {
                    tracing::warn!("refetch after {what} failed, showing the persisted copy: {e}");
                    self.last_error = Some(e.to_string());
                    self.publish();
                }
            }
        }
        Ok(self.snapshot())
    }

    fn commit(&mut self, raw: RawPayload, view: DashboardView) {
        self.raw = Some(raw);
        self.view = view;
        self.last_error = None;
        self.publish();
    }

    fn fail(&mut self, what: &str, e: &DashboardError) {
        tracing::error!("{what} failed, keeping previous state: {e}");
        self.last_error = Some(e.to_string());
        self.publish();
    }

    fn publish(&self) {
        if let Some(tx) = &self.publisher {
            tx.send_replace(self.snapshot());
        }
    }
}
