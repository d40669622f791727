mod common;

use common::MemoryGateway;
use dashboard_core::config::ReconcileMode;
use dashboard_core::error::DashboardError;
use dashboard_core::protocol::{RawPayload, TabRecord};
use dashboard_core::store::DashboardStore;
use dashboard_core::toggle::{PluginRef, ToggleError};

fn store(mode: ReconcileMode) -> (DashboardStore<MemoryGateway>, MemoryGateway) {
    let gateway = MemoryGateway::new(common::security_payload());
    (DashboardStore::new(gateway.clone(), mode), gateway)
}

#[tokio::test]
async fn mutations_before_first_load_are_rejected() {
    let (mut store, gateway) = store(ReconcileMode::Local);
    assert!(matches!(
        store.toggle_one(&PluginRef::Id("p1".into())).await,
        Err(DashboardError::NotLoaded)
    ));
    assert!(matches!(store.toggle_all().await, Err(DashboardError::NotLoaded)));
    assert!(gateway.persisted().is_empty());
}

#[tokio::test]
async fn load_builds_the_view() {
    let (mut store, _) = store(ReconcileMode::Local);
    let snap = store.load().await.unwrap();

    assert!(snap.loaded);
    assert!(!snap.loading);
    assert_eq!(snap.default_tab.as_deref(), Some("security"));
    assert_eq!(snap.plugins.len(), 2);
    assert_eq!(store.raw(), Some(&common::security_payload()));
}

#[tokio::test]
async fn failed_load_keeps_previous_data() {
    let (mut store, gateway) = store(ReconcileMode::Local);
    let first = store.load().await.unwrap();

    gateway.fail_next_fetches(1);
    assert!(matches!(store.load().await, Err(DashboardError::Network(_))));
    let snap = store.snapshot();
    assert_eq!(snap.plugins, first.plugins);
    assert!(snap.last_error.is_some());

    let snap = store.load().await.unwrap();
    assert_eq!(snap.last_error, None);
}

#[tokio::test]
async fn colliding_slugs_fail_the_load() {
    let (mut store, gateway) = store(ReconcileMode::Local);
    let mut raw = common::security_payload();
    raw.tab_data.insert("dup", TabRecord::new("security", ""));
    gateway.replace_remote(raw);

    assert!(matches!(store.load().await, Err(DashboardError::Normalize(_))));
    assert!(store.raw().is_none());
}

#[tokio::test]
async fn toggle_persists_then_commits() {
    let (mut store, gateway) = store(ReconcileMode::Local);
    store.load().await.unwrap();

    let snap = store.toggle_one(&PluginRef::Id("p2".into())).await.unwrap();
    let p2 = snap.plugins.iter().find(|p| p.id == "p2").unwrap();
    assert!(p2.status);

    let persisted = gateway.persisted();
    assert_eq!(persisted.len(), 1);
    assert_eq!(
        persisted[0].tab_data.get("security").unwrap().active,
        ["p1", "p2"]
    );
    assert_eq!(store.raw(), Some(&persisted[0]));
}

#[tokio::test]
async fn failed_persist_leaves_state_unchanged() {
    let (mut store, gateway) = store(ReconcileMode::Refetch);
    let before = store.load().await.unwrap();
    let raw_before = store.raw().cloned();

    gateway.fail_next_persists(1);
    let result = store.toggle_one(&PluginRef::Id("p1".into())).await;
    assert!(matches!(result, Err(DashboardError::Network(_))));

    assert_eq!(store.raw().cloned(), raw_before);
    let after = store.snapshot();
    assert_eq!(after.plugins, before.plugins);
    assert_eq!(after.all_disabled, before.all_disabled);
    assert!(after.last_error.is_some());
    assert!(gateway.persisted().is_empty());
}

#[tokio::test]
async fn failed_toggle_all_leaves_state_unchanged() {
    let (mut store, gateway) = store(ReconcileMode::Local);
    let before = store.load().await.unwrap();

    gateway.fail_next_persists(1);
    assert!(store.toggle_all().await.is_err());
    assert_eq!(store.snapshot().plugins, before.plugins);
    assert!(!store.view().all_disabled);
}

#[tokio::test]
async fn unknown_plugin_sets_error_without_persisting() {
    let (mut store, gateway) = store(ReconcileMode::Local);
    store.load().await.unwrap();

    let result = store.toggle_one(&PluginRef::Title("Nothing".into())).await;
    assert!(matches!(
        result,
        Err(DashboardError::Toggle(ToggleError::PluginNotFound(_)))
    ));
    assert!(store.last_error().is_some());
    assert!(gateway.persisted().is_empty());
}

#[tokio::test]
async fn refetch_mode_reads_back_after_persist() {
    let (mut store, gateway) = store(ReconcileMode::Refetch);
    store.load().await.unwrap();
    assert_eq!(gateway.fetch_count(), 1);

    store.toggle_one(&PluginRef::Id("p2".into())).await.unwrap();
    assert_eq!(gateway.fetch_count(), 2);
    assert_eq!(store.raw(), Some(&gateway.remote()));
}

#[tokio::test]
async fn local_mode_skips_the_refetch() {
    let (mut store, gateway) = store(ReconcileMode::Local);
    store.load().await.unwrap();

    store.toggle_all().await.unwrap();
    assert_eq!(gateway.fetch_count(), 1);
    assert!(store.view().all_disabled);
}

#[tokio::test]
async fn failed_refetch_keeps_the_persisted_copy() {
    let (mut store, gateway) = store(ReconcileMode::Refetch);
    store.load().await.unwrap();

    gateway.fail_next_fetches(1);
    let snap = store.toggle_all().await.unwrap();
    assert!(snap.all_disabled);
    assert!(snap.last_error.is_some());
    assert_eq!(gateway.persisted().len(), 1);
}

#[tokio::test]
async fn toggle_all_twice_round_trips() {
    let (mut store, _) = store(ReconcileMode::Local);
    store.load().await.unwrap();

    let off = store.toggle_all().await.unwrap();
    assert!(off.plugins.iter().all(|p| p.disabled));

    let on = store.toggle_all().await.unwrap();
    assert!(on.plugins.iter().all(|p| !p.disabled));
    assert!(!on.all_disabled);
}

#[tokio::test]
async fn toggle_all_on_an_empty_dashboard_stays_all_disabled() {
    let gateway = MemoryGateway::new(RawPayload::default());
    let mut store = DashboardStore::new(gateway.clone(), ReconcileMode::Local);
    let before = store.load().await.unwrap();
    assert!(before.all_disabled);

    let after = store.toggle_all().await.unwrap();
    assert!(after.all_disabled);
    assert!(after.plugins.is_empty());
    assert_eq!(gateway.persisted(), vec![RawPayload::default()]);
}

#[tokio::test]
async fn toggle_all_clears_lists_when_only_dangling_ids_remain() {
    let mut raw = RawPayload::default();
    raw.tab_data.insert(
        "t",
        TabRecord::new("Tools", "")
            .with_active(["ghost"])
            .with_disabled(["ghost"]),
    );
    let gateway = MemoryGateway::new(raw);
    let mut store = DashboardStore::new(gateway.clone(), ReconcileMode::Local);
    assert!(store.load().await.unwrap().all_disabled);

    let after = store.toggle_all().await.unwrap();
    assert!(after.all_disabled);
    let persisted = gateway.persisted();
    assert!(persisted[0].tab_data.get("t").unwrap().disabled.is_empty());
}
