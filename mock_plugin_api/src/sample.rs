use dashboard_protocol::{PluginRecord, RawPayload, TabRecord};

/// A small three-tab dashboard served when no seed file is given.
pub fn sample_payload() -> RawPayload {
    let mut raw = RawPayload {
        tabs: vec![
            "tab1".to_string(),
            "tab2".to_string(),
            "tab3".to_string(),
        ],
        ..RawPayload::default()
    };

    raw.tab_data.insert(
        "tab1",
        TabRecord::new("Marketing", "icon-marketing")
            .with_active(["plugin1", "plugin3"])
            .with_inactive(["plugin2"]),
    );
    raw.tab_data.insert(
        "tab2",
        TabRecord::new("Finance", "icon-finance")
            .with_active(["plugin4"])
            .with_inactive(["plugin5"])
            .with_disabled(["plugin5"]),
    );
    raw.tab_data.insert(
        "tab3",
        TabRecord::new("Personnel Management", "icon-people")
            .with_active(["plugin6"])
            .with_inactive(["plugin7"]),
    );

    for (id, title, description) in [
        ("plugin1", "Plugin 1", "Schedules campaign emails"),
        ("plugin2", "Plugin 2", "Tracks social mentions"),
        ("plugin3", "Plugin 3", "Builds landing pages"),
        ("plugin4", "Plugin 4", "Exports ledgers"),
        ("plugin5", "Plugin 5", "Forecasts cash flow"),
        ("plugin6", "Plugin 6", "Manages onboarding"),
        ("plugin7", "Plugin 7", "Collects time off requests"),
    ] {
        raw.plugins.insert(id, PluginRecord::new(title, description));
    }
    raw
}
