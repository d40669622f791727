use clap::{Parser, Subcommand};
use dashboard_core::actor::{spawn_store, StoreHandle};
use dashboard_core::config::{DashboardConfig, ReconcileMode, ENV_API_URL};
use dashboard_core::gateway::HttpGateway;
use dashboard_core::normalizer::Plugin;
use dashboard_core::routing::{resolve_route, Route};
use dashboard_core::store::DashboardSnapshot;
use dashboard_core::toggle::PluginRef;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "dashboard_cli", about = "Inspect and toggle plugins on a remote dashboard")]
struct Args {
    /// Overrides PLUGIN_API_URL.
    #[arg(long, global = true)]
    api_url: Option<String>,

    #[arg(long, global = true)]
    timeout_secs: Option<u64>,

    /// Total requests per call, the first one included. Overrides PLUGIN_API_ATTEMPTS.
    #[arg(long, global = true)]
    attempts: Option<u32>,

    /// `refetch` or `local`.
    #[arg(long, global = true)]
    reconcile: Option<ReconcileMode>,

    /// Print JSON instead of a table.
    #[arg(long, global = true, default_value_t = false)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List tabs in display order.
    Tabs,
    /// List plugins, optionally for one tab.
    Plugins {
        #[arg(long, value_name = "SLUG")]
        tab: Option<String>,
    },
    /// Show what a path would render.
    Route { path: String },
    /// Flip one plugin between active and inactive.
    Toggle {
        plugin: String,
        /// Treat PLUGIN as a title instead of an id.
        #[arg(long, default_value_t = false)]
        by_title: bool,
    },
    /// Disable every plugin, or enable them all if they already are.
    ToggleAll,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    let args = Args::parse();
    let config = build_config(&args)?;
    tracing::debug!(url = %config.api_url, reconcile = ?config.reconcile, "using plugin api");

    let gateway = HttpGateway::new(&config)?;
    let (store, _task) = spawn_store(gateway, config.reconcile);
    let loaded = store.load().await?;

    match &args.command {
        Command::Tabs => print_tabs(&loaded, args.json)?,
        Command::Plugins { tab } => {
            if let Some(slug) = tab.as_deref() {
                if !loaded.tabs.iter().any(|t| t.slug == slug) {
                    anyhow::bail!("no tab with slug {slug:?}");
                }
            }
            let plugins: Vec<&Plugin> = loaded
                .plugins
                .iter()
                .filter(|p| tab.as_deref().map_or(true, |slug| p.category == slug))
                .collect();
            print_plugins(&plugins, args.json)?;
        }
        Command::Route { path } => print_route(&resolve_route(&loaded.view(), path), args.json)?,
        Command::Toggle { plugin, by_title } => {
            let plugin = if *by_title {
                PluginRef::Title(plugin.clone())
            } else {
                PluginRef::Id(plugin.clone())
            };
            let snap = toggle(&store, plugin).await?;
            print_plugins(&snap.plugins.iter().collect::<Vec<_>>(), args.json)?;
        }
        Command::ToggleAll => {
            let snap = store.toggle_all().await?;
            eprintln!(
                "all plugins {}",
                if snap.all_disabled { "disabled" } else { "enabled" }
            );
            print_plugins(&snap.plugins.iter().collect::<Vec<_>>(), args.json)?;
        }
    }

    Ok(())
}

fn build_config(args: &Args) -> anyhow::Result<DashboardConfig> {
    let mut config = DashboardConfig::from_lookup(|key| match (key, args.api_url.as_ref()) {
        (ENV_API_URL, Some(url)) => Some(url.clone()),
        _ => std::env::var(key).ok(),
    })?;
    if let Some(secs) = args.timeout_secs {
        config = config.with_timeout(Duration::from_secs(secs));
    }
    if let Some(n) = args.attempts {
        config = config.with_max_attempts(n);
    }
    if let Some(mode) = args.reconcile {
        config = config.with_reconcile(mode);
    }
    Ok(config)
}

async fn toggle(store: &StoreHandle, plugin: PluginRef) -> anyhow::Result<DashboardSnapshot> {
    let snap = store.toggle(plugin).await?;
    if let Some(err) = snap.last_error.as_deref() {
        eprintln!("warning: {err}");
    }
    Ok(snap)
}

fn print_tabs(snap: &DashboardSnapshot, json: bool) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(&snap.tabs)?);
        return Ok(());
    }
    for tab in &snap.tabs {
        let marker = if snap.default_tab.as_deref() == Some(tab.slug.as_str()) {
            "*"
        } else {
            " "
        };
        println!("{marker} {:<24} {}", tab.slug, tab.title);
    }
    Ok(())
}

fn print_plugins(plugins: &[&Plugin], json: bool) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(plugins)?);
        return Ok(());
    }
    for p in plugins {
        let state = match (p.status, p.disabled) {
            (_, true) => "disabled",
            (true, false) => "active",
            (false, false) => "inactive",
        };
        println!("{:<16} {:<20} {:<9} {}", p.category, p.id, state, p.title);
    }
    Ok(())
}

fn print_route(route: &Route, json: bool) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(route)?);
        return Ok(());
    }
    match route {
        Route::Redirect { slug } => println!("redirect -> /{slug}"),
        Route::NotFound => println!("not found"),
        Route::Page {
            heading, plugins, ..
        } => {
            println!("{heading}");
            print_plugins(&plugins.iter().collect::<Vec<_>>(), false)?;
        }
    }
    Ok(())
}
