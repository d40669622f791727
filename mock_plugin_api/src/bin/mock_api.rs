use dashboard_protocol::RawPayload;
use mock_plugin_api::{sample_payload, MockApi};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing_subscriber::EnvFilter;

const DEFAULT_ADDR: &str = "127.0.0.1:0";

fn parse_arg_value(args: &[String], name: &str) -> Option<String> {
    args.iter()
        .position(|a| a == name)
        .and_then(|i| args.get(i + 1))
        .cloned()
}

fn load_seed(path: &Path) -> Result<RawPayload, String> {
    let text = fs::read_to_string(path)
        .map_err(|e| format!("failed to read seed {}: {e}", path.display()))?;
    serde_json::from_str(&text).map_err(|e| format!("invalid seed {}: {e}", path.display()))
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args: Vec<String> = std::env::args().collect();

    let addr = parse_arg_value(&args, "--addr")
        .or_else(|| std::env::var("MOCK_PLUGIN_API_ADDR").ok())
        .unwrap_or_else(|| DEFAULT_ADDR.to_string());
    let addr_file = parse_arg_value(&args, "--addr-file").map(PathBuf::from);
    let run_for_ms = parse_arg_value(&args, "--run-for-ms")
        .and_then(|s| s.parse::<u64>().ok())
        .map(Duration::from_millis);

    let payload = match parse_arg_value(&args, "--seed").map(PathBuf::from) {
        Some(path) => match load_seed(&path) {
            Ok(p) => p,
            Err(e) => {
                eprintln!("{e}");
                std::process::exit(1);
            }
        },
        None => sample_payload(),
    };

    let api = match MockApi::spawn(&addr, payload).await {
        Ok(api) => api,
        Err(e) => {
            eprintln!("bind failed on {addr}: {e}");
            std::process::exit(1);
        }
    };

    if let Some(path) = &addr_file {
        let _ = fs::write(path, api.url());
    }
    println!("mock_api listening on {}", api.url());

    match run_for_ms {
        Some(max) => tokio::time::sleep(max).await,
        None => {
            let _ = tokio::signal::ctrl_c().await;
        }
    }

    api.shutdown().await;
}
