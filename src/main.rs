//! rpc-balancer: issue load-balanced calls against a set of JSON/HTTP endpoints.
//!
//! # Architecture Overview
//!
//! ```text
//!     caller
//!       │ invoke(request)
//!       ▼
//!  ┌──────────┐   candidates   ┌──────────────┐
//!  │  router  │───────────────▶│   selector   │  round-robin / random / healthy-random
//!  └────┬─────┘                └──────────────┘
//!       │ demote on failure          ▲ healthy ids
//!       ▼                            │
//!  ┌──────────┐   promote/demote ┌───┴──────────┐
//!  │ registry │◀─────────────────│health monitor│  periodic probes, bounded timeout
//!  └────┬─────┘                  └──────────────┘
//!       │ connection handle
//!       ▼
//!  ┌──────────┐
//!  │transport │──────────▶ endpoint 0..n-1
//!  └──────────┘
//! ```

use clap::Parser;
use serde_json::json;
use std::path::PathBuf;
use std::time::Duration;

use rpc_balancer::config::{read_config, BalancerConfig, ConfigError, SelectionPolicy};
use rpc_balancer::lifecycle::signals::wait_for_signal;
use rpc_balancer::observability::{logging, metrics};
use rpc_balancer::{Balancer, HttpTransport, RpcRequest};

#[derive(Parser, Debug)]
#[command(name = "rpc-balancer")]
#[command(about = "Load-balanced calls over a static set of endpoints", long_about = None)]
struct Cli {
    /// TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Endpoint address; repeat to list several. Replaces configured addresses.
    #[arg(short, long = "endpoint")]
    endpoints: Vec<String>,

    /// Selection policy override.
    #[arg(long, value_enum)]
    policy: Option<SelectionPolicy>,

    /// Number of calls to issue.
    #[arg(short = 'n', long, default_value_t = 10)]
    requests: usize,

    /// Remote method to call.
    #[arg(short, long, default_value = "say_hello")]
    method: String,

    /// Pause between calls, in milliseconds.
    #[arg(long, default_value_t = 100)]
    delay_ms: u64,
}

/// Config file (unvalidated) with command-line overrides applied.
fn build_config(cli: &Cli) -> Result<BalancerConfig, ConfigError> {
    let mut config = match &cli.config {
        Some(path) => read_config(path)?,
        None => BalancerConfig::default(),
    };
    if !cli.endpoints.is_empty() {
        config.balancer.addresses = cli.endpoints.clone();
    }
    if cli.policy.is_some() {
        config.balancer.selection_policy = cli.policy;
    }
    Ok(config)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = build_config(&cli)?;

    logging::init_logging(&config.observability);
    tracing::info!("rpc-balancer v{} starting", env!("CARGO_PKG_VERSION"));

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let transport = HttpTransport::new(config.transport.clone());
    let balancer = Balancer::start(&config, transport).await?;

    let calls = async {
        for i in 0..cli.requests {
            let request = RpcRequest::new(cli.method.clone(), json!({ "name": format!("User-{}", i) }));
            match balancer.invoke(&request).await {
                Ok(response) => println!("Response {}: {}", i, response),
                Err(e) => eprintln!("Call {} failed: {}", i, e),
            }
            tokio::time::sleep(Duration::from_millis(cli.delay_ms)).await;
        }
    };

    tokio::select! {
        _ = calls => {}
        _ = wait_for_signal() => {
            tracing::info!("Interrupted, closing early");
        }
    }

    println!("{}", serde_json::to_string_pretty(&balancer.snapshot())?);

    balancer.close().await?;
    tracing::info!("Shutdown complete");
    Ok(())
}
