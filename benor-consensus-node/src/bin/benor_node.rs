//! Ben-Or consensus node launcher
//!
//! Serves every peer of a local cluster over HTTP on consecutive ports.
//!
//! # Example
//!
//! ```bash
//! # Serve 4 peers on ports 3000..3003 and wait for /start calls
//! benor-node --nodes 4 --faulty 1
//!
//! # Run one seeded round to completion and print the final states
//! benor-node --nodes 5 --faulty 1 --initial-values 0,1,0,1,1 --seed 7 --start
//! ```

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use tracing::info;

use benor_consensus_node::{init_tracing, launch_cluster, ClusterConfig};

#[derive(Parser, Debug)]
#[command(name = "benor-node")]
#[command(version, about, long_about = None)]
struct Cli {
    #[command(flatten)]
    cluster: ClusterConfig,

    /// JSON cluster config; replaces the cluster flags when given
    #[arg(long)]
    config: Option<PathBuf>,

    /// Start every peer and exit once all live peers have decided
    #[arg(long)]
    start: bool,

    /// Interval between state polls while waiting for a decision
    #[arg(long, default_value_t = 50)]
    poll_interval_ms: u64,

    /// Give up once a peer passes this round without deciding
    #[arg(long, default_value_t = 100)]
    max_round: u64,

    /// Log filter used when RUST_LOG is unset
    #[arg(long, default_value = "info")]
    log: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(&cli.log);

    let config = match &cli.config {
        Some(path) => ClusterConfig::from_json_file(path)
            .with_context(|| format!("loading {}", path.display()))?,
        None => cli.cluster.clone(),
    };
    info!(
        nodes = config.node_count,
        faulty = config.faulty_count,
        base_port = config.base_port,
        seed = ?config.seed,
        "launching cluster"
    );

    let cluster = launch_cluster(&config)
        .await
        .context("failed to launch cluster")?;

    if cli.start {
        cluster.start_all().await.context("failed to start peers")?;
        let states = cluster
            .wait_for_consensus(Duration::from_millis(cli.poll_interval_ms), cli.max_round)
            .await
            .context("consensus did not complete")?;
        println!("{}", serde_json::to_string_pretty(&states)?);
        cluster.stop_all().await.context("failed to stop peers")?;
    } else {
        tokio::signal::ctrl_c()
            .await
            .context("failed to listen for ctrl-c")?;
        info!("shutting down");
    }

    cluster.shutdown();
    Ok(())
}
