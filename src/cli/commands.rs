//! CLI subcommand definitions

use std::path::PathBuf;

use clap::Subcommand;

use crate::consts::DEFAULT_EXPERIMENT;

/// Main CLI commands
#[derive(Subcommand)]
pub(crate) enum Commands {
    /// Provision the tenant's bucket prefix and schema, then start the MLflow server
    Mlflow {
        /// Port the tracking server listens on
        #[arg(short, long)]
        port: Option<u16>,
        /// Print the server command instead of running it
        #[arg(long)]
        print: bool,
        /// Refuse to start when a provisioning step fails
        #[arg(long)]
        strict: bool,
    },
    /// Print the jupyter-server-proxy entry for the MLflow server
    ProxyConfig,
    /// Manage per-run TensorBoard log directories
    Logdir {
        #[command(subcommand)]
        command: LogdirCommands,
    },
    /// Show the resolved tenant, endpoints and paths
    Show,
}

/// Log directory subcommands
#[derive(Subcommand)]
pub(crate) enum LogdirCommands {
    /// Create a timestamped log directory for a new training run
    Create {
        /// Experiment name (a single path component)
        #[arg(short, long, default_value = DEFAULT_EXPERIMENT)]
        experiment: String,
        /// Base directory shared by all tenants
        #[arg(short, long, value_name = "DIR")]
        base_dir: Option<PathBuf>,
    },
    /// Delete the files directly inside a run's log directory
    Clear {
        /// Log directory of the run
        path: PathBuf,
    },
}
