//! CLI argument definitions
//!
//! Global CLI options and their mapping onto context overrides.

use std::io::IsTerminal;
use std::path::PathBuf;

use clap::{Parser, ValueEnum};

use crate::core::Overrides;

use super::commands::{Commands, LogdirCommands};

#[derive(Debug, Clone, Copy, Default, ValueEnum, PartialEq)]
pub(crate) enum ColorMode {
    /// Auto-detect based on terminal (default)
    #[default]
    Auto,
    /// Always use colors
    Always,
    /// Never use colors
    Never,
}

#[derive(Parser)]
#[command(name = "hubtrack")]
#[command(about = "Per-user MLflow and TensorBoard wiring for JupyterHub", version)]
pub(crate) struct Cli {
    #[command(subcommand)]
    pub(crate) command: Commands,

    /// Tenant name (defaults to $JUPYTERHUB_USER)
    #[arg(short, long, global = true)]
    pub(crate) tenant: Option<String>,

    /// Config file to use instead of the default locations
    #[arg(long, global = true, value_name = "FILE")]
    pub(crate) config: Option<PathBuf>,

    /// Output as JSON
    #[arg(short, long, global = true)]
    pub(crate) json: bool,

    /// Color output mode
    #[arg(long, global = true, value_enum, default_value = "auto")]
    pub(crate) color: ColorMode,

    /// Enable debug logging
    #[arg(long, global = true)]
    pub(crate) debug: bool,
}

impl Cli {
    pub(crate) fn overrides(&self) -> Overrides {
        let strict = matches!(self.command, Commands::Mlflow { strict: true, .. });
        Overrides {
            tenant: self.tenant.clone(),
            strict,
            log_base_dir: self.log_base_dir().cloned(),
        }
    }

    /// Base directory given on the command line, if any
    fn log_base_dir(&self) -> Option<&PathBuf> {
        match &self.command {
            Commands::Logdir {
                command: LogdirCommands::Create { base_dir, .. },
            } => base_dir.as_ref(),
            _ => None,
        }
    }

    pub(crate) fn use_color(&self) -> bool {
        match self.color {
            ColorMode::Always => true,
            ColorMode::Never => false,
            ColorMode::Auto => std::io::stdout().is_terminal(),
        }
    }
}
