use std::path::{Path, PathBuf};

use crate::cli::{Cli, Commands, LogdirCommands};
use crate::config::Config;
use crate::core::{HubContext, ServerSettings};
use crate::error::AppError;
use crate::launcher::{Launcher, ProxyConfig, ServerCommand};
use crate::logdir::{ClearOutcome, ExperimentLogDir};
use crate::output::{context_json, print_context_table};
use crate::provision::{PgSchemaStore, S3ObjectStore};

fn print_pretty_json<T: serde::Serialize>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(json) => println!("{json}"),
        Err(e) => tracing::error!("failed to serialize output: {e}"),
    }
}

pub(crate) fn run(cli: &Cli) -> Result<(), AppError> {
    let config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load(),
    };
    // Only commands that touch tenant resources resolve the full context
    let context = || HubContext::from_env(&config, &cli.overrides());

    match &cli.command {
        Commands::Mlflow { port, print, .. } => {
            let ctx = context()?;
            handle_mlflow(&ctx, port.unwrap_or(ctx.server.port), *print, cli.json)
        }
        Commands::ProxyConfig => {
            handle_proxy_config(&ServerSettings::from_config(&config));
            Ok(())
        }
        Commands::Logdir { command } => match command {
            LogdirCommands::Create { experiment, .. } => {
                handle_logdir_create(&context()?, experiment, cli.json)
            }
            LogdirCommands::Clear { path } => handle_logdir_clear(path, cli.json),
        },
        Commands::Show => {
            let ctx = context()?;
            if cli.json {
                println!("{}", context_json(&ctx)?);
                Ok(())
            } else {
                print_context_table(&ctx, cli.use_color())
            }
        }
    }
}

fn handle_mlflow(ctx: &HubContext, port: u16, print: bool, json: bool) -> Result<(), AppError> {
    let objects = S3ObjectStore::new(&ctx.storage, ctx.io_timeout);
    let schemas = PgSchemaStore::new(&ctx.database, ctx.io_timeout);
    let command = Launcher::new(ctx, &objects, &schemas).build_server_command(port)?;

    if !print {
        return launch(&command);
    }
    if json {
        print_pretty_json(&command.args());
    } else {
        println!("{}", command.to_shell_line());
    }
    Ok(())
}

/// Replace this process with the tracking server
#[cfg(unix)]
fn launch(command: &ServerCommand) -> Result<(), AppError> {
    use std::os::unix::process::CommandExt;

    tracing::info!(program = command.program(), "starting tracking server");
    let source = command.to_process().exec();
    Err(AppError::Launch {
        program: command.program().to_string(),
        source,
    })
}

#[cfg(not(unix))]
fn launch(command: &ServerCommand) -> Result<(), AppError> {
    tracing::info!(program = command.program(), "starting tracking server");
    let status = command
        .to_process()
        .status()
        .map_err(|source| AppError::Launch {
            program: command.program().to_string(),
            source,
        })?;
    if status.success() {
        Ok(())
    } else {
        Err(AppError::ServerExit {
            program: command.program().to_string(),
            status: status.to_string(),
        })
    }
}

fn handle_proxy_config(server: &ServerSettings) {
    let self_exe = std::env::current_exe().unwrap_or_else(|_| PathBuf::from("hubtrack"));
    print_pretty_json(&ProxyConfig::for_executable(server, &self_exe));
}

fn handle_logdir_create(ctx: &HubContext, experiment: &str, json: bool) -> Result<(), AppError> {
    let dir = ExperimentLogDir::for_context(ctx, experiment)?;
    if json {
        print_pretty_json(&dir.sink());
    } else {
        println!("{}", dir.describe());
    }
    Ok(())
}

fn handle_logdir_clear(path: &Path, json: bool) -> Result<(), AppError> {
    let dir = ExperimentLogDir::open(path);
    let outcome = dir.clear()?;

    if json {
        print_pretty_json(&outcome.to_json(dir.path()));
    } else {
        match &outcome {
            ClearOutcome::Missing => println!("No logs found at: {}", dir.path().display()),
            ClearOutcome::Cleared { removed, .. } => println!(
                "Cleared logs in: {} ({} file(s) removed)",
                dir.path().display(),
                removed.len()
            ),
        }
    }

    outcome.ensure_complete(dir.path())?;
    Ok(())
}
