//! Command dispatch

use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::CommandFactory;
use clap_complete::{generate, Shell};
use tracing::{debug, instrument};

use crate::application::{ApplicationError, IoResultExt};
use crate::cli::args::{Cli, Commands, ConfigCommands, InputArgs};
use crate::cli::output;
use crate::cli::{CliError, CliResult};
use crate::config::{global_config_path, local_config_path, Settings};
use crate::domain::RejectedLine;
use crate::infrastructure::di::ServiceContainer;
use crate::infrastructure::traits::{open_line_source, open_record_sink, LineSource};
use crate::infrastructure::InfraError;

pub fn execute_command(cli: &Cli) -> CliResult<()> {
    match &cli.command {
        Commands::Balance {
            input,
            output,
            strict,
        } => cmd_balance(cli, input, output.as_deref(), *strict),
        Commands::Check { input } => cmd_check(cli, input),
        Commands::Tree { input } => cmd_tree(cli, input),
        Commands::Config { command } => cmd_config(cli, command),
        Commands::Completion { shell } => cmd_completion(*shell),
    }
}

fn config_dir(cli: &Cli) -> CliResult<PathBuf> {
    match &cli.config_dir {
        Some(dir) => Ok(dir.clone()),
        None => std::env::current_dir()
            .map_err(|e| InfraError::io("determine current directory", e).into()),
    }
}

/// Layered settings with command-line overrides on top.
fn load_settings(cli: &Cli, input: &InputArgs) -> CliResult<Settings> {
    let dir = config_dir(cli)?;
    let mut settings = Settings::load(Some(&dir))?;
    if let Some(traversal) = input.traversal {
        settings.balance.traversal = traversal;
    }
    if let Some(self_mass) = input.self_mass {
        settings.balance.self_mass = self_mass;
    }
    debug!("settings: {:?}", settings);
    Ok(settings)
}

fn open_input(input: &InputArgs) -> CliResult<Box<dyn LineSource>> {
    let file = input.file.as_deref();
    open_line_source(file).map_err(|e| {
        InfraError::io(format!("open input {}", display_or_std(file, "stdin")), e).into()
    })
}

fn display_or_std(path: Option<&Path>, std_name: &str) -> String {
    path.map_or_else(|| std_name.to_string(), |p| p.display().to_string())
}

fn warn_rejected(line: &RejectedLine) {
    output::warning(line);
}

/// Services for an input command; rejected lines are warned about as they are read.
fn input_container(settings: Settings) -> ServiceContainer {
    ServiceContainer::new(settings).with_reject_handler(Arc::new(warn_rejected))
}

#[instrument(skip(cli))]
fn cmd_balance(cli: &Cli, input: &InputArgs, out: Option<&Path>, strict: bool) -> CliResult<()> {
    let mut settings = load_settings(cli, input)?;
    settings.balance.strict |= strict;
    let container = input_container(settings);

    let mut source = open_input(input)?;
    let mut sink = open_record_sink(out).map_err(|e| {
        InfraError::io(format!("create output {}", display_or_std(out, "stdout")), e)
    })?;

    let summary = container.balance.run(source.as_mut(), sink.as_mut())?;

    if container.settings.balance.strict && !summary.rejected.is_empty() {
        return Err(ApplicationError::RejectedLines {
            count: summary.rejected.len(),
        }
        .into());
    }
    Ok(())
}

#[instrument(skip(cli))]
fn cmd_check(cli: &Cli, input: &InputArgs) -> CliResult<()> {
    let container = input_container(load_settings(cli, input)?);
    let mut source = open_input(input)?;

    let computation = container.balance.compute(source.as_mut())?;

    if !computation.rejected.is_empty() {
        return Err(ApplicationError::RejectedLines {
            count: computation.rejected.len(),
        }
        .into());
    }
    output::success(&format!(
        "{} scales balanced from {} lines ({} traversal)",
        computation.graph.len(),
        computation.lines_read,
        container.settings.balance.traversal
    ));
    Ok(())
}

#[instrument(skip(cli))]
fn cmd_tree(cli: &Cli, input: &InputArgs) -> CliResult<()> {
    let container = input_container(load_settings(cli, input)?);
    let mut source = open_input(input)?;

    let (trees, _) = container.balance.trees(source.as_mut())?;
    for tree in trees {
        output::info(&tree);
    }
    Ok(())
}

fn cmd_config(cli: &Cli, command: &ConfigCommands) -> CliResult<()> {
    let dir = config_dir(cli)?;
    match command {
        ConfigCommands::Show => {
            let settings = Settings::load(Some(&dir))?;
            output::info(&settings.to_toml()?);
        }
        ConfigCommands::Path => {
            match global_config_path() {
                Some(path) => output::action("global", &exists_marker(&path)),
                None => output::action("global", "(no config directory on this platform)"),
            }
            output::action("local", &exists_marker(&local_config_path(&dir)));
            output::detail("environment: SCALEBAL_<SECTION>__<KEY>");
        }
        ConfigCommands::Init { global, force } => {
            let path = if *global {
                global_config_path().ok_or_else(|| {
                    CliError::Usage("no global config directory on this platform".into())
                })?
            } else {
                local_config_path(&dir)
            };
            if path.exists() && !force {
                return Err(CliError::Usage(format!(
                    "config already exists: {} (use --force to overwrite)",
                    path.display()
                )));
            }
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent).with_path_context("create directory", parent)?;
            }
            std::fs::write(&path, Settings::template())
                .with_path_context("write config", &path)?;
            output::action("Created", &path.display());
        }
    }
    Ok(())
}

fn exists_marker(path: &Path) -> String {
    if path.exists() {
        path.display().to_string()
    } else {
        format!("{} (not found)", path.display())
    }
}

fn cmd_completion(shell: Shell) -> CliResult<()> {
    let mut cmd = Cli::command();
    let name = cmd.get_name().to_string();
    generate(shell, &mut cmd, name, &mut io::stdout());
    Ok(())
}
