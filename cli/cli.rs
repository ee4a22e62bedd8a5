mod cli_args;
mod commands;
mod output;

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser};
use colored::*;
use std::env;
use std::path::{Component, Path, PathBuf};
use std::process;

use cli_args::{Cli, Commands, IgnoreOpts, ProjectConfigOpts};
use dirscribe_core::{AppError, Config, MatchEngine, Pattern, RuleOrigin, RuleSet};

fn main() {
    let cli_args = Cli::parse();

    setup_logging(cli_args.quiet, cli_args.verbose);

    let quiet = cli_args.quiet;

    log::debug!("CLI args parsed: {:?}", cli_args);

    let exit_code = match run_app(cli_args, quiet) {
        Ok(_) => {
            log::info!("Application finished successfully.");
            0
        }
        Err(e) => {
            let core_err = e.downcast_ref::<AppError>();
            let exit_code = match core_err {
                Some(AppError::Config(_)) => 1,
                Some(AppError::TomlParse(_)) => 1,
                Some(AppError::SizeParse(_)) => 1,
                Some(AppError::Io(_)) => 2,
                Some(AppError::DirRead { .. }) => 2,
                Some(AppError::WalkDir(_)) => 2,
                Some(AppError::Glob(_)) => 2,
                Some(AppError::InvalidArgument(_)) => 5,
                Some(AppError::JsonSerialize(_)) => 6,
                Some(AppError::YamlError(_)) => 6,
                Some(_) => 1,
                None => 1,
            };

            // Critical config/argument errors are printed even when quiet.
            if !quiet || exit_code == 1 || exit_code == 5 {
                eprintln!("{} {:#}", "Error:".red().bold(), e);
            } else {
                log::error!("Application failed: {:#}", e);
            }

            exit_code
        }
    };
    log::debug!("Exiting with code {}", exit_code);
    process::exit(exit_code);
}

fn setup_logging(quiet: bool, verbose: u8) {
    let log_level = if quiet {
        log::LevelFilter::Off
    } else {
        match verbose {
            0 => log::LevelFilter::Warn,
            1 => log::LevelFilter::Info,
            2 => log::LevelFilter::Debug,
            _ => log::LevelFilter::Trace,
        }
    };
    env_logger::Builder::new()
        .filter_level(log_level)
        .format_timestamp(None)
        .init();
    log::trace!("Logger initialized with level: {:?}", log_level);
}

fn run_app(cli: Cli, quiet: bool) -> Result<()> {
    match cli.command {
        None => {
            Cli::command().print_help()?;
        }
        Some(command) => match command {
            Commands::Concat(args) => {
                log::debug!("Executing 'concat' command...");
                commands::concat::handle_concat_command(&args, quiet)?;
            }
            Commands::Tree(args) => {
                log::debug!("Executing 'tree' command...");
                commands::scan::handle_scan_command(&args, commands::scan::ScanMode::Tree, quiet)?;
            }
            Commands::Contents(args) => {
                log::debug!("Executing 'contents' command...");
                commands::scan::handle_scan_command(
                    &args,
                    commands::scan::ScanMode::Contents,
                    quiet,
                )?;
            }
            Commands::Full(args) => {
                log::debug!("Executing 'full' command...");
                commands::scan::handle_scan_command(&args, commands::scan::ScanMode::Full, quiet)?;
            }
            Commands::Files(args) => {
                log::debug!("Executing 'files' command...");
                commands::files::handle_files_command(&args)?;
            }
            Commands::Rules(args) => {
                log::debug!("Executing 'rules' command...");
                commands::rules::handle_rules_command(&args)?;
            }
            Commands::Check(args) => {
                log::debug!("Executing 'check' command...");
                commands::check::handle_check_command(&args)?;
            }
        },
    }
    Ok(())
}

fn merge_config_with_cli_overrides(mut config: Config, ignore: &IgnoreOpts) -> Config {
    log::trace!("Applying CLI overrides to config...");

    if ignore.disable_gitignore {
        config.general.use_gitignore = false;
    }
    if ignore.enable_gitignore {
        config.general.use_gitignore = true;
    }
    if ignore.disable_default_ignores {
        config.general.enable_default_ignores = false;
    }
    if ignore.enable_default_ignores {
        config.general.enable_default_ignores = true;
    }
    if let Some(size) = &ignore.max_file_size {
        config.general.max_file_size = Some(size.clone());
    }

    log::trace!("Config after CLI overrides: {:?}", config);
    config
}

pub fn load_config_for_command(
    project_root: &Path,
    project_opts: &ProjectConfigOpts,
    ignore: &IgnoreOpts,
) -> Result<Config> {
    let config_path = Config::resolve_config_path(
        project_root,
        project_opts.config_file.as_ref(),
        project_opts.no_config_file,
    )
    .context("Failed to resolve configuration path")?;

    let config = match &config_path {
        Some(path) => Config::load_from_path(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => Config::default(),
    };

    Ok(merge_config_with_cli_overrides(config, ignore))
}

/// Everything a filtered command needs: the resolved root, the effective
/// rules and the compiled engine.
pub struct ScanContext {
    pub project_root: PathBuf,
    pub rule_set: RuleSet,
    pub engine: MatchEngine,
}

pub fn prepare_scan(
    project_opts: &ProjectConfigOpts,
    ignore: &IgnoreOpts,
    output_path: Option<&Path>,
) -> Result<ScanContext> {
    let project_root = Config::determine_project_root(project_opts.project_root.as_ref())
        .context("Failed to determine project root")?;
    log::info!("Project root determined: {}", project_root.display());

    let config = load_config_for_command(&project_root, project_opts, ignore)?;

    let mut extra = RuleSet::new();
    extra.extend_from(&ignore.exclude, RuleOrigin::CommandLine);
    if let Some(rule) = output_path.and_then(|p| output_exclusion_rule(&project_root, p)) {
        log::debug!("Excluding output file from its own scan: {}", rule);
        extra.insert(rule, RuleOrigin::CommandLine);
    }

    let (rule_set, engine) = config
        .build_engine_with(&project_root, &extra)
        .context("Failed to build exclusion rules")?;
    log::debug!(
        "Compiled {} of {} rules (max file size {} bytes).",
        engine.rule_count(),
        rule_set.len(),
        engine.max_file_size()
    );

    Ok(ScanContext {
        project_root,
        rule_set,
        engine,
    })
}

/// Anchored rule for `output_path` when it lies inside `project_root`.
fn output_exclusion_rule(project_root: &Path, output_path: &Path) -> Option<String> {
    let absolute = absolutize(output_path)?;
    let relative = absolute.strip_prefix(project_root).ok()?;
    if relative.as_os_str().is_empty() {
        return None;
    }
    Some(Pattern::exact_path_rule(relative))
}

/// Absolute form of `path`, resolved through its longest existing ancestor so
/// it can be compared with the canonical project root before the file (or
/// any of its parent directories) exists.
pub fn absolutize(path: &Path) -> Option<PathBuf> {
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        env::current_dir().ok()?.join(path)
    };

    let mut missing = Vec::new();
    let mut existing = absolute.as_path();
    let mut resolved = loop {
        if let Ok(canonical) = existing.canonicalize() {
            break canonical;
        }
        let mut components = existing.components();
        missing.push(components.next_back()?);
        existing = components.as_path();
    };

    for component in missing.into_iter().rev() {
        match component {
            Component::ParentDir => {
                resolved.pop();
            }
            Component::Normal(name) => resolved.push(name),
            _ => {}
        }
    }
    Some(resolved)
}
