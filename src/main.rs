use anyhow::Result;
use clap::Parser;
use colored::Colorize;
use tracing::{debug, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use presetenv::cli::{self, Cli, Commands};
use presetenv::targets::TargetValue;
use presetenv::{Config, Preset, PresetResult};

fn main() -> Result<()> {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Initialize tracing
    init_tracing(cli.verbose)?;

    // Load configuration
    let mut config = Config::load(cli.config.as_deref())?;

    debug!("Starting presetenv v{}", env!("CARGO_PKG_VERSION"));

    // Handle commands
    match cli.command {
        Commands::Targets { targets } => {
            apply_overrides(&mut config, targets);
            let preset = Preset::new()?;

            match preset.resolver().resolve(&config.targets) {
                Ok(targets) => {
                    println!("{}", serde_json::to_string_pretty(&targets)?);
                }
                Err(e) => {
                    eprintln!("❌ Target resolution failed: {}", e);
                    std::process::exit(1);
                }
            }
        }

        Commands::Check { name, targets } => {
            apply_overrides(&mut config, targets);
            let preset = Preset::new()?;

            let required = preset
                .resolver()
                .resolve(&config.targets)
                .and_then(|targets| preset.is_required(&name, &targets));

            match required {
                Ok(true) => println!("{} {}", name, "required".yellow()),
                Ok(false) => println!("{} {}", name, "not required".green()),
                Err(e) => {
                    eprintln!("❌ Check failed: {}", e);
                    std::process::exit(1);
                }
            }
        }

        Commands::Plan {
            targets,
            use_built_ins,
            debug,
            json,
        } => {
            apply_overrides(&mut config, targets);
            config.use_built_ins |= use_built_ins;
            config.debug |= debug;

            let preset = Preset::new()?;
            match preset.build(&config) {
                Ok(result) => {
                    if json {
                        println!("{}", serde_json::to_string_pretty(&result)?);
                    } else {
                        print_summary(&result)?;
                    }
                }
                Err(e) => {
                    eprintln!("❌ Planning failed: {}", e);
                    std::process::exit(1);
                }
            }
        }

        Commands::Init { output_dir } => {
            let path = Config::init(&output_dir)?;
            info!("Initialized presetenv configuration in {}", path.display());
        }

        Commands::Completions { shell } => {
            cli::generate_completions(shell);
        }
    }

    Ok(())
}

/// Command line targets replace configured ones with the same key
fn apply_overrides(config: &mut Config, overrides: Vec<(String, TargetValue)>) {
    for (key, value) in overrides {
        config.targets.insert(key, Some(value));
    }
}

fn print_summary(result: &PresetResult) -> Result<()> {
    println!("{} {}", "Targets:".bold(), serde_json::to_string(&result.targets)?);

    match result.modules {
        Some(modules) => println!("{} {}", "Modules:".bold(), modules),
        None => println!("{} false", "Modules:".bold()),
    }

    println!("{} ({})", "Plugins".bold(), result.plugins.len());
    for plugin in &result.plugins {
        println!("  {}", plugin.cyan());
    }

    if !result.built_ins.is_empty() {
        println!("{} ({})", "Built-ins".bold(), result.built_ins.len());
        for built_in in &result.built_ins {
            println!("  {}", built_in.magenta());
        }
    }

    Ok(())
}

fn init_tracing(verbose: bool) -> Result<()> {
    let default_filter = if verbose { "presetenv=debug" } else { "presetenv=info" };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_filter));

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .with_thread_ids(false)
                .with_file(false)
                .with_line_number(false)
        )
        .with(filter)
        .init();

    Ok(())
}
