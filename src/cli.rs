use std::path::PathBuf;
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{generate, Shell};

use crate::targets::TargetValue;
use crate::version::RawVersion;

/// Decide which JavaScript transforms and polyfills your targets need
#[derive(Parser)]
#[command(
    name = "presetenv",
    version,
    about = "Decide which JavaScript transforms and polyfills your targets need",
    long_about = "presetenv resolves target environments (browsers, Node.js, Electron, browser queries) into minimum versions and works out which syntax plugins and built-in polyfills must be applied to support all of them."
)]
pub struct Cli {
    /// Configuration file path (TOML, or JSON with a .json extension)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Resolve targets and print them as JSON
    Targets {
        /// Override a target, e.g. `chrome=49`, `node=true`, `browsers=last 2 versions`
        #[arg(short, long = "target", value_name = "KEY=VALUE", value_parser = parse_target_override)]
        targets: Vec<(String, TargetValue)>,
    },

    /// Check whether a single plugin or built-in is required
    Check {
        /// Plugin or built-in name
        #[arg(value_name = "NAME")]
        name: String,

        /// Override a target, e.g. `chrome=49`
        #[arg(short, long = "target", value_name = "KEY=VALUE", value_parser = parse_target_override)]
        targets: Vec<(String, TargetValue)>,
    },

    /// Select the plugins and built-ins for the configured targets
    Plan {
        /// Override a target, e.g. `chrome=49`
        #[arg(short, long = "target", value_name = "KEY=VALUE", value_parser = parse_target_override)]
        targets: Vec<(String, TargetValue)>,

        /// Also select built-in polyfills
        #[arg(long)]
        use_built_ins: bool,

        /// Log targets and the reason for every plugin
        #[arg(long)]
        debug: bool,

        /// Print the plan as JSON
        #[arg(long)]
        json: bool,
    },

    /// Initialize presetenv configuration
    Init {
        /// Output directory for configuration
        #[arg(short, long, default_value = ".")]
        output_dir: PathBuf,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Parse `KEY=VALUE`. `true`/`false` become flags, everything else is
/// passed on as text and normalized later.
pub fn parse_target_override(input: &str) -> Result<(String, TargetValue), String> {
    let (key, value) = input
        .split_once('=')
        .ok_or_else(|| format!("expected KEY=VALUE, got `{}`", input))?;

    let key = key.trim();
    if key.is_empty() {
        return Err(format!("missing target name in `{}`", input));
    }

    let value = match value.trim() {
        "true" => TargetValue::Flag(true),
        "false" => TargetValue::Flag(false),
        other => TargetValue::Version(RawVersion::Text(other.to_string())),
    };

    Ok((key.to_string(), value))
}

pub fn generate_completions(shell: Shell) {
    let mut cmd = Cli::command();
    let bin_name = cmd.get_name().to_string();
    generate(shell, &mut cmd, bin_name, &mut std::io::stdout());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verify_cli() {
        Cli::command().debug_assert()
    }

    #[test]
    fn test_parse_target_override() {
        assert_eq!(
            parse_target_override("chrome=49").unwrap(),
            ("chrome".to_string(), TargetValue::from("49"))
        );
        assert_eq!(
            parse_target_override("node=true").unwrap(),
            ("node".to_string(), TargetValue::Flag(true))
        );
        assert_eq!(
            parse_target_override("browsers=chrome > 50").unwrap(),
            ("browsers".to_string(), TargetValue::from("chrome > 50"))
        );
        assert!(parse_target_override("chrome").is_err());
        assert!(parse_target_override("=49").is_err());
    }

    #[test]
    fn test_parse_plan_arguments() {
        let cli = Cli::parse_from(["presetenv", "plan", "-t", "ie=11", "--use-built-ins", "--json"]);
        match cli.command {
            Commands::Plan { targets, use_built_ins, json, debug } => {
                assert_eq!(targets.len(), 1);
                assert!(use_built_ins);
                assert!(json);
                assert!(!debug);
            }
            _ => panic!("expected plan command"),
        }
    }
}
