//! CLI command definitions

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// CLI arguments for a2a-bridge
#[derive(Parser, Debug)]
#[command(name = "a2a-bridge")]
#[command(author, version, about = "Expose A2A mesh agents as MCP tools")]
#[command(long_about = r#"
a2a-bridge lets an MCP host discover, list and message A2A mesh agents
through three tools: a2a_discover, a2a_list_agents and a2a_send.

Every call passes trust-zone and rate-limit checks and comes back with
etiquette hints for the calling model.

Configuration files are loaded from (in priority order):
1. A2A_BRIDGE_* environment variables
2. --config <path>         Explicit config file
3. ./a2a-bridge.toml       Project-level config
4. ~/.config/a2a-bridge/config.toml   Global config

Example:
  a2a-bridge serve --caller claude-desktop
  a2a-bridge serve --interaction-log ~/.local/state/a2a-bridge/interactions.jsonl
  a2a-bridge tools
"#)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Verbosity level (-v = info, -vv = debug, -vvv = trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to configuration file
    #[arg(long, value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,

    /// Disable loading of configuration files
    #[arg(long, global = true)]
    pub no_config: bool,

    /// Show configuration file locations and exit
    #[arg(long)]
    pub show_config: bool,

    /// Also write diagnostic logs to a daily rolling file in this directory
    #[arg(long, value_name = "DIR", global = true)]
    pub log_dir: Option<PathBuf>,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Serve the bridge tools over stdio (default)
    Serve(ServeArgs),
    /// Print the tool definitions as JSON and exit
    Tools,
}

#[derive(clap::Args, Debug, Clone)]
pub struct ServeArgs {
    /// Caller identity attached to every invocation from this host
    #[arg(long, value_name = "ID", default_value = "host")]
    pub caller: String,

    /// Append one JSON line per tool call to this file
    #[arg(long, value_name = "PATH")]
    pub interaction_log: Option<PathBuf>,
}

impl Default for ServeArgs {
    fn default() -> Self {
        Self {
            caller: "host".to_string(),
            interaction_log: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_subcommand_defaults_to_serve() {
        let cli = Cli::try_parse_from(["a2a-bridge"]).unwrap();
        assert!(cli.command.is_none());
        assert_eq!(cli.verbose, 0);
    }

    #[test]
    fn test_serve_flags() {
        let cli = Cli::try_parse_from([
            "a2a-bridge",
            "serve",
            "--caller",
            "desktop",
            "--interaction-log",
            "/tmp/bridge.jsonl",
            "-vv",
        ])
        .unwrap();

        let Some(Command::Serve(args)) = cli.command else {
            panic!("expected serve");
        };
        assert_eq!(args.caller, "desktop");
        assert_eq!(args.interaction_log, Some(PathBuf::from("/tmp/bridge.jsonl")));
        assert_eq!(cli.verbose, 2);
    }

    #[test]
    fn test_global_config_flags() {
        let cli =
            Cli::try_parse_from(["a2a-bridge", "tools", "--no-config", "--config", "x.toml"])
                .unwrap();
        assert!(matches!(cli.command, Some(Command::Tools)));
        assert!(cli.no_config);
        assert_eq!(cli.config, Some(PathBuf::from("x.toml")));
    }
}
