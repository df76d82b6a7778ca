//! CLI module for Genesis
//!
//! Command-line interface definitions and handlers.
//!
//! # Commands
//!
//! - `serve` - Start the HTTP server
//! - `ask` - Route one prompt and stream the answer to stdout
//! - `providers` - Show provider status
//! - `config` - Configuration utilities (init)
//! - `completions` - Generate shell completions
//!
//! # Example
//!
//! ```bash
//! # Start server with default config
//! genesis serve
//!
//! # Ask through the cultural route
//! genesis ask --type cultural "What does the surname Okafor mean?"
//!
//! # Generate shell completions
//! genesis completions bash > ~/.bash_completion.d/genesis
//! ```

pub mod ask;
pub mod completions;
pub mod config;
pub mod output;
pub mod providers;
pub mod serve;

pub use ask::handle_ask;
pub use completions::handle_completions;
pub use config::{handle_config_init, load_config};
pub use providers::handle_providers;

use crate::routing::RequestType;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Default configuration file name.
pub const DEFAULT_CONFIG: &str = "genesis.toml";

/// Genesis - multi-provider AI router
#[derive(Parser, Debug)]
#[command(
    name = "genesis",
    version,
    about = "Multi-provider AI router with circuit breaking and fallback responses"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the HTTP server
    Serve(ServeArgs),
    /// Route a single prompt and print the answer
    Ask(AskArgs),
    /// Show provider status
    Providers(ProvidersArgs),
    /// Configuration utilities
    #[command(subcommand)]
    Config(ConfigCommands),
    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[derive(Args, Debug)]
pub struct ServeArgs {
    /// Path to configuration file
    #[arg(short, long, default_value = DEFAULT_CONFIG)]
    pub config: PathBuf,

    /// Override server port
    #[arg(short, long, env = "GENESIS_PORT")]
    pub port: Option<u16>,

    /// Override server host
    #[arg(short = 'H', long, env = "GENESIS_HOST")]
    pub host: Option<String>,

    /// Set log level (trace, debug, info, warn, error)
    #[arg(short, long, env = "GENESIS_LOG_LEVEL")]
    pub log_level: Option<String>,
}

#[derive(Args, Debug)]
pub struct AskArgs {
    /// Prompt text
    pub prompt: String,

    /// Request type (chat, analysis, generation, coding, business, cultural,
    /// creative, technical, research)
    #[arg(short = 't', long = "type", default_value = "chat")]
    pub request_type: RequestType,

    /// System/context text sent ahead of the prompt
    #[arg(long)]
    pub context: Option<String>,

    /// Output token cap
    #[arg(long)]
    pub max_tokens: Option<u32>,

    /// Sampling temperature (0.0 - 2.0)
    #[arg(long)]
    pub temperature: Option<f32>,

    /// Print each chunk as a JSON line instead of plain text
    #[arg(long)]
    pub json: bool,

    /// Path to configuration file
    #[arg(short, long, default_value = DEFAULT_CONFIG)]
    pub config: PathBuf,
}

#[derive(Args, Debug)]
pub struct ProvidersArgs {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,

    /// Path to configuration file
    #[arg(short, long, default_value = DEFAULT_CONFIG)]
    pub config: PathBuf,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Initialize a new configuration file
    Init(ConfigInitArgs),
}

#[derive(Args, Debug)]
pub struct ConfigInitArgs {
    /// Output file path
    #[arg(short, long, default_value = DEFAULT_CONFIG)]
    pub output: PathBuf,

    /// Overwrite existing file
    #[arg(short, long)]
    pub force: bool,
}

#[derive(Args, Debug)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: clap_complete::Shell,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn test_cli_parse_serve_defaults() {
        let cli = Cli::try_parse_from(["genesis", "serve"]).unwrap();
        match cli.command {
            Commands::Serve(args) => {
                assert_eq!(args.config, PathBuf::from(DEFAULT_CONFIG));
                assert!(args.host.is_none());
            }
            _ => panic!("Expected Serve command"),
        }
    }

    #[test]
    fn test_cli_parse_serve_with_port() {
        let cli = Cli::try_parse_from(["genesis", "serve", "-p", "9000"]).unwrap();
        match cli.command {
            Commands::Serve(args) => assert_eq!(args.port, Some(9000)),
            _ => panic!("Expected Serve command"),
        }
    }

    #[test]
    fn test_cli_parse_ask_with_type() {
        let cli =
            Cli::try_parse_from(["genesis", "ask", "--type", "Cultural", "Name origins?"]).unwrap();
        match cli.command {
            Commands::Ask(args) => {
                assert_eq!(args.request_type, RequestType::Cultural);
                assert_eq!(args.prompt, "Name origins?");
                assert!(!args.json);
            }
            _ => panic!("Expected Ask command"),
        }
    }

    #[test]
    fn test_cli_parse_ask_rejects_unknown_type() {
        assert!(Cli::try_parse_from(["genesis", "ask", "-t", "poetry", "hi"]).is_err());
    }

    #[test]
    fn test_cli_parse_providers_json() {
        let cli = Cli::try_parse_from(["genesis", "providers", "--json"]).unwrap();
        match cli.command {
            Commands::Providers(args) => assert!(args.json),
            _ => panic!("Expected Providers command"),
        }
    }

    #[test]
    fn test_cli_parse_config_init() {
        let cli = Cli::try_parse_from(["genesis", "config", "init", "-o", "x.toml"]).unwrap();
        match cli.command {
            Commands::Config(ConfigCommands::Init(args)) => {
                assert_eq!(args.output, PathBuf::from("x.toml"));
                assert!(!args.force);
            }
            _ => panic!("Expected Config Init command"),
        }
    }
}
