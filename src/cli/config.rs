//! Config command handlers

use crate::cli::ConfigInitArgs;
use crate::config::GenesisConfig;
use std::fs;
use std::path::Path;

const EXAMPLE_CONFIG: &str = include_str!("../../genesis.example.toml");

/// Load `path` if it exists, otherwise defaults, then apply `GENESIS_*`
/// environment overrides and validate.
pub fn load_config(path: &Path) -> Result<GenesisConfig, Box<dyn std::error::Error>> {
    let config = if path.exists() {
        GenesisConfig::load(Some(path))?
    } else {
        tracing::debug!(path = %path.display(), "Config file not found, using defaults");
        GenesisConfig::default()
    };
    let config = config.with_env_overrides();
    config.validate()?;
    Ok(config)
}

/// Handle `genesis config init` command
pub fn handle_config_init(args: &ConfigInitArgs) -> Result<(), Box<dyn std::error::Error>> {
    if args.output.exists() && !args.force {
        return Err(format!(
            "File already exists: {}. Use --force to overwrite.",
            args.output.display()
        )
        .into());
    }

    fs::write(&args.output, EXAMPLE_CONFIG)?;

    println!("✓ Configuration file created: {}", args.output.display());
    println!("  Set OPENAI_API_KEY, ANTHROPIC_API_KEY and GOOGLE_AI_API_KEY before serving.");

    Ok(())
}
