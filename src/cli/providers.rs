//! Providers command implementation

use crate::cli::output::{format_providers_json, format_providers_table};
use crate::cli::{load_config, ProvidersArgs};
use crate::registry::ProviderRegistry;

/// Handle `genesis providers` command
///
/// Reports the configured table as this process sees it: credentials are
/// read from the environment, breakers start closed.
pub fn handle_providers(args: &ProvidersArgs) -> Result<String, Box<dyn std::error::Error>> {
    let config = load_config(&args.config)?;
    let registry = ProviderRegistry::new(
        config.providers.clone(),
        config.circuit_breaker.clone(),
        config.streaming.provider_timeout(),
    );
    let statuses = registry.statuses();

    if args.json {
        Ok(format_providers_json(&statuses)?)
    } else {
        Ok(format_providers_table(&statuses))
    }
}
