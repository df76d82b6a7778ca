//! Structured logging helpers
//!
//! Filter construction for the `tracing` subscriber, request id generation
//! and privacy-safe prompt previews.

pub mod fields;
pub mod request_id;

pub use fields::truncate_prompt;
pub use request_id::generate_request_id;

/// Build filter directives string from LoggingConfig
///
/// Constructs a tracing filter string that includes the base log level
/// and one `genesis::<module>=<level>` directive per component override.
///
/// # Examples
///
/// ```
/// use genesis::config::logging::{LogFormat, LoggingConfig};
/// use genesis::logging::build_filter_directives;
///
/// let mut config = LoggingConfig::default();
/// config.format = LogFormat::Json;
/// config
///     .component_levels
///     .insert("recovery".to_string(), "debug".to_string());
///
/// assert_eq!(build_filter_directives(&config), "info,genesis::recovery=debug");
/// ```
pub fn build_filter_directives(config: &crate::config::LoggingConfig) -> String {
    config
        .component_levels
        .iter()
        .fold(config.level.clone(), |mut filter, (component, level)| {
            filter.push_str(&format!(",genesis::{}={}", component, level));
            filter
        })
}
