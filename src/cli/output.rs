//! Output formatting helpers for CLI commands

use crate::circuit_breaker::CircuitState;
use crate::registry::ProviderStatus;
use colored::Colorize;
use comfy_table::{presets::UTF8_FULL, Cell, ContentArrangement, Table};
use serde_json::json;
use std::collections::BTreeMap;

/// Format provider status as a table, in priority order.
pub fn format_providers_table(statuses: &BTreeMap<String, ProviderStatus>) -> String {
    let mut rows: Vec<&ProviderStatus> = statuses.values().collect();
    rows.sort_by_key(|s| (s.priority, s.id.clone()));

    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec![
        "Provider", "Kind", "Priority", "Models", "Credentials", "Circuit", "Reliability",
    ]);

    for s in rows {
        let circuit = match (s.is_active, s.circuit_state) {
            (false, _) => "Disabled".dimmed().to_string(),
            (true, CircuitState::Closed) => "Closed".green().to_string(),
            (true, CircuitState::HalfOpen) => "Half-open".yellow().to_string(),
            (true, CircuitState::Open) => "Open".red().to_string(),
        };
        let credentials = if s.has_credentials {
            "yes".green().to_string()
        } else {
            "missing".red().to_string()
        };

        table.add_row(vec![
            Cell::new(&s.id),
            Cell::new(s.kind),
            Cell::new(s.priority),
            Cell::new(s.models.join(", ")),
            Cell::new(credentials),
            Cell::new(circuit),
            Cell::new(format!("{:.2}", s.reliability)),
        ]);
    }

    table.to_string()
}

/// Format provider status as JSON
pub fn format_providers_json(
    statuses: &BTreeMap<String, ProviderStatus>,
) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(&json!({ "providers": statuses }))
}
