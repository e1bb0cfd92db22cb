// crates/questionnaire-config/src/examples.rs
// ============================================================================
// Module: Config Examples
// Description: Canonical example configuration payload.
// Purpose: Deterministic example for docs and the CLI.
// Dependencies: std
// ============================================================================

//! ## Overview
//! Canonical example for the questionnaire configuration. The output is
//! deterministic and always passes validation.

/// Returns a canonical example `questionnaire.toml` configuration.
#[must_use]
pub fn config_toml_example() -> String {
    String::from(
        r#"[server]
bind = "127.0.0.1:8080"
max_body_bytes = 1048576
api_prefix = "/api/v1"

[server.cors]
allowed_origins = ["http://localhost:5173"]
max_age_secs = 600

[audit]
enabled = true
# path = "questionnaire-audit.jsonl"

[store]
seed_demo = false
"#,
    )
}
