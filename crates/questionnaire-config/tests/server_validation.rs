//! Server config validation tests for questionnaire-config.
// crates/questionnaire-config/tests/server_validation.rs
// =============================================================================
// Module: Server Config Validation Tests
// Description: Validate bind, body limit, prefix, and CORS constraints.
// Purpose: Ensure HTTP server settings fail closed and enforce limits.
// =============================================================================

use questionnaire_config::MAX_BODY_BYTES_LIMIT;
use questionnaire_config::MAX_CORS_ORIGINS;

mod common;

use common::TestResult;
use common::assert_invalid;

#[test]
fn bind_must_be_socket_address() -> TestResult {
    let mut config = common::minimal_config().map_err(|err| err.to_string())?;
    config.server.bind = "localhost".to_string();
    assert_invalid(config.validate(), "server.bind must be a socket address")?;
    Ok(())
}

#[test]
fn bind_accepts_ipv6_loopback() -> TestResult {
    let mut config = common::minimal_config().map_err(|err| err.to_string())?;
    config.server.bind = "[::1]:9000".to_string();
    let addr = config.server.bind_addr().map_err(|err| err.to_string())?;
    if addr.port() != 9000 {
        return Err(format!("unexpected port {}", addr.port()));
    }
    config.validate().map_err(|err| err.to_string())
}

#[test]
fn zero_body_limit_rejected() -> TestResult {
    let mut config = common::minimal_config().map_err(|err| err.to_string())?;
    config.server.max_body_bytes = 0;
    assert_invalid(config.validate(), "max_body_bytes must be greater than zero")?;
    Ok(())
}

#[test]
fn body_limit_upper_bound_enforced() -> TestResult {
    let mut config = common::minimal_config().map_err(|err| err.to_string())?;
    config.server.max_body_bytes = MAX_BODY_BYTES_LIMIT;
    config.validate().map_err(|err| err.to_string())?;
    config.server.max_body_bytes = MAX_BODY_BYTES_LIMIT + 1;
    assert_invalid(config.validate(), "server.max_body_bytes exceeds limit")?;
    Ok(())
}

#[test]
fn api_prefix_requires_leading_slash() -> TestResult {
    let config = common::config_from_toml("[server]\napi_prefix = \"api\"\n")
        .map_err(|err| err.to_string())?;
    assert_invalid(config.validate(), "must start with '/'")?;
    Ok(())
}

#[test]
fn api_prefix_rejects_trailing_slash() -> TestResult {
    let config = common::config_from_toml("[server]\napi_prefix = \"/api/\"\n")
        .map_err(|err| err.to_string())?;
    assert_invalid(config.validate(), "must not end with '/'")?;
    Ok(())
}

#[test]
fn cors_rejects_blank_origin() -> TestResult {
    let config =
        common::config_from_toml("[server.cors]\nallowed_origins = [\"https://a.example\", \" \"]\n")
            .map_err(|err| err.to_string())?;
    assert_invalid(config.validate(), "allowed_origins entries must be non-empty")?;
    Ok(())
}

#[test]
fn cors_rejects_wildcard_entry() -> TestResult {
    let config = common::config_from_toml("[server.cors]\nallowed_origins = [\"*\"]\n")
        .map_err(|err| err.to_string())?;
    assert_invalid(config.validate(), "leave empty to allow any")?;
    Ok(())
}

#[test]
fn cors_rejects_too_many_origins() -> TestResult {
    let mut config = common::minimal_config().map_err(|err| err.to_string())?;
    config.server.cors.allowed_origins =
        (0 ..= MAX_CORS_ORIGINS).map(|index| format!("https://{index}.example")).collect();
    assert_invalid(config.validate(), "allowed_origins exceeds max entries")?;
    Ok(())
}

#[test]
fn cors_origins_disable_any_origin() -> TestResult {
    let config = common::config_from_toml(
        "[server.cors]\nallowed_origins = [\"https://a.example\"]\nmax_age_secs = 30\n",
    )
    .map_err(|err| err.to_string())?;
    config.validate().map_err(|err| err.to_string())?;
    if config.server.cors.allows_any_origin() {
        return Err("explicit origins should not allow any origin".to_string());
    }
    if config.server.cors.max_age_secs != 30 {
        return Err("max_age_secs not applied".to_string());
    }
    Ok(())
}

#[test]
fn audit_path_must_be_non_empty() -> TestResult {
    let config = common::config_from_toml("[audit]\npath = \"  \"\n")
        .map_err(|err| err.to_string())?;
    assert_invalid(config.validate(), "audit.path must be non-empty")?;
    Ok(())
}

#[test]
fn store_seed_flag_parses() -> TestResult {
    let config = common::config_from_toml("[store]\nseed_demo = true\n")
        .map_err(|err| err.to_string())?;
    if !config.store.seed_demo {
        return Err("seed_demo not applied".to_string());
    }
    Ok(())
}
