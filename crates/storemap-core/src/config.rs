use crate::app_config::{AppConfig, DataSource, Environment};
use crate::ConfigError;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Every setting has a default, so the only failure mode is a malformed value.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::net::SocketAddr;
    use std::path::PathBuf;

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let invalid = |var: &str, reason: String| ConfigError::InvalidEnvVar {
        var: var.to_string(),
        reason,
    };

    let parse_addr = |var: &str, default: &str| -> Result<SocketAddr, ConfigError> {
        or_default(var, default)
            .parse::<SocketAddr>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        or_default(var, default)
            .parse::<u64>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_usize = |var: &str, default: &str| -> Result<usize, ConfigError> {
        or_default(var, default)
            .parse::<usize>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let env = parse_environment(&or_default("STOREMAP_ENV", "development"))?;
    let bind_addr = parse_addr("STOREMAP_BIND_ADDR", "0.0.0.0:3000")?;
    let log_level = or_default("STOREMAP_LOG_LEVEL", "info");
    let data_source = DataSource::parse(&or_default("STOREMAP_DATA_SOURCE", "./data"));
    let stores_file = or_default("STOREMAP_STORES_FILE", "stores.csv");
    let brands_path = PathBuf::from(or_default("STOREMAP_BRANDS_PATH", "./config/brands.yaml"));
    let state_path = PathBuf::from(or_default("STOREMAP_STATE_PATH", "./state/viewer.json"));

    let state_ttl_days = match lookup("STOREMAP_STATE_TTL_DAYS") {
        Ok(raw) => Some(
            raw.parse::<u32>()
                .map_err(|e| invalid("STOREMAP_STATE_TTL_DAYS", e.to_string()))?,
        ),
        Err(_) => None,
    };

    let fetch_timeout_secs = parse_u64("STOREMAP_FETCH_TIMEOUT_SECS", "30")?;
    let user_agent = or_default("STOREMAP_USER_AGENT", "storemap/0.1 (store-map)");

    let offset_step = or_default("STOREMAP_OFFSET_STEP", "0.00005")
        .parse::<f64>()
        .map_err(|e| invalid("STOREMAP_OFFSET_STEP", e.to_string()))?;
    if !offset_step.is_finite() || offset_step < 0.0 {
        return Err(invalid(
            "STOREMAP_OFFSET_STEP",
            format!("must be a finite, non-negative number of degrees (got {offset_step})"),
        ));
    }

    let max_stack_depth = parse_usize("STOREMAP_MAX_STACK_DEPTH", "20000")?;
    if max_stack_depth == 0 {
        return Err(invalid(
            "STOREMAP_MAX_STACK_DEPTH",
            "must be at least 1".to_string(),
        ));
    }

    Ok(AppConfig {
        env,
        bind_addr,
        log_level,
        data_source,
        stores_file,
        brands_path,
        state_path,
        state_ttl_days,
        fetch_timeout_secs,
        user_agent,
        offset_step,
        max_stack_depth,
    })
}

/// Parse a string into an `Environment` variant.
fn parse_environment(s: &str) -> Result<Environment, ConfigError> {
    match s {
        "development" => Ok(Environment::Development),
        "test" => Ok(Environment::Test),
        "production" => Ok(Environment::Production),
        other => Err(ConfigError::InvalidEnvVar {
            var: "STOREMAP_ENV".to_string(),
            reason: format!("unknown environment '{other}'"),
        }),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
