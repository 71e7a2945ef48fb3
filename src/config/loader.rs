//! Configuration loader with TOML parsing and environment variable overrides

use super::schema::SyncConfig;
use super::secret::secret_string;
use crate::domain::errors::SyncError;
use crate::domain::result::Result;
use regex::Regex;
use std::fs;
use std::path::Path;

/// Prefix for environment overrides
pub const ENV_PREFIX: &str = "WARD_SYNC";

/// Loads configuration from a TOML file
///
/// This function:
/// 1. Reads the TOML file
/// 2. Substitutes `${VAR}` placeholders from the environment
/// 3. Parses the TOML into [`SyncConfig`]
/// 4. Applies `WARD_SYNC_*` environment overrides
/// 5. Validates the result
///
/// # Errors
///
/// Every failure is reported as [`SyncError::Configuration`].
///
/// # Examples
///
/// ```no_run
/// use ward_sync::config::loader::load_config;
///
/// let config = load_config("ward-sync.toml").expect("Failed to load config");
/// ```
pub fn load_config(path: impl AsRef<Path>) -> Result<SyncConfig> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(SyncError::Configuration(format!(
            "Configuration file not found: {}",
            path.display()
        )));
    }

    let contents = fs::read_to_string(path).map_err(|e| {
        SyncError::Configuration(format!(
            "Failed to read configuration file {}: {}",
            path.display(),
            e
        ))
    })?;

    let contents = substitute_env_vars(&contents)?;

    let mut config: SyncConfig = toml::from_str(&contents)
        .map_err(|e| SyncError::Configuration(format!("Failed to parse TOML: {e}")))?;

    apply_env_overrides(&mut config)?;

    config
        .validate()
        .map_err(|e| SyncError::Configuration(format!("Configuration validation failed: {e}")))?;

    Ok(config)
}

/// Substitutes environment variables in the format `${VAR_NAME}`
///
/// Comment lines are copied untouched.
///
/// # Errors
///
/// Lists every referenced variable that is not set.
fn substitute_env_vars(input: &str) -> Result<String> {
    let re = Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}")
        .map_err(|e| SyncError::Configuration(format!("Invalid substitution pattern: {e}")))?;
    let mut result = String::with_capacity(input.len());
    let mut missing_vars: Vec<String> = Vec::new();

    for line in input.lines() {
        if line.trim_start().starts_with('#') {
            result.push_str(line);
            result.push('\n');
            continue;
        }

        let processed = re.replace_all(line, |caps: &regex::Captures<'_>| {
            let var_name = &caps[1];
            match std::env::var(var_name) {
                Ok(value) => value,
                Err(_) => {
                    if !missing_vars.iter().any(|v| v == var_name) {
                        missing_vars.push(var_name.to_string());
                    }
                    String::new()
                }
            }
        });
        result.push_str(&processed);
        result.push('\n');
    }

    if !missing_vars.is_empty() {
        return Err(SyncError::Configuration(format!(
            "Missing required environment variables: {}",
            missing_vars.join(", ")
        )));
    }

    Ok(result)
}

fn env_override(section: &str, key: &str) -> Option<String> {
    std::env::var(format!("{ENV_PREFIX}_{section}_{key}")).ok()
}

fn parse_override<T: std::str::FromStr>(section: &str, key: &str) -> Result<Option<T>> {
    match env_override(section, key) {
        Some(raw) => raw.trim().parse::<T>().map(Some).map_err(|_| {
            SyncError::Configuration(format!(
                "Invalid value '{raw}' for {ENV_PREFIX}_{section}_{key}"
            ))
        }),
        None => Ok(None),
    }
}

/// Applies environment variable overrides using the `WARD_SYNC_*` prefix
///
/// Variables follow the pattern `WARD_SYNC_<SECTION>_<KEY>`, for example
/// `WARD_SYNC_NOTIFIER_ENDPOINT` or `WARD_SYNC_RECONCILE_EXAM_WINDOW_FORWARD_HOURS`.
/// Unparseable numeric or boolean values are a configuration error.
fn apply_env_overrides(config: &mut SyncConfig) -> Result<()> {
    if let Some(val) = env_override("APPLICATION", "LOG_LEVEL") {
        config.application.log_level = val;
    }
    if let Some(val) = parse_override("APPLICATION", "DRY_RUN")? {
        config.application.dry_run = val;
    }

    if let Some(val) = env_override("SOURCE", "CONNECTION_STRING") {
        config.source.connection_string = secret_string(val);
    }
    if let Some(val) = env_override("SOURCE", "TIMEZONE") {
        config.source.timezone = val;
    }
    if let Some(val) = env_override("DESTINATION", "CONNECTION_STRING") {
        config.destination.connection_string = secret_string(val);
    }
    if let Some(val) = env_override("DESTINATION", "TIMEZONE") {
        config.destination.timezone = val;
    }

    if let Some(val) = env_override("NOTIFIER", "ENDPOINT") {
        config.notifier.endpoint = val;
    }
    if let Some(val) = env_override("NOTIFIER", "TOKEN") {
        config.notifier.token = Some(secret_string(val));
    }
    if let Some(val) = parse_override("NOTIFIER", "TIMEOUT_SECONDS")? {
        config.notifier.timeout_seconds = val;
    }
    if let Some(val) = parse_override("NOTIFIER", "MAX_RETRIES")? {
        config.notifier.retry.max_retries = val;
    }

    if let Some(val) = parse_override("RECONCILE", "EXAM_WINDOW_BACK_HOURS")? {
        config.reconcile.exam_window_back_hours = val;
    }
    if let Some(val) = parse_override("RECONCILE", "EXAM_WINDOW_FORWARD_HOURS")? {
        config.reconcile.exam_window_forward_hours = val;
    }
    if let Some(val) = parse_override("RECONCILE", "MOST_RECENT_STAY_ONLY")? {
        config.reconcile.most_recent_stay_only = val;
    }

    if let Some(val) = parse_override("LOGGING", "LOCAL_ENABLED")? {
        config.logging.local_enabled = val;
    }
    if let Some(val) = env_override("LOGGING", "LOCAL_PATH") {
        config.logging.local_path = val;
    }

    Ok(())
}
