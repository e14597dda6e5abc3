use crate::config::types::{Config, EventsConfig, HttpConfig, OutputConfig};
use crate::ConfigError;

const MAX_TIMEOUT_SECS: u64 = 3600;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_http_config(&config.http)?;
    validate_output_config(&config.output)?;
    validate_events_config(&config.events)?;
    Ok(())
}

/// Validates HTTP client configuration
fn validate_http_config(config: &HttpConfig) -> Result<(), ConfigError> {
    if config.user_agent.trim().is_empty() {
        return Err(ConfigError::Validation(
            "user-agent cannot be empty".to_string(),
        ));
    }

    if config.user_agent.chars().any(|c| c.is_control()) {
        return Err(ConfigError::Validation(format!(
            "user-agent must not contain control characters, got {:?}",
            config.user_agent
        )));
    }

    for (name, value) in [
        ("connect-timeout-secs", config.connect_timeout_secs),
        ("request-timeout-secs", config.request_timeout_secs),
        ("read-timeout-secs", config.read_timeout_secs),
    ] {
        validate_timeout(name, value)?;
    }

    Ok(())
}

fn validate_timeout(name: &str, value: u64) -> Result<(), ConfigError> {
    if value < 1 || value > MAX_TIMEOUT_SECS {
        return Err(ConfigError::Validation(format!(
            "{} must be between 1 and {}, got {}",
            name, MAX_TIMEOUT_SECS, value
        )));
    }
    Ok(())
}

/// Validates output configuration
fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    if matches!(&config.directory, Some(dir) if dir.as_os_str().is_empty()) {
        return Err(ConfigError::Validation(
            "directory cannot be empty".to_string(),
        ));
    }

    if matches!(&config.summary_path, Some(path) if path.as_os_str().is_empty()) {
        return Err(ConfigError::Validation(
            "summary-path cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Validates event channel configuration
fn validate_events_config(config: &EventsConfig) -> Result<(), ConfigError> {
    if config.channel_capacity < 1 {
        return Err(ConfigError::Validation(format!(
            "channel-capacity must be >= 1, got {}",
            config.channel_capacity
        )));
    }
    Ok(())
}
