use crate::config::types::{Config, FetchConfig, OutputConfig};
use crate::ConfigError;

/// Lowest pacing delay accepted from a configuration file (milliseconds)
pub const MIN_PACING_FLOOR_MS: u64 = 1000;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_fetch_config(&config.fetch)?;
    validate_output_config(&config.output)?;
    Ok(())
}

/// Validates pacing, timeout and header settings
fn validate_fetch_config(config: &FetchConfig) -> Result<(), ConfigError> {
    if config.min_delay_ms < MIN_PACING_FLOOR_MS {
        return Err(ConfigError::Validation(format!(
            "min_delay_ms must be >= {}ms, got {}ms",
            MIN_PACING_FLOOR_MS, config.min_delay_ms
        )));
    }

    if config.max_delay_ms < config.min_delay_ms {
        return Err(ConfigError::Validation(format!(
            "max_delay_ms ({}ms) must be >= min_delay_ms ({}ms)",
            config.max_delay_ms, config.min_delay_ms
        )));
    }

    if config.timeout_secs < 1 || config.timeout_secs > 300 {
        return Err(ConfigError::Validation(format!(
            "timeout_secs must be between 1 and 300, got {}",
            config.timeout_secs
        )));
    }

    if config.max_attempts < 1 || config.max_attempts > 10 {
        return Err(ConfigError::Validation(format!(
            "max_attempts must be between 1 and 10, got {}",
            config.max_attempts
        )));
    }

    if config.user_agent.trim().is_empty() {
        return Err(ConfigError::Validation(
            "user_agent cannot be empty".to_string(),
        ));
    }

    validate_header_value("user_agent", &config.user_agent)?;
    validate_header_value("accept_language", &config.accept_language)?;

    Ok(())
}

/// Validates output configuration
fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    if config.file_prefix.is_empty() {
        return Err(ConfigError::Validation(
            "file_prefix cannot be empty".to_string(),
        ));
    }

    if config
        .file_prefix
        .chars()
        .any(|c| c == '/' || c == '\\' || c.is_control())
    {
        return Err(ConfigError::Validation(format!(
            "file_prefix must be a plain file name, got '{}'",
            config.file_prefix
        )));
    }

    if config.directory.as_os_str().is_empty() {
        return Err(ConfigError::Validation(
            "directory cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Header values must be visible ASCII so reqwest accepts them
fn validate_header_value(name: &str, value: &str) -> Result<(), ConfigError> {
    if !value.chars().all(|c| c == ' ' || c.is_ascii_graphic()) {
        return Err(ConfigError::Validation(format!(
            "{} must contain only printable ASCII characters",
            name
        )));
    }
    Ok(())
}
