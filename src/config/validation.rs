use crate::config::types::{Config, CrawlerConfig, OutputConfig};
use crate::ConfigError;

const MAX_REQUEST_TIMEOUT_SECS: u64 = 3600;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_crawler_config(&config.crawler)?;
    validate_output_config(&config.output)?;
    Ok(())
}

/// Validates crawler configuration
fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    // max_depth >= 0 is always true for u32, so no check needed

    if config.request_timeout > MAX_REQUEST_TIMEOUT_SECS {
        return Err(ConfigError::Validation(format!(
            "request-timeout must be at most {}s, got {}s",
            MAX_REQUEST_TIMEOUT_SECS, config.request_timeout
        )));
    }

    Ok(())
}

/// Validates output configuration
fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    if config.directory.as_os_str().is_empty() {
        return Err(ConfigError::OutputDirectory(config.directory.clone()));
    }

    Ok(())
}
