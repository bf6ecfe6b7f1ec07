use crate::config::types::{ClientConfig, Config, ProfileEntry};
use crate::ConfigError;
use url::Url;

/// Validates the entire configuration
///
/// Identities are not checked here; a bad username or resume URL surfaces as a
/// failed record for that source instead of rejecting the whole run.
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_client_config(&config.client)?;
    for (index, entry) in config.profiles.iter().enumerate() {
        validate_profile(index, entry)?;
    }
    Ok(())
}

/// Validates the shared client settings
fn validate_client_config(config: &ClientConfig) -> Result<(), ConfigError> {
    if config.user_agent.trim().is_empty() {
        return Err(ConfigError::Validation(
            "user-agent cannot be empty".to_string(),
        ));
    }

    if config.github_token_env.trim().is_empty() {
        return Err(ConfigError::Validation(
            "github-token-env cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Validates the overrides of one profile entry
fn validate_profile(index: usize, entry: &ProfileEntry) -> Result<(), ConfigError> {
    let label = format!("profile #{} ({})", index + 1, entry.platform);

    if let Some(attempts) = entry.max_attempts {
        if !(1..=10).contains(&attempts) {
            return Err(ConfigError::InvalidProfile(format!(
                "{}: max-attempts must be between 1 and 10, got {}",
                label, attempts
            )));
        }
    }

    if let Some(timeout) = entry.timeout_secs {
        if !(1..=120).contains(&timeout) {
            return Err(ConfigError::InvalidProfile(format!(
                "{}: timeout-secs must be between 1 and 120, got {}",
                label, timeout
            )));
        }
    }

    if let Some(base_ms) = entry.backoff_base_ms {
        if !(1..=60_000).contains(&base_ms) {
            return Err(ConfigError::InvalidProfile(format!(
                "{}: backoff-base-ms must be between 1 and 60000, got {}",
                label, base_ms
            )));
        }
    }

    if let Some(base_url) = &entry.base_url {
        validate_base_url(base_url)?;
    }

    Ok(())
}

/// Base URLs must parse and use http or https
fn validate_base_url(base_url: &str) -> Result<(), ConfigError> {
    let url = Url::parse(base_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid base-url '{}': {}", base_url, e)))?;

    match url.scheme() {
        "http" | "https" => Ok(()),
        scheme => Err(ConfigError::InvalidUrl(format!(
            "base-url '{}' must use http or https, got '{}'",
            base_url, scheme
        ))),
    }
}
