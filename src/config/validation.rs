use crate::config::types::{Config, CrawlTarget, CrawlerConfig, OutputConfig, UserAgentConfig};
use crate::url::parse_http_url;
use crate::{ConfigError, ConfigResult};
use std::collections::HashSet;
use url::Url;

/// Validates the entire configuration
///
/// The output target is checked first: a run without a sink is refused
/// before anything else is looked at.
pub fn validate(config: &Config) -> ConfigResult<()> {
    validate_output(&config.output)?;
    validate_crawler_config(&config.crawler)?;
    validate_user_agent_config(&config.user_agent)?;
    validate_sites(&config.sites)?;
    Ok(())
}

/// Validates output configuration
pub fn validate_output(config: &OutputConfig) -> ConfigResult<()> {
    if config.directory.trim().is_empty() {
        return Err(ConfigError::MissingOutput);
    }

    if config.prefix.contains("..") || config.prefix.starts_with('/') {
        return Err(ConfigError::Validation(format!(
            "output prefix must be a relative path segment, got '{}'",
            config.prefix
        )));
    }

    Ok(())
}

/// Validates crawler configuration
fn validate_crawler_config(config: &CrawlerConfig) -> ConfigResult<()> {
    if config.pages_per_site < 1 {
        return Err(ConfigError::Validation(
            "pages_per_site must be >= 1".to_string(),
        ));
    }

    if config.request_timeout_secs < 1 || config.request_timeout_secs > 300 {
        return Err(ConfigError::Validation(format!(
            "request_timeout_secs must be between 1 and 300, got {}",
            config.request_timeout_secs
        )));
    }

    if config.politeness_delay_ms < 100 {
        return Err(ConfigError::Validation(format!(
            "politeness_delay_ms must be >= 100ms, got {}ms",
            config.politeness_delay_ms
        )));
    }

    if config.max_redirects > 20 {
        return Err(ConfigError::Validation(format!(
            "max_redirects must be <= 20, got {}",
            config.max_redirects
        )));
    }

    if config.discover_endpoints && config.endpoint_cap < 1 {
        return Err(ConfigError::Validation(
            "endpoint_cap must be >= 1 when endpoint discovery is enabled".to_string(),
        ));
    }

    if config.max_concurrent_sites < 1 || config.max_concurrent_sites > 32 {
        return Err(ConfigError::Validation(format!(
            "max_concurrent_sites must be between 1 and 32, got {}",
            config.max_concurrent_sites
        )));
    }

    Ok(())
}

/// Validates user agent configuration
fn validate_user_agent_config(config: &UserAgentConfig) -> ConfigResult<()> {
    // The name doubles as the robots.txt product token
    if config.crawler_name.is_empty() {
        return Err(ConfigError::Validation(
            "crawler_name cannot be empty".to_string(),
        ));
    }

    if !config
        .crawler_name
        .chars()
        .all(|c| c.is_alphanumeric() || c == '-')
    {
        return Err(ConfigError::Validation(format!(
            "crawler_name must contain only alphanumeric characters and hyphens, got '{}'",
            config.crawler_name
        )));
    }

    Url::parse(&config.contact_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid contact_url: {}", e)))?;

    validate_email(&config.contact_email)?;

    Ok(())
}

/// Validates the site list
fn validate_sites(sites: &[CrawlTarget]) -> ConfigResult<()> {
    if sites.is_empty() {
        return Err(ConfigError::Validation(
            "at least one [[site]] entry is required".to_string(),
        ));
    }

    let mut names = HashSet::new();
    for site in sites {
        validate_site_name(&site.name)?;

        if !names.insert(site.name.as_str()) {
            return Err(ConfigError::Validation(format!(
                "duplicate site name '{}'",
                site.name
            )));
        }

        if site.seeds.is_empty() {
            return Err(ConfigError::Validation(format!(
                "Site '{}' must have at least one seed URL",
                site.name
            )));
        }

        for seed in &site.seeds {
            parse_http_url(seed).map_err(|e| {
                ConfigError::InvalidUrl(format!("Invalid seed URL '{}': {}", seed, e))
            })?;
        }
    }

    Ok(())
}

/// Site names become directory names in the sink
fn validate_site_name(name: &str) -> ConfigResult<()> {
    if name.is_empty() {
        return Err(ConfigError::Validation(
            "site name cannot be empty".to_string(),
        ));
    }

    if name == "." || name == ".." {
        return Err(ConfigError::Validation(format!(
            "site name '{}' is not allowed",
            name
        )));
    }

    if !name
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == '.')
    {
        return Err(ConfigError::Validation(format!(
            "site name '{}' may only contain letters, digits, '.', '-' and '_'",
            name
        )));
    }

    Ok(())
}

/// Basic email validation
fn validate_email(email: &str) -> ConfigResult<()> {
    if email.is_empty() {
        return Err(ConfigError::Validation(
            "contact_email cannot be empty".to_string(),
        ));
    }

    let parts: Vec<&str> = email.split('@').collect();
    if parts.len() != 2 || parts[0].is_empty() || parts[1].is_empty() {
        return Err(ConfigError::Validation(format!(
            "Invalid email format: '{}'",
            email
        )));
    }

    if !parts[1].contains('.') {
        return Err(ConfigError::Validation(format!(
            "Invalid email domain: '{}'",
            email
        )));
    }

    Ok(())
}
