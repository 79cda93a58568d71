use crate::config::types::{Config, CrawlerConfig, UserAgentConfig};
use crate::ConfigError;
use tokio::sync::Semaphore;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_crawler_config(&config.crawler)?;
    validate_user_agent_config(&config.user_agent)?;
    Ok(())
}

/// Validates crawler configuration
fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    if config.request_timeout_secs < 1 {
        return Err(ConfigError::Validation(format!(
            "request_timeout_secs must be >= 1, got {}",
            config.request_timeout_secs
        )));
    }

    if config.max_retry < 1 {
        return Err(ConfigError::Validation(format!(
            "max_retry must be >= 1, got {}",
            config.max_retry
        )));
    }

    if config.max_workers > Semaphore::MAX_PERMITS {
        return Err(ConfigError::Validation(format!(
            "max_workers must be <= {}, got {}",
            Semaphore::MAX_PERMITS,
            config.max_workers
        )));
    }

    if config.result_queue_capacity < 1 {
        return Err(ConfigError::Validation(format!(
            "result_queue_capacity must be >= 1, got {}",
            config.result_queue_capacity
        )));
    }

    if config.output_queue_capacity < 1 {
        return Err(ConfigError::Validation(format!(
            "output_queue_capacity must be >= 1, got {}",
            config.output_queue_capacity
        )));
    }

    if config.check_interval_ms < 10 {
        return Err(ConfigError::Validation(format!(
            "check_interval_ms must be >= 10ms, got {}ms",
            config.check_interval_ms
        )));
    }

    Ok(())
}

/// Validates user agent configuration
fn validate_user_agent_config(config: &UserAgentConfig) -> Result<(), ConfigError> {
    // Crawler name: non-empty, alphanumeric + hyphens only
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

    if config.crawler_version.is_empty() {
        return Err(ConfigError::Validation(
            "crawler_version cannot be empty".to_string(),
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate(&Config::default()).is_ok());
    }

    #[test]
    fn test_zero_max_retry_rejected() {
        let mut config = Config::default();
        config.crawler.max_retry = 0;
        assert!(matches!(
            validate(&config),
            Err(ConfigError::Validation(_))
        ));
    }

    #[test]
    fn test_zero_capacities_rejected() {
        let mut config = Config::default();
        config.crawler.result_queue_capacity = 0;
        assert!(validate(&config).is_err());

        let mut config = Config::default();
        config.crawler.output_queue_capacity = 0;
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_check_interval_lower_bound() {
        let mut config = Config::default();
        config.crawler.check_interval_ms = 5;
        assert!(validate(&config).is_err());

        config.crawler.check_interval_ms = 10;
        assert!(validate(&config).is_ok());
    }

    #[test]
    fn test_unbounded_workers_allowed() {
        let mut config = Config::default();
        config.crawler.max_workers = 0;
        assert!(validate(&config).is_ok());
    }

    #[test]
    fn test_excessive_workers_rejected() {
        let mut config = Config::default();
        config.crawler.max_workers = usize::MAX;
        assert!(validate(&config).is_err());

        config.crawler.max_workers = Semaphore::MAX_PERMITS;
        assert!(validate(&config).is_ok());
    }

    #[test]
    fn test_validate_crawler_name() {
        let mut config = Config::default();
        config.user_agent.crawler_name = "my-crawler2".to_string();
        assert!(validate(&config).is_ok());

        config.user_agent.crawler_name = String::new();
        assert!(validate(&config).is_err());

        config.user_agent.crawler_name = "bad name!".to_string();
        assert!(validate(&config).is_err());
    }
}
