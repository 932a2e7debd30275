use crate::config::Config;
use crate::ConfigError;

/// Validates a configuration, rejecting values the pipeline cannot run
/// with
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    if config.crawler.retries == 0 {
        return Err(ConfigError::Validation(
            "crawler.retries must be at least 1".to_string(),
        ));
    }
    if config.crawler.page_timeout_secs == 0 {
        return Err(ConfigError::Validation(
            "crawler.page-timeout-secs must be at least 1".to_string(),
        ));
    }
    if config.crawler.download_timeout_secs == 0 {
        return Err(ConfigError::Validation(
            "crawler.download-timeout-secs must be at least 1".to_string(),
        ));
    }
    if config.index.request_timeout_secs == 0 {
        return Err(ConfigError::Validation(
            "index.request-timeout-secs must be at least 1".to_string(),
        ));
    }

    if config.index.index_name.is_empty() {
        return Err(ConfigError::Validation(
            "index.index-name must not be empty".to_string(),
        ));
    }

    let engine_url = url::Url::parse(&config.index.engine_url)
        .map_err(|_| ConfigError::InvalidUrl(config.index.engine_url.clone()))?;
    if !matches!(engine_url.scheme(), "http" | "https") {
        return Err(ConfigError::InvalidUrl(config.index.engine_url.clone()));
    }

    for host in &config.crawler.allowed_hosts {
        if host.trim().is_empty() {
            return Err(ConfigError::Validation(
                "crawler.allowed-hosts entries must not be empty".to_string(),
            ));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert!(validate(&Config::default()).is_ok());
    }

    #[test]
    fn zero_retries_rejected() {
        let mut config = Config::default();
        config.crawler.retries = 0;
        assert!(matches!(
            validate(&config),
            Err(ConfigError::Validation(_))
        ));
    }

    #[test]
    fn zero_timeout_rejected() {
        let mut config = Config::default();
        config.crawler.page_timeout_secs = 0;
        assert!(validate(&config).is_err());
    }

    #[test]
    fn zero_retry_delay_allowed() {
        let mut config = Config::default();
        config.crawler.retry_delay_secs = 0;
        assert!(validate(&config).is_ok());
    }

    #[test]
    fn malformed_engine_url_rejected() {
        let mut config = Config::default();
        config.index.engine_url = "not a url".to_string();
        assert!(matches!(validate(&config), Err(ConfigError::InvalidUrl(_))));
    }

    #[test]
    fn non_http_engine_url_rejected() {
        let mut config = Config::default();
        config.index.engine_url = "ftp://localhost:9200".to_string();
        assert!(matches!(validate(&config), Err(ConfigError::InvalidUrl(_))));
    }

    #[test]
    fn empty_index_name_rejected() {
        let mut config = Config::default();
        config.index.index_name = String::new();
        assert!(validate(&config).is_err());
    }

    #[test]
    fn blank_allowed_host_rejected() {
        let mut config = Config::default();
        config.crawler.allowed_hosts = vec!["  ".to_string()];
        assert!(validate(&config).is_err());
    }
}
