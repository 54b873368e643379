use std::time::Duration;

use reqwest::header::HeaderMap;
use serde::{Deserialize, de::DeserializeOwned};

use crate::constants::{ALLOW_REQUEST_REDIRECTS, VERIFY_REQUEST_SSL};
use crate::error::ConfigError;
use crate::ratelimit::WaitStrategy;
use crate::requests::QueryParams;

pub const ENV_PREFIX: &str = "YAD2_";

/// Options applied to every request. Collections are merged, scalars replaced.
#[derive(Debug, Clone, Default)]
pub struct RequestOptions {
    pub params: QueryParams,
    pub headers: HeaderMap,
    pub timeout: Option<Duration>,
}

impl RequestOptions {
    pub fn with_params(params: QueryParams) -> Self {
        Self {
            params,
            ..Self::default()
        }
    }

    /// Layers `overlay` on top of `self`.
    pub fn merge(&mut self, overlay: &RequestOptions) {
        self.params.extend(
            overlay
                .params
                .iter()
                .map(|(key, value)| (key.clone(), value.clone())),
        );
        for (name, value) in &overlay.headers {
            self.headers.insert(name.clone(), value.clone());
        }
        if overlay.timeout.is_some() {
            self.timeout = overlay.timeout;
        }
    }
}

/// Everything a [`crate::Scraper`] needs, passed in explicitly.
#[derive(Debug, Clone)]
pub struct ScraperConfig {
    pub request_defaults: RequestOptions,
    pub randomize_user_agent: bool,
    pub user_agent: Option<String>,
    pub no_script: Option<bool>,
    pub wait_strategy: Option<WaitStrategy>,
    pub max_request_attempts: u32,
    pub requests_per_second: Option<u32>,
    pub follow_redirects: bool,
    pub verify_ssl: bool,
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            request_defaults: RequestOptions::default(),
            randomize_user_agent: true,
            user_agent: None,
            no_script: None,
            wait_strategy: None,
            max_request_attempts: 1,
            requests_per_second: None,
            follow_redirects: ALLOW_REQUEST_REDIRECTS,
            verify_ssl: VERIFY_REQUEST_SSL,
        }
    }
}

impl ScraperConfig {
    /// Reads `YAD2_*` variables, after loading a `.env` file if one exists.
    pub fn from_env() -> Result<Self, ConfigError> {
        ScraperEnv::load_from_env(ENV_PREFIX)?.try_into()
    }

    pub fn from_env_vars<I>(vars: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let scraper_env = envy::prefixed(ENV_PREFIX).from_iter::<_, ScraperEnv>(vars)?;
        scraper_env.try_into()
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_request_attempts == 0 {
            return Err(ConfigError::InvalidMaxRequestAttempts(0));
        }
        if self.requests_per_second == Some(0) {
            return Err(ConfigError::InvalidRequestRate);
        }
        Ok(())
    }
}

/// The env vars understood by [`ScraperConfig::from_env`], minus the prefix.
#[derive(Debug, Default, Deserialize)]
pub struct ScraperEnv {
    max_request_attempts: Option<i64>,
    randomize_user_agent: Option<bool>,
    user_agent: Option<String>,
    no_script: Option<bool>,
    wait_min_secs: Option<f64>,
    wait_max_secs: Option<f64>,
    requests_per_second: Option<u32>,
    timeout_secs: Option<u64>,
    follow_redirects: Option<bool>,
    verify_ssl: Option<bool>,
}

impl TryFrom<ScraperEnv> for ScraperConfig {
    type Error = ConfigError;

    fn try_from(env: ScraperEnv) -> Result<Self, Self::Error> {
        let defaults = ScraperConfig::default();

        let max_request_attempts = match env.max_request_attempts {
            Some(attempts) => u32::try_from(attempts)
                .ok()
                .filter(|attempts| *attempts > 0)
                .ok_or(ConfigError::InvalidMaxRequestAttempts(attempts))?,
            None => defaults.max_request_attempts,
        };

        let wait_strategy = match (env.wait_min_secs, env.wait_max_secs) {
            (Some(min), Some(max)) => {
                Some(WaitStrategy::random_range(seconds(min)?, seconds(max)?)?)
            }
            (Some(secs), None) | (None, Some(secs)) => Some(WaitStrategy::Fixed(seconds(secs)?)),
            (None, None) => None,
        };

        let config = ScraperConfig {
            request_defaults: RequestOptions {
                timeout: env.timeout_secs.map(Duration::from_secs),
                ..RequestOptions::default()
            },
            randomize_user_agent: env
                .randomize_user_agent
                .unwrap_or(defaults.randomize_user_agent),
            user_agent: env.user_agent,
            no_script: env.no_script,
            wait_strategy,
            max_request_attempts,
            requests_per_second: env.requests_per_second,
            follow_redirects: env.follow_redirects.unwrap_or(defaults.follow_redirects),
            verify_ssl: env.verify_ssl.unwrap_or(defaults.verify_ssl),
        };
        config.validate()?;
        Ok(config)
    }
}

fn seconds(secs: f64) -> Result<Duration, ConfigError> {
    Duration::try_from_secs_f64(secs).map_err(|_| ConfigError::InvalidWaitSeconds(secs))
}

// Extension trait.
pub trait LoadFromEnv: DeserializeOwned {
    fn load_from_env(prefix: &str) -> Result<Self, ConfigError> {
        // Don't throw an error if .env file doesn't exist.
        let _ = dotenv::dotenv();
        let config = envy::prefixed(prefix).from_env::<Self>()?;
        Ok(config)
    }
}

impl<T: DeserializeOwned> LoadFromEnv for T {}

#[cfg(test)]
mod tests {
    use reqwest::header::{HeaderValue, USER_AGENT};

    use super::*;

    fn vars(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect()
    }

    #[test]
    fn merge_extends_collections_and_overrides_scalars() {
        let mut base = RequestOptions::with_params(QueryParams::from([
            ("existing".to_string(), "value".to_string()),
            ("page".to_string(), "1".to_string()),
        ]));
        base.headers.insert(USER_AGENT, HeaderValue::from_static("base"));
        base.timeout = Some(Duration::from_secs(10));

        let mut overlay = RequestOptions::with_params(QueryParams::from([
            ("new".to_string(), "param".to_string()),
            ("page".to_string(), "2".to_string()),
        ]));
        overlay.timeout = None;
        base.merge(&overlay);

        assert_eq!(base.params.len(), 3);
        assert_eq!(base.params["existing"], "value");
        assert_eq!(base.params["new"], "param");
        assert_eq!(base.params["page"], "2");
        assert_eq!(base.headers[USER_AGENT], "base");
        assert_eq!(base.timeout, Some(Duration::from_secs(10)));

        overlay.timeout = Some(Duration::from_secs(3));
        base.merge(&overlay);
        assert_eq!(base.timeout, Some(Duration::from_secs(3)));
    }

    #[test]
    fn env_defaults_match_struct_defaults() {
        let config = ScraperConfig::from_env_vars(Vec::new()).unwrap();
        assert_eq!(config.max_request_attempts, 1);
        assert!(config.randomize_user_agent);
        assert!(config.follow_redirects);
        assert!(config.verify_ssl);
        assert!(config.wait_strategy.is_none());
    }

    #[test]
    fn env_values_are_applied() {
        let config = ScraperConfig::from_env_vars(vars(&[
            ("YAD2_MAX_REQUEST_ATTEMPTS", "4"),
            ("YAD2_RANDOMIZE_USER_AGENT", "false"),
            ("YAD2_NO_SCRIPT", "true"),
            ("YAD2_WAIT_MIN_SECS", "0.5"),
            ("YAD2_WAIT_MAX_SECS", "1.5"),
            ("YAD2_TIMEOUT_SECS", "20"),
            ("UNRELATED", "ignored"),
        ]))
        .unwrap();
        assert_eq!(config.max_request_attempts, 4);
        assert!(!config.randomize_user_agent);
        assert_eq!(config.no_script, Some(true));
        assert!(matches!(
            config.wait_strategy,
            Some(WaitStrategy::RandomRange { .. })
        ));
        let timeout = config.request_defaults.timeout;
        assert_eq!(timeout, Some(Duration::from_secs(20)));
    }

    #[test]
    fn non_positive_attempts_are_rejected() {
        for value in ["0", "-3"] {
            let env = vars(&[("YAD2_MAX_REQUEST_ATTEMPTS", value)]);
            let error = ScraperConfig::from_env_vars(env).unwrap_err();
            assert!(matches!(error, ConfigError::InvalidMaxRequestAttempts(_)));
        }
    }

    #[test]
    fn non_integer_attempts_are_rejected() {
        for value in ["abc", "2.5"] {
            let env = vars(&[("YAD2_MAX_REQUEST_ATTEMPTS", value)]);
            let error = ScraperConfig::from_env_vars(env).unwrap_err();
            assert!(matches!(error, ConfigError::Env(_)));
        }
    }

    #[test]
    fn negative_wait_is_rejected() {
        let env = vars(&[("YAD2_WAIT_MIN_SECS", "-1")]);
        let error = ScraperConfig::from_env_vars(env).unwrap_err();
        assert!(matches!(error, ConfigError::InvalidWaitSeconds(_)));
    }
}
