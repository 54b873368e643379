use std::collections::BTreeMap;

use log::{debug, error, info};
use rand::{Rng, rng};
use reqwest::Method;
use reqwest::header::{COOKIE, HeaderMap, HeaderValue, USER_AGENT};

use crate::category::FromHtml;
use crate::config::{RequestOptions, ScraperConfig};
use crate::constants::{
    ANTIBOT_CONTENT_IDENTIFIER, NO_SCRIPT_COOKIE, PAGE_CONTENT_IDENTIFIER, USER_AGENTS,
    default_request_headers,
};
use crate::error::{ConfigError, Error, MaxRequestAttemptsExceededError, RequestError, Result};
use crate::ratelimit::{RateLimiter, WaitStrategy};
use crate::requests::{HttpRequest, HttpTransport, QueryParams, Response, Transport};
use crate::vehicles::{VehicleCategory, VehiclesCategory, VehiclesQueryFilters};

/// A Yad2 client with retries, response validation and optional pacing.
///
/// All methods that touch the network take `&mut self`; share one scraper
/// per task rather than across tasks. The transport is released on
/// [`Scraper::close`] or when the scraper is dropped.
pub struct Scraper<T: Transport = HttpTransport> {
    transport: Option<T>,
    headers: HeaderMap,
    cookies: BTreeMap<String, String>,
    request_defaults: RequestOptions,
    randomize_user_agent: bool,
    wait_strategy: Option<WaitStrategy>,
    max_request_attempts: u32,
    rate_limiter: Option<RateLimiter>,
    request_count: u64,
}

impl Scraper<HttpTransport> {
    pub fn new(config: ScraperConfig) -> Result<Self> {
        let transport = HttpTransport::new(config.follow_redirects, config.verify_ssl)?;
        Self::with_transport(transport, config)
    }
}

impl<T: Transport> Scraper<T> {
    pub fn with_transport(transport: T, config: ScraperConfig) -> Result<Self> {
        config.validate()?;
        let rate_limiter = config
            .requests_per_second
            .map(RateLimiter::new)
            .transpose()?;

        let mut scraper = Self {
            transport: Some(transport),
            headers: default_request_headers(),
            cookies: BTreeMap::new(),
            request_defaults: config.request_defaults,
            randomize_user_agent: config.randomize_user_agent,
            wait_strategy: config.wait_strategy,
            max_request_attempts: config.max_request_attempts,
            rate_limiter,
            request_count: 0,
        };
        if let Some(user_agent) = &config.user_agent {
            scraper.set_user_agent(user_agent)?;
        }
        if let Some(no_script) = config.no_script {
            scraper.set_no_script(no_script);
        }

        debug!(
            "Scraper initialized (max attempts: {}, randomize user agent: {})",
            scraper.max_request_attempts, scraper.randomize_user_agent
        );
        Ok(scraper)
    }

    /// Requests that passed validation so far.
    pub fn request_count(&self) -> u64 {
        self.request_count
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn cookies(&self) -> &BTreeMap<String, String> {
        &self.cookies
    }

    pub fn request_defaults(&self) -> &RequestOptions {
        &self.request_defaults
    }

    pub fn request_defaults_mut(&mut self) -> &mut RequestOptions {
        &mut self.request_defaults
    }

    pub fn max_request_attempts(&self) -> u32 {
        self.max_request_attempts
    }

    pub fn set_max_request_attempts(&mut self, max_request_attempts: u32) {
        self.max_request_attempts = max_request_attempts;
    }

    pub fn set_wait_strategy(&mut self, wait_strategy: Option<WaitStrategy>) {
        self.wait_strategy = wait_strategy;
    }

    pub fn set_randomize_user_agent(&mut self, randomize_user_agent: bool) {
        self.randomize_user_agent = randomize_user_agent;
    }

    pub fn is_closed(&self) -> bool {
        self.transport.is_none()
    }

    pub fn set_user_agent(&mut self, user_agent: &str) -> Result<()> {
        let value = HeaderValue::from_str(user_agent)?;
        self.headers.insert(USER_AGENT, value);
        debug!("User-Agent client header set to: '{user_agent}'");
        Ok(())
    }

    /// Sets the `noscript` cookie to `"1"` or `"0"`.
    pub fn set_no_script(&mut self, no_script: bool) {
        let value = if no_script { "1" } else { "0" };
        self.cookies
            .insert(NO_SCRIPT_COOKIE.to_string(), value.to_string());
        debug!("NoScript ({NO_SCRIPT_COOKIE}) client cookie set to: '{value}'");
    }

    pub async fn fetch_category<C: FromHtml>(
        &mut self,
        url: &str,
        params: Option<QueryParams>,
    ) -> Result<C> {
        debug!("Fetching category from URL: '{url}'");
        let response = self.get(url, params).await?;
        debug!("Category fetched successfully from URL: '{url}'");
        Ok(C::from_html_bytes(response.bytes()))
    }

    pub async fn fetch_vehicle_category(
        &mut self,
        vehicle_category: VehicleCategory,
        filters: &VehiclesQueryFilters,
    ) -> Result<VehiclesCategory> {
        let params = filters.to_params();
        let params = (!params.is_empty()).then_some(params);
        self.fetch_category(&vehicle_category.url(), params).await
    }

    pub async fn get(&mut self, url: &str, params: Option<QueryParams>) -> Result<Response> {
        self.request(Method::GET, url, params).await
    }

    pub async fn request(
        &mut self,
        method: Method,
        url: &str,
        params: Option<QueryParams>,
    ) -> Result<Response> {
        let options = RequestOptions::with_params(params.unwrap_or_default());
        self.request_with_options(method, url, &options).await
    }

    /// Runs the attempt loop. With a single configured attempt its error is
    /// returned as is; otherwise all attempt errors are aggregated.
    pub async fn request_with_options(
        &mut self,
        method: Method,
        url: &str,
        options: &RequestOptions,
    ) -> Result<Response> {
        let max_attempts = self.max_request_attempts;
        if max_attempts == 0 {
            return Err(ConfigError::InvalidMaxRequestAttempts(0).into());
        }
        let Some(transport) = self.transport.as_ref() else {
            return Err(Error::Closed);
        };

        let request_options = self.prepare_request_options(options)?;
        let mut errors = Vec::new();

        for attempt in 1..=max_attempts {
            match self
                .send_request(transport, &method, url, &request_options, attempt)
                .await
            {
                Ok(response) => {
                    self.request_count += 1;
                    return Ok(response);
                }
                Err(e) => {
                    error!(
                        "{method} request to '{url}' failed {}: {e}",
                        self.format_attempt_info(attempt)
                    );
                    errors.push(e);
                }
            }
        }

        if max_attempts == 1 {
            if let Some(e) = errors.pop() {
                return Err(e.into());
            }
        }

        let max_attempts_error = MaxRequestAttemptsExceededError {
            method,
            url: url.to_string(),
            max_attempts,
            errors,
        };
        error!("{max_attempts_error}");
        Err(max_attempts_error.into())
    }

    /// Releases the transport. Further requests fail with [`Error::Closed`].
    pub fn close(&mut self) {
        if let Some(mut transport) = self.transport.take() {
            debug!("Closing scraper client");
            transport.close();
            info!("Scraper client closed");
        }
    }

    async fn send_request(
        &self,
        transport: &T,
        method: &Method,
        url: &str,
        request_options: &RequestOptions,
        attempt: u32,
    ) -> Result<Response, RequestError> {
        let mut headers = request_options.headers.clone();
        if self.randomize_user_agent {
            let user_agent = random_user_agent();
            headers.insert(USER_AGENT, HeaderValue::from_static(user_agent));
            debug!("Using random User-Agent header for this attempt: '{user_agent}'");
        }

        self.apply_wait_strategy(attempt).await;
        if let Some(rate_limiter) = &self.rate_limiter {
            rate_limiter.wait_until_ready().await;
        }

        let request = HttpRequest {
            method: method.clone(),
            url: url.to_string(),
            params: request_options.params.clone(),
            headers,
            timeout: request_options.timeout,
        };

        info!(
            "Sending {method} request to URL: '{url}' {}",
            self.format_attempt_info(attempt)
        );
        let response = transport.send(&request).await?;
        debug!(
            "Received response {} from '{url}' {}",
            response.status,
            self.format_attempt_info(attempt)
        );

        validate_response(method, response)
    }

    /// Session headers and cookies, then the defaults, then the call's own options.
    fn prepare_request_options(&self, options: &RequestOptions) -> Result<RequestOptions> {
        debug!("Preparing request options from defaults");
        let mut request_options = RequestOptions {
            headers: self.headers.clone(),
            ..RequestOptions::default()
        };
        if let Some(cookie) = self.cookie_header()? {
            request_options.headers.insert(COOKIE, cookie);
        }
        request_options.merge(&self.request_defaults);
        request_options.merge(options);

        if !options.params.is_empty() {
            debug!(
                "Updated request options with query params: {:?}",
                options.params
            );
        }
        Ok(request_options)
    }

    fn cookie_header(&self) -> Result<Option<HeaderValue>> {
        if self.cookies.is_empty() {
            return Ok(None);
        }
        let cookie = self
            .cookies
            .iter()
            .map(|(name, value)| format!("{name}={value}"))
            .collect::<Vec<_>>()
            .join("; ");
        Ok(Some(HeaderValue::from_str(&cookie)?))
    }

    async fn apply_wait_strategy(&self, attempt: u32) {
        let Some(wait_time) = self
            .wait_strategy
            .as_ref()
            .and_then(|wait_strategy| wait_strategy.wait_duration(attempt))
        else {
            return;
        };

        debug!(
            "Waiting {:.2} seconds before request {}",
            wait_time.as_secs_f64(),
            self.format_attempt_info(attempt)
        );
        tokio::time::sleep(wait_time).await;
    }

    fn format_attempt_info(&self, attempt: u32) -> String {
        format!("(attempt {attempt}/{})", self.max_request_attempts)
    }
}

impl<T: Transport> Drop for Scraper<T> {
    fn drop(&mut self) {
        self.close();
    }
}

fn random_user_agent() -> &'static str {
    USER_AGENTS[rng().random_range(0..USER_AGENTS.len())]
}

/// Status first, then content markers. The site marker is only required
/// when `method`, the method that was sent, is GET.
fn validate_response(method: &Method, response: Response) -> Result<Response, RequestError> {
    let response = response.error_for_status()?;
    if response.contains(ANTIBOT_CONTENT_IDENTIFIER) {
        return Err(RequestError::AntiBotDetected(Box::new(response)));
    }
    if *method == Method::GET && !response.contains(PAGE_CONTENT_IDENTIFIER) {
        return Err(RequestError::UnexpectedContent(Box::new(response)));
    }

    debug!("Response validation succeeded");
    Ok(response)
}
