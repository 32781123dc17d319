use anyhow::{Context, Result};
use reqwest::Client;
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use reqwest_retry::{RetryTransientMiddleware, policies::ExponentialBackoff};
use std::time::Duration;

pub struct HttpClientFactory;

impl HttpClientFactory {
    /// Client for a PostgREST store. The key goes out on every request as
    /// both `apikey` and a bearer token.
    pub fn create_store_client(api_key: &str, timeout: Duration) -> Result<ClientWithMiddleware> {
        let mut headers = HeaderMap::new();
        headers.insert("apikey", sensitive(api_key.to_string())?);
        headers.insert(AUTHORIZATION, sensitive(format!("Bearer {}", api_key))?);

        // Max 3 retries on transient failures (5xx, timeouts, connection errors)
        let retry_policy = ExponentialBackoff::builder().build_with_max_retries(3);

        let client = Client::builder()
            .default_headers(headers)
            .pool_max_idle_per_host(5)
            .timeout(timeout)
            .connect_timeout(timeout.min(Duration::from_secs(10)))
            .build()
            .context("Failed to build store HTTP client")?;

        Ok(ClientBuilder::new(client)
            .with(RetryTransientMiddleware::new_with_policy(retry_policy))
            .build())
    }
}

fn sensitive(value: String) -> Result<HeaderValue> {
    let mut header =
        HeaderValue::from_str(&value).context("Store API key is not a valid header value")?;
    header.set_sensitive(true);
    Ok(header)
}
