//! Rate provider client.

use reqwest::Client;
use url::Url;

use super::{ClientError, http_client, parse_response};
use crate::objects::rates::{RateQuote, RatesResponse};

/// Typed HTTP client for the rate provider.
#[derive(Debug, Clone)]
pub struct RateClient {
    http: Client,
    base_url: Url,
}

impl RateClient {
    /// Create a new `RateClient` against the provider rooted at `base_url`.
    pub fn new(base_url: Url) -> Self {
        Self {
            http: http_client(std::time::Duration::from_secs(10)),
            base_url,
        }
    }

    /// Replace the default `reqwest::Client` with a custom one.
    pub fn with_http_client(mut self, client: Client) -> Self {
        self.http = client;
        self
    }

    /// `GET /rates` – current quotes for every supported currency.
    #[tracing::instrument(skip_all, err, name = "HTTP:GetRates")]
    pub async fn get_rates(&self) -> Result<Vec<RateQuote>, ClientError> {
        let url = self.base_url.join("rates")?;
        let resp = self.http.get(url).send().await?;
        let body: RatesResponse = parse_response(resp).await?;
        Ok(body.quotes)
    }
}
