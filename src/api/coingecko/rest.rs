use crate::error::FetchError;
use crate::monitor::PriceSource;
use async_trait::async_trait;
use log::debug;
use reqwest::Client;
use std::collections::HashMap;

const COINGECKO_SIMPLE_PRICE_URL: &str = "https://api.coingecko.com/api/v3/simple/price";
const VS_CURRENCY: &str = "usd";

/// Spot USD price for one CoinGecko asset id via `/simple/price`.
pub struct CoinGeckoClient {
    client: Client,
    base_url: String,
    asset_id: String,
}

impl CoinGeckoClient {
    pub fn new(client: Client, asset_id: impl Into<String>) -> Self {
        Self {
            client,
            base_url: COINGECKO_SIMPLE_PRICE_URL.to_string(),
            asset_id: asset_id.into(),
        }
    }
}

#[async_trait]
impl PriceSource for CoinGeckoClient {
    async fn fetch_price(&self) -> Result<f64, FetchError> {
        debug!("GET {} ids={}", self.base_url, self.asset_id);

        let resp = self
            .client
            .get(&self.base_url)
            .query(&[("ids", self.asset_id.as_str()), ("vs_currencies", VS_CURRENCY)])
            .header("accept", "application/json")
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            return Err(FetchError::Status(status));
        }

        let body = resp.bytes().await?;
        parse_simple_price(&body, &self.asset_id)
    }
}

/// Pulls the USD price out of `{ "<asset>": { "usd": <number> } }`.
pub fn parse_simple_price(body: &[u8], asset_id: &str) -> Result<f64, FetchError> {
    let parsed: HashMap<String, HashMap<String, serde_json::Value>> =
        serde_json::from_slice(body)?;

    let price = parsed
        .get(asset_id)
        .and_then(|quotes| quotes.get(VS_CURRENCY))
        .and_then(serde_json::Value::as_f64)
        .ok_or_else(|| FetchError::MissingPrice {
            asset: asset_id.to_string(),
            currency: VS_CURRENCY.to_string(),
        })?;

    if !price.is_finite() || price <= 0.0 {
        return Err(FetchError::InvalidPrice(price));
    }
    Ok(price)
}
