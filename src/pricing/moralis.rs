//! Moralis ERC-20 token price source.
//!
//! Prices contract keys on EVM chains via `GET /erc20/{address}/price`. Used
//! behind CoinGecko for tokens CoinGecko does not list.

use reqwest::{Client, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use serde_json::Value;

use crate::config::MORALIS_API_BASE;
use crate::error::Error;
use crate::models::PriceKey;

use super::{PriceQuote, PriceSource};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TokenPriceResponse {
    usd_price: Option<f64>,
    /// Moralis sends this as a numeric string.
    #[serde(rename = "24hrPercentChange", default)]
    change_24h: Option<Value>,
}

fn number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

pub struct MoralisPriceSource {
    client: Client,
    base_url: String,
    api_key: SecretString,
}

impl MoralisPriceSource {
    pub fn new(api_key: SecretString) -> Self {
        Self {
            client: Client::new(),
            base_url: MORALIS_API_BASE.to_string(),
            api_key,
        }
    }

    pub fn with_client(mut self, client: Client) -> Self {
        self.client = client;
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }
}

#[async_trait::async_trait]
impl PriceSource for MoralisPriceSource {
    fn name(&self) -> &str {
        "moralis"
    }

    async fn quote(&self, key: &PriceKey) -> Result<Option<PriceQuote>, Error> {
        let PriceKey::Contract { network, address } = key else {
            return Ok(None);
        };
        let Some(chain) = network.evm_chain_id() else {
            return Ok(None);
        };

        let path = format!("/erc20/{address}/price");
        tracing::debug!(endpoint = %path, chain, "Moralis price request");
        let response = self
            .client
            .get(format!("{}{}", self.base_url, path))
            .query(&[("chain", chain)])
            .header("accept", "application/json")
            .header("X-API-Key", self.api_key.expose_secret())
            .send()
            .await
            .map_err(|source| Error::Transport {
                endpoint: path.clone(),
                source,
            })?;

        let status = response.status();
        // Unknown tokens (no liquidity pools) come back as 404.
        if status == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::HttpStatus {
                endpoint: path,
                status: status.as_u16(),
                body,
            });
        }

        let body = response.text().await.map_err(|source| Error::Transport {
            endpoint: path.clone(),
            source,
        })?;
        let parsed: TokenPriceResponse =
            serde_json::from_str(&body).map_err(|e| Error::data_shape(&path, e.to_string()))?;

        Ok(parsed.usd_price.map(|price| PriceQuote {
            price_usd: price,
            change_24h: parsed.change_24h.as_ref().and_then(number),
            change_7d: None,
        }))
    }
}
