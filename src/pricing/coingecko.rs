//! CoinGecko price source.
//!
//! Native coins are priced through `/coins/markets`, which carries both the
//! 24h and 7d change. Tokens are priced by contract address through
//! `/simple/token_price/{platform}`, which only carries the 24h change.
//!
//! The base URL may point at a proxy that adds the API key itself, so the
//! `x-cg-demo-api-key` header is only sent when a key is configured.

use std::collections::HashMap;

use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::config::COINGECKO_API_BASE;
use crate::error::Error;
use crate::models::{Network, PriceKey};

use super::{PriceQuote, PriceSource};

/// Symbol → CoinGecko coin id for the coins the supported wallets hold.
const KNOWN_IDS: &[(&str, &str)] = &[
    ("BNB", "binancecoin"),
    ("ETH", "ethereum"),
    ("SOL", "solana"),
    ("ADA", "cardano"),
    ("BTC", "bitcoin"),
    ("BTCB", "binance-bitcoin"),
    ("USDT", "tether"),
    ("USDC", "usd-coin"),
    ("BUSD", "binance-usd"),
    ("DAI", "dai"),
    ("CAKE", "pancakeswap-token"),
    ("WBNB", "wbnb"),
    ("WETH", "weth"),
    ("WBTC", "wrapped-bitcoin"),
    ("XRP", "ripple"),
    ("DOGE", "dogecoin"),
    ("MATIC", "matic-network"),
    ("POL", "matic-network"),
    ("LINK", "chainlink"),
    ("UNI", "uniswap"),
];

/// CoinGecko asset platform for token lookups.
fn platform(network: Network) -> Option<&'static str> {
    match network {
        Network::Bsc => Some("binance-smart-chain"),
        Network::Eth => Some("ethereum"),
        Network::Solana => Some("solana"),
        Network::Cardano => None,
    }
}

#[derive(Debug, Deserialize)]
struct MarketEntry {
    id: String,
    current_price: Option<f64>,
    #[serde(default)]
    price_change_percentage_24h: Option<f64>,
    #[serde(default)]
    price_change_percentage_24h_in_currency: Option<f64>,
    #[serde(default)]
    price_change_percentage_7d_in_currency: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct TokenPrice {
    usd: Option<f64>,
    #[serde(default)]
    usd_24h_change: Option<f64>,
}

pub struct CoinGeckoPriceSource {
    client: Client,
    base_url: String,
    api_key: Option<SecretString>,
    symbol_ids: HashMap<String, String>,
}

impl CoinGeckoPriceSource {
    pub fn new() -> Self {
        Self {
            client: Client::new(),
            base_url: COINGECKO_API_BASE.to_string(),
            api_key: None,
            symbol_ids: HashMap::new(),
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

    pub fn with_api_key(mut self, api_key: Option<SecretString>) -> Self {
        self.api_key = api_key;
        self
    }

    /// Symbol → coin id overrides, checked before the built-in table.
    pub fn with_symbol_ids(mut self, ids: HashMap<String, String>) -> Self {
        self.symbol_ids = ids
            .into_iter()
            .map(|(symbol, id)| (symbol.to_uppercase(), id))
            .collect();
        self
    }

    /// Unknown symbols fall back to the lower-cased symbol itself.
    fn coin_id(&self, symbol: &str) -> String {
        let symbol = symbol.to_uppercase();
        if let Some(id) = self.symbol_ids.get(&symbol) {
            return id.clone();
        }
        KNOWN_IDS
            .iter()
            .find(|(known, _)| *known == symbol)
            .map(|(_, id)| id.to_string())
            .unwrap_or_else(|| symbol.to_lowercase())
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<T, Error> {
        let url = format!("{}{}", self.base_url, path);
        tracing::debug!(endpoint = path, "CoinGecko request");

        let mut request = self
            .client
            .get(&url)
            .query(query)
            .header("accept", "application/json");
        if let Some(key) = &self.api_key {
            request = request.header("x-cg-demo-api-key", key.expose_secret());
        }

        let response = request.send().await.map_err(|source| Error::Transport {
            endpoint: path.to_string(),
            source,
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::HttpStatus {
                endpoint: path.to_string(),
                status: status.as_u16(),
                body,
            });
        }

        let body = response.text().await.map_err(|source| Error::Transport {
            endpoint: path.to_string(),
            source,
        })?;
        serde_json::from_str(&body).map_err(|e| Error::data_shape(path, e.to_string()))
    }

    async fn native_quote(&self, symbol: &str) -> Result<Option<PriceQuote>, Error> {
        let id = self.coin_id(symbol);
        let entries: Vec<MarketEntry> = self
            .get_json(
                "/coins/markets",
                &[
                    ("vs_currency", "usd"),
                    ("ids", id.as_str()),
                    ("price_change_percentage", "24h,7d"),
                ],
            )
            .await?;

        let Some(entry) = entries.into_iter().find(|e| e.id == id) else {
            return Ok(None);
        };
        let Some(price) = entry.current_price else {
            return Ok(None);
        };
        Ok(Some(PriceQuote {
            price_usd: price,
            change_24h: entry
                .price_change_percentage_24h_in_currency
                .or(entry.price_change_percentage_24h),
            change_7d: entry.price_change_percentage_7d_in_currency,
        }))
    }

    async fn token_quote(
        &self,
        network: Network,
        address: &str,
    ) -> Result<Option<PriceQuote>, Error> {
        let Some(platform) = platform(network) else {
            return Ok(None);
        };
        let path = format!("/simple/token_price/{platform}");
        let prices: HashMap<String, TokenPrice> = self
            .get_json(
                &path,
                &[
                    ("contract_addresses", address),
                    ("vs_currencies", "usd"),
                    ("include_24hr_change", "true"),
                ],
            )
            .await?;

        // Response keys are contract addresses, normally lower-cased.
        let entry = prices
            .into_iter()
            .find(|(contract, _)| contract.eq_ignore_ascii_case(address))
            .map(|(_, price)| price);
        Ok(entry.and_then(|price| {
            price.usd.map(|usd| PriceQuote {
                price_usd: usd,
                change_24h: price.usd_24h_change,
                change_7d: None,
            })
        }))
    }
}

impl Default for CoinGeckoPriceSource {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl PriceSource for CoinGeckoPriceSource {
    fn name(&self) -> &str {
        "coingecko"
    }

    async fn quote(&self, key: &PriceKey) -> Result<Option<PriceQuote>, Error> {
        match key {
            PriceKey::Native { symbol } => self.native_quote(symbol).await,
            PriceKey::Contract { network, address } => self.token_quote(*network, address).await,
        }
    }
}
