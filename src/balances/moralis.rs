//! Moralis EVM balance fetcher.
//!
//! Reads native-coin and ERC-20 balances from the Moralis Web3 Data API:
//! - `GET /{address}/balance?chain=0x38`
//! - `GET /{address}/erc20?chain=0x38`
//!
//! Both calls for a chain run concurrently. One wallet can be fetched on
//! several EVM chains; each chain is fetched concurrently too.

use futures::future::join_all;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;

use crate::config::MORALIS_API_BASE;
use crate::error::Error;
use crate::models::{Asset, Network};

use super::{scale_raw_amount, BalanceFetcher, BalanceReport};

const NATIVE_DECIMALS: u32 = 18;

#[derive(Debug, Deserialize)]
struct NativeBalanceResponse {
    #[serde(default)]
    balance: Option<String>,
}

#[derive(Debug, Deserialize)]
struct MoralisToken {
    token_address: String,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    symbol: Option<String>,
    /// Number or numeric string depending on the endpoint version.
    #[serde(default)]
    decimals: Option<Value>,
    balance: String,
    #[serde(default)]
    possible_spam: bool,
}

impl MoralisToken {
    fn decimals(&self) -> Option<u32> {
        match self.decimals.as_ref()? {
            Value::Number(n) => n.as_u64().and_then(|d| u32::try_from(d).ok()),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }
}

/// Symbol and display name of a chain's own coin.
fn native_coin(network: Network) -> (&'static str, &'static str) {
    match network {
        Network::Bsc => ("BNB", "BNB"),
        _ => ("ETH", "Ethereum"),
    }
}

/// Moralis balance fetcher for EVM wallets.
pub struct MoralisBalanceFetcher {
    client: Client,
    base_url: String,
    api_key: SecretString,
    chains: Vec<Network>,
}

impl MoralisBalanceFetcher {
    /// Creates a fetcher for BSC, the chain MetaMask wallets are read from by default.
    pub fn new(api_key: SecretString) -> Self {
        Self {
            client: Client::new(),
            base_url: MORALIS_API_BASE.to_string(),
            api_key,
            chains: vec![Network::Bsc],
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

    /// Non-EVM networks are ignored with a warning.
    pub fn with_chains(mut self, chains: Vec<Network>) -> Self {
        self.chains = chains
            .into_iter()
            .filter(|network| {
                let supported = network.evm_chain_id().is_some();
                if !supported {
                    tracing::warn!(network = %network, "Moralis fetcher only supports EVM chains; skipping");
                }
                supported
            })
            .collect();
        self
    }

    pub fn chains(&self) -> &[Network] {
        &self.chains
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str, chain: &str) -> Result<T, Error> {
        let url = format!("{}{}", self.base_url, path);
        tracing::debug!(endpoint = path, chain, "Moralis request");

        let response = self
            .client
            .get(&url)
            .query(&[("chain", chain)])
            .header("accept", "application/json")
            .header("X-API-Key", self.api_key.expose_secret())
            .send()
            .await
            .map_err(|source| Error::Transport {
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

    async fn native_asset(&self, address: &str, network: Network) -> Result<Option<Asset>, Error> {
        let chain = network.evm_chain_id().unwrap_or_default();
        let path = format!("/{address}/balance");
        let response: NativeBalanceResponse = self.get_json(&path, chain).await?;

        let Some(raw) = response.balance.filter(|b| !b.trim().is_empty()) else {
            return Ok(None);
        };
        let balance = scale_raw_amount(&raw, NATIVE_DECIMALS)
            .ok_or_else(|| Error::data_shape(&path, format!("invalid native balance {raw:?}")))?;

        let (symbol, name) = native_coin(network);
        Ok(Some(Asset::native(network, symbol, name, balance)))
    }

    async fn token_assets(&self, address: &str, network: Network) -> BalanceReport {
        let chain = network.evm_chain_id().unwrap_or_default();
        let path = format!("/{address}/erc20");

        let body: Value = match self.get_json(&path, chain).await {
            Ok(body) => body,
            Err(e) => return BalanceReport::failed(e),
        };
        let Value::Array(entries) = body else {
            return BalanceReport::failed(Error::data_shape(&path, "token list is not an array"));
        };

        let mut report = BalanceReport::default();
        for entry in entries {
            let token: MoralisToken = match serde_json::from_value(entry) {
                Ok(token) => token,
                Err(e) => {
                    report
                        .diagnostics
                        .push(Error::data_shape(&path, format!("skipping token entry: {e}")));
                    continue;
                }
            };
            if token.possible_spam {
                continue;
            }

            let Some(balance) = token
                .decimals()
                .and_then(|decimals| scale_raw_amount(&token.balance, decimals))
            else {
                report.diagnostics.push(Error::data_shape(
                    &path,
                    format!("unreadable balance for token {}", token.token_address),
                ));
                continue;
            };

            let asset = Asset::token(
                network,
                token.token_address,
                token.name.unwrap_or_default(),
                token.symbol.unwrap_or_default(),
                balance,
            );
            // Spam tokens typically ship without a symbol or name.
            if asset.has_metadata() {
                report.assets.push(asset);
            }
        }
        report
    }

    async fn fetch_chain(&self, address: &str, network: Network) -> BalanceReport {
        let (native, mut tokens) = tokio::join!(
            self.native_asset(address, network),
            self.token_assets(address, network)
        );

        let mut report = BalanceReport::default();
        match native {
            Ok(Some(asset)) => report.assets.push(asset),
            Ok(None) => {}
            Err(e) => report.diagnostics.push(e),
        }
        report.assets.append(&mut tokens.assets);
        report.diagnostics.append(&mut tokens.diagnostics);

        for error in &report.diagnostics {
            tracing::warn!(network = %network, error = %error, "Moralis balance fetch degraded");
        }
        report
    }
}

#[async_trait::async_trait]
impl BalanceFetcher for MoralisBalanceFetcher {
    fn name(&self) -> &str {
        "moralis"
    }

    async fn fetch_balances(&self, address: &str) -> BalanceReport {
        let reports = join_all(
            self.chains
                .iter()
                .map(|network| self.fetch_chain(address, *network)),
        )
        .await;

        let mut combined = BalanceReport::default();
        for report in reports {
            combined.extend(report);
        }
        tracing::debug!(
            address,
            assets = combined.assets.len(),
            problems = combined.diagnostics.len(),
            "Moralis balances fetched"
        );
        combined
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_token_with_numeric_or_string_decimals() {
        let numeric: MoralisToken = serde_json::from_str(
            r#"{"token_address":"0xabc","name":"Token","symbol":"TKN","decimals":18,"balance":"1"}"#,
        )
        .unwrap();
        assert_eq!(numeric.decimals(), Some(18));

        let string: MoralisToken = serde_json::from_str(
            r#"{"token_address":"0xabc","name":"Token","symbol":"TKN","decimals":"6","balance":"1"}"#,
        )
        .unwrap();
        assert_eq!(string.decimals(), Some(6));
    }

    #[test]
    fn missing_metadata_defaults_to_none() {
        let token: MoralisToken =
            serde_json::from_str(r#"{"token_address":"0xabc","balance":"1","decimals":null}"#)
                .unwrap();
        assert!(token.name.is_none());
        assert!(token.symbol.is_none());
        assert_eq!(token.decimals(), None);
        assert!(!token.possible_spam);
    }

    #[test]
    fn with_chains_drops_non_evm_networks() {
        let fetcher = MoralisBalanceFetcher::new(SecretString::from("key".to_string()))
            .with_chains(vec![Network::Eth, Network::Cardano, Network::Bsc]);
        assert_eq!(fetcher.chains(), &[Network::Eth, Network::Bsc]);
    }
}
