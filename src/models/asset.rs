use serde::{Deserialize, Serialize};

use super::Network;

/// Identifier used to look up an asset's price.
///
/// Native coins and tokens live in different lookup namespaces: a native coin
/// is priced by its symbol, a token by its contract address on a network.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PriceKey {
    Native { symbol: String },
    Contract { network: Network, address: String },
}

impl PriceKey {
    pub fn native(symbol: impl AsRef<str>) -> Self {
        PriceKey::Native {
            symbol: symbol.as_ref().trim().to_uppercase(),
        }
    }

    /// Contract addresses are compared case-insensitively.
    pub fn contract(network: Network, address: impl AsRef<str>) -> Self {
        PriceKey::Contract {
            network,
            address: address.as_ref().trim().to_lowercase(),
        }
    }
}

/// One holding of one wallet on one network.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Asset {
    pub id: String,
    pub name: String,
    pub ticker: String,
    pub network: Network,
    /// Quantity already scaled by the token's decimals.
    pub balance: f64,
    pub price_usd: f64,
    #[serde(rename = "change24h")]
    pub change_24h: f64,
    #[serde(rename = "change7d")]
    pub change_7d: f64,
    pub price_key: PriceKey,
}

impl Asset {
    /// A chain's own coin (BNB on BSC, ETH on Ethereum, ...).
    pub fn native(
        network: Network,
        symbol: impl Into<String>,
        name: impl Into<String>,
        balance: f64,
    ) -> Self {
        let symbol = symbol.into();
        Self {
            id: format!("native:{}:{}", network, symbol.to_uppercase()),
            name: name.into(),
            price_key: PriceKey::native(&symbol),
            ticker: symbol,
            network,
            balance: balance.max(0.0),
            price_usd: 0.0,
            change_24h: 0.0,
            change_7d: 0.0,
        }
    }

    pub fn token(
        network: Network,
        contract: impl Into<String>,
        name: impl Into<String>,
        ticker: impl Into<String>,
        balance: f64,
    ) -> Self {
        let contract = contract.into();
        Self {
            price_key: PriceKey::contract(network, &contract),
            id: contract,
            name: name.into(),
            ticker: ticker.into(),
            network,
            balance: balance.max(0.0),
            price_usd: 0.0,
            change_24h: 0.0,
            change_7d: 0.0,
        }
    }

    pub fn with_prices(mut self, price_usd: f64, change_24h: f64, change_7d: f64) -> Self {
        self.price_usd = price_usd;
        self.change_24h = change_24h;
        self.change_7d = change_7d;
        self
    }

    /// Tokens without a ticker or name are treated as spam.
    pub fn has_metadata(&self) -> bool {
        !self.ticker.trim().is_empty() && !self.name.trim().is_empty()
    }

    pub fn clear_prices(&mut self) {
        self.price_usd = 0.0;
        self.change_24h = 0.0;
        self.change_7d = 0.0;
    }

    pub fn value_usd(&self) -> f64 {
        self.balance * self.price_usd
    }
}
