use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Blockchain a balance or price query targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Network {
    Eth,
    Bsc,
    Solana,
    Cardano,
}

impl Network {
    pub const ALL: [Network; 4] = [Network::Eth, Network::Bsc, Network::Solana, Network::Cardano];

    /// Short tag used by filters and asset rows.
    pub fn as_str(&self) -> &'static str {
        match self {
            Network::Eth => "ETH",
            Network::Bsc => "BSC",
            Network::Solana => "SOLANA",
            Network::Cardano => "CARDANO",
        }
    }

    /// Hex chain id of an EVM network, as the Moralis API expects it.
    pub fn evm_chain_id(&self) -> Option<&'static str> {
        match self {
            Network::Eth => Some("0x1"),
            Network::Bsc => Some("0x38"),
            Network::Solana | Network::Cardano => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Network::Eth => "Ethereum",
            Network::Bsc => "BSC",
            Network::Solana => "Solana",
            Network::Cardano => "Cardano",
        }
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Network {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "ETH" | "ETHEREUM" => Ok(Network::Eth),
            "BSC" | "BNB" => Ok(Network::Bsc),
            "SOLANA" | "SOL" => Ok(Network::Solana),
            "CARDANO" | "ADA" => Ok(Network::Cardano),
            other => Err(format!("unknown network: {other}")),
        }
    }
}

/// Network selection for the dashboard views.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum NetworkFilter {
    #[default]
    All,
    Only(Network),
}

impl NetworkFilter {
    pub fn matches(&self, network: Network) -> bool {
        match self {
            NetworkFilter::All => true,
            NetworkFilter::Only(selected) => *selected == network,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            NetworkFilter::All => "All networks",
            NetworkFilter::Only(network) => network.label(),
        }
    }
}

impl fmt::Display for NetworkFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NetworkFilter::All => f.write_str("ALL"),
            NetworkFilter::Only(network) => network.fmt(f),
        }
    }
}

impl FromStr for NetworkFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case("ALL") {
            return Ok(NetworkFilter::All);
        }
        s.parse().map(NetworkFilter::Only)
    }
}

impl From<Network> for NetworkFilter {
    fn from(network: Network) -> Self {
        NetworkFilter::Only(network)
    }
}

impl From<NetworkFilter> for String {
    fn from(filter: NetworkFilter) -> Self {
        filter.to_string()
    }
}

impl TryFrom<String> for NetworkFilter {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_tags_case_insensitively() {
        assert_eq!("bsc".parse::<Network>().unwrap(), Network::Bsc);
        assert_eq!("Solana".parse::<Network>().unwrap(), Network::Solana);
        assert!("DOGE".parse::<Network>().is_err());
    }

    #[test]
    fn filter_round_trips_through_tag() {
        assert_eq!("ALL".parse::<NetworkFilter>().unwrap(), NetworkFilter::All);
        assert_eq!(
            "CARDANO".parse::<NetworkFilter>().unwrap(),
            NetworkFilter::Only(Network::Cardano)
        );
        assert_eq!(NetworkFilter::Only(Network::Eth).to_string(), "ETH");
    }

    #[test]
    fn network_serializes_as_upper_case_tag() {
        let json = serde_json::to_string(&Network::Solana).unwrap();
        assert_eq!(json, r#""SOLANA""#);
        let json = serde_json::to_string(&NetworkFilter::All).unwrap();
        assert_eq!(json, r#""ALL""#);
    }
}
