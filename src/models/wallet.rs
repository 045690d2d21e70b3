use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::Network;

/// Supported wallet-provider integrations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum WalletKind {
    MetaMask,
    Phantom,
    Yoroi,
}

impl WalletKind {
    pub const ALL: [WalletKind; 3] = [WalletKind::MetaMask, WalletKind::Phantom, WalletKind::Yoroi];

    /// Network filters a connected wallet of this kind unlocks.
    ///
    /// MetaMask controls both Ethereum and BSC accounts.
    pub fn networks(&self) -> &'static [Network] {
        match self {
            WalletKind::MetaMask => &[Network::Eth, Network::Bsc],
            WalletKind::Phantom => &[Network::Solana],
            WalletKind::Yoroi => &[Network::Cardano],
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            WalletKind::MetaMask => "MetaMask",
            WalletKind::Phantom => "Phantom",
            WalletKind::Yoroi => "Yoroi",
        }
    }
}

impl fmt::Display for WalletKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for WalletKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "metamask" => Ok(WalletKind::MetaMask),
            "phantom" => Ok(WalletKind::Phantom),
            "yoroi" => Ok(WalletKind::Yoroi),
            other => Err(format!("unknown wallet: {other}")),
        }
    }
}

/// A wallet the user has connected, with its resolved text address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectedWallet {
    pub kind: WalletKind,
    pub address: String,
}

impl ConnectedWallet {
    pub fn new(kind: WalletKind, address: impl Into<String>) -> Self {
        Self {
            kind,
            address: address.into(),
        }
    }
}

/// Per-kind connection lifecycle. A failed attempt goes straight back to
/// `Disconnected`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionState {
    #[default]
    Disconnected,
    Connecting,
    Connected,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn metamask_unlocks_two_networks() {
        assert_eq!(WalletKind::MetaMask.networks(), &[Network::Eth, Network::Bsc]);
        assert_eq!(WalletKind::Yoroi.networks(), &[Network::Cardano]);
    }

    #[test]
    fn parses_wallet_names() {
        assert_eq!("MetaMask".parse::<WalletKind>().unwrap(), WalletKind::MetaMask);
        assert_eq!("yoroi".parse::<WalletKind>().unwrap(), WalletKind::Yoroi);
        assert!("ledger".parse::<WalletKind>().is_err());
    }
}
