mod asset;
mod fiat;
mod network;
mod wallet;

pub use asset::{Asset, PriceKey};
pub use fiat::{FiatCurrency, FiatInfo};
pub use network::{Network, NetworkFilter};
pub use wallet::{ConnectedWallet, ConnectionState, WalletKind};
