use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::chart::TimeRange;
use crate::duration::deserialize_duration;
use crate::models::{FiatCurrency, Network};

pub const MORALIS_API_BASE: &str = "https://deep-index.moralis.io/api/v2.2";
pub const COINGECKO_API_BASE: &str = "https://api.coingecko.com/api/v3";

fn default_timeout() -> Duration {
    Duration::from_secs(10)
}

fn default_user_agent() -> String {
    concat!("walletfolio/", env!("CARGO_PKG_VERSION")).to_string()
}

/// Outbound HTTP settings shared by every API client.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    #[serde(
        default = "default_timeout",
        deserialize_with = "deserialize_duration",
        skip_serializing
    )]
    pub timeout: Duration,

    pub user_agent: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout: default_timeout(),
            user_agent: default_user_agent(),
        }
    }
}

/// Moralis balance indexer settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MoralisConfig {
    pub base_url: String,

    /// Environment variable holding the API key.
    pub api_key_env: String,

    /// EVM chains queried for a MetaMask address.
    pub chains: Vec<Network>,
}

impl Default for MoralisConfig {
    fn default() -> Self {
        Self {
            base_url: MORALIS_API_BASE.to_string(),
            api_key_env: "MORALIS_API_KEY".to_string(),
            chains: vec![Network::Bsc],
        }
    }
}

/// CoinGecko price API settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CoinGeckoConfig {
    /// May point at a same-origin proxy that injects the key itself.
    pub base_url: String,

    /// Environment variable holding the demo API key. Optional.
    pub api_key_env: String,

    /// Maximum number of price lookups in flight.
    pub concurrency: usize,

    /// Symbol to CoinGecko coin id overrides.
    pub symbol_ids: HashMap<String, String>,
}

impl Default for CoinGeckoConfig {
    fn default() -> Self {
        Self {
            base_url: COINGECKO_API_BASE.to_string(),
            api_key_env: "COINGECKO_API_KEY".to_string(),
            concurrency: 4,
            symbol_ids: HashMap::new(),
        }
    }
}

/// Display/output formatting configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    /// Fiat values are rendered with exactly this many decimal places.
    pub currency_decimals: u32,

    /// Render fiat values with thousands separators.
    pub currency_grouping: bool,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            currency_decimals: 2,
            currency_grouping: true,
        }
    }
}

/// Application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Fiat currency selected when the dashboard starts.
    pub default_fiat: FiatCurrency,

    /// Chart range selected when the dashboard starts.
    pub default_range: TimeRange,

    pub http: HttpConfig,

    pub moralis: MoralisConfig,

    pub coingecko: CoinGeckoConfig,

    pub display: DisplayConfig,
}

impl Config {
    /// Load config from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Load config from a file, or return default config if file doesn't exist.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Shared HTTP client honoring the `[http]` section.
    pub fn http_client(&self) -> Result<reqwest::Client> {
        reqwest::Client::builder()
            .timeout(self.http.timeout)
            .user_agent(self.http.user_agent.clone())
            .build()
            .context("Failed to build HTTP client")
    }
}

/// Returns the default config file path.
///
/// Resolution order:
/// 1. `./walletfolio.toml` if it exists in current directory
/// 2. `~/.config/walletfolio/walletfolio.toml` (XDG config directory)
pub fn default_config_path() -> PathBuf {
    let local_config = PathBuf::from("walletfolio.toml");
    if local_config.exists() {
        return local_config;
    }

    if let Some(config_dir) = dirs::config_dir() {
        return config_dir.join("walletfolio").join("walletfolio.toml");
    }

    local_config
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.default_fiat, FiatCurrency::Brl);
        assert_eq!(config.default_range, TimeRange::OneMonth);
        assert_eq!(config.http.timeout, Duration::from_secs(10));
        assert_eq!(config.moralis.chains, vec![Network::Bsc]);
        assert_eq!(config.moralis.api_key_env, "MORALIS_API_KEY");
        assert_eq!(config.coingecko.concurrency, 4);
        assert_eq!(config.display.currency_decimals, 2);
        assert!(config.display.currency_grouping);
    }

    #[test]
    fn test_load_empty_config() -> Result<()> {
        let dir = TempDir::new()?;
        let config_path = dir.path().join("walletfolio.toml");
        std::fs::File::create(&config_path)?;

        let config = Config::load(&config_path)?;
        assert_eq!(config.default_fiat, FiatCurrency::Brl);
        assert_eq!(config.coingecko.base_url, COINGECKO_API_BASE);

        Ok(())
    }

    #[test]
    fn test_load_full_config() -> Result<()> {
        let dir = TempDir::new()?;
        let config_path = dir.path().join("walletfolio.toml");

        let mut file = std::fs::File::create(&config_path)?;
        writeln!(file, "default_fiat = \"EUR\"")?;
        writeln!(file, "default_range = \"1D\"")?;
        writeln!(file, "[http]")?;
        writeln!(file, "timeout = \"2500ms\"")?;
        writeln!(file, "[moralis]")?;
        writeln!(file, "chains = [\"BSC\", \"ETH\"]")?;
        writeln!(file, "[coingecko]")?;
        writeln!(file, "base_url = \"http://localhost:5173/api/coingecko\"")?;
        writeln!(file, "concurrency = 8")?;
        writeln!(file, "[coingecko.symbol_ids]")?;
        writeln!(file, "CAKE = \"pancakeswap-token\"")?;
        writeln!(file, "[display]")?;
        writeln!(file, "currency_grouping = false")?;

        let config = Config::load(&config_path)?;
        assert_eq!(config.default_fiat, FiatCurrency::Eur);
        assert_eq!(config.default_range, TimeRange::OneDay);
        assert_eq!(config.http.timeout, Duration::from_millis(2500));
        assert_eq!(config.moralis.chains, vec![Network::Bsc, Network::Eth]);
        assert_eq!(
            config.coingecko.base_url,
            "http://localhost:5173/api/coingecko"
        );
        assert_eq!(config.coingecko.concurrency, 8);
        assert_eq!(
            config.coingecko.symbol_ids.get("CAKE").map(String::as_str),
            Some("pancakeswap-token")
        );
        assert!(!config.display.currency_grouping);
        assert_eq!(config.display.currency_decimals, 2);

        Ok(())
    }

    #[test]
    fn test_invalid_fiat_is_rejected() -> Result<()> {
        let dir = TempDir::new()?;
        let config_path = dir.path().join("walletfolio.toml");

        let mut file = std::fs::File::create(&config_path)?;
        writeln!(file, "default_fiat = \"GBP\"")?;

        assert!(Config::load(&config_path).is_err());

        Ok(())
    }

    #[test]
    fn test_load_or_default_missing_file() -> Result<()> {
        let dir = TempDir::new()?;
        let config = Config::load_or_default(&dir.path().join("missing.toml"))?;
        assert_eq!(config.moralis.base_url, MORALIS_API_BASE);
        Ok(())
    }
}
