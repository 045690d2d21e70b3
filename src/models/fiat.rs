use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Display currencies the dashboard can convert into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum FiatCurrency {
    Usd,
    #[default]
    Brl,
    Eur,
}

/// Symbol and USD conversion rate for one fiat currency.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FiatInfo {
    pub code: FiatCurrency,
    pub symbol: &'static str,
    /// Units of this currency per 1 USD.
    pub rate: f64,
}

const FIAT_TABLE: [FiatInfo; 3] = [
    FiatInfo {
        code: FiatCurrency::Usd,
        symbol: "$",
        rate: 1.0,
    },
    FiatInfo {
        code: FiatCurrency::Brl,
        symbol: "R$",
        rate: 5.10,
    },
    FiatInfo {
        code: FiatCurrency::Eur,
        symbol: "€",
        rate: 0.92,
    },
];

impl FiatCurrency {
    pub const ALL: [FiatCurrency; 3] = [FiatCurrency::Usd, FiatCurrency::Brl, FiatCurrency::Eur];

    pub fn info(&self) -> FiatInfo {
        match self {
            FiatCurrency::Usd => FIAT_TABLE[0],
            FiatCurrency::Brl => FIAT_TABLE[1],
            FiatCurrency::Eur => FIAT_TABLE[2],
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            FiatCurrency::Usd => "USD",
            FiatCurrency::Brl => "BRL",
            FiatCurrency::Eur => "EUR",
        }
    }
}

impl fmt::Display for FiatCurrency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for FiatCurrency {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "USD" => Ok(FiatCurrency::Usd),
            "BRL" => Ok(FiatCurrency::Brl),
            "EUR" => Ok(FiatCurrency::Eur),
            other => Err(format!("unsupported fiat currency: {other}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_entries_match_their_codes() {
        for fiat in FiatCurrency::ALL {
            assert_eq!(fiat.info().code, fiat);
        }
        assert_eq!(FiatCurrency::Brl.info().symbol, "R$");
        assert_eq!(FiatCurrency::Eur.info().rate, 0.92);
        assert_eq!(FiatCurrency::Usd.info().rate, 1.0);
    }

    #[test]
    fn parses_codes() {
        assert_eq!("brl".parse::<FiatCurrency>().unwrap(), FiatCurrency::Brl);
        assert!("GBP".parse::<FiatCurrency>().is_err());
    }
}
