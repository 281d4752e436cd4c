//! Currency type
//!
//! The fixed set of currencies an account may be denominated in. Accounts
//! persist the string form; the enum exists so requests are validated at the
//! boundary and unsupported codes never reach the store.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Supported currencies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Currency {
    Usd,
    Eur,
    Rmb,
}

/// Error for unsupported currency codes
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unsupported currency: {0}")]
pub struct CurrencyError(pub String);

impl Currency {
    /// All supported currencies
    pub const ALL: [Currency; 3] = [Currency::Usd, Currency::Eur, Currency::Rmb];

    /// The canonical code stored in the accounts table
    pub fn as_str(&self) -> &'static str {
        match self {
            Currency::Usd => "USD",
            Currency::Eur => "EUR",
            Currency::Rmb => "RMB",
        }
    }

    /// Check whether a raw code names a supported currency
    pub fn is_supported(code: &str) -> bool {
        code.parse::<Currency>().is_ok()
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Currency {
    type Err = CurrencyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "USD" => Ok(Currency::Usd),
            "EUR" => Ok(Currency::Eur),
            "RMB" => Ok(Currency::Rmb),
            other => Err(CurrencyError(other.to_string())),
        }
    }
}

impl TryFrom<String> for Currency {
    type Error = CurrencyError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Currency> for String {
    fn from(currency: Currency) -> Self {
        currency.as_str().to_string()
    }
}
