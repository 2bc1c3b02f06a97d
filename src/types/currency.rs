use serde::{Deserialize, Serialize};

/// Three-letter codes that are crypto assets despite looking like ISO fiat codes.
pub const CRYPTO_CODE_EXCEPTIONS: [&str; 5] = ["btc", "eth", "bnb", "ada", "dot"];

/// Classifies a supported currency code as crypto (`true`) or fiat (`false`).
///
/// Heuristic: ISO 4217 fiat codes are three letters, so anything longer is treated
/// as crypto, plus the fixed exception list of three-letter crypto tickers.
pub fn is_crypto_code(code: &str) -> bool {
    let code = code.to_ascii_lowercase();
    code.chars().count() > 3 || CRYPTO_CODE_EXCEPTIONS.contains(&code.as_str())
}

/// Supported quote currencies, in provider order.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CurrencyList(pub Vec<String>);

impl CurrencyList {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Pairs each code with its crypto/fiat classification.
    pub fn classified(&self) -> impl Iterator<Item = (&str, bool)> {
        self.0.iter().map(|code| (code.as_str(), is_crypto_code(code)))
    }
}
