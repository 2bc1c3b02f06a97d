use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// All rates from `/exchange_rates` are quoted against this asset.
pub const BASE_ASSET: &str = "BTC";

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CurrencyType {
    Fiat,
    Crypto,
    Commodity,
    #[default]
    #[serde(other)]
    Unknown,
}

impl CurrencyType {
    pub fn as_str(&self) -> &'static str {
        match self {
            CurrencyType::Fiat => "fiat",
            CurrencyType::Crypto => "crypto",
            CurrencyType::Commodity => "commodity",
            CurrencyType::Unknown => "unknown",
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ExchangeRate {
    pub name: Option<String>,
    pub unit: Option<String>,
    pub value: Option<f64>,
    #[serde(rename = "type")]
    pub currency_type: Option<CurrencyType>,
}

impl ExchangeRate {
    pub fn currency_type(&self) -> CurrencyType {
        self.currency_type.unwrap_or_default()
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ExchangeRateSet {
    #[serde(default)]
    pub rates: BTreeMap<String, ExchangeRate>,
}

impl ExchangeRateSet {
    pub fn get(&self, code: &str) -> Option<&ExchangeRate> {
        self.rates.get(code)
    }

    pub fn len(&self) -> usize {
        self.rates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rates.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_provider_payload() {
        let raw = r#"{
            "rates": {
                "usd": {"name": "US Dollar", "unit": "$", "value": 65000.12, "type": "fiat"},
                "xau": {"name": "Gold - Troy Ounce", "unit": "XAU", "value": 27.1, "type": "commodity"},
                "sats": {"name": "Satoshi", "unit": "sats", "value": 100000000, "type": "crypto"},
                "zzz": {"name": "Mystery", "value": 1.0, "type": "novelty"}
            }
        }"#;
        let set: ExchangeRateSet = serde_json::from_str(raw).unwrap();

        assert_eq!(set.len(), 4);
        assert_eq!(set.get("usd").unwrap().currency_type(), CurrencyType::Fiat);
        assert_eq!(set.get("xau").unwrap().currency_type(), CurrencyType::Commodity);
        assert_eq!(set.get("sats").unwrap().value, Some(100000000.0));
        assert_eq!(set.get("zzz").unwrap().currency_type(), CurrencyType::Unknown);
        assert_eq!(set.get("zzz").unwrap().unit, None);
    }

    #[test]
    fn test_missing_rates_is_empty() {
        let set: ExchangeRateSet = serde_json::from_str("{}").unwrap();
        assert!(set.is_empty());
    }
}
