use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One asset's quote as returned by `/simple/price`. Every field is optional upstream.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PriceQuote {
    pub usd: Option<f64>,
    pub aud: Option<f64>,
    pub usd_market_cap: Option<f64>,
    pub usd_24h_vol: Option<f64>,
    pub usd_24h_change: Option<f64>,
    pub last_updated_at: Option<i64>,
}

/// Quotes for one poll, keyed by lowercase asset symbol.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(from = "BTreeMap<String, PriceQuote>")]
pub struct PriceSnapshot {
    quotes: BTreeMap<String, PriceQuote>,
}

impl PriceSnapshot {
    pub fn new() -> Self {
        PriceSnapshot::default()
    }

    pub fn insert(&mut self, asset: &str, quote: PriceQuote) {
        self.quotes.insert(asset.to_lowercase(), quote);
    }

    pub fn get(&self, asset: &str) -> Option<&PriceQuote> {
        self.quotes.get(&asset.to_lowercase())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &PriceQuote)> {
        self.quotes.iter().map(|(asset, quote)| (asset.as_str(), quote))
    }

    pub fn len(&self) -> usize {
        self.quotes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.quotes.is_empty()
    }
}

impl From<BTreeMap<String, PriceQuote>> for PriceSnapshot {
    fn from(raw: BTreeMap<String, PriceQuote>) -> Self {
        raw.into_iter().collect()
    }
}

impl FromIterator<(String, PriceQuote)> for PriceSnapshot {
    fn from_iter<I: IntoIterator<Item = (String, PriceQuote)>>(iter: I) -> Self {
        let mut snapshot = PriceSnapshot::new();
        for (asset, quote) in iter {
            snapshot.insert(&asset, quote);
        }
        snapshot
    }
}
