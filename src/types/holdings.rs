use serde::{Deserialize, Serialize};

/// One public company's bitcoin treasury position.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct CompanyHolding {
    pub name: Option<String>,
    pub symbol: Option<String>,
    pub country: Option<String>,
    pub total_holdings: Option<f64>,
    pub total_entry_value_usd: Option<f64>,
    pub total_current_value_usd: Option<f64>,
    pub percentage_of_total_supply: Option<f64>,
}

/// Response of `/companies/public_treasury/bitcoin`. Company order is the provider's.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct CompanyHoldingsReport {
    #[serde(alias = "total_holdings_btc")]
    pub total_holdings: Option<f64>,
    pub total_value_usd: Option<f64>,
    pub market_cap_dominance: Option<f64>,
    #[serde(default)]
    pub companies: Vec<CompanyHolding>,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HoldingsSummary {
    pub total_holdings: f64,
    pub total_value_usd: f64,
    pub companies_count: usize,
    pub market_cap_dominance: f64,
}

impl CompanyHoldingsReport {
    pub fn summary(&self) -> HoldingsSummary {
        HoldingsSummary {
            total_holdings: self.total_holdings.unwrap_or(0.0),
            total_value_usd: self.total_value_usd.unwrap_or(0.0),
            companies_count: self.companies.len(),
            market_cap_dominance: self.market_cap_dominance.unwrap_or(0.0),
        }
    }
}
