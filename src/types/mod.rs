pub mod currency;
pub mod exchange_rate;
pub mod holdings;
pub mod price;
pub mod row;
pub mod timestamp;

pub use currency::{is_crypto_code, CurrencyList};
pub use exchange_rate::{CurrencyType, ExchangeRate, ExchangeRateSet};
pub use holdings::{CompanyHolding, CompanyHoldingsReport, HoldingsSummary};
pub use price::{PriceQuote, PriceSnapshot};
pub use row::{CompanyRow, DatasetKind, ExchangeRateRow, FormattedRow, PriceRow, PushOutcome};
pub use timestamp::{Clock, FixedClock, SystemClock};
