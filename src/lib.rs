pub mod config;
pub mod core;
pub mod error;
pub mod formatter;
pub mod interfaces;
pub mod observability;
pub mod price_infra;
pub mod storage;
pub mod streaming;
pub mod types;
