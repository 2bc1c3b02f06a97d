pub mod persistence;
pub mod price_source;
pub mod streaming_sink;

pub use persistence::Persistence;
pub use price_source::PriceSource;
pub use streaming_sink::StreamingSink;

#[cfg(test)]
pub use persistence::MockPersistence;
#[cfg(test)]
pub use price_source::MockPriceSource;
#[cfg(test)]
pub use streaming_sink::MockStreamingSink;
