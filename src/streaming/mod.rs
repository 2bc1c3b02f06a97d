pub mod powerbi;

pub use powerbi::PowerBiClient;
