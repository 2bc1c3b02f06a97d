pub mod connector;
pub mod mysql;

pub use connector::{Connector, MySqlConnector};
pub use mysql::MySqlStore;
