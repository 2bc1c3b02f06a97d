use async_trait::async_trait;
use sqlx::mysql::{MySqlConnectOptions, MySqlConnection};
use sqlx::Connection;
use crate::config::DatabaseConfig;

/// Opens one database connection per sink call.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Connector: Send + Sync {
    async fn connect(&self, settings: &DatabaseConfig) -> Result<MySqlConnection, sqlx::Error>;
}

pub struct MySqlConnector;

#[async_trait]
impl Connector for MySqlConnector {
    async fn connect(&self, settings: &DatabaseConfig) -> Result<MySqlConnection, sqlx::Error> {
        let options = MySqlConnectOptions::new()
            .host(&settings.host)
            .port(settings.port)
            .database(&settings.database)
            .username(&settings.user)
            .password(&settings.password);

        MySqlConnection::connect_with(&options).await
    }
}
