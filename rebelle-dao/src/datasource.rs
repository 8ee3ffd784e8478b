use futures::future::BoxFuture;
use sqlx::pool::PoolConnection;
use sqlx::{Database, Pool};

/// A connection factory that can be published in the directory.
///
/// Each call hands out one connection; dropping the connection returns it to
/// wherever it came from.
pub trait DataSource: Send + Sync + 'static {
    type Connection: Send;
    type Error: std::error::Error + Send + Sync + 'static;

    fn get_connection(&self) -> BoxFuture<'_, Result<Self::Connection, Self::Error>>;
}

impl<DB: Database> DataSource for Pool<DB> {
    type Connection = PoolConnection<DB>;
    type Error = sqlx::Error;

    fn get_connection(&self) -> BoxFuture<'_, Result<Self::Connection, Self::Error>> {
        Box::pin(self.acquire())
    }
}
