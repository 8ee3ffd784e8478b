//! Run work with a borrowed connection

use futures::future::BoxFuture;

use crate::datasource::DataSource;
use crate::error::LookupError;
use crate::names::DEFAULT_JNDI;
use crate::provider::DataSourceProvider;

impl<D: DataSource> DataSourceProvider<D> {
    /// Borrow one connection from the data source bound to `name`, run `work`
    /// with it and give it back.
    ///
    /// The connection is released on every path out of this function,
    /// including a panic inside `work`. Errors from the lookup, from
    /// acquiring the connection, and from `work` reach the caller unchanged;
    /// the caller picks `E`, which only has to accept the first two.
    ///
    /// ```rust,no_run
    /// # use rebelle_dao::DataSourceProvider;
    /// # async fn example(provider: &DataSourceProvider<sqlx::PgPool>) -> anyhow::Result<()> {
    /// let version: String = provider
    ///     .with_connection("JDBC/FRENCHY", |conn| {
    ///         Box::pin(async move {
    ///             let (v,): (String,) = sqlx::query_as("SELECT version()")
    ///                 .fetch_one(&mut **conn)
    ///                 .await?;
    ///             Ok::<_, anyhow::Error>(v)
    ///         })
    ///     })
    ///     .await?;
    /// # Ok(())
    /// # }
    /// ```
    pub async fn with_connection<T, E, F>(&self, name: &str, work: F) -> Result<T, E>
    where
        F: for<'c> FnOnce(&'c mut D::Connection) -> BoxFuture<'c, Result<T, E>>,
        E: From<LookupError> + From<D::Error>,
    {
        let data_source = self.get(name)?;
        let mut connection = data_source.get_connection().await?;
        tracing::trace!(name, "Borrowed connection");

        let result = work(&mut connection).await;

        drop(connection);
        tracing::trace!(name, "Released connection");
        result
    }

    /// [`with_connection`](Self::with_connection) against [`DEFAULT_JNDI`].
    pub async fn with_default_connection<T, E, F>(&self, work: F) -> Result<T, E>
    where
        F: for<'c> FnOnce(&'c mut D::Connection) -> BoxFuture<'c, Result<T, E>>,
        E: From<LookupError> + From<D::Error>,
    {
        self.with_connection(DEFAULT_JNDI, work).await
    }
}
