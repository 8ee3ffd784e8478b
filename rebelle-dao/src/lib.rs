//! Rebelle DAO - data source lookup and pooled connection helpers
//!
//! Data sources are published in a [`Directory`] under names such as
//! [`DEFAULT_JNDI`] and resolved once per process by a
//! [`DataSourceProvider`], which also runs work with a borrowed connection.
//!
//! # Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use rebelle_dao::{Config, DataSourceProvider, Directory};
//!
//! # async fn example() -> anyhow::Result<()> {
//! let directory = Arc::new(Directory::new());
//! Config::load()?.bind_all(&directory)?;
//!
//! let provider: DataSourceProvider<sqlx::PgPool> = DataSourceProvider::new(directory);
//! let count: i64 = provider
//!     .with_default_connection(|conn| {
//!         Box::pin(async move {
//!             let (n,): (i64,) = sqlx::query_as("SELECT count(*) FROM members")
//!                 .fetch_one(&mut **conn)
//!                 .await?;
//!             Ok::<_, anyhow::Error>(n)
//!         })
//!     })
//!     .await?;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod datasource;
pub mod error;
pub mod names;
pub mod naming;
pub mod provider;
mod work;

#[cfg(test)]
mod testing;

// Re-export key types for convenience
pub use config::{BindingConfig, Config};
pub use datasource::DataSource;
pub use error::LookupError;
pub use names::{DEFAULT_JNDI, ENV_CONTEXT};
pub use naming::{Binding, Context, Directory, NamingContext};
pub use provider::DataSourceProvider;
