//! Connection check through the data source provider

use anyhow::{Context, Result};
use futures::future::try_join_all;
use rebelle_dao::{DataSourceProvider, DEFAULT_JNDI};
use sqlx::PgPool;

pub async fn run(
    provider: &DataSourceProvider<PgPool>,
    name: Option<String>,
    concurrency: usize,
) -> Result<()> {
    let name = name.unwrap_or_else(|| DEFAULT_JNDI.to_string());
    tracing::info!("Checking data source '{}' with {} connection(s)", name, concurrency);

    let checks = (0..concurrency.max(1)).map(|_| query_version(provider, &name));
    let versions = try_join_all(checks).await?;

    let pool = provider.get(&name)?;
    println!("✓ Data source '{}' is reachable", name);
    println!("  Version: {}", versions[0]);
    println!("  Connections borrowed: {}", versions.len());
    println!("  Pool size: {} ({} idle)", pool.size(), pool.num_idle());

    Ok(())
}

async fn query_version(provider: &DataSourceProvider<PgPool>, name: &str) -> Result<String> {
    provider
        .with_connection(name, |conn| {
            Box::pin(async move {
                let (version,): (String,) = sqlx::query_as("SELECT version()")
                    .fetch_one(&mut **conn)
                    .await
                    .context("Failed to query version")?;
                Ok::<_, anyhow::Error>(version)
            })
        })
        .await
        .with_context(|| format!("Connection check failed for '{}'", name))
}
