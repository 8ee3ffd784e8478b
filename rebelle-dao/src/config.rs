use std::collections::HashMap;
use std::time::Duration;

use anyhow::{Context, Result};
use sqlx::postgres::PgPoolOptions;

use crate::names::DEFAULT_JNDI;
use crate::naming::Directory;

const DEFAULT_MAX_CONNECTIONS: u32 = 10;
const DEFAULT_ACQUIRE_TIMEOUT_SECS: u64 = 30;

/// One data source to publish in the directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BindingConfig {
    pub name: String,
    pub url: String,
}

impl BindingConfig {
    /// The URL with its password masked, for logs and listings.
    pub fn redacted_url(&self) -> String {
        let Some(scheme_end) = self.url.find("://") else {
            return self.url.clone();
        };
        let authority_start = scheme_end + 3;
        let Some(at) = self.url[authority_start..].find('@').map(|i| i + authority_start) else {
            return self.url.clone();
        };
        match self.url[authority_start..at].find(':') {
            Some(colon) => format!(
                "{}:****{}",
                &self.url[..authority_start + colon],
                &self.url[at..]
            ),
            None => self.url.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub bindings: Vec<BindingConfig>,
    pub max_connections: u32,
    pub acquire_timeout: Duration,
}

impl Config {
    /// Load from the process environment, reading `.env` first if present.
    pub fn load() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_vars(std::env::vars())
    }

    /// Build from an explicit set of variables.
    ///
    /// `DATABASE_URL` is bound under `DATASOURCE_JNDI` (default
    /// [`DEFAULT_JNDI`]). `DATASOURCE_BINDINGS` adds `NAME=URL` pairs,
    /// separated by commas.
    pub fn from_vars<I, K, V>(vars: I) -> Result<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let vars: HashMap<String, String> = vars
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();

        let default_name = vars
            .get("DATASOURCE_JNDI")
            .cloned()
            .unwrap_or_else(|| DEFAULT_JNDI.to_string());
        let database_url = vars
            .get("DATABASE_URL")
            .cloned()
            .context("DATABASE_URL must be set")?;

        let mut bindings = vec![BindingConfig {
            name: default_name,
            url: database_url,
        }];

        if let Some(extra) = vars.get("DATASOURCE_BINDINGS") {
            for entry in extra.split(',').map(str::trim).filter(|e| !e.is_empty()) {
                let (name, url) = entry.split_once('=').with_context(|| {
                    format!("DATASOURCE_BINDINGS entry '{}' must look like NAME=URL", entry)
                })?;
                let name = name.trim();
                if name.is_empty() {
                    anyhow::bail!("DATASOURCE_BINDINGS entry '{}' has an empty name", entry);
                }
                if bindings.iter().any(|b| b.name == name) {
                    anyhow::bail!("Data source '{}' is bound more than once", name);
                }
                bindings.push(BindingConfig {
                    name: name.to_string(),
                    url: url.trim().to_string(),
                });
            }
        }

        let max_connections = match vars.get("DATABASE_MAX_CONNECTIONS") {
            Some(v) => v
                .parse()
                .context("DATABASE_MAX_CONNECTIONS must be a positive integer")?,
            None => DEFAULT_MAX_CONNECTIONS,
        };
        if max_connections == 0 {
            anyhow::bail!("DATABASE_MAX_CONNECTIONS must be a positive integer");
        }

        let acquire_timeout_secs = match vars.get("DATABASE_ACQUIRE_TIMEOUT_SECS") {
            Some(v) => v
                .parse()
                .context("DATABASE_ACQUIRE_TIMEOUT_SECS must be a number of seconds")?,
            None => DEFAULT_ACQUIRE_TIMEOUT_SECS,
        };

        Ok(Self {
            bindings,
            max_connections,
            acquire_timeout: Duration::from_secs(acquire_timeout_secs),
        })
    }

    /// Publish a lazily-connecting PostgreSQL pool for every binding.
    ///
    /// No connection is opened here. Must run inside a tokio runtime.
    pub fn bind_all(&self, directory: &Directory) -> Result<()> {
        for binding in &self.bindings {
            let pool = PgPoolOptions::new()
                .max_connections(self.max_connections)
                .acquire_timeout(self.acquire_timeout)
                .connect_lazy(&binding.url)
                .with_context(|| format!("Invalid database URL for '{}'", binding.name))?;

            tracing::info!(
                name = %binding.name,
                url = %binding.redacted_url(),
                "Bound data source"
            );
            directory.bind_resource(binding.name.clone(), pool);
        }
        Ok(())
    }
}
