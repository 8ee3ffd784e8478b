//! Cached data source lookup
//!
//! A [`DataSourceProvider`] resolves a data source through the directory the
//! first time it is asked for one and hands out the same instance afterwards.
//! Build one at startup and share it (`Arc<DataSourceProvider<_>>`) with
//! every component that talks to the database.

use std::sync::Arc;

use once_cell::sync::OnceCell;

use crate::datasource::DataSource;
use crate::error::LookupError;
use crate::names::{DEFAULT_JNDI, ENV_CONTEXT};
use crate::naming::{Binding, Directory};

struct Resolved<D> {
    name: String,
    data_source: Arc<D>,
}

pub struct DataSourceProvider<D: DataSource> {
    directory: Arc<Directory>,
    cached: OnceCell<Resolved<D>>,
}

impl<D: DataSource> DataSourceProvider<D> {
    pub fn new(directory: Arc<Directory>) -> Self {
        Self {
            directory,
            cached: OnceCell::new(),
        }
    }

    pub fn directory(&self) -> &Arc<Directory> {
        &self.directory
    }

    /// Name the cached data source was resolved under, if any.
    pub fn cached_name(&self) -> Option<&str> {
        self.cached.get().map(|resolved| resolved.name.as_str())
    }

    /// Return the data source bound to `name`.
    ///
    /// Only the first successful call touches the directory. Concurrent first
    /// calls block until that lookup finishes and then share its result. A
    /// failed lookup leaves the cache empty so the next call tries again.
    ///
    /// Once a data source is cached it is returned for every name; the
    /// directory is not consulted again.
    pub fn get(&self, name: &str) -> Result<Arc<D>, LookupError> {
        let resolved = self
            .cached
            .get_or_try_init(|| self.lookup(name))
            .map_err(|e| {
                tracing::warn!(name, error = %e, "Data source lookup failed");
                e
            })?;

        if resolved.name != name {
            tracing::warn!(
                requested = name,
                cached = %resolved.name,
                "Returning data source cached under another name"
            );
        }

        Ok(Arc::clone(&resolved.data_source))
    }

    /// Return the data source bound to [`DEFAULT_JNDI`].
    pub fn get_default(&self) -> Result<Arc<D>, LookupError> {
        self.get(DEFAULT_JNDI)
    }

    fn lookup(&self, name: &str) -> Result<Resolved<D>, LookupError> {
        tracing::debug!(name, "Looking up data source in {}", ENV_CONTEXT);

        // Both handles close on drop, whichever way this returns.
        let root = self.directory.initial_context();
        let env = root.lookup_context(ENV_CONTEXT)?;

        let data_source = match env.lookup(name)? {
            Binding::Object(object) => object.downcast::<D>().map_err(|_| LookupError::NotADataSource {
                name: name.to_string(),
            })?,
            Binding::Context(_) => {
                return Err(LookupError::NotADataSource {
                    name: name.to_string(),
                })
            }
        };

        tracing::info!(name, "Data source resolved");

        Ok(Resolved {
            name: name.to_string(),
            data_source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::naming::NamingContext;
    use crate::testing::FakeDataSource;

    fn provider_with(directory: Directory) -> (Arc<Directory>, DataSourceProvider<FakeDataSource>) {
        let directory = Arc::new(directory);
        let provider = DataSourceProvider::new(Arc::clone(&directory));
        (directory, provider)
    }

    #[test]
    fn test_get_caches_first_lookup() {
        let directory = Directory::new();
        directory.bind_resource("JDBC/X", FakeDataSource::default());
        let (directory, provider) = provider_with(directory);

        let first = provider.get("JDBC/X").unwrap();
        let second = provider.get("JDBC/X").unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(directory.contexts_opened(), 1);
        assert_eq!(provider.cached_name(), Some("JDBC/X"));
    }

    #[test]
    fn test_get_default_uses_default_name() {
        let directory = Directory::new();
        directory.bind_resource(DEFAULT_JNDI, FakeDataSource::default());
        let (_directory, provider) = provider_with(directory);

        let by_default = provider.get_default().unwrap();
        let by_name = provider.get("JDBC/FRENCHY").unwrap();

        assert!(Arc::ptr_eq(&by_default, &by_name));
    }

    #[test]
    fn test_concurrent_callers_share_one_lookup() {
        let directory = Directory::new();
        directory.bind_resource(DEFAULT_JNDI, FakeDataSource::default());
        let (directory, provider) = provider_with(directory);

        let handles: Vec<Arc<FakeDataSource>> = std::thread::scope(|scope| {
            let workers: Vec<_> = (0..16)
                .map(|_| scope.spawn(|| provider.get_default().unwrap()))
                .collect();
            workers.into_iter().map(|w| w.join().unwrap()).collect()
        });

        assert_eq!(directory.contexts_opened(), 1);
        assert!(handles.iter().all(|h| Arc::ptr_eq(h, &handles[0])));
    }

    #[test]
    fn test_unbound_name_is_not_cached() {
        let (directory, provider) = provider_with(Directory::new());
        directory.root().subcontext(ENV_CONTEXT);

        let err = provider.get("JDBC/X").unwrap_err();
        assert!(matches!(err, LookupError::NameNotBound { ref name, .. } if name == "JDBC/X"));
        assert_eq!(provider.cached_name(), None);

        directory.bind_resource("JDBC/X", FakeDataSource::default());
        assert!(provider.get("JDBC/X").is_ok());
        assert_eq!(directory.contexts_opened(), 2);
    }

    #[test]
    fn test_wrong_type_is_rejected() {
        let directory = Directory::new();
        directory.bind_resource("JDBC/X", "not a pool".to_string());
        let (directory, provider) = provider_with(directory);

        let err = provider.get("JDBC/X").unwrap_err();
        assert_eq!(
            err,
            LookupError::NotADataSource {
                name: "JDBC/X".to_string()
            }
        );
        assert_eq!(err.name(), "JDBC/X");
        assert!(err.to_string().contains("JDBC/X"));
        assert_eq!(directory.open_contexts(), 0);
    }

    #[test]
    fn test_context_bound_under_name_is_rejected() {
        let directory = Directory::new();
        directory
            .root()
            .subcontext(ENV_CONTEXT)
            .rebind("JDBC/X", Binding::Context(Arc::new(NamingContext::new())));
        let (_directory, provider) = provider_with(directory);

        assert!(matches!(
            provider.get("JDBC/X"),
            Err(LookupError::NotADataSource { .. })
        ));
    }

    #[test]
    fn test_missing_env_context() {
        let (directory, provider) = provider_with(Directory::new());

        let err = provider.get_default().unwrap_err();
        assert_eq!(
            err,
            LookupError::ContextUnavailable {
                path: ENV_CONTEXT.to_string()
            }
        );
        assert_eq!(directory.open_contexts(), 0);
    }

    #[test]
    fn test_other_name_after_cache_gets_cached_handle() {
        let directory = Directory::new();
        directory.bind_resource("JDBC/X", FakeDataSource::default());
        directory.bind_resource("JDBC/Y", FakeDataSource::default());
        let (_directory, provider) = provider_with(directory);

        let first = provider.get("JDBC/X").unwrap();
        let second = provider.get("JDBC/Y").unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(provider.cached_name(), Some("JDBC/X"));
        assert_eq!(provider.directory().contexts_opened(), 1);
    }

    #[test]
    fn test_racing_names_observe_one_handle() {
        let directory = Directory::new();
        directory.bind_resource("JDBC/X", FakeDataSource::default());
        directory.bind_resource("JDBC/Y", FakeDataSource::default());
        let (directory, provider) = provider_with(directory);

        let handles: Vec<Arc<FakeDataSource>> = std::thread::scope(|scope| {
            let workers: Vec<_> = ["JDBC/X", "JDBC/Y", "JDBC/X", "JDBC/Y"]
                .into_iter()
                .map(|name| {
                    let provider = &provider;
                    scope.spawn(move || provider.get(name).unwrap())
                })
                .collect();
            workers.into_iter().map(|w| w.join().unwrap()).collect()
        });

        assert_eq!(directory.contexts_opened(), 1);
        assert!(handles.iter().all(|h| Arc::ptr_eq(h, &handles[0])));
    }

    #[test]
    fn test_cached_handle_survives_unbind() {
        let directory = Directory::new();
        directory.bind_resource("JDBC/X", FakeDataSource::default());
        let (directory, provider) = provider_with(directory);

        let first = provider.get("JDBC/X").unwrap();
        directory.unbind_resource("JDBC/X");
        directory.bind_resource("JDBC/X", FakeDataSource::default());

        assert!(Arc::ptr_eq(&first, &provider.get("JDBC/X").unwrap()));
    }
}
