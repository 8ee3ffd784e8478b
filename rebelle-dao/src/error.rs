use thiserror::Error;

/// Errors raised while resolving a data source through the directory.
///
/// Lookups are never retried here and failures are never cached; the next
/// call performs a fresh lookup.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LookupError {
    /// The environment context is missing, or the name is bound to something
    /// that is not a context.
    #[error("naming context '{path}' is not available")]
    ContextUnavailable { path: String },

    /// Nothing is bound under the requested name.
    #[error("name '{name}' is not bound in '{context}'")]
    NameNotBound { name: String, context: String },

    /// The name resolves, but not to a data source of the expected type.
    #[error("object bound to '{name}' is not a data source")]
    NotADataSource { name: String },
}

impl LookupError {
    /// Name of the binding this error is about.
    pub fn name(&self) -> &str {
        match self {
            LookupError::ContextUnavailable { path } => path,
            LookupError::NameNotBound { name, .. } => name,
            LookupError::NotADataSource { name } => name,
        }
    }
}
