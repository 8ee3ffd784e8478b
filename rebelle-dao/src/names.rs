//! Name constants for directory lookups
//!
//! These match the names used by existing deployment descriptors, so they
//! must not change.

/// Default name the application's data source is bound under.
///
/// Resolved relative to [`ENV_CONTEXT`].
pub const DEFAULT_JNDI: &str = "JDBC/FRENCHY";

/// Environment naming context that holds resource bindings.
///
/// Looked up from the root context before any resource name is resolved.
pub const ENV_CONTEXT: &str = "java:/comp/env";
