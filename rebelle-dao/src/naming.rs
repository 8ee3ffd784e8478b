//! In-process directory service
//!
//! A [`Directory`] maps names to bindings inside nested naming contexts.
//! Callers navigate it through [`Context`] handles, which are counted while
//! open and released when dropped, so a lookup that bails out early still
//! closes everything it opened.

use std::any::Any;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

use crate::error::LookupError;
use crate::names::ENV_CONTEXT;

/// An object published in the directory.
pub type SharedObject = Arc<dyn Any + Send + Sync>;

/// What a name resolves to.
#[derive(Clone)]
pub enum Binding {
    Context(Arc<NamingContext>),
    Object(SharedObject),
}

impl fmt::Debug for Binding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Binding::Context(ctx) => f.debug_tuple("Context").field(&ctx.list()).finish(),
            Binding::Object(_) => f.write_str("Object(..)"),
        }
    }
}

/// A set of name bindings.
#[derive(Default)]
pub struct NamingContext {
    bindings: RwLock<BTreeMap<String, Binding>>,
}

impl NamingContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `name`, replacing any previous binding. Returns the old one.
    pub fn rebind(&self, name: impl Into<String>, binding: Binding) -> Option<Binding> {
        self.bindings
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(name.into(), binding)
    }

    pub fn unbind(&self, name: &str) -> Option<Binding> {
        self.bindings
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(name)
    }

    pub fn lookup(&self, name: &str) -> Option<Binding> {
        self.bindings
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(name)
            .cloned()
    }

    /// Names bound directly in this context, sorted.
    pub fn list(&self) -> Vec<String> {
        self.bindings
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .cloned()
            .collect()
    }

    /// Return the sub-context bound under `name`, creating it when the name
    /// is free. An existing non-context binding is replaced.
    pub fn subcontext(&self, name: &str) -> Arc<NamingContext> {
        let mut bindings = self.bindings.write().unwrap_or_else(PoisonError::into_inner);
        if let Some(Binding::Context(ctx)) = bindings.get(name) {
            return Arc::clone(ctx);
        }
        let ctx = Arc::new(NamingContext::new());
        bindings.insert(name.to_string(), Binding::Context(Arc::clone(&ctx)));
        ctx
    }
}

/// Root of a naming tree, shared by everything that resolves resources.
#[derive(Default)]
pub struct Directory {
    root: Arc<NamingContext>,
    open: AtomicUsize,
    opened: AtomicUsize,
}

impl Directory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind a resource in the environment context, creating the context on
    /// first use.
    pub fn bind_resource<T>(&self, name: impl Into<String>, resource: T)
    where
        T: Any + Send + Sync,
    {
        let name = name.into();
        tracing::debug!(name = %name, "Binding resource in {}", ENV_CONTEXT);
        self.root
            .subcontext(ENV_CONTEXT)
            .rebind(name, Binding::Object(Arc::new(resource)));
    }

    /// Remove a resource from the environment context.
    pub fn unbind_resource(&self, name: &str) -> Option<Binding> {
        match self.root.lookup(ENV_CONTEXT) {
            Some(Binding::Context(env)) => env.unbind(name),
            _ => None,
        }
    }

    /// Direct access to the root context for arbitrary bindings.
    pub fn root(&self) -> &Arc<NamingContext> {
        &self.root
    }

    /// Open a handle on the root context.
    pub fn initial_context(&self) -> Context<'_> {
        Context::open(self, Arc::clone(&self.root), String::new())
    }

    /// Handles currently open.
    pub fn open_contexts(&self) -> usize {
        self.open.load(Ordering::SeqCst)
    }

    /// Initial contexts opened over the directory's lifetime.
    pub fn contexts_opened(&self) -> usize {
        self.opened.load(Ordering::SeqCst)
    }
}

/// An open handle on a naming context. Closed on drop.
pub struct Context<'d> {
    directory: &'d Directory,
    node: Arc<NamingContext>,
    path: String,
}

impl<'d> Context<'d> {
    fn open(directory: &'d Directory, node: Arc<NamingContext>, path: String) -> Self {
        directory.open.fetch_add(1, Ordering::SeqCst);
        if path.is_empty() {
            directory.opened.fetch_add(1, Ordering::SeqCst);
        }
        Self { directory, node, path }
    }

    /// Path of this context from the root; empty for the root itself.
    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn lookup(&self, name: &str) -> Result<Binding, LookupError> {
        self.node.lookup(name).ok_or_else(|| LookupError::NameNotBound {
            name: name.to_string(),
            context: self.path.clone(),
        })
    }

    /// Resolve `name` to a sub-context and open a handle on it.
    pub fn lookup_context(&self, name: &str) -> Result<Context<'d>, LookupError> {
        let path = if self.path.is_empty() {
            name.to_string()
        } else {
            format!("{}/{}", self.path, name)
        };
        match self.node.lookup(name) {
            Some(Binding::Context(node)) => Ok(Context::open(self.directory, node, path)),
            _ => Err(LookupError::ContextUnavailable { path }),
        }
    }

    pub fn list(&self) -> Vec<String> {
        self.node.list()
    }
}

impl fmt::Debug for Context<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Context").field("path", &self.path).finish()
    }
}

impl Drop for Context<'_> {
    fn drop(&mut self) {
        self.directory.open.fetch_sub(1, Ordering::SeqCst);
        tracing::trace!(path = %self.path, "Closed naming context");
    }
}
