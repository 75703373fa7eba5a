//! Listener callbacks and taps.

use std::future::Future;
use std::sync::Arc;

use futures::future::BoxFuture;

use hatch_core::HatchResult;

use super::definitions::HookArgs;

type SyncFn = dyn Fn(&HookArgs) -> HatchResult<()> + Send + Sync;
type AsyncFn = dyn Fn(HookArgs) -> BoxFuture<'static, HatchResult<()>> + Send + Sync;

/// A hook listener.
///
/// Synchronous slots only accept [`Listener::Sync`]; sequential slots accept
/// both kinds.
#[derive(Clone)]
pub enum Listener {
    /// Runs to completion on the broadcaster's stack.
    Sync(Arc<SyncFn>),
    /// Returns a future the broadcaster awaits before the next listener.
    Async(Arc<AsyncFn>),
}

impl Listener {
    /// Wraps a synchronous closure.
    pub fn sync<F>(f: F) -> Self
    where
        F: Fn(&HookArgs) -> HatchResult<()> + Send + Sync + 'static,
    {
        Self::Sync(Arc::new(f))
    }

    /// Wraps a closure returning a future.
    pub fn future<F, Fut>(f: F) -> Self
    where
        F: Fn(HookArgs) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = HatchResult<()>> + Send + 'static,
    {
        Self::Async(Arc::new(
            move |args| -> BoxFuture<'static, HatchResult<()>> { Box::pin(f(args)) },
        ))
    }

    /// Whether this listener may suspend.
    pub fn is_async(&self) -> bool {
        matches!(self, Self::Async(_))
    }
}

impl std::fmt::Debug for Listener {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sync(_) => write!(f, "Listener::Sync(<closure>)"),
            Self::Async(_) => write!(f, "Listener::Async(<closure>)"),
        }
    }
}

/// A listener tagged with the name of whoever attached it.
#[derive(Debug, Clone)]
pub struct Tap {
    name: String,
    listener: Listener,
}

impl Tap {
    /// Creates a tap.
    pub fn new(name: impl Into<String>, listener: Listener) -> Self {
        Self {
            name: name.into(),
            listener,
        }
    }

    /// Shorthand for a tap with a synchronous closure.
    pub fn sync<F>(name: impl Into<String>, f: F) -> Self
    where
        F: Fn(&HookArgs) -> HatchResult<()> + Send + Sync + 'static,
    {
        Self::new(name, Listener::sync(f))
    }

    /// Shorthand for a tap with an async closure.
    pub fn future<F, Fut>(name: impl Into<String>, f: F) -> Self
    where
        F: Fn(HookArgs) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = HatchResult<()>> + Send + 'static,
    {
        Self::new(name, Listener::future(f))
    }

    /// Name of the attacher.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The listener.
    pub fn listener(&self) -> &Listener {
        &self.listener
    }
}
