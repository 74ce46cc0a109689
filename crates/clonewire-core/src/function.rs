//! Callable function values

use crate::{CodecError, ErrorValue, Value};
use async_trait::async_trait;
use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

/// Outcome of a call: the returned value or the thrown one
pub type CallResult = Result<Value, Value>;

/// Something that can be invoked with a list of arguments
///
/// Local closures and remote proxies both implement this trait, so a decoded
/// proxy is an ordinary function and can be forwarded again.
#[async_trait]
pub trait Callable: Send + Sync + 'static {
    async fn call(&self, args: Vec<Value>) -> CallResult;
}

/// Shared handle to a [`Callable`]
#[derive(Clone)]
pub struct Function {
    inner: Arc<dyn Callable>,
}

impl Function {
    /// Wrap an async closure
    pub fn new<F, Fut>(f: F) -> Self
    where
        F: Fn(Vec<Value>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = CallResult> + Send + 'static,
    {
        Self::from_callable(AsyncFn(f))
    }

    /// Wrap a synchronous closure
    pub fn sync<F>(f: F) -> Self
    where
        F: Fn(Vec<Value>) -> CallResult + Send + Sync + 'static,
    {
        Self::from_callable(SyncFn(f))
    }

    pub fn from_callable(callable: impl Callable) -> Self {
        Self {
            inner: Arc::new(callable),
        }
    }

    pub async fn call(&self, args: Vec<Value>) -> CallResult {
        self.inner.call(args).await
    }

    /// Call with a deadline; an expired deadline rejects with a `TimeoutError`
    pub async fn call_timeout(&self, args: Vec<Value>, timeout: Duration) -> CallResult {
        match tokio::time::timeout(timeout, self.inner.call(args)).await {
            Ok(result) => result,
            Err(_) => Err(ErrorValue::from(CodecError::Timeout).into()),
        }
    }

    /// Check whether both handles wrap the same callable
    pub fn same_function(&self, other: &Function) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl PartialEq for Function {
    fn eq(&self, other: &Self) -> bool {
        self.same_function(other)
    }
}

impl fmt::Debug for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Function")
    }
}

struct AsyncFn<F>(F);

#[async_trait]
impl<F, Fut> Callable for AsyncFn<F>
where
    F: Fn(Vec<Value>) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = CallResult> + Send + 'static,
{
    async fn call(&self, args: Vec<Value>) -> CallResult {
        (self.0)(args).await
    }
}

struct SyncFn<F>(F);

#[async_trait]
impl<F> Callable for SyncFn<F>
where
    F: Fn(Vec<Value>) -> CallResult + Send + Sync + 'static,
{
    async fn call(&self, args: Vec<Value>) -> CallResult {
        (self.0)(args)
    }
}

#[cfg(test)]
#[path = "function/function_tests.rs"]
mod function_tests;
