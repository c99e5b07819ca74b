//! Cleaner chaining.
//!
//! This module provides [`CleanerExt`], an extension trait that composes a
//! cleaner with a follow-up step. Each combinator consumes its receiver and
//! returns a new cleaner; clone the receiver first to keep using it on its
//! own.
//!
//! # Example
//!
//! ```rust
//! use cleanse::{Cleaned, Cleaner, CleanerExt, Context, Schema};
//! use serde_json::json;
//!
//! # futures::executor::block_on(async {
//! let shout = Schema::string()
//!     .build()
//!     .unwrap()
//!     .map(|s| s.to_uppercase())
//!     .map(|s| format!("{}!", s));
//!
//! let cleaned = shout.clean(Some(&json!("hey")), &Context::new()).await.unwrap();
//! assert_eq!(cleaned, Cleaned::Value("HEY!".to_string()));
//! # });
//! ```

use std::future::Future;

use async_trait::async_trait;
use serde_json::Value;

use super::traits::{BoxCleaner, Cleaned, Cleaner, IntoValue};
use crate::context::Context;
use crate::error::{CleanError, Label};

/// Combinators available on every [`Cleaner`].
pub trait CleanerExt: Cleaner + Sized {
    /// Runs an async step on whatever this cleaner produced, including
    /// `Undefined` and `Null`.
    ///
    /// The step receives the same context as the inner cleaner.
    ///
    /// ```rust
    /// use cleanse::{Cleaned, Cleaner, CleanerExt, Context, Schema};
    /// use serde_json::json;
    ///
    /// # futures::executor::block_on(async {
    /// let cleaner = Schema::string()
    ///     .required(false)
    ///     .build()
    ///     .unwrap()
    ///     .then(|cleaned, _ctx| async move {
    ///         Ok(match cleaned {
    ///             Cleaned::Undefined => Cleaned::Value("anonymous".to_string()),
    ///             other => other,
    ///         })
    ///     });
    ///
    /// let cleaned = cleaner.clean(None, &Context::new()).await.unwrap();
    /// assert_eq!(cleaned, Cleaned::Value("anonymous".to_string()));
    /// # });
    /// ```
    fn then<F, Fut, U>(self, step: F) -> Then<Self, F>
    where
        F: Fn(Cleaned<Self::Output>, Context) -> Fut + Send + Sync,
        Fut: Future<Output = Result<Cleaned<U>, CleanError>> + Send + 'static,
        U: IntoValue + Send + 'static,
    {
        Then { inner: self, step }
    }

    /// Transforms present values; `Undefined` and `Null` pass through.
    fn map<F, U>(self, f: F) -> Mapped<Self, F>
    where
        F: Fn(Self::Output) -> U + Send + Sync,
        U: IntoValue + Send + 'static,
    {
        Mapped { inner: self, f }
    }

    /// Transforms present values with a fallible step that can read the
    /// context.
    ///
    /// ```rust
    /// use cleanse::{Cleaner, CleanerExt, Context, Schema, ValidationError};
    /// use serde_json::json;
    ///
    /// # futures::executor::block_on(async {
    /// let even = Schema::integer().build().unwrap().try_map(|n, _ctx| {
    ///     if n % 2 == 0 {
    ///         Ok(n)
    ///     } else {
    ///         Err(ValidationError::message("Must be even.").into())
    ///     }
    /// });
    ///
    /// let err = even.clean(Some(&json!(3)), &Context::new()).await.unwrap_err();
    /// assert_eq!(err.to_string(), "Must be even.");
    /// # });
    /// ```
    fn try_map<F, U>(self, f: F) -> TryMapped<Self, F>
    where
        F: Fn(Self::Output, &Context) -> Result<U, CleanError> + Send + Sync,
        U: IntoValue + Send + 'static,
    {
        TryMapped { inner: self, f }
    }

    /// Feeds the JSON projection of this cleaner's output into `next`.
    ///
    /// `Undefined` reaches `next` as absent input.
    fn pipe<N: Cleaner>(self, next: N) -> Pipe<Self, N> {
        Pipe { first: self, next }
    }

    /// Erases the output type.
    fn boxed(self) -> BoxCleaner
    where
        Self: 'static,
    {
        Box::new(self)
    }
}

impl<C: Cleaner> CleanerExt for C {}

/// Cleaner returned by [`CleanerExt::then`].
#[derive(Clone)]
pub struct Then<C, F> {
    inner: C,
    step: F,
}

#[async_trait]
impl<C, F, Fut, U> Cleaner for Then<C, F>
where
    C: Cleaner,
    F: Fn(Cleaned<C::Output>, Context) -> Fut + Send + Sync,
    Fut: Future<Output = Result<Cleaned<U>, CleanError>> + Send + 'static,
    U: IntoValue + Send + 'static,
{
    type Output = U;

    async fn clean(
        &self,
        value: Option<&Value>,
        ctx: &Context,
    ) -> Result<Cleaned<U>, CleanError> {
        let cleaned = self.inner.clean(value, ctx).await?;
        (self.step)(cleaned, ctx.clone()).await
    }

    fn label(&self) -> Option<&Label> {
        self.inner.label()
    }
}

/// Cleaner returned by [`CleanerExt::map`].
#[derive(Clone)]
pub struct Mapped<C, F> {
    inner: C,
    f: F,
}

#[async_trait]
impl<C, F, U> Cleaner for Mapped<C, F>
where
    C: Cleaner,
    F: Fn(C::Output) -> U + Send + Sync,
    U: IntoValue + Send + 'static,
{
    type Output = U;

    async fn clean(
        &self,
        value: Option<&Value>,
        ctx: &Context,
    ) -> Result<Cleaned<U>, CleanError> {
        Ok(self.inner.clean(value, ctx).await?.map(|v| (self.f)(v)))
    }

    fn label(&self) -> Option<&Label> {
        self.inner.label()
    }
}

/// Cleaner returned by [`CleanerExt::try_map`].
#[derive(Clone)]
pub struct TryMapped<C, F> {
    inner: C,
    f: F,
}

#[async_trait]
impl<C, F, U> Cleaner for TryMapped<C, F>
where
    C: Cleaner,
    F: Fn(C::Output, &Context) -> Result<U, CleanError> + Send + Sync,
    U: IntoValue + Send + 'static,
{
    type Output = U;

    async fn clean(
        &self,
        value: Option<&Value>,
        ctx: &Context,
    ) -> Result<Cleaned<U>, CleanError> {
        match self.inner.clean(value, ctx).await? {
            Cleaned::Undefined => Ok(Cleaned::Undefined),
            Cleaned::Null => Ok(Cleaned::Null),
            Cleaned::Value(v) => Ok(Cleaned::Value((self.f)(v, ctx)?)),
        }
    }

    fn label(&self) -> Option<&Label> {
        self.inner.label()
    }
}

/// Cleaner returned by [`CleanerExt::pipe`].
#[derive(Clone)]
pub struct Pipe<A, B> {
    first: A,
    next: B,
}

#[async_trait]
impl<A, B> Cleaner for Pipe<A, B>
where
    A: Cleaner,
    B: Cleaner,
{
    type Output = B::Output;

    async fn clean(
        &self,
        value: Option<&Value>,
        ctx: &Context,
    ) -> Result<Cleaned<B::Output>, CleanError> {
        let projected = self.first.clean(value, ctx).await?.into_json();
        self.next.clean(projected.as_ref(), ctx).await
    }

    fn label(&self) -> Option<&Label> {
        self.first.label()
    }
}
