use core::{any::Any, future::Future};
use futures::FutureExt;
use std::{
    error::Error as StdError,
    panic::{AssertUnwindSafe, catch_unwind},
    sync::Arc,
};
use thiserror::Error;

/// Shared, type-erased reason of an upstream rejection.
pub type Reason = Arc<dyn StdError + Send + Sync + 'static>;

/// Error a deferred chain rejects with.
///
/// Every payload sits behind an `Arc`, so the same error value is handed to
/// every reader of a rejected node and to all of its descendants.
#[derive(Debug, Error, Clone)]
#[non_exhaustive]
pub enum DeferError {
    /// The wrapped future, a callable or a fallible transform failed.
    ///
    /// Displays exactly like the original error; use
    /// [`DeferError::downcast_ref`] to get the original back.
    #[error("{0}")]
    Rejected(Reason),
    /// A value that is not a function was invoked.
    #[error("value of type `{found}` is not callable")]
    NotCallable {
        /// Type name of the offending value.
        found: &'static str,
    },
    /// A transform, callback or synchronous callable panicked.
    #[error("deferred callback panicked: {message}")]
    Panicked {
        /// Panic payload, when it was a string.
        message: Arc<str>,
    },
    /// A dynamic value has no JSON representation.
    #[error("value of type `{found}` has no JSON representation")]
    Unrepresentable {
        /// Type name of the offending value.
        found: &'static str,
    },
    /// Converting between a typed value and a dynamic one failed.
    #[error("json conversion failed: {0}")]
    Json(Arc<serde_json::Error>),
}

impl DeferError {
    /// Wrap an arbitrary error as a rejection reason.
    ///
    /// A `DeferError` is returned as is instead of being nested.
    pub fn rejected<E>(error: E) -> Self
    where
        E: StdError + Send + Sync + 'static,
    {
        let boxed: Box<dyn StdError + Send + Sync> = Box::new(error);
        match boxed.downcast::<Self>() {
            Ok(this) => *this,
            Err(other) => Self::Rejected(Arc::from(other)),
        }
    }

    /// Build a `Panicked` error from a caught panic payload.
    pub(crate) fn panicked(payload: Box<dyn Any + Send>) -> Self {
        let message: Arc<str> = if let Some(msg) = payload.downcast_ref::<&'static str>() {
            (*msg).into()
        } else if let Some(msg) = payload.downcast_ref::<String>() {
            msg.as_str().into()
        } else {
            "non-string panic payload".into()
        };
        Self::Panicked { message }
    }

    /// Original reason of an upstream rejection.
    #[must_use]
    pub fn reason(&self) -> Option<&Reason> {
        match self {
            Self::Rejected(reason) => Some(reason),
            _ => None,
        }
    }

    /// Borrow the original rejection reason as a concrete error type.
    #[must_use]
    pub fn downcast_ref<E: StdError + 'static>(&self) -> Option<&E> {
        self.reason()?.downcast_ref()
    }
}

impl From<serde_json::Error> for DeferError {
    fn from(error: serde_json::Error) -> Self {
        Self::Json(Arc::new(error))
    }
}

/// Run a synchronous callback, turning a panic into a `Panicked` error.
pub(crate) fn catch_panic<R>(f: impl FnOnce() -> R) -> Result<R, DeferError> {
    catch_unwind(AssertUnwindSafe(f)).map_err(DeferError::panicked)
}

/// Await a future, turning a panic while polling it into a `Panicked` error.
pub(crate) async fn catch_panic_async<F: Future>(fut: F) -> Result<F::Output, DeferError> {
    AssertUnwindSafe(fut)
        .catch_unwind()
        .await
        .map_err(DeferError::panicked)
}
