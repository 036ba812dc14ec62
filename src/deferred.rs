mod dynamic;
mod settle;

use crate::{
    error::{DeferError, catch_panic, catch_panic_async},
    trace::trace,
    types::{Link, LinkFuture, Resolvable, Settled},
};
use core::{
    fmt::{self, Display},
    future::Future,
};
use futures::{FutureExt, future};
use std::error::Error as StdError;

/// Text every deferred node displays as, whatever its depth or state.
///
/// Lets code tell "still a deferred chain" apart from a resolved value
/// without awaiting anything.
pub const DEFER_PROXY_TAG: &str = "[Defer Proxy]";

/// Whether `value` displays as a deferred node.
#[must_use]
pub fn is_deferred(value: &dyn Display) -> bool {
    value.to_string() == DEFER_PROXY_TAG
}

/// One link of a lazy chain over an eventual value.
///
/// A node owns a single-resolution future and nothing else. Every combinator
/// (`fmap`, `get`, `invoke`, `then`, ...) returns immediately with a new
/// node whose future awaits this one and then applies the recorded
/// operation. Nothing runs until some node is awaited; awaiting resolves the
/// chain root first, and the first rejection is handed down unchanged to
/// every descendant without running their operations.
///
/// Cloning a node is cheap and shares its resolution: siblings built from
/// the same parent observe one parent settlement.
#[must_use = "deferred values do nothing unless awaited"]
pub struct Deferred<T> {
    link: Link<T>,
    /// Handle this node polls through when awaited. Kept apart from `link`
    /// because a completed `Shared` handle cannot be polled again.
    reader: Option<Link<T>>,
}

impl<T: Resolvable> Deferred<T> {
    fn from_link(link: LinkFuture<T>) -> Self {
        Self {
            link: link.shared(),
            reader: None,
        }
    }

    /// Node already resolved to `value`.
    pub fn resolve(value: T) -> Self {
        Self::from_link(future::ready(Ok(value)).boxed())
    }

    /// Node already rejected with `error`.
    pub fn reject<E>(error: E) -> Self
    where
        E: StdError + Send + Sync + 'static,
    {
        Self::from_link(future::ready(Err(DeferError::rejected(error))).boxed())
    }

    /// Root node over an infallible future.
    pub fn from_future<F>(fut: F) -> Self
    where
        F: Future<Output = T> + Send + 'static,
    {
        Self::from_link(fut.map(Ok).boxed())
    }

    /// Root node over a fallible future; its error becomes the rejection
    /// reason as is.
    pub fn try_from_future<F, E>(fut: F) -> Self
    where
        F: Future<Output = Result<T, E>> + Send + 'static,
        E: StdError + Send + Sync + 'static,
    {
        Self::from_link(fut.map(|out| out.map_err(DeferError::rejected)).boxed())
    }

    /// Whether this node has settled. Never drives the chain.
    #[must_use]
    pub fn is_settled(&self) -> bool {
        self.link.peek().is_some()
    }

    /// Record a link that runs `op` on this node's value once it resolves.
    ///
    /// A rejection of this node skips `op` and is passed on untouched.
    pub(crate) fn chain<U, F, Fut>(&self, op: &'static str, f: F) -> Deferred<U>
    where
        U: Resolvable,
        F: FnOnce(T) -> Fut + Send + 'static,
        Fut: Future<Output = Settled<U>> + Send + 'static,
    {
        let parent = self.link.clone();
        trace!(op = op, "deferred link recorded");
        Deferred::from_link(
            async move {
                match parent.await {
                    Ok(value) => {
                        trace!(op = op, "parent resolved, applying link");
                        f(value).await
                    }
                    Err(error) => {
                        trace!(op = op, "parent rejected, skipping link");
                        Err(error)
                    }
                }
            }
            .boxed(),
        )
    }

    /// Map the eventual value with `f`.
    ///
    /// `f` runs only after this node resolves; a panic inside it rejects the
    /// returned node instead of unwinding into the caller.
    pub fn fmap<U, F>(&self, f: F) -> Deferred<U>
    where
        U: Resolvable,
        F: FnOnce(T) -> U + Send + 'static,
    {
        self.chain("fmap", move |value| future::ready(catch_panic(|| f(value))))
    }

    /// Map the eventual value with a fallible `f`; its `Err` rejects the
    /// returned node.
    pub fn try_fmap<U, E, F>(&self, f: F) -> Deferred<U>
    where
        U: Resolvable,
        E: StdError + Send + Sync + 'static,
        F: FnOnce(T) -> Result<U, E> + Send + 'static,
    {
        self.chain("try_fmap", move |value| {
            future::ready(
                catch_panic(|| f(value)).and_then(|out| out.map_err(DeferError::rejected)),
            )
        })
    }

    /// Map the eventual value with an asynchronous `f`, awaiting its result.
    pub fn fmap_async<U, E, F, Fut>(&self, f: F) -> Deferred<U>
    where
        U: Resolvable,
        E: StdError + Send + Sync + 'static,
        F: FnOnce(T) -> Fut + Send + 'static,
        Fut: Future<Output = Result<U, E>> + Send + 'static,
    {
        self.chain("fmap_async", move |value| async move {
            let fut = catch_panic(|| f(value))?;
            catch_panic_async(fut).await?.map_err(DeferError::rejected)
        })
    }
}

impl<T> Clone for Deferred<T> {
    fn clone(&self) -> Self {
        Self {
            link: self.link.clone(),
            reader: None,
        }
    }
}

impl<T> Display for Deferred<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(DEFER_PROXY_TAG)
    }
}

impl<T: Resolvable> fmt::Debug for Deferred<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Deferred")
            .field("settled", &self.is_settled())
            .finish_non_exhaustive()
    }
}

/// Wrap an in-flight fallible future as a root node.
pub fn defer<T, E, F>(fut: F) -> Deferred<T>
where
    T: Resolvable,
    E: StdError + Send + Sync + 'static,
    F: Future<Output = Result<T, E>> + Send + 'static,
{
    Deferred::try_from_future(fut)
}

/// Turn an asynchronous function into a node factory.
///
/// Each call runs `f` with the given arguments (pass a tuple for several)
/// and wraps the returned future as a fresh, independent root node.
pub fn defer_fn<A, T, E, F, Fut>(f: F) -> impl Fn(A) -> Deferred<T>
where
    T: Resolvable,
    E: StdError + Send + Sync + 'static,
    F: Fn(A) -> Fut,
    Fut: Future<Output = Result<T, E>> + Send + 'static,
{
    move |args| match catch_panic(|| f(args)) {
        Ok(fut) => Deferred::from_link(
            async move { catch_panic_async(fut).await?.map_err(DeferError::rejected) }.boxed(),
        ),
        Err(error) => Deferred::from_link(future::ready(Err(error)).boxed()),
    }
}

/// Turn a synchronous function into a node factory.
///
/// `f` runs immediately on each call; its outcome, including a panic, is
/// only observed by awaiting the returned node.
pub fn defer_sync_fn<A, T, E, F>(f: F) -> impl Fn(A) -> Deferred<T>
where
    T: Resolvable,
    E: StdError + Send + Sync + 'static,
    F: Fn(A) -> Result<T, E>,
{
    move |args| {
        let settled = catch_panic(|| f(args)).and_then(|out| out.map_err(DeferError::rejected));
        Deferred::from_link(future::ready(settled).boxed())
    }
}
