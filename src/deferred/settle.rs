use crate::{
    deferred::Deferred,
    error::{DeferError, catch_panic},
    trace::trace,
    types::{Resolvable, Settled},
};
use core::{
    future::Future,
    pin::Pin,
    task::{Context, Poll, ready},
};
use futures::{FutureExt, future};

/// Awaiting a node drives its whole chain and yields its outcome.
///
/// The node may be awaited, by value, by `&mut` or through clones, any
/// number of times; every reader sees the same settlement.
impl<T: Resolvable> Future for Deferred<T> {
    type Output = Settled<T>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = &mut *self;
        let reader = this.reader.get_or_insert_with(|| this.link.clone());
        let settled = ready!(reader.poll_unpin(cx));
        this.reader = None;
        Poll::Ready(settled)
    }
}

impl<T: Resolvable> Deferred<T> {
    fn settle<U, F>(&self, op: &'static str, f: F) -> Deferred<U>
    where
        U: Resolvable,
        F: FnOnce(Settled<T>) -> Settled<U> + Send + 'static,
    {
        let parent = self.link.clone();
        trace!(op = op, "settle callback attached");
        Deferred::from_link(
            parent
                .then(move |settled| {
                    trace!(op = op, resolved = settled.is_ok(), "running settle callback");
                    future::ready(f(settled))
                })
                .boxed(),
        )
    }

    /// Attach both a success and a failure callback.
    ///
    /// Exactly one of them runs, after this node settles; the returned node
    /// resolves to whatever that callback returns.
    pub fn then<U, F, R>(&self, on_resolved: F, on_rejected: R) -> Deferred<U>
    where
        U: Resolvable,
        F: FnOnce(T) -> U + Send + 'static,
        R: FnOnce(DeferError) -> U + Send + 'static,
    {
        self.settle("then", move |settled| match settled {
            Ok(value) => catch_panic(|| on_resolved(value)),
            Err(error) => catch_panic(|| on_rejected(error)),
        })
    }

    /// Attach a failure callback that recovers with a replacement value.
    /// A resolved value passes through untouched.
    pub fn catch<F>(&self, on_rejected: F) -> Self
    where
        F: FnOnce(DeferError) -> T + Send + 'static,
    {
        self.settle("catch", move |settled| match settled {
            Ok(value) => Ok(value),
            Err(error) => catch_panic(|| on_rejected(error)),
        })
    }

    /// Attach a callback that runs once this node settles either way.
    /// The outcome passes through unless the callback panics.
    pub fn finally<F>(&self, on_settled: F) -> Self
    where
        F: FnOnce() + Send + 'static,
    {
        self.settle("finally", move |settled| {
            catch_panic(on_settled)?;
            settled
        })
    }
}
