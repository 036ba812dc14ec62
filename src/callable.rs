use crate::{
    error::{DeferError, catch_panic, catch_panic_async},
    types::LinkFuture,
    value::Value,
};
use core::{convert::Infallible, future::Future};
use derive_more::Debug;
use futures::{FutureExt, future};
use std::{error::Error as StdError, sync::Arc};

type NativeFn = dyn Fn(Value, Vec<Value>) -> LinkFuture<Value> + Send + Sync;

/// A function value: a named native closure plus an optional bound receiver.
///
/// The closure receives the receiver (`this`, or [`Value::Undefined`] when
/// unbound) and the argument list. Whatever it returns is always delivered
/// through a future, so invoking a `Callable` never fails synchronously.
#[derive(Debug, Clone)]
pub struct Callable {
    name: Arc<str>,
    #[debug(skip)]
    func: Arc<NativeFn>,
    receiver: Option<Box<Value>>,
}

impl Callable {
    /// Infallible synchronous function.
    pub fn new<F, R>(name: &str, func: F) -> Self
    where
        F: Fn(Value, Vec<Value>) -> R + Send + Sync + 'static,
        R: Into<Value>,
    {
        Self::try_new(name, move |this, args| {
            Ok::<Value, Infallible>(func(this, args).into())
        })
    }

    /// Fallible synchronous function; an `Err` becomes a rejection.
    pub fn try_new<F, R, E>(name: &str, func: F) -> Self
    where
        F: Fn(Value, Vec<Value>) -> Result<R, E> + Send + Sync + 'static,
        R: Into<Value>,
        E: StdError + Send + Sync + 'static,
    {
        Self::from_native(name, move |this, args| {
            let settled = catch_panic(|| func(this, args)).and_then(|out| {
                out.map(Into::into).map_err(DeferError::rejected)
            });
            future::ready(settled).boxed()
        })
    }

    /// Asynchronous function; the returned future is awaited on invocation.
    pub fn new_async<F, Fut, R, E>(name: &str, func: F) -> Self
    where
        F: Fn(Value, Vec<Value>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<R, E>> + Send + 'static,
        R: Into<Value>,
        E: StdError + Send + Sync + 'static,
    {
        let func = Arc::new(func);
        Self::from_native(name, move |this, args| {
            let func = func.clone();
            async move {
                let fut = catch_panic(|| func(this, args))?;
                catch_panic_async(fut)
                    .await?
                    .map(Into::into)
                    .map_err(DeferError::rejected)
            }
            .boxed()
        })
    }

    fn from_native<F>(name: &str, func: F) -> Self
    where
        F: Fn(Value, Vec<Value>) -> LinkFuture<Value> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            func: Arc::new(func),
            receiver: None,
        }
    }

    /// Name the function was created with.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Receiver this function is bound to, if any.
    #[must_use]
    pub fn receiver(&self) -> Option<&Value> {
        self.receiver.as_deref()
    }

    /// Bind `this` as the receiver. A function that is already bound keeps
    /// its original receiver.
    #[must_use]
    pub fn bind(&self, this: Value) -> Self {
        let mut bound = self.clone();
        if bound.receiver.is_none() {
            bound.receiver = Some(Box::new(this));
        }
        bound
    }

    /// Invoke the function with its bound receiver.
    pub fn call(&self, args: Vec<Value>) -> LinkFuture<Value> {
        let this = self.receiver().cloned().unwrap_or_default();
        (self.func)(this, args)
    }

    /// Whether both handles run the same closure with the same receiver.
    #[must_use]
    pub fn same_as(&self, other: &Self) -> bool {
        core::ptr::addr_eq(Arc::as_ptr(&self.func), Arc::as_ptr(&other.func))
            && self.receiver == other.receiver
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::executor::block_on;
    use std::io;

    #[test]
    fn sync_function_receives_arguments() {
        let add = Callable::new("add", |_, args| {
            args.iter().filter_map(Value::as_f64).sum::<f64>()
        });
        let sum = block_on(add.call(vec![1.into(), 2.into(), 3.into()])).expect("sum");
        assert_eq!(sum, Value::from(6));
    }

    #[test]
    fn bound_receiver_is_passed_as_this() {
        let whoami = Callable::new("whoami", |this, _| this.get(&"name".into()));
        let unbound = block_on(whoami.call(vec![])).expect("unbound");
        assert!(unbound.is_undefined());

        let bound = whoami.bind(Value::object([("name", "ann")]));
        let name = block_on(bound.call(vec![])).expect("bound");
        assert_eq!(name, Value::from("ann"));

        let rebound = bound.bind(Value::object([("name", "bob")]));
        let name = block_on(rebound.call(vec![])).expect("rebound");
        assert_eq!(name, Value::from("ann"));
        assert!(rebound.same_as(&bound));
        assert!(!rebound.same_as(&whoami));
    }

    #[test]
    fn failures_become_rejections() {
        let fails = Callable::try_new("fails", |_, _| {
            Err::<Value, _>(io::Error::other("nope"))
        });
        let err = block_on(fails.call(vec![])).expect_err("rejects");
        assert_eq!(err.to_string(), "nope");

        let panics = Callable::new("panics", |_, _| -> Value { panic!("kaboom") });
        let err = block_on(panics.call(vec![])).expect_err("rejects");
        assert!(matches!(err, DeferError::Panicked { .. }));
    }

    #[test]
    fn async_function_is_awaited() {
        let double = Callable::new_async("double", |_, args| async move {
            let x = args.first().and_then(Value::as_f64).unwrap_or_default();
            Ok::<_, Infallible>(x * 2.0)
        });
        let out = block_on(double.call(vec![21.into()])).expect("double");
        assert_eq!(out, Value::from(42));
        assert_eq!(double.name(), "double");
    }
}
