use crate::{
    deferred::Deferred,
    error::DeferError,
    types::{Key, Resolvable},
    value::Value,
};
use futures::future;
use serde::{Serialize, de::DeserializeOwned};

/// Combinators for chains whose shape is only known at runtime.
impl Deferred<Value> {
    /// Read member `key` of the eventual value.
    ///
    /// The read is null-safe (see [`Value::get`]): a missing member resolves
    /// to [`Value::Undefined`] rather than rejecting, and a function member
    /// resolves bound to the value it was read from, without being called.
    pub fn get(&self, key: impl Into<Key>) -> Self {
        let key = key.into();
        self.chain("get", move |value| future::ready(Ok(value.get(&key))))
    }

    /// Read position `idx` of the eventual sequence.
    pub fn index(&self, idx: usize) -> Self {
        self.get(idx)
    }

    /// Read `length` of the eventual sequence or string.
    pub fn length(&self) -> Self {
        self.get("length")
    }

    /// Call the eventual value with `args`, awaiting the call's result.
    ///
    /// A value that turns out not to be a function rejects the returned node
    /// with [`DeferError::NotCallable`] once awaited.
    pub fn invoke(&self, args: Vec<Value>) -> Self {
        self.chain("invoke", move |value| value.call(args))
    }

    /// Read method `name` and call it with `args`, keeping the receiver.
    pub fn call_method(&self, name: impl Into<Key>, args: Vec<Value>) -> Self {
        self.get(name).invoke(args)
    }

    /// Deferred `array.map(callback)`.
    pub fn map(&self, callback: impl Into<Value>) -> Self {
        self.call_method("map", vec![callback.into()])
    }

    /// Deferred `array.filter(predicate)`.
    pub fn filter(&self, predicate: impl Into<Value>) -> Self {
        self.call_method("filter", vec![predicate.into()])
    }

    /// Deferred `array.slice(start, end)`; negative bounds count from the end.
    pub fn slice(&self, start: i64, end: Option<i64>) -> Self {
        self.call_method("slice", vec![start.into(), end.into()])
    }

    /// Decode the eventual value into a typed `T` through its JSON form.
    pub fn decode<T>(&self) -> Deferred<T>
    where
        T: Resolvable + DeserializeOwned,
    {
        self.chain("decode", |value| {
            future::ready(
                value
                    .to_json()
                    .and_then(|json| serde_json::from_value(json).map_err(DeferError::from)),
            )
        })
    }
}

impl<T: Resolvable + Serialize> Deferred<T> {
    /// Continue the chain dynamically over the serialized form of `T`.
    pub fn dynamic(&self) -> Deferred<Value> {
        self.chain("dynamic", |value| {
            future::ready(
                serde_json::to_value(&value)
                    .map(Value::from)
                    .map_err(DeferError::from),
            )
        })
    }
}
