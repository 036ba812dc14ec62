mod sequence;

use crate::{
    callable::Callable,
    error::DeferError,
    types::{Key, LinkFuture, ObjectMap},
};
use core::fmt;
use futures::{FutureExt, future};
use serde_json::{Map as JsonMap, Value as JsonValue};
use std::sync::Arc;

/// Dynamically shaped eventual value.
///
/// This is what a deferred chain navigates when the shape of the result is
/// only known at runtime: member reads, positional reads and calls are all
/// resolved against it. Cloning is cheap, compound variants are shared.
#[derive(Debug, Clone, Default)]
pub enum Value {
    /// Absent value: a missing member, or a read through `Undefined`/`Null`.
    #[default]
    Undefined,
    /// Explicitly empty value.
    Null,
    /// `true` or `false`.
    Bool(bool),
    /// Every number is a double, integers included.
    Number(f64),
    /// Immutable text, shared between clones.
    String(Arc<str>),
    /// Ordered items, shared between clones.
    Array(Arc<Vec<Value>>),
    /// Named members in insertion order, shared between clones.
    Object(Arc<ObjectMap>),
    /// Callable value, possibly bound to the object it was read from.
    Function(Callable),
}

impl Value {
    /// Array built from anything convertible into values.
    pub fn array<I>(items: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<Self>,
    {
        Self::Array(Arc::new(items.into_iter().map(Into::into).collect()))
    }

    /// Object built from `(name, value)` pairs, keeping their order.
    pub fn object<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<Arc<str>>,
        V: Into<Self>,
    {
        Self::Object(Arc::new(
            entries
                .into_iter()
                .map(|(name, value)| (name.into(), value.into()))
                .collect(),
        ))
    }

    /// Short type name, as reported in errors.
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Undefined => "undefined",
            Self::Null => "null",
            Self::Bool(_) => "boolean",
            Self::Number(_) => "number",
            Self::String(_) => "string",
            Self::Array(_) => "array",
            Self::Object(_) => "object",
            Self::Function(_) => "function",
        }
    }

    /// Only `Undefined`; `Null` is a value of its own.
    #[must_use]
    pub fn is_undefined(&self) -> bool {
        matches!(self, Self::Undefined)
    }

    /// `Undefined` or `Null`.
    #[must_use]
    pub fn is_nullish(&self) -> bool {
        matches!(self, Self::Undefined | Self::Null)
    }

    /// Whether [`Value::call`] would invoke something.
    #[must_use]
    pub fn is_callable(&self) -> bool {
        matches!(self, Self::Function(_))
    }

    /// Truthiness used by `filter`: empty strings, zero, `NaN`, `false` and
    /// nullish values are falsy.
    #[must_use]
    pub fn is_truthy(&self) -> bool {
        match self {
            Self::Undefined | Self::Null => false,
            Self::Bool(b) => *b,
            Self::Number(n) => *n != 0.0 && !n.is_nan(),
            Self::String(s) => !s.is_empty(),
            Self::Array(_) | Self::Object(_) | Self::Function(_) => true,
        }
    }

    /// The boolean, without truthiness coercion.
    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// The number, if this is one.
    #[must_use]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// The string, if this is one.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// The items, if this is an array.
    #[must_use]
    pub fn as_array(&self) -> Option<&[Self]> {
        match self {
            Self::Array(items) => Some(items),
            _ => None,
        }
    }

    /// The members, if this is an object.
    #[must_use]
    pub fn as_object(&self) -> Option<&ObjectMap> {
        match self {
            Self::Object(map) => Some(map),
            _ => None,
        }
    }

    /// The callable, receiver included, if this is a function.
    #[must_use]
    pub fn as_callable(&self) -> Option<&Callable> {
        match self {
            Self::Function(func) => Some(func),
            _ => None,
        }
    }

    /// Null-safe member read.
    ///
    /// Never fails: reading through `Undefined`/`Null`, reading an absent
    /// member or reading from a scalar yields `Undefined`. A member that is a
    /// function comes back bound to `self`, so a later call sees `self` as
    /// its receiver.
    #[must_use]
    pub fn get(&self, key: &Key) -> Self {
        let member = match self {
            Self::Undefined | Self::Null => return Self::Undefined,
            Self::Array(items) => match (key.as_index(), key.as_name()) {
                (Some(idx), _) => items.get(idx).cloned().unwrap_or_default(),
                (None, Some("length")) => Self::from(items.len()),
                (None, Some(name)) => sequence::method(name).map_or(Self::Undefined, Self::Function),
                (None, None) => Self::Undefined,
            },
            Self::String(text) => match (key.as_index(), key.as_name()) {
                (Some(idx), _) => text
                    .chars()
                    .nth(idx)
                    .map_or(Self::Undefined, |ch| Self::from(ch.to_string())),
                (None, Some("length")) => Self::from(text.chars().count()),
                _ => Self::Undefined,
            },
            Self::Object(map) => match key {
                Key::Name(name) => map.get(&**name).cloned().unwrap_or_default(),
                Key::Index(idx) => map.get(idx.to_string().as_str()).cloned().unwrap_or_default(),
            },
            Self::Function(func) => match key.as_name() {
                Some("name") => Self::from(func.name()),
                _ => Self::Undefined,
            },
            Self::Bool(_) | Self::Number(_) => Self::Undefined,
        };
        match member {
            Self::Function(func) => Self::Function(func.bind(self.clone())),
            other => other,
        }
    }

    /// Invoke this value.
    ///
    /// Calling anything but a function does not fail here; the returned
    /// future rejects with [`DeferError::NotCallable`].
    pub fn call(&self, args: Vec<Value>) -> LinkFuture<Value> {
        match self {
            Self::Function(func) => func.call(args),
            other => future::ready(Err(DeferError::NotCallable {
                found: other.type_name(),
            }))
            .boxed(),
        }
    }

    /// JSON form of this value.
    ///
    /// Mirrors `JSON.stringify`: undefined and function members are dropped
    /// from objects and become `null` inside arrays; non-finite numbers
    /// become `null`. A top-level `Undefined` or function is rejected.
    ///
    /// # Errors
    /// [`DeferError::Unrepresentable`] for a top-level `Undefined` or
    /// function.
    pub fn to_json(&self) -> Result<JsonValue, DeferError> {
        self.json_member().ok_or(DeferError::Unrepresentable {
            found: self.type_name(),
        })
    }

    fn json_member(&self) -> Option<JsonValue> {
        let json = match self {
            Self::Undefined | Self::Function(_) => return None,
            Self::Null => JsonValue::Null,
            Self::Bool(b) => JsonValue::Bool(*b),
            Self::Number(n) => number_to_json(*n),
            Self::String(s) => JsonValue::String(s.to_string()),
            Self::Array(items) => JsonValue::Array(
                items
                    .iter()
                    .map(|item| item.json_member().unwrap_or(JsonValue::Null))
                    .collect(),
            ),
            Self::Object(map) => JsonValue::Object(
                map.iter()
                    .filter_map(|(name, value)| Some((name.to_string(), value.json_member()?)))
                    .collect::<JsonMap<_, _>>(),
            ),
        };
        Some(json)
    }
}

#[allow(clippy::cast_possible_truncation)]
fn number_to_json(n: f64) -> JsonValue {
    // Integral values go out as integers so they decode into integer fields.
    if n.fract() == 0.0 && n.abs() < 9_007_199_254_740_992.0 {
        return JsonValue::from(n as i64);
    }
    serde_json::Number::from_f64(n).map_or(JsonValue::Null, JsonValue::Number)
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Undefined, Self::Undefined) | (Self::Null, Self::Null) => true,
            (Self::Bool(a), Self::Bool(b)) => a == b,
            (Self::Number(a), Self::Number(b)) => a == b,
            (Self::String(a), Self::String(b)) => a == b,
            (Self::Array(a), Self::Array(b)) => a == b,
            (Self::Object(a), Self::Object(b)) => a == b,
            (Self::Function(a), Self::Function(b)) => a.same_as(b),
            _ => false,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Undefined => f.write_str("undefined"),
            Self::Null => f.write_str("null"),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Number(n) if n.is_nan() => f.write_str("NaN"),
            Self::Number(n) if n.is_infinite() => {
                f.write_str(if *n > 0.0 { "Infinity" } else { "-Infinity" })
            }
            Self::Number(n) if *n == 0.0 => f.write_str("0"),
            Self::Number(n) => write!(f, "{n}"),
            Self::String(s) => f.write_str(s),
            Self::Array(items) => {
                for (idx, item) in items.iter().enumerate() {
                    if idx > 0 {
                        f.write_str(",")?;
                    }
                    if !item.is_nullish() {
                        write!(f, "{item}")?;
                    }
                }
                Ok(())
            }
            Self::Object(_) => f.write_str("[object Object]"),
            Self::Function(func) => write!(f, "function {}", func.name()),
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Self::Number(n)
    }
}

macro_rules! impl_from_int {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for Value {
                #[allow(clippy::cast_precision_loss, clippy::cast_lossless)]
                fn from(n: $ty) -> Self {
                    Self::Number(n as f64)
                }
            }
        )*
    };
}

impl_from_int!(i32, i64, u32, u64, usize);

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::String(s.into())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::String(s.into())
    }
}

impl From<Arc<str>> for Value {
    fn from(s: Arc<str>) -> Self {
        Self::String(s)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Self::Array(Arc::new(items))
    }
}

impl From<ObjectMap> for Value {
    fn from(map: ObjectMap) -> Self {
        Self::Object(Arc::new(map))
    }
}

impl From<Callable> for Value {
    fn from(func: Callable) -> Self {
        Self::Function(func)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Undefined, Into::into)
    }
}

impl From<JsonValue> for Value {
    fn from(json: JsonValue) -> Self {
        match json {
            JsonValue::Null => Self::Null,
            JsonValue::Bool(b) => Self::Bool(b),
            JsonValue::Number(n) => Self::Number(n.as_f64().unwrap_or(f64::NAN)),
            JsonValue::String(s) => Self::from(s),
            JsonValue::Array(items) => Self::array(items),
            JsonValue::Object(map) => Self::object(map),
        }
    }
}

impl TryFrom<Value> for JsonValue {
    type Error = DeferError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        value.to_json()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::executor::block_on;
    use serde_json::json;

    fn key(k: &str) -> Key {
        Key::from(k)
    }

    #[test]
    fn reads_nested_members() {
        let value = Value::from(json!({"a": {"b": {"c": 1}}, "list": [10, 20]}));
        let c = value.get(&key("a")).get(&key("b")).get(&key("c"));
        assert_eq!(c, Value::from(1));
        assert_eq!(value.get(&key("list")).get(&Key::Index(1)), Value::from(20));
        assert_eq!(value.get(&key("list")).get(&key("0")), Value::from(10));
        assert_eq!(value.get(&key("list")).get(&key("length")), Value::from(2));
    }

    #[test]
    fn missing_reads_are_undefined() {
        let value = Value::from(json!({"a": 1, "n": null}));
        assert!(value.get(&key("b")).is_undefined());
        assert!(value.get(&key("b")).get(&key("c")).is_undefined());
        assert!(value.get(&key("n")).get(&key("c")).is_undefined());
        assert!(value.get(&key("a")).get(&key("c")).is_undefined());
        assert!(Value::array([1, 2]).get(&Key::Index(5)).is_undefined());
        assert!(Value::Undefined.get(&Key::Index(0)).is_undefined());
    }

    #[test]
    fn string_positions_and_length() {
        let text = Value::from("héllo");
        assert_eq!(text.get(&key("length")), Value::from(5));
        assert_eq!(text.get(&Key::Index(1)), Value::from("é"));
        assert!(text.get(&Key::Index(9)).is_undefined());
    }

    #[test]
    fn methods_are_bound_not_called() {
        let greet = Callable::new("greet", |this, _| {
            format!("hi {}", this.get(&"name".into()))
        });
        let user = Value::object([("name", Value::from("ann")), ("greet", greet.into())]);
        let member = user.get(&key("greet"));
        let bound = member.as_callable().expect("function");
        assert_eq!(bound.receiver(), Some(&user));
        assert_eq!(member.get(&key("name")), Value::from("greet"));
        let out = block_on(member.call(vec![])).expect("greeting");
        assert_eq!(out, Value::from("hi ann"));
    }

    #[test]
    fn calling_a_non_function_rejects() {
        let err = block_on(Value::from(3).call(vec![])).expect_err("not callable");
        assert!(matches!(err, DeferError::NotCallable { found: "number" }));
        let err = block_on(Value::Undefined.call(vec![])).expect_err("not callable");
        assert!(matches!(err, DeferError::NotCallable { found: "undefined" }));
    }

    #[test]
    fn displays_like_string_coercion() {
        assert_eq!(Value::Undefined.to_string(), "undefined");
        assert_eq!(Value::from(10).to_string(), "10");
        assert_eq!(Value::from(2.5).to_string(), "2.5");
        assert_eq!(Value::from(-0.0).to_string(), "0");
        assert_eq!(Value::from(f64::NAN).to_string(), "NaN");
        assert_eq!(Value::from(json!([1, null, "x"])).to_string(), "1,,x");
        assert_eq!(Value::from(json!({"a": 1})).to_string(), "[object Object]");
    }

    #[test]
    fn truthiness() {
        assert!(!Value::Undefined.is_truthy());
        assert!(!Value::from(0).is_truthy());
        assert!(!Value::from("").is_truthy());
        assert!(Value::from("0").is_truthy());
        assert!(Value::array(Vec::<Value>::new()).is_truthy());
    }

    #[test]
    fn json_bridge_follows_stringify_rules() {
        let noop = Callable::new("noop", |_, _| Value::Undefined);
        let value = Value::object([
            ("n", Value::from(3)),
            ("f", Value::from(1.5)),
            ("gone", Value::Undefined),
            ("fn", noop.clone().into()),
            ("list", Value::array([Value::Undefined, Value::from(f64::INFINITY)])),
        ]);
        assert_eq!(
            value.to_json().expect("json"),
            json!({"n": 3, "f": 1.5, "list": [null, null]})
        );
        assert!(matches!(
            Value::from(noop).to_json(),
            Err(DeferError::Unrepresentable { found: "function" })
        ));
        assert!(JsonValue::try_from(Value::Undefined).is_err());
    }

    #[test]
    fn object_equality_is_structural() {
        assert_eq!(
            Value::from(json!({"a": [1, {"b": true}]})),
            Value::object([("a", Value::from(json!([1, {"b": true}])))])
        );
        assert_ne!(Value::from(1), Value::from("1"));
        assert_ne!(Value::Null, Value::Undefined);
    }
}
