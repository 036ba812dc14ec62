//! Array methods exposed as readable members of array values.

use crate::{callable::Callable, error::DeferError, value::Value};

/// Builtin array method called `name`, unbound.
pub(super) fn method(name: &str) -> Option<Callable> {
    let method = match name {
        "map" => Callable::new_async("map", map),
        "filter" => Callable::new_async("filter", filter),
        "slice" => Callable::new("slice", slice),
        _ => return None,
    };
    Some(method)
}

/// `(item, index, array)`, the argument list every callback receives.
fn callback_args(this: &Value, idx: usize, item: &Value) -> Vec<Value> {
    vec![item.clone(), Value::from(idx), this.clone()]
}

async fn map(this: Value, args: Vec<Value>) -> Result<Value, DeferError> {
    let callback = args.into_iter().next().unwrap_or_default();
    let items = this.as_array().unwrap_or_default();
    let mut mapped = Vec::with_capacity(items.len());
    for (idx, item) in items.iter().enumerate() {
        mapped.push(callback.call(callback_args(&this, idx, item)).await?);
    }
    Ok(Value::from(mapped))
}

async fn filter(this: Value, args: Vec<Value>) -> Result<Value, DeferError> {
    let predicate = args.into_iter().next().unwrap_or_default();
    let items = this.as_array().unwrap_or_default();
    let mut kept = Vec::new();
    for (idx, item) in items.iter().enumerate() {
        if predicate
            .call(callback_args(&this, idx, item))
            .await?
            .is_truthy()
        {
            kept.push(item.clone());
        }
    }
    Ok(Value::from(kept))
}

fn slice(this: Value, args: Vec<Value>) -> Value {
    let items = this.as_array().unwrap_or_default();
    let len = items.len();
    let start = relative_bound(args.first(), 0, len);
    let end = relative_bound(args.get(1), len, len).max(start);
    Value::array(items[start..end].iter().cloned())
}

/// Resolve a `slice` bound: missing means `default`, negative counts from
/// the end, everything is clamped into `0..=len`. Non-numbers go through
/// numeric coercion first, so `"1"` is `1` and anything unparsable is `0`.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::cast_precision_loss)]
fn relative_bound(arg: Option<&Value>, default: usize, len: usize) -> usize {
    let Some(arg) = arg.filter(|arg| !arg.is_undefined()) else {
        return default;
    };
    let bound = to_number(arg).filter(|n| !n.is_nan()).unwrap_or(0.0).trunc();
    let len_f = len as f64;
    if bound < 0.0 {
        (len_f + bound).max(0.0) as usize
    } else {
        bound.min(len_f) as usize
    }
}

/// Numeric coercion of a bound; `None` where the result would be `NaN`.
fn to_number(arg: &Value) -> Option<f64> {
    match arg {
        Value::Number(n) => Some(*n),
        Value::Bool(b) => Some(f64::from(u8::from(*b))),
        Value::Null => Some(0.0),
        Value::String(text) => match text.trim() {
            "" => Some(0.0),
            "Infinity" | "+Infinity" => Some(f64::INFINITY),
            "-Infinity" => Some(f64::NEG_INFINITY),
            // Rust also parses "inf" and "nan", which are not numeric strings here.
            trimmed if trimmed.contains(['i', 'I', 'n', 'N']) => None,
            trimmed => trimmed.parse().ok(),
        },
        Value::Undefined | Value::Array(_) | Value::Object(_) | Value::Function(_) => None,
    }
}
