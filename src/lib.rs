//! Lazy chaining over eventual values.
//!
//! This crate lets you build member reads, positional reads, calls and maps
//! against a value that does not exist yet. Every operation returns a new
//! deferred node immediately; nothing runs until a node is awaited, at which
//! point the recorded links resolve root first, once each, and the first
//! failure is handed down unchanged to everything built on top of it.
//!
//! Key modules:
//! - `deferred`: the `Deferred<T>` node, its constructors (`defer`,
//!   `defer_fn`, `defer_sync_fn`), typed `fmap` combinators and the
//!   awaitable `then`/`catch`/`finally` interface.
//! - `value`: the dynamic `Value` model navigated by `get`, `index`,
//!   `length` and `invoke` when the shape of the result is only known at
//!   runtime, with a JSON bridge to and from `serde_json`.
//! - `callable`: function values with a bound receiver.
//! - `error`: `DeferError`, the single error type a chain rejects with.
//! - `types`: bounds, aliases and the `Key` type.
//!
//! Quick start:
//! 1. Wrap a future with `deferred::defer`, or turn an async function into a
//!    node factory with `deferred::defer_fn`.
//! 2. Chain `fmap` for typed transforms, or go dynamic (`Deferred<Value>`)
//!    and chain `get("user").get("name")`, `index(0)`, `invoke(args)`.
//! 3. `.await` the last node.
//!
//! Every node displays as `"[Defer Proxy]"`, so an unresolved chain can be
//! told apart from a resolved value without awaiting it.

/// Function values that can be read from, bound to and invoked through a
/// dynamic chain.
pub mod callable;
/// The deferred node.
///
/// Contains `Deferred<T>` with its root constructors and node factories,
/// the short-circuiting link machinery behind every combinator, the dynamic
/// combinators over `Value`, and the `Future` and settle-callback
/// delegation.
pub mod deferred;
/// Error type shared by every deferred chain.
pub mod error;
mod trace;
/// Common bounds and aliases (`Resolvable`, `Settled`, `IndexMap`) and the
/// `Key` used by member reads.
pub mod types;
/// The dynamic value model.
///
/// Provides `Value`, its null-safe member reads, invocation, the builtin
/// `map`/`filter`/`slice` array methods and JSON conversions.
pub mod value;
