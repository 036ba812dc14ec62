use crate::{error::DeferError, value::Value};
use core::fmt;
use futures::future::{BoxFuture, Shared};
use indexmap::IndexMap as _IndexMap;
use rustc_hash::FxBuildHasher;
use std::sync::Arc;

/// Bound for anything a deferred node can resolve to.
///
/// A settled value is cloned out to every reader of the node (awaiters and
/// child links alike), and links may be driven from any executor thread.
pub trait Resolvable: Clone + Send + Sync + 'static {}

impl<T: Clone + Send + Sync + 'static> Resolvable for T {}

/// Outcome of a single link once it settles.
pub type Settled<T> = Result<T, DeferError>;

/// Boxed, not yet shared continuation of one link.
pub type LinkFuture<T> = BoxFuture<'static, Settled<T>>;

/// Single-resolution, multi-reader future backing every node.
pub(crate) type Link<T> = Shared<LinkFuture<T>>;

/// `IndexMap` type with fast hasher.
pub type IndexMap<K, V> = _IndexMap<K, V, FxBuildHasher>;

/// Insertion-ordered property table of an object [`Value`].
pub type ObjectMap = IndexMap<Arc<str>, Value>;

/// Member key of a read: a property name or a sequence position.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Key {
    /// Named property. Names made of ASCII digits also address array slots.
    Name(Arc<str>),
    /// Position in an array or string.
    Index(usize),
}

impl Key {
    /// Position addressed by this key, if it is an index or a canonical
    /// numeric name (`"0"`, `"17"`, but not `"07"`).
    #[must_use]
    pub fn as_index(&self) -> Option<usize> {
        match self {
            Self::Index(idx) => Some(*idx),
            Self::Name(name) => {
                let name: &str = name;
                if name == "0" {
                    return Some(0);
                }
                if name.is_empty()
                    || name.starts_with('0')
                    || !name.bytes().all(|b| b.is_ascii_digit())
                {
                    return None;
                }
                name.parse().ok()
            }
        }
    }

    /// Property name of this key, if it is a name.
    #[must_use]
    pub fn as_name(&self) -> Option<&str> {
        match self {
            Self::Name(name) => Some(name),
            Self::Index(_) => None,
        }
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Name(name) => f.write_str(name),
            Self::Index(idx) => write!(f, "{idx}"),
        }
    }
}

impl From<&str> for Key {
    fn from(name: &str) -> Self {
        Self::Name(name.into())
    }
}

impl From<String> for Key {
    fn from(name: String) -> Self {
        Self::Name(name.into())
    }
}

impl From<Arc<str>> for Key {
    fn from(name: Arc<str>) -> Self {
        Self::Name(name)
    }
}

impl From<usize> for Key {
    fn from(idx: usize) -> Self {
        Self::Index(idx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numeric_names_address_positions() {
        assert_eq!(Key::from("0").as_index(), Some(0));
        assert_eq!(Key::from("12").as_index(), Some(12));
        assert_eq!(Key::from(3).as_index(), Some(3));
        assert_eq!(Key::from("07").as_index(), None);
        assert_eq!(Key::from("").as_index(), None);
        assert_eq!(Key::from("length").as_index(), None);
        assert_eq!(Key::from("-1").as_index(), None);
    }

    #[test]
    fn keys_display_like_property_names() {
        assert_eq!(Key::from("name").to_string(), "name");
        assert_eq!(Key::from(4).to_string(), "4");
        assert_eq!(Key::from(4).as_name(), None);
        assert_eq!(Key::from("a").as_name(), Some("a"));
    }
}
