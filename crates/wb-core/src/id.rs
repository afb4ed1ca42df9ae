use lasso::{Spur, ThreadedRodeo};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::sync::LazyLock;
use std::sync::atomic::{AtomicU64, Ordering};

/// Global string interner for board identifiers. Fast comparisons, low memory.
static INTERNER: LazyLock<ThreadedRodeo> = LazyLock::new(ThreadedRodeo::default);

/// Shared counter so generated ids never collide across id kinds.
static COUNTER: AtomicU64 = AtomicU64::new(0);

macro_rules! interned_id {
    ($(#[$meta:meta])* $name:ident, $prefix:literal) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name(Spur);

        impl $name {
            /// Intern a string as an id, or return the existing one.
            pub fn intern(s: &str) -> Self {
                Self(INTERNER.get_or_intern(s))
            }

            /// The id for `s` if it was ever interned. Never interns.
            pub fn lookup(s: &str) -> Option<Self> {
                INTERNER.get(s).map(Self)
            }

            /// Resolve back to a string slice.
            pub fn as_str(&self) -> &str {
                INTERNER.resolve(&self.0)
            }

            /// Generate a fresh id that has never been handed out or interned
            /// before, including ids loaded from a snapshot.
            pub fn generate() -> Self {
                loop {
                    let n = COUNTER.fetch_add(1, Ordering::Relaxed);
                    let candidate = format!(concat!($prefix, "_{}"), n);
                    if !INTERNER.contains(&candidate) {
                        return Self::intern(&candidate);
                    }
                }
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "#{}", self.as_str())
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl Serialize for $name {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str(self.as_str())
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let s = String::deserialize(deserializer)?;
                Ok(Self::intern(&s))
            }
        }
    };
}

interned_id!(
    /// Identity of a placed window item. Stable for the item's lifetime.
    ItemId,
    "item"
);

interned_id!(
    /// Identity of a connection between two items.
    ConnectionId,
    "conn"
);

interned_id!(
    /// Identity of an item group.
    GroupId,
    "group"
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interning_roundtrip() {
        let a = ItemId::intern("notes");
        let b = ItemId::intern("notes");
        assert_eq!(a, b);
        assert_eq!(a.as_str(), "notes");
        assert_eq!(ItemId::lookup("notes"), Some(a));
        assert_eq!(ItemId::lookup("never_interned_anywhere"), None);
    }

    #[test]
    fn generated_ids_are_unique() {
        let a = ItemId::generate();
        let b = ItemId::generate();
        let c = ConnectionId::generate();
        assert_ne!(a, b);
        assert_ne!(a.as_str(), c.as_str());
    }

    #[test]
    fn serializes_as_plain_string() {
        let id = ConnectionId::intern("conn_abc");
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"conn_abc\"");
        let back: ConnectionId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }
}
