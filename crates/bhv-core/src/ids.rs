//! Strongly typed string identifier wrappers.
//!
//! Behaviors and granting sources are addressed by content-chosen names
//! ("fire_resistance", "command", "definition:3"), not array indices, so the
//! identifier newtypes here wrap `String` rather than an integer.  All IDs
//! are `Ord + Hash` so they can be used as map keys, and `Borrow<str>` so
//! maps keyed by them can be queried with a plain `&str`.

use std::borrow::Borrow;
use std::fmt;

/// Generate a typed identifier wrapper around a `String`.
macro_rules! typed_name {
    ($(#[$attr:meta])* $vis:vis struct $name:ident;) => {
        $(#[$attr])*
        #[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
        #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
        $vis struct $name(pub String);

        impl $name {
            /// Construct from anything string-like.
            pub fn new(name: impl Into<String>) -> Self {
                Self(name.into())
            }

            /// View as a plain string slice.
            #[inline]
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl Borrow<str> for $name {
            #[inline]
            fn borrow(&self) -> &str {
                &self.0
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_owned())
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self(s)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

typed_name! {
    /// Identifier of a behavior type within a registry — also the key under
    /// which a live behavior instance is held per entity.
    pub struct BehaviorId;
}

typed_name! {
    /// Opaque tag naming what granted a behavior (a definition id, a
    /// command, …).  Multiple sources may co-grant the same behavior.
    pub struct SourceId;
}
