//! `SchemaType<T>` — a named codec for one value type.
//!
//! A schema type bundles four pure functions: text encode/decode and binary
//! encode/decode.  All four are stored as `Arc`'d closures so a schema type
//! is cheap to clone and share; composite codecs (lists, enums, field sets)
//! are built by closing over inner schema types.

use std::sync::Arc;

use crate::error::DecodeResult;
use crate::wire::{WireReader, WireWriter};

/// The textual tree format: a JSON value.
///
/// Content definitions are JSON objects; every schema type's text codec
/// reads and writes `Node`s.
pub type Node = serde_json::Value;

type ToText<T>    = Arc<dyn Fn(&T) -> Node + Send + Sync>;
type FromText<T>  = Arc<dyn Fn(&Node) -> DecodeResult<T> + Send + Sync>;
type ToBytes<T>   = Arc<dyn Fn(&T, &mut WireWriter) + Send + Sync>;
type FromBytes<T> = Arc<dyn Fn(&mut WireReader<'_>) -> DecodeResult<T> + Send + Sync>;

/// A named, self-describing codec for values of type `T`.
pub struct SchemaType<T> {
    name:       Arc<str>,
    to_text:    ToText<T>,
    from_text:  FromText<T>,
    to_bytes:   ToBytes<T>,
    from_bytes: FromBytes<T>,
}

impl<T> Clone for SchemaType<T> {
    fn clone(&self) -> Self {
        Self {
            name:       self.name.clone(),
            to_text:    self.to_text.clone(),
            from_text:  self.from_text.clone(),
            to_bytes:   self.to_bytes.clone(),
            from_bytes: self.from_bytes.clone(),
        }
    }
}

impl<T: 'static> SchemaType<T> {
    pub fn new(
        name: impl Into<Arc<str>>,
        to_text: impl Fn(&T) -> Node + Send + Sync + 'static,
        from_text: impl Fn(&Node) -> DecodeResult<T> + Send + Sync + 'static,
        to_bytes: impl Fn(&T, &mut WireWriter) + Send + Sync + 'static,
        from_bytes: impl Fn(&mut WireReader<'_>) -> DecodeResult<T> + Send + Sync + 'static,
    ) -> Self {
        Self {
            name:       name.into(),
            to_text:    Arc::new(to_text),
            from_text:  Arc::new(from_text),
            to_bytes:   Arc::new(to_bytes),
            from_bytes: Arc::new(from_bytes),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Encode a value into the textual tree format.
    pub fn to_text(&self, value: &T) -> Node {
        (self.to_text)(value)
    }

    /// Decode a value from the textual tree format.
    pub fn from_text(&self, node: &Node) -> DecodeResult<T> {
        (self.from_text)(node)
    }

    /// Encode a value into the binary wire format.
    pub fn to_bytes(&self, value: &T, writer: &mut WireWriter) {
        (self.to_bytes)(value, writer)
    }

    /// Decode a value from the binary wire format.
    pub fn from_bytes(&self, reader: &mut WireReader<'_>) -> DecodeResult<T> {
        (self.from_bytes)(reader)
    }

    /// Derive a schema type for `U` from this one via a pair of total
    /// conversion functions.
    ///
    /// This is how opaque reference types are layered onto a plain codec:
    /// e.g. a lazily-resolved identifier reference wraps the string schema
    /// with `into = |s| Ref::new(s)` and `back = |r| r.id().to_owned()`.
    pub fn wrap<U: 'static>(
        self,
        name: impl Into<Arc<str>>,
        into: impl Fn(T) -> U + Send + Sync + 'static,
        back: impl Fn(&U) -> T + Send + Sync + 'static,
    ) -> SchemaType<U> {
        let into = Arc::new(into);
        let back = Arc::new(back);
        let inner_to_text = self.to_text.clone();
        let inner_from_text = self.from_text.clone();
        let inner_to_bytes = self.to_bytes.clone();
        let inner_from_bytes = self.from_bytes.clone();

        SchemaType {
            name: name.into(),
            to_text: {
                let back = back.clone();
                Arc::new(move |u: &U| inner_to_text(&back(u)))
            },
            from_text: {
                let into = into.clone();
                Arc::new(move |node| inner_from_text(node).map(|t| into(t)))
            },
            to_bytes: Arc::new(move |u: &U, w: &mut WireWriter| inner_to_bytes(&back(u), w)),
            from_bytes: Arc::new(move |r: &mut WireReader<'_>| inner_from_bytes(r).map(|t| into(t))),
        }
    }
}

/// Human-readable name of a node's JSON kind, for `WrongType` diagnostics.
pub(crate) fn node_kind(node: &Node) -> String {
    match node {
        Node::Null      => "null".to_owned(),
        Node::Bool(_)   => "a boolean".to_owned(),
        Node::Number(_) => "a number".to_owned(),
        Node::String(_) => "a string".to_owned(),
        Node::Array(_)  => "an array".to_owned(),
        Node::Object(_) => "an object".to_owned(),
    }
}
