//! Composite schema type constructors.
//!
//! Every combinator forwards inner errors with a path prefix so a decode
//! failure in a nested structure names the exact offending element
//! (`"[3].attribute"` rather than just "bad value").

use std::collections::BTreeMap;
use std::sync::Arc;

use tracing::warn;

use crate::builtin;
use crate::error::{DecodeError, DecodeErrorKind, DecodeResult};
use crate::types::{Node, SchemaType, node_kind};

// ── Lists ─────────────────────────────────────────────────────────────────────

/// Homogeneous, order-preserving list of `elem` values.
///
/// A bare (non-array) node is accepted as a one-element list, so content can
/// write a single condition or action where an array is expected.
pub fn list<T: Clone + 'static>(elem: SchemaType<T>) -> SchemaType<Vec<T>> {
    let name: Arc<str> = format!("list<{}>", elem.name()).into();
    let e1 = elem.clone();
    let e2 = elem.clone();
    let e3 = elem.clone();
    let e4 = elem;

    SchemaType::new(
        name,
        move |values: &Vec<T>| Node::Array(values.iter().map(|v| e1.to_text(v)).collect()),
        move |node| match node {
            Node::Array(items) => items
                .iter()
                .enumerate()
                .map(|(i, item)| e2.from_text(item).map_err(|err| err.at_index(i)))
                .collect(),
            // Single-element shorthand.
            other => Ok(vec![e2.from_text(other).map_err(|err| err.at_index(0))?]),
        },
        move |values, w| {
            w.put_len(values.len());
            for v in values {
                e3.to_bytes(v, w);
            }
        },
        move |r| {
            let len = r.get_len()?;
            let mut out = Vec::with_capacity(len);
            for i in 0..len {
                out.push(e4.from_bytes(r).map_err(|err| err.at_index(i))?);
            }
            Ok(out)
        },
    )
}

// ── Maps ──────────────────────────────────────────────────────────────────────

/// String-keyed map of `elem` values.
///
/// Backed by a `BTreeMap` so both codecs emit keys in a deterministic order.
pub fn string_map<T: Clone + 'static>(elem: SchemaType<T>) -> SchemaType<BTreeMap<String, T>> {
    let name: Arc<str> = format!("map<{}>", elem.name()).into();
    let e1 = elem.clone();
    let e2 = elem.clone();
    let e3 = elem.clone();
    let e4 = elem;

    SchemaType::new(
        name,
        move |map: &BTreeMap<String, T>| {
            Node::Object(
                map.iter()
                    .map(|(k, v)| (k.clone(), e1.to_text(v)))
                    .collect(),
            )
        },
        move |node| {
            let obj = node.as_object().ok_or_else(|| {
                DecodeError::reading(DecodeErrorKind::WrongType {
                    expected: "an object",
                    found:    node_kind(node),
                })
            })?;
            obj.iter()
                .map(|(k, v)| {
                    e2.from_text(v)
                        .map(|decoded| (k.clone(), decoded))
                        .map_err(|err| err.at(k))
                })
                .collect()
        },
        move |map, w| {
            w.put_len(map.len());
            for (k, v) in map {
                w.put_str(k);
                e3.to_bytes(v, w);
            }
        },
        move |r| {
            let len = r.get_len()?;
            let mut out = BTreeMap::new();
            for _ in 0..len {
                let key = r.get_str()?;
                let value = e4.from_bytes(r).map_err(|err| err.at(&key))?;
                out.insert(key, value);
            }
            Ok(out)
        },
    )
}

// ── Enumerations ──────────────────────────────────────────────────────────────

/// Builder for enum schema types: binary by ordinal, text by name
/// (case-insensitive, with an alias table).
pub struct EnumBuilder<T> {
    name:     String,
    variants: Vec<(String, T)>,
    aliases:  Vec<(String, usize)>,
}

impl<T: Clone + PartialEq + Send + Sync + 'static> EnumBuilder<T> {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name:     name.into(),
            variants: Vec::new(),
            aliases:  Vec::new(),
        }
    }

    /// Add a variant.  Declaration order fixes the binary ordinal.
    pub fn variant(mut self, name: impl Into<String>, value: T) -> Self {
        self.variants.push((name.into(), value));
        self
    }

    /// Accept `alias` in text wherever the most recently added variant's
    /// canonical name is accepted.
    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        debug_assert!(!self.variants.is_empty(), "alias before any variant");
        self.aliases.push((alias.into(), self.variants.len() - 1));
        self
    }

    pub fn build(self) -> SchemaType<T> {
        let name: Arc<str> = self.name.into();
        let ename = name.clone();
        let variants = Arc::new(self.variants);
        let aliases = Arc::new(self.aliases);
        let v1 = variants.clone();
        let v2 = variants.clone();
        let v3 = variants.clone();
        let v4 = variants;

        SchemaType::new(
            name,
            move |value: &T| match v1.iter().find(|(_, v)| v == value) {
                Some((name, _)) => Node::String(name.clone()),
                None => Node::Null,
            },
            move |node| {
                let s = node.as_str().ok_or_else(|| {
                    DecodeError::reading(DecodeErrorKind::WrongType {
                        expected: "an enum name",
                        found:    node_kind(node),
                    })
                })?;
                let found = v2
                    .iter()
                    .find(|(name, _)| name.eq_ignore_ascii_case(s))
                    .map(|(_, v)| v)
                    .or_else(|| {
                        aliases
                            .iter()
                            .find(|(alias, _)| alias.eq_ignore_ascii_case(s))
                            .map(|(_, i)| &v2[*i].1)
                    });
                found
                    .cloned()
                    .ok_or_else(|| DecodeError::reading(DecodeErrorKind::UnknownName(s.to_owned())))
            },
            move |value, w| {
                let ordinal = v3.iter().position(|(_, v)| v == value).unwrap_or_else(|| {
                    debug_assert!(false, "enum `{ename}` value missing from the variant table");
                    warn!(name = %ename, "enum value missing from the variant table; encoding ordinal 0");
                    0
                });
                w.put_i32(ordinal as i32);
            },
            move |r| {
                let ordinal = r.get_len()?;
                v4.get(ordinal).map(|(_, v)| v.clone()).ok_or_else(|| {
                    DecodeError::receiving(DecodeErrorKind::Message(format!(
                        "enum ordinal {ordinal} out of range"
                    )))
                })
            },
        )
    }
}

// ── Bounded numerics ──────────────────────────────────────────────────────────

/// An `i32` clamped to `[min, max]` on decode (text and binary).
pub fn bounded_i32(min: i32, max: i32) -> SchemaType<i32> {
    debug_assert!(min <= max);
    builtin::i32().wrap(
        format!("i32[{min},{max}]"),
        move |v| v.clamp(min, max),
        |v| *v,
    )
}

/// An `f64` clamped to `[min, max]` on decode (text and binary).
pub fn bounded_f64(min: f64, max: f64) -> SchemaType<f64> {
    debug_assert!(min <= max);
    builtin::f64().wrap(
        format!("f64[{min},{max}]"),
        move |v| v.clamp(min, max),
        |v| *v,
    )
}
