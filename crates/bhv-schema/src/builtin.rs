//! Primitive schema types.
//!
//! Each constructor returns a fresh (cheaply cloneable) [`SchemaType`] for
//! one primitive.  Integer decoders accept any JSON number that fits the
//! target width; float decoders accept integers as well.

use crate::error::{DecodeError, DecodeErrorKind, DecodeResult};
use crate::types::{Node, SchemaType, node_kind};

fn wrong_type(expected: &'static str, node: &Node) -> DecodeError {
    DecodeError::reading(DecodeErrorKind::WrongType {
        expected,
        found: node_kind(node),
    })
}

pub fn bool() -> SchemaType<bool> {
    SchemaType::new(
        "bool",
        |v| Node::Bool(*v),
        |node| node.as_bool().ok_or_else(|| wrong_type("a boolean", node)),
        |v, w| w.put_bool(*v),
        |r| r.get_bool(),
    )
}

pub fn i32() -> SchemaType<i32> {
    SchemaType::new(
        "i32",
        |v| Node::from(*v),
        |node| decode_i64(node)?.try_into().map_err(|_| out_of_range(node)),
        |v, w| w.put_i32(*v),
        |r| r.get_i32(),
    )
}

pub fn i64() -> SchemaType<i64> {
    SchemaType::new(
        "i64",
        |v| Node::from(*v),
        decode_i64,
        |v, w| w.put_i64(*v),
        |r| r.get_i64(),
    )
}

pub fn f32() -> SchemaType<f32> {
    SchemaType::new(
        "f32",
        |v| Node::from(f64::from(*v)),
        |node| decode_f64(node).map(|v| v as f32),
        |v, w| w.put_f32(*v),
        |r| r.get_f32(),
    )
}

pub fn f64() -> SchemaType<f64> {
    SchemaType::new(
        "f64",
        |v| Node::from(*v),
        decode_f64,
        |v, w| w.put_f64(*v),
        |r| r.get_f64(),
    )
}

pub fn string() -> SchemaType<String> {
    SchemaType::new(
        "string",
        |v: &String| Node::String(v.clone()),
        |node| {
            node.as_str()
                .map(str::to_owned)
                .ok_or_else(|| wrong_type("a string", node))
        },
        |v, w| w.put_str(v),
        |r| r.get_str(),
    )
}

// ── Shared number decoding ────────────────────────────────────────────────────

fn decode_i64(node: &Node) -> DecodeResult<i64> {
    node.as_i64().ok_or_else(|| wrong_type("an integer", node))
}

fn decode_f64(node: &Node) -> DecodeResult<f64> {
    node.as_f64().ok_or_else(|| wrong_type("a number", node))
}

fn out_of_range(node: &Node) -> DecodeError {
    DecodeError::reading(DecodeErrorKind::Message(format!(
        "number {node} out of range"
    )))
}
