//! `SchemaSet` and `SchemaInstance` — ordered field schemas and bound values.
//!
//! # Design
//!
//! A set holds heterogeneously-typed fields, so each field stores its codec
//! as type-erased closures over `Arc<dyn Any + Send + Sync>` alongside the
//! field's `TypeId`.  Erasure is total at the boundary: values only enter an
//! instance through the set's own decoders or the TypeId-checked
//! [`SchemaInstance::set_value`], so a downcast failure inside an encode
//! path is reported as an internal decode error rather than a panic.
//!
//! Field order is declaration order.  The binary codec is positional over
//! that order and carries no names; the text codec is by name, applies
//! declared defaults, and fails with a `DecodeError` naming any absent
//! field that has no default.

use std::any::{Any, TypeId};
use std::sync::Arc;

use rustc_hash::FxHashMap;

use crate::error::{DecodeError, DecodeErrorKind, DecodeResult};
use crate::types::{Node, SchemaType, node_kind};
use crate::wire::{WireReader, WireWriter};

type ErasedValue = Arc<dyn Any + Send + Sync>;

// ── FieldDef ──────────────────────────────────────────────────────────────────

struct FieldDef {
    name:      String,
    type_name: Arc<str>,
    type_id:   TypeId,
    default:   Option<ErasedValue>,
    to_text:   Arc<dyn Fn(&ErasedValue) -> DecodeResult<Node> + Send + Sync>,
    from_text: Arc<dyn Fn(&Node) -> DecodeResult<ErasedValue> + Send + Sync>,
    to_bytes:  Arc<dyn Fn(&ErasedValue, &mut WireWriter) -> DecodeResult<()> + Send + Sync>,
    from_bytes:
        Arc<dyn Fn(&mut WireReader<'_>) -> DecodeResult<ErasedValue> + Send + Sync>,
}

fn internal_type_error(field: &str) -> DecodeError {
    DecodeError::writing(DecodeErrorKind::Message(format!(
        "field `{field}` holds a value of the wrong type"
    )))
}

// ── SchemaSet ─────────────────────────────────────────────────────────────────

/// An ordered collection of named, typed, optionally-defaulted fields.
///
/// Built once per factory with the fluent `with`/`with_default` methods and
/// shared behind an `Arc` thereafter.
#[derive(Default)]
pub struct SchemaSet {
    fields: Vec<FieldDef>,
}

impl SchemaSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a required field (decode fails if it is absent from the text).
    pub fn with<T: Send + Sync + 'static>(self, name: impl Into<String>, ty: &SchemaType<T>) -> Self {
        self.push_field(name.into(), ty, None)
    }

    /// Add a field with a default applied when the text omits it.
    pub fn with_default<T: Send + Sync + 'static>(
        self,
        name: impl Into<String>,
        ty: &SchemaType<T>,
        default: T,
    ) -> Self {
        self.push_field(name.into(), ty, Some(default))
    }

    fn push_field<T: Send + Sync + 'static>(
        mut self,
        name: String,
        ty: &SchemaType<T>,
        default: Option<T>,
    ) -> Self {
        debug_assert!(
            !self.fields.iter().any(|f| f.name == name),
            "duplicate field `{name}`"
        );
        let field_name = name.clone();
        let t1 = ty.clone();
        let t2 = ty.clone();
        let t3 = ty.clone();
        let t4 = ty.clone();
        let n1 = field_name.clone();
        let n2 = field_name.clone();

        self.fields.push(FieldDef {
            name,
            type_name: ty.name().into(),
            type_id:   TypeId::of::<T>(),
            default:   default.map(|d| Arc::new(d) as ErasedValue),
            to_text: Arc::new(move |value| {
                let v = value
                    .downcast_ref::<T>()
                    .ok_or_else(|| internal_type_error(&n1))?;
                Ok(t1.to_text(v))
            }),
            from_text: Arc::new(move |node| {
                t2.from_text(node).map(|v| Arc::new(v) as ErasedValue)
            }),
            to_bytes: Arc::new(move |value, w| {
                let v = value
                    .downcast_ref::<T>()
                    .ok_or_else(|| internal_type_error(&n2))?;
                t3.to_bytes(v, w);
                Ok(())
            }),
            from_bytes: Arc::new(move |r| {
                t4.from_bytes(r).map(|v| Arc::new(v) as ErasedValue)
            }),
        });
        self
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn has_field(&self, name: &str) -> bool {
        self.fields.iter().any(|f| f.name == name)
    }

    /// Field names in declaration (wire) order.
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|f| f.name.as_str())
    }

    /// Schema type name of `field`, if it exists.
    pub fn type_name_of(&self, field: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|f| f.name == field)
            .map(|f| &*f.type_name)
    }

    // ── Decoding ──────────────────────────────────────────────────────────

    /// Decode an instance from a text object.
    ///
    /// Unknown extra keys are ignored.  Every field without a default must
    /// be present, else the decode fails naming the missing field.
    pub fn decode_text(self: &Arc<Self>, node: &Node) -> DecodeResult<SchemaInstance> {
        let obj = node.as_object().ok_or_else(|| {
            DecodeError::reading(DecodeErrorKind::WrongType {
                expected: "an object",
                found:    node_kind(node),
            })
        })?;

        let mut values = FxHashMap::default();
        for field in &self.fields {
            let value = match obj.get(&field.name) {
                Some(n) => (field.from_text)(n).map_err(|err| err.at(&field.name))?,
                None => match &field.default {
                    Some(d) => d.clone(),
                    None => return Err(DecodeError::missing_field(&field.name)),
                },
            };
            values.insert(field.name.clone(), value);
        }
        Ok(SchemaInstance { set: self.clone(), values })
    }

    /// Decode an instance from a wire stream written by a matching set.
    ///
    /// Always succeeds on a well-formed stream: the wire carries every field
    /// in declared order, defaults included.
    pub fn decode_bytes(self: &Arc<Self>, reader: &mut WireReader<'_>) -> DecodeResult<SchemaInstance> {
        let mut values = FxHashMap::default();
        for field in &self.fields {
            let value = (field.from_bytes)(reader).map_err(|err| err.at(&field.name))?;
            values.insert(field.name.clone(), value);
        }
        Ok(SchemaInstance { set: self.clone(), values })
    }

    /// Build an instance holding every field's declared default.
    ///
    /// Fails with a `DecodeError` naming the first field that has no
    /// default — restore paths treat that as "this set cannot be
    /// default-constructed".
    pub fn instantiate_with_defaults(self: &Arc<Self>) -> DecodeResult<SchemaInstance> {
        let mut values = FxHashMap::default();
        for field in &self.fields {
            match &field.default {
                Some(d) => {
                    values.insert(field.name.clone(), d.clone());
                }
                None => return Err(DecodeError::missing_field(&field.name)),
            }
        }
        Ok(SchemaInstance { set: self.clone(), values })
    }
}

// ── SchemaInstance ────────────────────────────────────────────────────────────

/// A bound set of values conforming to a [`SchemaSet`].
///
/// Decoding guarantees every field of the set is present, so typed reads in
/// factory constructors can rely on `get` returning `Some` for declared
/// fields of the right type.
#[derive(Clone)]
pub struct SchemaInstance {
    set:    Arc<SchemaSet>,
    values: FxHashMap<String, ErasedValue>,
}

impl std::fmt::Debug for SchemaInstance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SchemaInstance")
            .field("fields", &self.values.keys().collect::<Vec<_>>())
            .finish_non_exhaustive()
    }
}

impl SchemaInstance {
    pub fn set(&self) -> &Arc<SchemaSet> {
        &self.set
    }

    /// Typed read of one field.  `None` if the field is absent or `T` does
    /// not match the field's schema type.
    pub fn get<T: 'static>(&self, name: &str) -> Option<&T> {
        self.values.get(name)?.downcast_ref::<T>()
    }

    /// Typed read with a fallback, for constructors that want a value
    /// unconditionally.
    pub fn value_or<T: Clone + 'static>(&self, name: &str, fallback: T) -> T {
        self.get::<T>(name).cloned().unwrap_or(fallback)
    }

    /// Replace one field's value.  The value's type must match the field's
    /// declared schema type.
    pub fn set_value<T: Send + Sync + 'static>(
        &mut self,
        name: &str,
        value: T,
    ) -> DecodeResult<()> {
        let field = self
            .set
            .fields
            .iter()
            .find(|f| f.name == name)
            .ok_or_else(|| {
                DecodeError::writing(DecodeErrorKind::UnknownName(name.to_owned()))
            })?;
        if field.type_id != TypeId::of::<T>() {
            return Err(internal_type_error(name));
        }
        self.values.insert(name.to_owned(), Arc::new(value));
        Ok(())
    }

    // ── Encoding ──────────────────────────────────────────────────────────

    /// Encode every field into a text object.
    pub fn to_text(&self) -> DecodeResult<Node> {
        let mut obj = serde_json::Map::new();
        for field in &self.set.fields {
            let value = self
                .values
                .get(&field.name)
                .ok_or_else(|| DecodeError::missing_field(&field.name))?;
            obj.insert(field.name.clone(), (field.to_text)(value)?);
        }
        Ok(Node::Object(obj))
    }

    /// Encode every field into the wire format, in declared order.
    pub fn write_bytes(&self, writer: &mut WireWriter) -> DecodeResult<()> {
        for field in &self.set.fields {
            let value = self
                .values
                .get(&field.name)
                .ok_or_else(|| DecodeError::missing_field(&field.name))?;
            (field.to_bytes)(value, writer)?;
        }
        Ok(())
    }
}
