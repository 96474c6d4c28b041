//! Bidirectional name↔value registries and their identifier codec.
//!
//! Registries back every "look this up by name" schema type: attribute
//! identifiers, resource kinds, and so on.  Registration happens during
//! startup/load; lookups happen on every decode.  The interior `RwLock`
//! exists so a shared `Arc<Registry<T>>` can be populated after schema
//! types have already captured it.

use std::sync::{Arc, RwLock};

use rustc_hash::FxHashMap;

use crate::error::{DecodeError, DecodeErrorKind, DecodeResult};
use crate::types::{Node, SchemaType, node_kind};

/// A named collection of `Arc<T>` values addressable by string name, with
/// reverse lookup by value identity.
pub struct Registry<T> {
    name:  String,
    inner: RwLock<Inner<T>>,
}

struct Inner<T> {
    by_name: FxHashMap<String, Arc<T>>,
    /// Registration order, for deterministic iteration.
    order: Vec<String>,
}

impl<T: Send + Sync + 'static> Registry<T> {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name:  name.into(),
            inner: RwLock::new(Inner {
                by_name: FxHashMap::default(),
                order:   Vec::new(),
            }),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Register `value` under `name`, returning the shared handle.
    ///
    /// Re-registering an existing name overwrites it and returns the new
    /// handle; the previous value (if any) comes back in the second tuple
    /// slot so callers can decide whether to warn.
    pub fn register(&self, name: impl Into<String>, value: T) -> (Arc<T>, Option<Arc<T>>) {
        let name = name.into();
        let handle = Arc::new(value);
        let mut inner = self.inner.write().unwrap_or_else(|e| e.into_inner());
        let previous = inner.by_name.insert(name.clone(), handle.clone());
        if previous.is_none() {
            inner.order.push(name);
        }
        (handle, previous)
    }

    pub fn get(&self, name: &str) -> Option<Arc<T>> {
        let inner = self.inner.read().unwrap_or_else(|e| e.into_inner());
        inner.by_name.get(name).cloned()
    }

    /// Reverse lookup: the name `value` was registered under.
    pub fn name_of(&self, value: &Arc<T>) -> Option<String> {
        let inner = self.inner.read().unwrap_or_else(|e| e.into_inner());
        inner
            .by_name
            .iter()
            .find(|(_, v)| Arc::ptr_eq(v, value))
            .map(|(name, _)| name.clone())
    }

    /// All registered names in registration order.
    pub fn names(&self) -> Vec<String> {
        let inner = self.inner.read().unwrap_or_else(|e| e.into_inner());
        inner.order.clone()
    }

    pub fn len(&self) -> usize {
        let inner = self.inner.read().unwrap_or_else(|e| e.into_inner());
        inner.by_name.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Schema type resolving names through `registry`.
///
/// Text and wire both carry the name; decode fails with `UnknownName` if the
/// name is not registered at decode time.
pub fn registry_schema<T: Send + Sync + 'static>(
    registry: &Arc<Registry<T>>,
) -> SchemaType<Arc<T>> {
    let r1 = registry.clone();
    let r2 = registry.clone();
    let r3 = registry.clone();
    let r4 = registry.clone();

    SchemaType::new(
        registry.name().to_owned(),
        move |value: &Arc<T>| match r1.name_of(value) {
            Some(name) => Node::String(name),
            None => Node::Null,
        },
        move |node| {
            let name = node.as_str().ok_or_else(|| {
                DecodeError::reading(DecodeErrorKind::WrongType {
                    expected: "an identifier string",
                    found:    node_kind(node),
                })
            })?;
            lookup(&r2, name, DecodeError::reading)
        },
        move |value, w| {
            w.put_str(r3.name_of(value).as_deref().unwrap_or_default());
        },
        move |r| {
            let name = r.get_str()?;
            lookup(&r4, &name, DecodeError::receiving)
        },
    )
}

fn lookup<T: Send + Sync + 'static>(
    registry: &Registry<T>,
    name: &str,
    mk: fn(DecodeErrorKind) -> DecodeError,
) -> DecodeResult<Arc<T>> {
    registry
        .get(name)
        .ok_or_else(|| mk(DecodeErrorKind::UnknownName(name.to_owned())))
}
