//! Open registries mapping string ids to factories and behavior types.
//!
//! Registries are explicit objects constructed at startup and passed by
//! reference to whatever needs lookup — there is no global state, so tests
//! get isolated registries for free.  Duplicate registration overwrites
//! with a warning rather than failing: reload flows intentionally
//! re-register.

use std::sync::{Arc, RwLock};

use bhv_core::BehaviorId;
use bhv_schema::{DecodeError, DecodeErrorKind, DecodeResult, Node, WireReader};
use rustc_hash::FxHashMap;
use tracing::warn;

use crate::factory::{Factory, FactoryInstance};
use crate::kind::{BehaviorProduct, BehaviorType};
use crate::ops::{Action, Condition};

// ── FactoryRegistry ───────────────────────────────────────────────────────────

/// Factories of one product kind, addressable by id.
pub struct FactoryRegistry<P> {
    /// Product kind label, for log lines ("condition", "action", "behavior").
    kind:  &'static str,
    inner: RwLock<FxHashMap<String, Factory<P>>>,
}

pub type ConditionRegistry = FactoryRegistry<Condition>;
pub type ActionRegistry = FactoryRegistry<Action>;
pub type BehaviorFactoryRegistry = FactoryRegistry<BehaviorProduct>;

impl<P: 'static> FactoryRegistry<P> {
    pub fn new(kind: &'static str) -> Self {
        Self {
            kind,
            inner: RwLock::new(FxHashMap::default()),
        }
    }

    pub fn kind(&self) -> &'static str {
        self.kind
    }

    /// Register `factory` under its own id, overwriting (with a warning) any
    /// previous registration.
    pub fn register(&self, factory: Factory<P>) {
        let mut inner = self.inner.write().unwrap_or_else(|e| e.into_inner());
        if inner.insert(factory.id().to_owned(), factory.clone()).is_some() {
            warn!(kind = self.kind, id = factory.id(), "overwriting existing factory");
        }
    }

    pub fn get(&self, id: &str) -> Option<Factory<P>> {
        let inner = self.inner.read().unwrap_or_else(|e| e.into_inner());
        inner.get(id).cloned()
    }

    pub fn len(&self) -> usize {
        let inner = self.inner.read().unwrap_or_else(|e| e.into_inner());
        inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Registered ids, sorted.
    pub fn ids(&self) -> Vec<String> {
        let inner = self.inner.read().unwrap_or_else(|e| e.into_inner());
        let mut ids: Vec<String> = inner.keys().cloned().collect();
        ids.sort();
        ids
    }

    /// Decode a bound instance from a text object carrying a `"type"` key.
    ///
    /// Fails with `MissingField("type")` when the key is absent and
    /// `UnknownName` when no factory is registered under the id — callers
    /// that want a safe fallback (the condition/action schema types) check
    /// [`get`][Self::get] themselves instead.
    pub fn decode_text(&self, node: &Node) -> DecodeResult<FactoryInstance<P>> {
        let id = node
            .get("type")
            .and_then(Node::as_str)
            .ok_or_else(|| DecodeError::missing_field("type"))?;
        let factory = self
            .get(id)
            .ok_or_else(|| DecodeError::reading(DecodeErrorKind::UnknownName(id.to_owned())))?;
        factory.read_text(node)
    }

    /// Decode a bound instance from wire bytes: length-prefixed factory id,
    /// then the fields.
    pub fn decode_bytes(&self, reader: &mut WireReader<'_>) -> DecodeResult<FactoryInstance<P>> {
        let id = reader.get_str()?;
        let factory = self.get(&id).ok_or_else(|| {
            DecodeError::receiving(DecodeErrorKind::UnknownName(id.clone()))
        })?;
        factory.read_bytes(reader)
    }
}

// ── BehaviorRegistry ──────────────────────────────────────────────────────────

/// Behavior types by id, plus the raw behavior factories they were built
/// from.
///
/// The raw factory registry exists for the restore path: a persisted grant
/// whose id has no fully-configured [`BehaviorType`] (e.g. it was granted by
/// a command, parameterless) falls back to default-instantiating the factory
/// registered under the same id.
pub struct BehaviorRegistry {
    types:     RwLock<FxHashMap<BehaviorId, Arc<BehaviorType>>>,
    factories: Arc<BehaviorFactoryRegistry>,
}

impl Default for BehaviorRegistry {
    fn default() -> Self {
        Self {
            types:     RwLock::new(FxHashMap::default()),
            factories: Arc::new(FactoryRegistry::new("behavior")),
        }
    }
}

impl BehaviorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// The raw behavior factory registry (register content factories here).
    pub fn factories(&self) -> &Arc<BehaviorFactoryRegistry> {
        &self.factories
    }

    /// Register a fully-configured behavior type, overwriting (with a
    /// warning) any previous registration under the same id.
    pub fn register_type(&self, ty: BehaviorType) -> Arc<BehaviorType> {
        let ty = Arc::new(ty);
        let mut types = self.types.write().unwrap_or_else(|e| e.into_inner());
        if types.insert(ty.id().clone(), ty.clone()).is_some() {
            warn!(id = %ty.id(), "overwriting existing behavior type");
        }
        ty
    }

    /// Decode a content definition (`{"type": <factory-id>, ...}`) into a
    /// behavior type registered under `id`.
    pub fn register_definition(
        &self,
        id: impl Into<BehaviorId>,
        display_name: impl Into<String>,
        node: &Node,
    ) -> DecodeResult<Arc<BehaviorType>> {
        let template = self.factories.decode_text(node)?;
        Ok(self.register_type(BehaviorType::new(id, display_name, template)))
    }

    pub fn get(&self, id: &str) -> Option<Arc<BehaviorType>> {
        let types = self.types.read().unwrap_or_else(|e| e.into_inner());
        types.get(id).cloned()
    }

    /// Registered type ids, sorted.
    pub fn ids(&self) -> Vec<BehaviorId> {
        let types = self.types.read().unwrap_or_else(|e| e.into_inner());
        let mut ids: Vec<BehaviorId> = types.keys().cloned().collect();
        ids.sort();
        ids
    }
}
