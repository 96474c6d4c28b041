//! Per-entity behavior attachment: `ActiveBehavior` and `Holder`.
//!
//! # Design
//!
//! A holder owns every behavior instance attached to one entity.  Each
//! instance is refcounted by *source id*, not by count: granting from a
//! source the instance already has is idempotent, and the instance is
//! destroyed only when the last source is revoked.
//!
//! Ticking runs off a cached worklist of the instances that asked to tick,
//! rebuilt lazily when a grant or revoke marks it dirty.  During dispatch
//! the holder's structure is never modified — actions and behaviors push
//! [`DeferredOp`]s into an outbox, and the batch is applied once dispatch
//! (including any due delayed actions) has finished.
//!
//! All methods take `&mut self`; the owning host serializes access by
//! ticking each holder from one thread at a time, which ownership already
//! enforces.

use std::collections::BTreeSet;

use bhv_core::{BehaviorId, Entity, SourceId, Tick};
use bhv_sched::Scheduler;
use bhv_schema::Node;
use rustc_hash::FxHashMap;
use tracing::{debug, warn};

use crate::behavior::Behavior;
use crate::error::EngineResult;
use crate::factory::FactoryInstance;
use crate::kind::{BehaviorProduct, BehaviorType};
use crate::ops::{Action, ActionCtx, Condition, DeferredOp};
use crate::registry::BehaviorRegistry;

// ── ActiveBehavior ────────────────────────────────────────────────────────────

/// One behavior instance attached to an entity, with its produced conditions
/// and the set of sources currently granting it.
pub struct ActiveBehavior {
    id:         BehaviorId,
    /// The bound factory instance this behavior was produced from.  Kept so
    /// snapshots carry the instance's parameters, not just the registered
    /// type's template.
    params:     FactoryInstance<BehaviorProduct>,
    behavior:   Box<dyn Behavior>,
    conditions: Vec<Condition>,
    sources:    BTreeSet<SourceId>,
    /// Tick flags, read once at construction.
    tick_needed:             bool,
    tick_even_when_inactive: bool,
}

impl ActiveBehavior {
    pub(crate) fn new(
        id: BehaviorId,
        params: FactoryInstance<BehaviorProduct>,
        conditions: Vec<Condition>,
    ) -> Self {
        let behavior = params.produce();
        let tick_needed = behavior.tick_needed();
        let tick_even_when_inactive = behavior.tick_even_when_inactive();
        Self {
            id,
            params,
            behavior,
            conditions,
            sources: BTreeSet::new(),
            tick_needed,
            tick_even_when_inactive,
        }
    }

    pub fn id(&self) -> &BehaviorId {
        &self.id
    }

    /// Whether every attached condition currently passes.  An instance with
    /// no conditions is vacuously active.
    pub fn is_active(&self, entity: &dyn Entity) -> bool {
        self.conditions.iter().all(|c| c(entity))
    }

    /// Sources currently granting this instance, in sorted order.
    pub fn sources(&self) -> impl Iterator<Item = &SourceId> {
        self.sources.iter()
    }

    pub fn granted_by(&self, source: &SourceId) -> bool {
        self.sources.contains(source)
    }

    pub fn params(&self) -> &FactoryInstance<BehaviorProduct> {
        &self.params
    }

    pub fn behavior(&self) -> &dyn Behavior {
        self.behavior.as_ref()
    }

    pub fn behavior_mut(&mut self) -> &mut dyn Behavior {
        self.behavior.as_mut()
    }

    /// Access the concrete behavior type, if it is `B`.
    pub fn downcast_ref<B: Behavior + 'static>(&self) -> Option<&B> {
        self.behavior.as_any().downcast_ref()
    }

    pub fn downcast_mut<B: Behavior + 'static>(&mut self) -> Option<&mut B> {
        self.behavior.as_any_mut().downcast_mut()
    }
}

// ── Holder ────────────────────────────────────────────────────────────────────

/// The set of behavior instances attached to one entity.
#[derive(Default)]
pub struct Holder {
    entries: FxHashMap<BehaviorId, ActiveBehavior>,
    delayed: Scheduler<Action>,

    /// Ids of entries with `tick_needed`, rebuilt when `tick_dirty`.
    tick_list:  Vec<BehaviorId>,
    tick_dirty: bool,
}

impl Holder {
    pub fn new() -> Self {
        Self::default()
    }

    // ── Queries ───────────────────────────────────────────────────────────

    pub fn get(&self, id: &str) -> Option<&ActiveBehavior> {
        self.entries.get(id)
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut ActiveBehavior> {
        self.entries.get_mut(id)
    }

    pub fn has(&self, id: &str) -> bool {
        self.entries.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Attached behavior ids, sorted.
    pub fn ids(&self) -> Vec<BehaviorId> {
        let mut ids: Vec<BehaviorId> = self.entries.keys().cloned().collect();
        ids.sort();
        ids
    }

    /// Pending delayed actions.
    pub fn delayed_len(&self) -> usize {
        self.delayed.len()
    }

    // ── Grant / revoke ────────────────────────────────────────────────────

    /// Grant `ty` from `source` using the type's bound template.
    ///
    /// Returns `true` if a new instance was created; `false` if the instance
    /// already existed and only the source set changed (including the
    /// idempotent case where `source` had already granted it).
    pub fn grant(
        &mut self,
        ty: &BehaviorType,
        source: impl Into<SourceId>,
        entity: &mut dyn Entity,
    ) -> bool {
        if let Some(entry) = self.entries.get_mut(ty.id().as_str()) {
            entry.sources.insert(source.into());
            return false;
        }
        self.attach(ty.create(), source.into(), entity, false);
        true
    }

    /// Grant `ty` from `source`, re-parameterized from `node` instead of the
    /// bound template.  Decode failures leave the holder untouched.
    pub fn grant_with(
        &mut self,
        ty: &BehaviorType,
        node: &Node,
        source: impl Into<SourceId>,
        entity: &mut dyn Entity,
    ) -> EngineResult<bool> {
        if let Some(entry) = self.entries.get_mut(ty.id().as_str()) {
            entry.sources.insert(source.into());
            return Ok(false);
        }
        let active = ty.create_with(node)?;
        self.attach(active, source.into(), entity, false);
        Ok(true)
    }

    fn attach(
        &mut self,
        mut active: ActiveBehavior,
        source: SourceId,
        entity: &mut dyn Entity,
        from_sync: bool,
    ) {
        active.sources.insert(source);
        active.behavior.on_added(entity, from_sync);
        if !from_sync {
            active.behavior.on_gained(entity);
        }
        if active.tick_needed {
            self.tick_dirty = true;
        }
        self.entries.insert(active.id.clone(), active);
    }

    /// Remove `source` from the instance's source set, destroying the
    /// instance when the set becomes empty.
    ///
    /// Returns `true` only when the instance was destroyed.  Revoking an id
    /// that is not attached, or a source that never granted it, is a logged
    /// no-op.
    pub fn revoke(&mut self, id: &str, source: &SourceId, entity: &mut dyn Entity) -> bool {
        let Some(entry) = self.entries.get_mut(id) else {
            debug!(id, %source, "revoke of unattached behavior; ignoring");
            return false;
        };
        if !entry.sources.remove(source) {
            debug!(id, %source, "revoke from non-granting source; ignoring");
            return false;
        }
        if !entry.sources.is_empty() {
            return false;
        }
        self.detach(id, entity, false);
        true
    }

    /// Revoke every instance granted by `source`.  Returns the number of
    /// instances destroyed.
    pub fn revoke_all_from_source(&mut self, source: &SourceId, entity: &mut dyn Entity) -> usize {
        let granted: Vec<BehaviorId> = self
            .entries
            .values()
            .filter(|e| e.sources.contains(source))
            .map(|e| e.id.clone())
            .collect();
        granted
            .iter()
            .filter(|id| self.revoke(id.as_str(), source, &mut *entity))
            .count()
    }

    /// Destroy every instance regardless of sources (entity despawn).
    pub fn clear(&mut self, entity: &mut dyn Entity) {
        for id in self.ids() {
            self.detach(id.as_str(), entity, false);
        }
        self.delayed = Scheduler::new();
    }

    fn detach(&mut self, id: &str, entity: &mut dyn Entity, from_sync: bool) {
        if let Some(mut entry) = self.entries.remove(id) {
            entry.behavior.on_removed(entity, from_sync);
            if !from_sync {
                entry.behavior.on_lost(entity);
            }
            if entry.tick_needed {
                self.tick_dirty = true;
            }
        }
    }

    /// Notify every instance that the entity respawned.
    pub fn respawn(&mut self, entity: &mut dyn Entity) {
        for entry in self.entries.values_mut() {
            entry.behavior.on_respawn(entity);
        }
    }

    // ── Ticking ───────────────────────────────────────────────────────────

    /// Run one simulation tick: update ticking instances, fire due delayed
    /// actions, then apply the deferred-operation batch.
    pub fn tick(&mut self, now: Tick, entity: &mut dyn Entity, registry: &BehaviorRegistry) {
        if self.tick_dirty {
            self.rebuild_tick_list();
        }

        let mut ops: Vec<DeferredOp> = Vec::new();

        // Snapshot the worklist: `update` cannot mutate holder structure,
        // but applying the previous tick's batch may have.
        let work = self.tick_list.clone();
        for id in &work {
            let Some(entry) = self.entries.get_mut(id.as_str()) else {
                continue;
            };
            if !entry.tick_even_when_inactive && !entry.is_active(&*entity) {
                continue;
            }
            let mut ctx = ActionCtx { entity: &mut *entity, now, ops: &mut ops };
            if let Err(error) = entry.behavior.update(&mut ctx) {
                warn!(behavior = %id, %error, "behavior update failed; continuing tick");
            }
        }

        for action in self.delayed.drain_due(now) {
            let mut ctx = ActionCtx { entity: &mut *entity, now, ops: &mut ops };
            action(&mut ctx);
        }

        self.apply(ops, now, entity, registry);
    }

    fn rebuild_tick_list(&mut self) {
        self.tick_list = self
            .entries
            .values()
            .filter(|e| e.tick_needed)
            .map(|e| e.id.clone())
            .collect();
        // Map iteration order is arbitrary; keep dispatch deterministic.
        self.tick_list.sort();
        self.tick_dirty = false;
    }

    fn apply(
        &mut self,
        ops: Vec<DeferredOp>,
        now: Tick,
        entity: &mut dyn Entity,
        registry: &BehaviorRegistry,
    ) {
        for op in ops {
            match op {
                DeferredOp::Grant { behavior, source } => {
                    if let Some(ty) = behavior.resolve(registry) {
                        let ty = ty.clone();
                        self.grant(&ty, source, &mut *entity);
                    }
                }
                DeferredOp::Revoke { behavior, source } => {
                    self.revoke(behavior.id().as_str(), &source, &mut *entity);
                }
                DeferredOp::Schedule { delay, action } => {
                    self.delayed.schedule(now, delay, action);
                }
            }
        }
    }

    // ── Persistence ───────────────────────────────────────────────────────

    /// Snapshot every attachment as a JSON array of
    /// `{"id", "sources", "params", "data"}` objects.  `params` re-encodes
    /// the bound factory instance, so a re-parameterized grant restores with
    /// its own parameters rather than the registered type's template.
    /// Pending delayed actions are not persisted.
    pub fn save(&self) -> Node {
        let mut out = Vec::with_capacity(self.entries.len());
        for id in self.ids() {
            let entry = &self.entries[&id];
            let sources: Vec<Node> = entry
                .sources
                .iter()
                .map(|s| Node::String(s.as_str().to_owned()))
                .collect();
            let params = entry.params.to_json().unwrap_or_else(|error| {
                warn!(behavior = %id, %error, "behavior parameters failed to re-encode; snapshot falls back to the registered template");
                Node::Null
            });
            out.push(serde_json::json!({
                "id":      id.as_str(),
                "sources": sources,
                "params":  params,
                "data":    entry.behavior.save_data(),
            }));
        }
        Node::Array(out)
    }

    /// Restore attachments from a [`save`][Self::save] snapshot.
    ///
    /// Instances are recreated from the saved `params` where present, else
    /// from the registered behavior type (or, for an id with no registered
    /// type, from the defaults of the behavior factory of the same id), then
    /// fed their saved `data`.  Only `on_added(_, true)` fires.  Malformed
    /// or unknown entries — including entries with no sources, which no
    /// revoke could ever destroy — are logged and skipped; returns the
    /// number of instances restored.
    pub fn load(&mut self, node: &Node, entity: &mut dyn Entity, registry: &BehaviorRegistry) -> usize {
        let Node::Array(items) = node else {
            warn!("holder snapshot is not an array; ignoring");
            return 0;
        };

        let mut restored = 0;
        for item in items {
            let Some(id) = item.get("id").and_then(Node::as_str) else {
                warn!("snapshot entry without an id; skipping");
                continue;
            };
            let sources: Vec<SourceId> = match item.get("sources") {
                Some(Node::Array(sources)) => {
                    sources.iter().filter_map(Node::as_str).map(SourceId::new).collect()
                }
                _ => Vec::new(),
            };
            if sources.is_empty() {
                warn!(id, "snapshot entry has no sources; skipping");
                continue;
            }
            let params = item.get("params").filter(|p| !p.is_null());
            let Some(mut active) = Self::recreate(id, params, registry) else {
                continue;
            };

            active.sources.extend(sources);
            if let Some(data) = item.get("data") {
                if !data.is_null() {
                    active.behavior.load_data(data);
                }
            }

            active.behavior.on_added(entity, true);
            if active.tick_needed {
                self.tick_dirty = true;
            }
            self.entries.insert(active.id.clone(), active);
            restored += 1;
        }
        restored
    }

    fn recreate(id: &str, params: Option<&Node>, registry: &BehaviorRegistry) -> Option<ActiveBehavior> {
        if let Some(ty) = registry.get(id) {
            if let Some(node) = params {
                match ty.create_with(node) {
                    Ok(active) => return Some(active),
                    Err(error) => {
                        warn!(id, %error, "snapshot parameters failed to decode; using the registered template");
                    }
                }
            }
            return Some(ty.create());
        }
        let Some(factory) = registry.factories().get(id) else {
            warn!(id, "unknown behavior id in snapshot; skipping");
            return None;
        };
        let ty = match params {
            Some(node) => factory
                .read_text(node)
                .map(|bound| BehaviorType::new(factory.id(), factory.id(), bound)),
            None => BehaviorType::from_factory_defaults(&factory),
        };
        match ty {
            Ok(ty) => Some(ty.create()),
            Err(error) => {
                warn!(id, %error, "snapshot behavior cannot be restored; skipping");
                None
            }
        }
    }
}
