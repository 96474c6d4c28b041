//! Runtime products of the factory system: predicates, actions, and the
//! deferred-operation outbox.
//!
//! Actions mutate the entity directly through its capability surface, but
//! holder-structural work (granting, revoking, scheduling) is *deferred*:
//! an action pushes a [`DeferredOp`] into the [`ActionCtx`] outbox and the
//! holder applies the batch after dispatch.  This keeps the tick worklist
//! iteration free of structural modification — revoking a behavior mid-tick
//! is always safe.

use std::sync::Arc;

use bhv_core::{Entity, SourceId, Tick};

use crate::reference::BehaviorRef;

/// A runtime predicate over one entity.  Produced by condition factories.
pub type Condition = Arc<dyn Fn(&dyn Entity) -> bool + Send + Sync>;

/// A side-effecting operation.  Produced by action factories.
pub type Action = Arc<dyn Fn(&mut ActionCtx<'_>) + Send + Sync>;

/// Everything an action (or a behavior's `update`) may touch during one tick.
pub struct ActionCtx<'a> {
    /// The entity the holder is ticking.
    pub entity: &'a mut dyn Entity,

    /// Current simulation tick.
    pub now: Tick,

    /// Outbox for holder-structural operations, applied after dispatch.
    pub ops: &'a mut Vec<DeferredOp>,
}

/// A holder-level mutation requested during dispatch.
pub enum DeferredOp {
    /// Grant the referenced behavior type from `source`.
    ///
    /// An unresolvable reference is a logged no-op at apply time.
    Grant {
        behavior: Arc<BehaviorRef>,
        source:   SourceId,
    },

    /// Remove `source` from the referenced behavior's source set.
    Revoke {
        behavior: Arc<BehaviorRef>,
        source:   SourceId,
    },

    /// Run `action` `delay` ticks from now via the holder's scheduler.
    Schedule {
        delay:  u64,
        action: Action,
    },
}
