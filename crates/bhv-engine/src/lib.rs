//! `bhv-engine` — data-driven behavior composition.
//!
//! Content declares composable, conditionally-active, stateful behaviors in
//! external JSON definitions; the engine decodes them through `bhv-schema`,
//! turns them into runtime predicates and actions via named factories, and
//! manages per-entity grants and per-tick dispatch through [`Holder`].
//!
//! # Crate layout
//!
//! | Module        | Contents                                                       |
//! |---------------|----------------------------------------------------------------|
//! | [`factory`]   | `Factory<P>` / `FactoryInstance<P>` — schema-bound templates   |
//! | [`registry`]  | `FactoryRegistry<P>`, `BehaviorRegistry`                       |
//! | [`ops`]       | `Condition`, `Action`, `ActionCtx`, `DeferredOp`               |
//! | [`expr`]      | Condition/action schema types and composite operators          |
//! | [`leaf`]      | Leaf conditions and actions over the entity capability surface |
//! | [`behavior`]  | The `Behavior` trait (lifecycle hooks, tick flags, save/load)  |
//! | [`kind`]      | `BehaviorType` — produces behavior instances for an entity     |
//! | [`reference`] | `BehaviorRef` — lazily-resolved, cached type reference         |
//! | [`holder`]    | Per-entity grant bookkeeping and the tick worklist             |
//! | [`error`]     | `EngineError`, `EngineResult<T>`                               |
//!
//! # Design notes
//!
//! The tick path is a two-phase loop:
//!
//! 1. **Dispatch phase**: [`Holder::tick`] snapshots the (lazily rebuilt)
//!    worklist and runs each due behavior's `update` plus any delayed
//!    actions.  Structural reads only; behaviors and actions communicate
//!    holder-level mutations by pushing [`DeferredOp`]s into the
//!    [`ActionCtx`] outbox.
//! 2. **Apply phase**: the holder applies the collected ops — grants,
//!    revokes, and new schedules — after dispatch finishes, so the worklist
//!    iteration can never race its own mutation.
//!
//! There is no internal parallelism: `Holder` takes `&mut self`, and hosts
//! that grant or revoke from outside the tick path must serialize onto the
//! tick thread (the borrow checker enforces exactly that).

pub mod behavior;
pub mod error;
pub mod expr;
pub mod factory;
pub mod holder;
pub mod kind;
pub mod leaf;
pub mod ops;
pub mod reference;
pub mod registry;

#[cfg(test)]
mod tests;

// ── Re-exports ────────────────────────────────────────────────────────────────

pub use behavior::Behavior;
pub use error::{EngineError, EngineResult};
pub use expr::{action_schema, always, condition_schema, no_op, register_composites};
pub use factory::{Factory, FactoryInstance};
pub use holder::{ActiveBehavior, Holder};
pub use kind::{BehaviorProduct, BehaviorType, behavior_schema};
pub use leaf::register_leaves;
pub use ops::{Action, ActionCtx, Condition, DeferredOp};
pub use reference::{BehaviorRef, behavior_ref_schema};
pub use registry::{
    ActionRegistry, BehaviorFactoryRegistry, BehaviorRegistry, ConditionRegistry, FactoryRegistry,
};
