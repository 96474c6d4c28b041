//! The `Behavior` trait — the main extension point for content code.

use std::any::Any;

use bhv_core::Entity;
use bhv_schema::Node;

use crate::error::EngineResult;
use crate::ops::ActionCtx;

/// A stateful unit of entity logic, attached to one entity by the holder.
///
/// # Lifecycle
///
/// ```text
/// created → on_added(from_sync) → on_gained() → [update]* →
///           on_removed(from_sync) → on_lost() → destroyed
/// ```
///
/// plus an orthogonal `on_respawn()` fired on entity respawn without
/// destroying the instance.  Every hook defaults to a no-op so simple
/// behaviors only implement what they need.
///
/// # Ticking
///
/// The default is "no ticking".  A behavior that wants per-tick updates
/// returns `true` from [`tick_needed`][Self::tick_needed]; the holder then
/// calls [`update`][Self::update] on ticks where the behavior is active (or
/// unconditionally, if [`tick_even_when_inactive`][Self::tick_even_when_inactive]
/// also returns `true`).  Both flags are read once, when the instance is
/// granted.
///
/// An `Err` from `update` is logged at the dispatch site and does not abort
/// the remaining worklist for that tick.
///
/// # Persistence
///
/// [`save_data`][Self::save_data]/[`load_data`][Self::load_data] carry
/// best-effort JSON for mutable runtime state (a cooldown counter, …).
/// The defaults persist nothing: a behavior fully described by its bound
/// schema instance needs no extra state — the instance is restored from the
/// registered behavior type on load.  Overrides must tolerate missing keys
/// in the incoming object, treating each as "keep the current value".
pub trait Behavior: Send {
    // ── Lifecycle hooks ───────────────────────────────────────────────────

    /// Instance attached to the holder.  `from_sync` is `true` when the
    /// attach comes from restoring a snapshot; side effects that should only
    /// happen on a *fresh* grant belong in [`on_gained`][Self::on_gained].
    fn on_added(&mut self, _entity: &mut dyn Entity, _from_sync: bool) {}

    /// Fresh grant (first source added); fires exactly once per instance.
    fn on_gained(&mut self, _entity: &mut dyn Entity) {}

    /// Instance about to be detached.
    fn on_removed(&mut self, _entity: &mut dyn Entity, _from_sync: bool) {}

    /// Last source revoked; fires exactly once per instance.
    fn on_lost(&mut self, _entity: &mut dyn Entity) {}

    /// Entity respawned; the instance survives.
    fn on_respawn(&mut self, _entity: &mut dyn Entity) {}

    // ── Ticking ───────────────────────────────────────────────────────────

    fn tick_needed(&self) -> bool {
        false
    }

    fn tick_even_when_inactive(&self) -> bool {
        false
    }

    fn update(&mut self, _ctx: &mut ActionCtx<'_>) -> EngineResult<()> {
        Ok(())
    }

    // ── Persistence ───────────────────────────────────────────────────────

    fn save_data(&self) -> Node {
        Node::Null
    }

    fn load_data(&mut self, _data: &Node) {}

    // ── Downcasting ───────────────────────────────────────────────────────

    /// Access the concrete type, for host/content code that needs it.
    fn as_any(&self) -> &dyn Any;

    fn as_any_mut(&mut self) -> &mut dyn Any;
}
