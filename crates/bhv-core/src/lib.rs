//! `bhv-core` — foundational types for the `rust_bhv` behavior engine.
//!
//! This crate is a dependency of every other `bhv-*` crate.  It intentionally
//! has no `bhv-*` dependencies and almost no external ones (just optional
//! `serde` derives).
//!
//! # What lives here
//!
//! | Module      | Contents                                                |
//! |-------------|---------------------------------------------------------|
//! | [`tick`]    | `Tick` — the engine's only timing unit                  |
//! | [`ids`]     | `BehaviorId`, `SourceId` string identifier newtypes     |
//! | [`compare`] | `Comparison` — six-way numeric comparison operator      |
//! | [`entity`]  | `Entity` capability trait, `BasicEntity` test/demo impl |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                              |
//! |---------|-----------------------------------------------------|
//! | `serde` | Adds `Serialize`/`Deserialize` to all public types. |

pub mod compare;
pub mod entity;
pub mod ids;
pub mod tick;

#[cfg(test)]
mod tests;

// ── Re-exports ────────────────────────────────────────────────────────────────

pub use compare::Comparison;
pub use entity::{BasicEntity, Entity};
pub use ids::{BehaviorId, SourceId};
pub use tick::Tick;
