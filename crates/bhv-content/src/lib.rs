//! `bhv-content` — reference behavior implementations.
//!
//! The engine ships no concrete behaviors; this crate provides a small set
//! built purely on the public engine surface, doubling as worked examples
//! for content authors:
//!
//! | Factory id | Behavior                                               |
//! |------------|--------------------------------------------------------|
//! | `cooldown` | Tick-counted ability cooldown with `trigger`/`is_ready`|
//! | `regen`    | Periodic healing, gated by the attached conditions     |

pub mod cooldown;
pub mod regen;
pub mod register;


pub use cooldown::CooldownBehavior;
pub use regen::RegenerationBehavior;
pub use register::register_defaults;
