//! Tick-counted ability cooldown.

use std::any::Any;

use bhv_engine::{ActionCtx, Behavior, EngineResult};
use bhv_schema::Node;
use serde_json::json;

/// A per-entity cooldown timer counted in simulation ticks.
///
/// [`trigger`][Self::trigger] starts the timer; the behavior counts down
/// every tick — even while its conditions fail, since a cooldown that
/// pauses when you stop qualifying would be a different ability — and
/// [`is_ready`][Self::is_ready] reports whether it has elapsed.
pub struct CooldownBehavior {
    cooldown:  u64,
    remaining: u64,
}

impl CooldownBehavior {
    pub fn new(cooldown: u64) -> Self {
        Self { cooldown, remaining: 0 }
    }

    /// Consume the ability: starts the countdown and returns `true`, or
    /// returns `false` (leaving the timer alone) if still cooling down.
    pub fn trigger(&mut self) -> bool {
        if !self.is_ready() {
            return false;
        }
        self.remaining = self.cooldown;
        true
    }

    pub fn is_ready(&self) -> bool {
        self.remaining == 0
    }

    /// Ticks left until ready.
    pub fn remaining(&self) -> u64 {
        self.remaining
    }

    /// Configured cooldown length in ticks.
    pub fn cooldown(&self) -> u64 {
        self.cooldown
    }
}

impl Behavior for CooldownBehavior {
    fn tick_needed(&self) -> bool {
        true
    }

    fn tick_even_when_inactive(&self) -> bool {
        true
    }

    fn update(&mut self, _ctx: &mut ActionCtx<'_>) -> EngineResult<()> {
        self.remaining = self.remaining.saturating_sub(1);
        Ok(())
    }

    fn save_data(&self) -> Node {
        json!({ "remaining": self.remaining })
    }

    fn load_data(&mut self, data: &Node) {
        if let Some(n) = data.get("remaining").and_then(Node::as_u64) {
            self.remaining = n;
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
