//! Periodic health regeneration.

use std::any::Any;

use bhv_core::Entity as _;
use bhv_engine::{ActionCtx, Behavior, EngineResult};
use bhv_schema::Node;
use serde_json::json;

/// Heals the entity by `amount` every `period` ticks.
///
/// Regeneration only progresses while the behavior is active, so attaching
/// a condition list (e.g. "only while not on fire") pauses the timer as
/// well as the healing.
pub struct RegenerationBehavior {
    amount:  f64,
    period:  u64,
    elapsed: u64,
}

impl RegenerationBehavior {
    pub fn new(amount: f64, period: u64) -> Self {
        Self {
            amount,
            period: period.max(1),
            elapsed: 0,
        }
    }

    pub fn amount(&self) -> f64 {
        self.amount
    }

    /// Healing period in ticks (at least 1).
    pub fn period(&self) -> u64 {
        self.period
    }
}

impl Behavior for RegenerationBehavior {
    fn tick_needed(&self) -> bool {
        true
    }

    fn update(&mut self, ctx: &mut ActionCtx<'_>) -> EngineResult<()> {
        self.elapsed += 1;
        if self.elapsed >= self.period {
            self.elapsed = 0;
            ctx.entity.heal(self.amount);
        }
        Ok(())
    }

    fn save_data(&self) -> Node {
        json!({ "elapsed": self.elapsed })
    }

    fn load_data(&mut self, data: &Node) {
        if let Some(n) = data.get("elapsed").and_then(Node::as_u64) {
            self.elapsed = n;
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
