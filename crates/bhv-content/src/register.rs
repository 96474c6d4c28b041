//! Factory registration for the reference behaviors.

use std::sync::Arc;

use bhv_engine::{BehaviorProduct, BehaviorRegistry, ConditionRegistry, Factory, behavior_schema};
use bhv_schema::{SchemaSet, bounded_i32, builtin};

use crate::cooldown::CooldownBehavior;
use crate::regen::RegenerationBehavior;

/// Register the `cooldown` and `regen` behavior factories.
///
/// Every numeric field has a default so both factories survive the
/// default-instantiation restore path for command-granted behaviors.
pub fn register_defaults(behaviors: &BehaviorRegistry, conditions: &Arc<ConditionRegistry>) {
    behaviors.factories().register(Factory::new(
        "cooldown",
        behavior_schema(
            SchemaSet::new().with_default("cooldown", &bounded_i32(0, i32::MAX), 20),
            conditions,
        ),
        |inst| {
            let cooldown = inst.value_or("cooldown", 20_i32) as u64;
            Box::new(CooldownBehavior::new(cooldown)) as BehaviorProduct
        },
    ));

    behaviors.factories().register(Factory::new(
        "regen",
        behavior_schema(
            SchemaSet::new()
                .with_default("amount", &builtin::f64(), 1.0_f64)
                .with_default("period", &bounded_i32(1, i32::MAX), 20),
            conditions,
        ),
        |inst| {
            let amount = inst.value_or("amount", 1.0_f64);
            let period = inst.value_or("period", 20_i32) as u64;
            Box::new(RegenerationBehavior::new(amount, period)) as BehaviorProduct
        },
    ));
}
