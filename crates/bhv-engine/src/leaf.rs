//! The built-in leaf conditions and actions.
//!
//! | kind      | ids                                                            |
//! |-----------|----------------------------------------------------------------|
//! | condition | `health`, `on_fire`, `sneaking`, `sprinting`, `swimming`,      |
//! |           | `on_ground`, `in_water`, `alive`                               |
//! | action    | `heal`, `damage`, `modify_health`, `set_fire`, `kill`,         |
//! |           | `velocity`, `message`, `grant`, `revoke`                       |
//!
//! `grant`/`revoke` are the bridge back into the holder: they emit deferred
//! operations against a lazily-resolved behavior reference rather than
//! touching holder state during dispatch.

use std::sync::Arc;

use bhv_core::{Comparison, Entity, SourceId};
use bhv_schema::{EnumBuilder, SchemaSet, SchemaType, builtin};
use tracing::warn;

use crate::factory::Factory;
use crate::ops::{Action, ActionCtx, Condition, DeferredOp};
use crate::reference::behavior_ref_schema;
use crate::registry::{ActionRegistry, ConditionRegistry};

/// Register every built-in leaf factory into `conditions` and `actions`.
pub fn register_leaves(conditions: &Arc<ConditionRegistry>, actions: &Arc<ActionRegistry>) {
    register_leaf_conditions(conditions);
    register_leaf_actions(actions);
}

// ── Conditions ────────────────────────────────────────────────────────────────

fn comparison_schema() -> SchemaType<Comparison> {
    let mut b = EnumBuilder::new("comparison");
    for cmp in Comparison::ALL {
        b = b.variant(cmp.as_str(), cmp).alias(cmp.symbol());
    }
    b.build()
}

fn register_leaf_conditions(conditions: &Arc<ConditionRegistry>) {
    // health — compare current health against a threshold.
    conditions.register(Factory::new(
        "health",
        SchemaSet::new()
            .with("threshold", &builtin::f64())
            .with_default("comparison", &comparison_schema(), Comparison::GreaterOrEqual),
        |inst| {
            let threshold = inst.value_or("threshold", 0.0_f64);
            let cmp = inst.value_or("comparison", Comparison::GreaterOrEqual);
            Arc::new(move |e: &dyn Entity| cmp.evaluate(e.health(), threshold)) as Condition
        },
    ));

    // Parameterless state-flag conditions.
    let flags: [(&str, fn(&dyn Entity) -> bool); 7] = [
        ("on_fire",   |e| e.is_on_fire()),
        ("sneaking",  |e| e.is_sneaking()),
        ("sprinting", |e| e.is_sprinting()),
        ("swimming",  |e| e.is_swimming()),
        ("on_ground", |e| e.is_on_ground()),
        ("in_water",  |e| e.is_in_water()),
        ("alive",     |e| e.is_alive()),
    ];
    for (id, probe) in flags {
        conditions.register(Factory::new(id, SchemaSet::new(), move |_| {
            Arc::new(probe) as Condition
        }));
    }
}

// ── Actions ───────────────────────────────────────────────────────────────────

#[derive(Copy, Clone, PartialEq, Eq, Debug)]
enum HealthOp {
    Add,
    Set,
    Multiply,
}

fn health_op_schema() -> SchemaType<HealthOp> {
    EnumBuilder::new("health_op")
        .variant("add", HealthOp::Add)
        .alias("+")
        .variant("set", HealthOp::Set)
        .alias("=")
        .variant("multiply", HealthOp::Multiply)
        .alias("*")
        .build()
}

fn register_leaf_actions(actions: &Arc<ActionRegistry>) {
    actions.register(Factory::new(
        "heal",
        SchemaSet::new().with_default("amount", &builtin::f64(), 1.0_f64),
        |inst| {
            let amount = inst.value_or("amount", 1.0_f64);
            Arc::new(move |ctx: &mut ActionCtx<'_>| ctx.entity.heal(amount)) as Action
        },
    ));

    actions.register(Factory::new(
        "damage",
        SchemaSet::new().with_default("amount", &builtin::f64(), 1.0_f64),
        |inst| {
            let amount = inst.value_or("amount", 1.0_f64);
            Arc::new(move |ctx: &mut ActionCtx<'_>| ctx.entity.damage(amount)) as Action
        },
    ));

    // modify_health — general read-modify-write on health.
    actions.register(Factory::new(
        "modify_health",
        SchemaSet::new()
            .with("amount", &builtin::f64())
            .with_default("operation", &health_op_schema(), HealthOp::Add),
        |inst| {
            let amount = inst.value_or("amount", 0.0_f64);
            let op = inst.value_or("operation", HealthOp::Add);
            Arc::new(move |ctx: &mut ActionCtx<'_>| {
                let current = ctx.entity.health();
                let next = match op {
                    HealthOp::Add => current + amount,
                    HealthOp::Set => amount,
                    HealthOp::Multiply => current * amount,
                };
                ctx.entity.set_health(next);
            }) as Action
        },
    ));

    actions.register(Factory::new(
        "set_fire",
        SchemaSet::new().with_default("lit", &builtin::bool(), true),
        |inst| {
            let lit = inst.value_or("lit", true);
            Arc::new(move |ctx: &mut ActionCtx<'_>| ctx.entity.set_on_fire(lit)) as Action
        },
    ));

    actions.register(Factory::new("kill", SchemaSet::new(), |_| {
        Arc::new(|ctx: &mut ActionCtx<'_>| ctx.entity.kill()) as Action
    }));

    actions.register(Factory::new(
        "velocity",
        SchemaSet::new()
            .with_default("x", &builtin::f64(), 0.0_f64)
            .with_default("y", &builtin::f64(), 0.0_f64)
            .with_default("z", &builtin::f64(), 0.0_f64),
        |inst| {
            let x = inst.value_or("x", 0.0_f64);
            let y = inst.value_or("y", 0.0_f64);
            let z = inst.value_or("z", 0.0_f64);
            Arc::new(move |ctx: &mut ActionCtx<'_>| ctx.entity.add_velocity(x, y, z)) as Action
        },
    ));

    actions.register(Factory::new(
        "message",
        SchemaSet::new().with("text", &builtin::string()),
        |inst| {
            let text: String = inst.value_or("text", String::new());
            Arc::new(move |ctx: &mut ActionCtx<'_>| ctx.entity.send_message(&text)) as Action
        },
    ));

    // grant / revoke — deferred holder-structural operations.
    actions.register(Factory::new(
        "grant",
        SchemaSet::new()
            .with("behavior", &behavior_ref_schema())
            .with_default("source", &builtin::string(), String::from("action")),
        |inst| match inst.get::<Arc<crate::reference::BehaviorRef>>("behavior") {
            Some(behavior) => {
                let behavior = behavior.clone();
                let source = SourceId::new(inst.value_or("source", String::from("action")));
                Arc::new(move |ctx: &mut ActionCtx<'_>| {
                    ctx.ops.push(DeferredOp::Grant {
                        behavior: behavior.clone(),
                        source:   source.clone(),
                    });
                }) as Action
            }
            None => {
                warn!("grant action bound without a behavior reference");
                crate::expr::no_op()
            }
        },
    ));

    actions.register(Factory::new(
        "revoke",
        SchemaSet::new()
            .with("behavior", &behavior_ref_schema())
            .with_default("source", &builtin::string(), String::from("action")),
        |inst| match inst.get::<Arc<crate::reference::BehaviorRef>>("behavior") {
            Some(behavior) => {
                let behavior = behavior.clone();
                let source = SourceId::new(inst.value_or("source", String::from("action")));
                Arc::new(move |ctx: &mut ActionCtx<'_>| {
                    ctx.ops.push(DeferredOp::Revoke {
                        behavior: behavior.clone(),
                        source:   source.clone(),
                    });
                }) as Action
            }
            None => {
                warn!("revoke action bound without a behavior reference");
                crate::expr::no_op()
            }
        },
    ));
}
