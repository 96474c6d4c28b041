//! Condition/action schema types and the composite operators.
//!
//! A "condition" or "action" field in a schema set is itself schema-typed:
//! its decode function looks up a factory by the embedded `"type"` id and
//! recursively decodes *that* factory's fields.  Composite operators are
//! ordinary factories whose schema sets contain such fields, which is what
//! turns flat definitions into expression trees.
//!
//! Unknown factory ids in text resolve to safe defaults — a constant-true
//! condition or a no-op action — with a warning, so one bad reference never
//! fails a whole load pass.  The binary path stays strict: a wire stream is
//! only decodable against the registry that produced it.

use std::sync::Arc;

use bhv_core::Entity;
use bhv_schema::{DecodeError, Node, SchemaSet, SchemaType, bounded_i32, list};
use tracing::warn;

use crate::factory::{Factory, FactoryInstance};
use crate::ops::{Action, ActionCtx, Condition, DeferredOp};
use crate::registry::{ActionRegistry, ConditionRegistry, FactoryRegistry};

// ── Safe defaults ─────────────────────────────────────────────────────────────

/// The vacuous condition: true for every entity.
pub fn always() -> Condition {
    Arc::new(|_: &dyn Entity| true)
}

/// The action that does nothing.
pub fn no_op() -> Action {
    Arc::new(|_: &mut ActionCtx<'_>| {})
}

// ── Factory-typed schema fields ───────────────────────────────────────────────

fn factory_schema<P: Clone + Send + Sync + 'static>(
    name: &'static str,
    registry: &Arc<FactoryRegistry<P>>,
    fallback: fn() -> P,
) -> SchemaType<FactoryInstance<P>> {
    let r1 = registry.clone();
    let r2 = registry.clone();

    SchemaType::new(
        name,
        |fi: &FactoryInstance<P>| {
            fi.to_json().unwrap_or_else(|error| {
                warn!(id = fi.factory_id(), %error, "factory instance failed to re-encode; emitting null");
                Node::Null
            })
        },
        move |node| {
            // A bare string is shorthand for `{"type": "<id>"}` with all defaults.
            let (id, bare) = match node.as_str() {
                Some(s) => (s, true),
                None => (
                    node.get("type")
                        .and_then(Node::as_str)
                        .ok_or_else(|| DecodeError::missing_field("type"))?,
                    false,
                ),
            };
            match r1.get(id) {
                Some(factory) if bare => factory.with_defaults(),
                Some(factory) => factory.read_text(node),
                None => {
                    warn!(kind = name, id, "unknown factory id; substituting safe default");
                    Factory::constant(id.to_owned(), fallback()).with_defaults()
                }
            }
        },
        |fi, w| {
            if let Err(error) = fi.write_bytes(w) {
                debug_assert!(false, "factory instance must re-encode: {error}");
                warn!(id = fi.factory_id(), %error, "factory instance failed to re-encode to the wire");
            }
        },
        move |r| r2.decode_bytes(r),
    )
}

/// Schema type for a condition-valued field.
pub fn condition_schema(registry: &Arc<ConditionRegistry>) -> SchemaType<FactoryInstance<Condition>> {
    factory_schema("condition", registry, always)
}

/// Schema type for an action-valued field.
pub fn action_schema(registry: &Arc<ActionRegistry>) -> SchemaType<FactoryInstance<Action>> {
    factory_schema("action", registry, no_op)
}

// ── Composite operators ───────────────────────────────────────────────────────

/// Register the boolean/control-flow operators into `conditions`/`actions`:
/// `and`, `or`, `not`, `if_else`, `delay`, and `all` (action sequence).
pub fn register_composites(conditions: &Arc<ConditionRegistry>, actions: &Arc<ActionRegistry>) {
    let cond_ty = condition_schema(conditions);
    let cond_list = list(cond_ty.clone());
    let act_ty = action_schema(actions);
    let act_list = list(act_ty.clone());

    // and — short-circuit conjunction over sub-conditions.
    conditions.register(Factory::new(
        "and",
        SchemaSet::new().with("conditions", &cond_list),
        |inst| {
            let kids = produce_conditions(inst.value_or("conditions", Vec::new()));
            Arc::new(move |e: &dyn Entity| kids.iter().all(|c| c(e))) as Condition
        },
    ));

    // or — short-circuit disjunction.
    conditions.register(Factory::new(
        "or",
        SchemaSet::new().with("conditions", &cond_list),
        |inst| {
            let kids = produce_conditions(inst.value_or("conditions", Vec::new()));
            Arc::new(move |e: &dyn Entity| kids.iter().any(|c| c(e))) as Condition
        },
    ));

    // not — boolean negation of one sub-condition.
    conditions.register(Factory::new(
        "not",
        SchemaSet::new().with("condition", &cond_ty),
        |inst| {
            let kid = inst
                .get::<FactoryInstance<Condition>>("condition")
                .map(FactoryInstance::produce)
                .unwrap_or_else(always);
            Arc::new(move |e: &dyn Entity| !kid(e)) as Condition
        },
    ));

    // if_else — branch on a condition; either branch may be omitted.
    actions.register(Factory::new(
        "if_else",
        SchemaSet::new()
            .with("condition", &cond_ty)
            .with_default("then", &act_list, Vec::new())
            .with_default("else", &act_list, Vec::new()),
        |inst| {
            let cond = inst
                .get::<FactoryInstance<Condition>>("condition")
                .map(FactoryInstance::produce)
                .unwrap_or_else(always);
            let then_branch = produce_actions(inst.value_or("then", Vec::new()));
            let else_branch = produce_actions(inst.value_or("else", Vec::new()));
            Arc::new(move |ctx: &mut ActionCtx<'_>| {
                let branch = if cond(&*ctx.entity) { &then_branch } else { &else_branch };
                for action in branch {
                    action(ctx);
                }
            }) as Action
        },
    ));

    // delay — schedule an action N ticks later via the holder's scheduler.
    actions.register(Factory::new(
        "delay",
        SchemaSet::new()
            .with("ticks", &bounded_i32(0, i32::MAX))
            .with("action", &act_ty),
        |inst| {
            let ticks = inst.value_or("ticks", 0_i32) as u64;
            let action = inst
                .get::<FactoryInstance<Action>>("action")
                .map(FactoryInstance::produce)
                .unwrap_or_else(no_op);
            Arc::new(move |ctx: &mut ActionCtx<'_>| {
                ctx.ops.push(DeferredOp::Schedule {
                    delay:  ticks,
                    action: action.clone(),
                });
            }) as Action
        },
    ));

    // all — run every sub-action in order.
    actions.register(Factory::new(
        "all",
        SchemaSet::new().with("actions", &act_list),
        |inst| {
            let kids = produce_actions(inst.value_or("actions", Vec::new()));
            Arc::new(move |ctx: &mut ActionCtx<'_>| {
                for action in &kids {
                    action(ctx);
                }
            }) as Action
        },
    ));
}

fn produce_conditions(bound: Vec<FactoryInstance<Condition>>) -> Vec<Condition> {
    bound.iter().map(FactoryInstance::produce).collect()
}

fn produce_actions(bound: Vec<FactoryInstance<Action>>) -> Vec<Action> {
    bound.iter().map(FactoryInstance::produce).collect()
}
