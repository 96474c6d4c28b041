//! Unit tests for bhv-engine.

use std::any::Any;
use std::sync::Arc;

use bhv_core::{BasicEntity, Entity, SourceId, Tick};
use bhv_schema::{Node, SchemaSet, WireReader, WireWriter, builtin};
use serde_json::json;

use crate::behavior::Behavior;
use crate::error::EngineResult;
use crate::expr::{action_schema, condition_schema, no_op, register_composites};
use crate::factory::{Factory, FactoryInstance};
use crate::holder::Holder;
use crate::kind::{BehaviorProduct, BehaviorType, behavior_schema};
use crate::leaf::register_leaves;
use crate::ops::{Action, ActionCtx, Condition, DeferredOp};
use crate::registry::{ActionRegistry, BehaviorRegistry, ConditionRegistry, FactoryRegistry};

// ── Helpers ───────────────────────────────────────────────────────────────────

struct Rig {
    conditions: Arc<ConditionRegistry>,
    actions:    Arc<ActionRegistry>,
    behaviors:  BehaviorRegistry,
}

/// Fresh registries with every built-in leaf and composite registered, plus
/// the `probe` and `runner` test behavior factories.
fn rig() -> Rig {
    let conditions = Arc::new(FactoryRegistry::new("condition"));
    let actions = Arc::new(FactoryRegistry::new("action"));
    register_leaves(&conditions, &actions);
    register_composites(&conditions, &actions);

    let behaviors = BehaviorRegistry::new();
    behaviors.factories().register(Factory::new(
        "probe",
        behavior_schema(
            SchemaSet::new()
                .with_default("label", &builtin::string(), String::from("probe"))
                .with_default("always_tick", &builtin::bool(), false),
            &conditions,
        ),
        |inst| {
            Box::new(Probe {
                label: inst.value_or("label", String::from("probe")),
                always_tick: inst.value_or("always_tick", false),
                ticks: 0,
            }) as BehaviorProduct
        },
    ));
    {
        let act = action_schema(&actions);
        behaviors.factories().register(Factory::new(
            "runner",
            behavior_schema(SchemaSet::new().with("action", &act), &conditions),
            |inst| {
                let action = inst
                    .get::<FactoryInstance<Action>>("action")
                    .map(FactoryInstance::produce)
                    .unwrap_or_else(no_op);
                Box::new(Runner { action, fired: false }) as BehaviorProduct
            },
        ));
    }

    Rig { conditions, actions, behaviors }
}

/// Records its lifecycle into the entity's message log and counts updates.
struct Probe {
    label:       String,
    always_tick: bool,
    ticks:       u64,
}

impl Behavior for Probe {
    fn on_added(&mut self, entity: &mut dyn Entity, from_sync: bool) {
        entity.send_message(&format!("{}:added:{from_sync}", self.label));
    }

    fn on_gained(&mut self, entity: &mut dyn Entity) {
        entity.send_message(&format!("{}:gained", self.label));
    }

    fn on_removed(&mut self, entity: &mut dyn Entity, from_sync: bool) {
        entity.send_message(&format!("{}:removed:{from_sync}", self.label));
    }

    fn on_lost(&mut self, entity: &mut dyn Entity) {
        entity.send_message(&format!("{}:lost", self.label));
    }

    fn on_respawn(&mut self, entity: &mut dyn Entity) {
        entity.send_message(&format!("{}:respawn", self.label));
    }

    fn tick_needed(&self) -> bool {
        true
    }

    fn tick_even_when_inactive(&self) -> bool {
        self.always_tick
    }

    fn update(&mut self, ctx: &mut ActionCtx<'_>) -> EngineResult<()> {
        self.ticks += 1;
        ctx.entity.send_message(&format!("{}:tick", self.label));
        Ok(())
    }

    fn save_data(&self) -> Node {
        json!({ "ticks": self.ticks })
    }

    fn load_data(&mut self, data: &Node) {
        if let Some(n) = data.get("ticks").and_then(Node::as_u64) {
            self.ticks = n;
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// Runs its configured action on the first update only.
struct Runner {
    action: Action,
    fired:  bool,
}

impl Behavior for Runner {
    fn tick_needed(&self) -> bool {
        true
    }

    fn update(&mut self, ctx: &mut ActionCtx<'_>) -> EngineResult<()> {
        if !self.fired {
            self.fired = true;
            (self.action)(ctx);
        }
        Ok(())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

fn decode_condition(rig: &Rig, node: Node) -> Condition {
    condition_schema(&rig.conditions)
        .from_text(&node)
        .unwrap()
        .produce()
}

fn decode_action(rig: &Rig, node: Node) -> Action {
    action_schema(&rig.actions).from_text(&node).unwrap().produce()
}

fn run_action(action: &Action, entity: &mut BasicEntity) -> Vec<DeferredOp> {
    let mut ops = Vec::new();
    let mut ctx = ActionCtx { entity, now: Tick(0), ops: &mut ops };
    action(&mut ctx);
    ops
}

fn src(name: &str) -> SourceId {
    SourceId::new(name)
}

#[cfg(test)]
mod conditions {
    use super::*;

    #[test]
    fn health_threshold_with_comparison() {
        let rig = rig();
        let mut e = BasicEntity::new(20.0);
        e.health = 8.0;

        let low = decode_condition(&rig, json!({"type": "health", "threshold": 10.0, "comparison": "less"}));
        assert!(low(&e));
        e.health = 12.0;
        assert!(!low(&e));
    }

    #[test]
    fn comparison_accepts_symbol_aliases() {
        let rig = rig();
        let mut e = BasicEntity::new(20.0);
        e.health = 10.0;

        let exact = decode_condition(&rig, json!({"type": "health", "threshold": 10.0, "comparison": "=="}));
        assert!(exact(&e));
        let ge = decode_condition(&rig, json!({"type": "health", "threshold": 10.0, "comparison": ">="}));
        assert!(ge(&e));
    }

    #[test]
    fn comparison_defaults_to_greater_or_equal() {
        let rig = rig();
        let e = BasicEntity::new(20.0);
        let c = decode_condition(&rig, json!({"type": "health", "threshold": 20.0}));
        assert!(c(&e));
    }

    #[test]
    fn state_flags() {
        let rig = rig();
        let mut e = BasicEntity::new(20.0);
        e.on_fire = true;
        e.in_water = false;

        assert!(decode_condition(&rig, json!({"type": "on_fire"}))(&e));
        assert!(!decode_condition(&rig, json!({"type": "in_water"}))(&e));
        assert!(decode_condition(&rig, json!({"type": "alive"}))(&e));
        e.health = 0.0;
        assert!(!decode_condition(&rig, json!({"type": "alive"}))(&e));
    }

    #[test]
    fn and_or_not_compose() {
        let rig = rig();
        let mut e = BasicEntity::new(20.0);
        e.on_fire = true;
        e.sneaking = false;

        let both = decode_condition(
            &rig,
            json!({"type": "and", "conditions": [{"type": "on_fire"}, {"type": "sneaking"}]}),
        );
        assert!(!both(&e));

        let either = decode_condition(
            &rig,
            json!({"type": "or", "conditions": [{"type": "on_fire"}, {"type": "sneaking"}]}),
        );
        assert!(either(&e));

        let negated = decode_condition(&rig, json!({"type": "not", "condition": {"type": "sneaking"}}));
        assert!(negated(&e));
    }

    #[test]
    fn bare_condition_object_stands_in_for_a_one_item_list() {
        let rig = rig();
        let mut e = BasicEntity::new(20.0);
        e.on_fire = true;
        let c = decode_condition(&rig, json!({"type": "and", "conditions": {"type": "on_fire"}}));
        assert!(c(&e));
    }

    #[test]
    fn bare_string_stands_in_for_a_typed_object() {
        let rig = rig();
        let mut e = BasicEntity::new(20.0);
        e.on_fire = true;
        let c = decode_condition(&rig, json!({"type": "and", "conditions": ["on_fire", "alive"]}));
        assert!(c(&e));
        e.health = 0.0;
        assert!(!c(&e));
    }

    #[test]
    fn empty_and_is_vacuously_true() {
        let rig = rig();
        let e = BasicEntity::new(20.0);
        let c = decode_condition(&rig, json!({"type": "and", "conditions": []}));
        assert!(c(&e));
    }

    #[test]
    fn unknown_condition_id_falls_back_to_true() {
        let rig = rig();
        let e = BasicEntity::new(20.0);
        let c = decode_condition(&rig, json!({"type": "no_such_condition"}));
        assert!(c(&e));
    }

    #[test]
    fn missing_type_key_is_an_error() {
        let rig = rig();
        let err = condition_schema(&rig.conditions)
            .from_text(&json!({"threshold": 1.0}))
            .unwrap_err();
        assert!(err.to_string().contains("type"));
    }
}

#[cfg(test)]
mod actions {
    use super::*;

    #[test]
    fn heal_and_damage_respect_clamping() {
        let rig = rig();
        let mut e = BasicEntity::new(20.0);
        e.health = 15.0;

        let heal = decode_action(&rig, json!({"type": "heal", "amount": 10.0}));
        run_action(&heal, &mut e);
        assert_eq!(e.health, 20.0);

        let hurt = decode_action(&rig, json!({"type": "damage", "amount": 25.0}));
        run_action(&hurt, &mut e);
        assert_eq!(e.health, 0.0);
    }

    #[test]
    fn modify_health_operations() {
        let rig = rig();
        let mut e = BasicEntity::new(20.0);
        e.health = 10.0;

        let set = decode_action(&rig, json!({"type": "modify_health", "operation": "set", "amount": 4.0}));
        run_action(&set, &mut e);
        assert_eq!(e.health, 4.0);

        let mul = decode_action(&rig, json!({"type": "modify_health", "operation": "*", "amount": 3.0}));
        run_action(&mul, &mut e);
        assert_eq!(e.health, 12.0);

        let add = decode_action(&rig, json!({"type": "modify_health", "amount": 2.0}));
        run_action(&add, &mut e);
        assert_eq!(e.health, 14.0);
    }

    #[test]
    fn message_requires_text() {
        let rig = rig();
        let mut e = BasicEntity::new(20.0);

        let say = decode_action(&rig, json!({"type": "message", "text": "hello"}));
        run_action(&say, &mut e);
        assert_eq!(e.messages, vec!["hello"]);

        let err = action_schema(&rig.actions)
            .from_text(&json!({"type": "message"}))
            .unwrap_err();
        assert!(err.to_string().contains("text"));
    }

    #[test]
    fn velocity_accumulates() {
        let rig = rig();
        let mut e = BasicEntity::new(20.0);
        let launch = decode_action(&rig, json!({"type": "velocity", "y": 0.5}));
        run_action(&launch, &mut e);
        run_action(&launch, &mut e);
        assert_eq!(e.velocity, (0.0, 1.0, 0.0));
    }

    #[test]
    fn if_else_picks_branch() {
        let rig = rig();
        let mut e = BasicEntity::new(20.0);
        let branch = decode_action(
            &rig,
            json!({
                "type": "if_else",
                "condition": {"type": "on_fire"},
                "then": [{"type": "message", "text": "burning"}],
                "else": [{"type": "message", "text": "fine"}]
            }),
        );

        run_action(&branch, &mut e);
        e.on_fire = true;
        run_action(&branch, &mut e);
        assert_eq!(e.messages, vec!["fine", "burning"]);
    }

    #[test]
    fn all_runs_in_order() {
        let rig = rig();
        let mut e = BasicEntity::new(20.0);
        let seq = decode_action(
            &rig,
            json!({
                "type": "all",
                "actions": [
                    {"type": "message", "text": "one"},
                    {"type": "message", "text": "two"}
                ]
            }),
        );
        run_action(&seq, &mut e);
        assert_eq!(e.messages, vec!["one", "two"]);
    }

    #[test]
    fn delay_defers_instead_of_running() {
        let rig = rig();
        let mut e = BasicEntity::new(20.0);
        let later = decode_action(
            &rig,
            json!({"type": "delay", "ticks": 3, "action": {"type": "message", "text": "boom"}}),
        );
        let ops = run_action(&later, &mut e);
        assert!(e.messages.is_empty());
        assert!(matches!(ops.as_slice(), [DeferredOp::Schedule { delay: 3, .. }]));
    }

    #[test]
    fn grant_emits_deferred_op() {
        let rig = rig();
        let mut e = BasicEntity::new(20.0);
        let grant = decode_action(
            &rig,
            json!({"type": "grant", "behavior": "some_def", "source": "chain"}),
        );
        let ops = run_action(&grant, &mut e);
        match ops.as_slice() {
            [DeferredOp::Grant { behavior, source }] => {
                assert_eq!(behavior.id().as_str(), "some_def");
                assert_eq!(source.as_str(), "chain");
            }
            other => panic!("expected one Grant op, got {} ops", other.len()),
        }
    }

    #[test]
    fn unknown_action_id_falls_back_to_no_op() {
        let rig = rig();
        let mut e = BasicEntity::new(20.0);
        let a = decode_action(&rig, json!({"type": "no_such_action"}));
        run_action(&a, &mut e);
        assert!(e.messages.is_empty());
    }
}

#[cfg(test)]
mod wire {
    use super::*;

    #[test]
    fn condition_tree_survives_binary_round_trip() {
        let rig = rig();
        let ty = condition_schema(&rig.conditions);
        let bound = ty
            .from_text(&json!({
                "type": "and",
                "conditions": [
                    {"type": "on_fire"},
                    {"type": "health", "threshold": 5.0, "comparison": "<"}
                ]
            }))
            .unwrap();

        let mut w = WireWriter::new();
        ty.to_bytes(&bound, &mut w);
        let bytes = w.into_bytes();

        let mut r = WireReader::new(&bytes);
        let back = ty.from_bytes(&mut r).unwrap();
        assert_eq!(r.remaining(), 0);

        let mut e = BasicEntity::new(20.0);
        e.on_fire = true;
        e.health = 3.0;
        assert!(back.produce()(&e));
        e.health = 10.0;
        assert!(!back.produce()(&e));
    }

    #[test]
    fn unknown_id_on_the_wire_is_strict() {
        let rig = rig();
        let mut w = WireWriter::new();
        w.put_str("no_such_condition");
        let bytes = w.into_bytes();

        let mut r = WireReader::new(&bytes);
        let err = condition_schema(&rig.conditions).from_bytes(&mut r).unwrap_err();
        assert!(err.to_string().contains("no_such_condition"));
    }

    #[test]
    fn text_re_emission_carries_the_type_key() {
        let rig = rig();
        let ty = action_schema(&rig.actions);
        let bound = ty
            .from_text(&json!({"type": "message", "text": "hi"}))
            .unwrap();
        let node = ty.to_text(&bound);
        assert_eq!(node.get("type"), Some(&json!("message")));
        assert_eq!(node.get("text"), Some(&json!("hi")));
    }
}

#[cfg(test)]
mod behavior_types {
    use super::*;

    #[test]
    fn definition_decodes_and_produces_instances() {
        let rig = rig();
        let ty = rig
            .behaviors
            .register_definition(
                "labelled",
                "Labelled Probe",
                &json!({"type": "probe", "label": "lab"}),
            )
            .unwrap();
        assert_eq!(ty.display_name(), "Labelled Probe");

        let mut e = BasicEntity::new(20.0);
        let mut holder = Holder::new();
        holder.grant(&ty, src("test"), &mut e);
        assert_eq!(e.messages, vec!["lab:added:false", "lab:gained"]);
    }

    #[test]
    fn unknown_factory_in_definition_is_an_error() {
        let rig = rig();
        let err = rig
            .behaviors
            .register_definition("bad", "Bad", &json!({"type": "nope"}))
            .unwrap_err();
        assert!(err.to_string().contains("nope"));
    }

    #[test]
    fn conditions_field_gates_activity() {
        let rig = rig();
        let ty = rig
            .behaviors
            .register_definition(
                "fire_probe",
                "Fire Probe",
                &json!({"type": "probe", "conditions": [{"type": "on_fire"}]}),
            )
            .unwrap();

        let mut e = BasicEntity::new(20.0);
        let mut holder = Holder::new();
        holder.grant(&ty, src("test"), &mut e);

        let active = holder.get("fire_probe").unwrap();
        assert!(!active.is_active(&e));
        e.on_fire = true;
        assert!(active.is_active(&e));
    }
}

#[cfg(test)]
mod holders {
    use super::*;

    fn probe_type(rig: &Rig, id: &str, extra: Node) -> Arc<BehaviorType> {
        let mut def = json!({"type": "probe", "label": id});
        if let (Node::Object(dst), Node::Object(extra)) = (&mut def, extra) {
            dst.extend(extra);
        }
        rig.behaviors.register_definition(id, id, &def).unwrap()
    }

    #[test]
    fn grant_is_idempotent_per_source() {
        let rig = rig();
        let ty = probe_type(&rig, "p", json!({}));
        let mut e = BasicEntity::new(20.0);
        let mut holder = Holder::new();

        assert!(holder.grant(&ty, src("a"), &mut e));
        assert!(!holder.grant(&ty, src("a"), &mut e));
        assert!(!holder.grant(&ty, src("b"), &mut e));
        assert_eq!(holder.len(), 1);
        // Hooks fired exactly once.
        assert_eq!(e.messages, vec!["p:added:false", "p:gained"]);
    }

    #[test]
    fn instance_survives_until_last_source_revoked() {
        let rig = rig();
        let ty = probe_type(&rig, "p", json!({}));
        let mut e = BasicEntity::new(20.0);
        let mut holder = Holder::new();

        holder.grant(&ty, src("a"), &mut e);
        holder.grant(&ty, src("b"), &mut e);

        assert!(!holder.revoke("p", &src("a"), &mut e));
        assert!(holder.has("p"));
        assert!(holder.revoke("p", &src("b"), &mut e));
        assert!(!holder.has("p"));
        assert_eq!(
            e.messages,
            vec!["p:added:false", "p:gained", "p:removed:false", "p:lost"]
        );
    }

    #[test]
    fn revoke_of_unattached_or_wrong_source_is_a_no_op() {
        let rig = rig();
        let ty = probe_type(&rig, "p", json!({}));
        let mut e = BasicEntity::new(20.0);
        let mut holder = Holder::new();

        assert!(!holder.revoke("p", &src("a"), &mut e));
        holder.grant(&ty, src("a"), &mut e);
        assert!(!holder.revoke("p", &src("never-granted"), &mut e));
        assert!(holder.has("p"));
    }

    #[test]
    fn revoke_all_from_source() {
        let rig = rig();
        let a = probe_type(&rig, "a_probe", json!({}));
        let b = probe_type(&rig, "b_probe", json!({}));
        let mut e = BasicEntity::new(20.0);
        let mut holder = Holder::new();

        holder.grant(&a, src("quest"), &mut e);
        holder.grant(&b, src("quest"), &mut e);
        holder.grant(&b, src("command"), &mut e);

        assert_eq!(holder.revoke_all_from_source(&src("quest"), &mut e), 1);
        assert!(!holder.has("a_probe"));
        assert!(holder.has("b_probe"), "co-granted instance survives");
    }

    #[test]
    fn ticking_respects_activity_gate() {
        let rig = rig();
        let gated = probe_type(&rig, "gated", json!({"conditions": [{"type": "on_fire"}]}));
        let mut e = BasicEntity::new(20.0);
        let mut holder = Holder::new();
        holder.grant(&gated, src("test"), &mut e);
        e.messages.clear();

        holder.tick(Tick(1), &mut e, &rig.behaviors);
        assert!(e.messages.is_empty(), "inactive behavior must not update");

        e.on_fire = true;
        holder.tick(Tick(2), &mut e, &rig.behaviors);
        assert_eq!(e.messages, vec!["gated:tick"]);
    }

    #[test]
    fn tick_even_when_inactive_overrides_the_gate() {
        let rig = rig();
        let eager = probe_type(
            &rig,
            "eager",
            json!({"always_tick": true, "conditions": [{"type": "on_fire"}]}),
        );
        let mut e = BasicEntity::new(20.0);
        let mut holder = Holder::new();
        holder.grant(&eager, src("test"), &mut e);
        e.messages.clear();

        holder.tick(Tick(1), &mut e, &rig.behaviors);
        assert_eq!(e.messages, vec!["eager:tick"]);
    }

    #[test]
    fn tick_order_is_sorted_by_id() {
        let rig = rig();
        let b = probe_type(&rig, "b_probe", json!({}));
        let a = probe_type(&rig, "a_probe", json!({}));
        let mut e = BasicEntity::new(20.0);
        let mut holder = Holder::new();
        holder.grant(&b, src("test"), &mut e);
        holder.grant(&a, src("test"), &mut e);
        e.messages.clear();

        holder.tick(Tick(1), &mut e, &rig.behaviors);
        assert_eq!(e.messages, vec!["a_probe:tick", "b_probe:tick"]);
    }

    #[test]
    fn granted_action_applies_after_dispatch() {
        let rig = rig();
        probe_type(&rig, "reward", json!({}));
        let runner = rig
            .behaviors
            .register_definition(
                "granter",
                "granter",
                &json!({
                    "type": "runner",
                    "action": {"type": "grant", "behavior": "reward", "source": "chain"}
                }),
            )
            .unwrap();

        let mut e = BasicEntity::new(20.0);
        let mut holder = Holder::new();
        holder.grant(&runner, src("test"), &mut e);
        e.messages.clear();

        holder.tick(Tick(1), &mut e, &rig.behaviors);
        assert!(holder.has("reward"));
        assert!(holder.get("reward").unwrap().granted_by(&src("chain")));
        assert_eq!(e.messages, vec!["reward:added:false", "reward:gained"]);

        // The freshly granted probe joins the worklist on the next tick.
        e.messages.clear();
        holder.tick(Tick(2), &mut e, &rig.behaviors);
        assert_eq!(e.messages, vec!["reward:tick"]);
    }

    #[test]
    fn deferred_grant_of_unknown_type_is_dropped() {
        let rig = rig();
        let runner = rig
            .behaviors
            .register_definition(
                "granter",
                "granter",
                &json!({
                    "type": "runner",
                    "action": {"type": "grant", "behavior": "no_such_def", "source": "chain"}
                }),
            )
            .unwrap();

        let mut e = BasicEntity::new(20.0);
        let mut holder = Holder::new();
        holder.grant(&runner, src("test"), &mut e);
        holder.tick(Tick(1), &mut e, &rig.behaviors);
        assert_eq!(holder.len(), 1, "only the runner itself is attached");
    }

    #[test]
    fn delayed_action_fires_after_the_configured_ticks() {
        let rig = rig();
        let runner = rig
            .behaviors
            .register_definition(
                "fuse",
                "fuse",
                &json!({
                    "type": "runner",
                    "action": {"type": "delay", "ticks": 3, "action": {"type": "message", "text": "boom"}}
                }),
            )
            .unwrap();

        let mut e = BasicEntity::new(20.0);
        let mut holder = Holder::new();
        holder.grant(&runner, src("test"), &mut e);

        for t in 1..=3 {
            holder.tick(Tick(t), &mut e, &rig.behaviors);
            assert!(!e.messages.contains(&"boom".to_owned()), "tick {t} too early");
        }
        holder.tick(Tick(4), &mut e, &rig.behaviors);
        assert!(e.messages.contains(&"boom".to_owned()));
        assert_eq!(holder.delayed_len(), 0);
    }

    #[test]
    fn respawn_reaches_every_instance() {
        let rig = rig();
        let a = probe_type(&rig, "a_probe", json!({}));
        let b = probe_type(&rig, "b_probe", json!({}));
        let mut e = BasicEntity::new(20.0);
        let mut holder = Holder::new();
        holder.grant(&a, src("test"), &mut e);
        holder.grant(&b, src("test"), &mut e);
        e.messages.clear();

        holder.respawn(&mut e);
        let mut got = e.messages.clone();
        got.sort();
        assert_eq!(got, vec!["a_probe:respawn", "b_probe:respawn"]);
    }

    #[test]
    fn clear_detaches_everything() {
        let rig = rig();
        let ty = probe_type(&rig, "p", json!({}));
        let mut e = BasicEntity::new(20.0);
        let mut holder = Holder::new();
        holder.grant(&ty, src("a"), &mut e);
        holder.grant(&ty, src("b"), &mut e);
        e.messages.clear();

        holder.clear(&mut e);
        assert!(holder.is_empty());
        assert_eq!(e.messages, vec!["p:removed:false", "p:lost"]);
    }
}

#[cfg(test)]
mod persistence {
    use super::*;

    #[test]
    fn save_and_load_restore_sources_and_state() {
        let rig = rig();
        let ty = rig
            .behaviors
            .register_definition("p", "p", &json!({"type": "probe", "label": "p"}))
            .unwrap();

        let mut e = BasicEntity::new(20.0);
        let mut holder = Holder::new();
        holder.grant(&ty, src("a"), &mut e);
        holder.grant(&ty, src("b"), &mut e);
        holder.tick(Tick(1), &mut e, &rig.behaviors);
        holder.tick(Tick(2), &mut e, &rig.behaviors);

        let snapshot = holder.save();

        let mut e2 = BasicEntity::new(20.0);
        let mut restored = Holder::new();
        assert_eq!(restored.load(&snapshot, &mut e2, &rig.behaviors), 1);

        let active = restored.get("p").unwrap();
        assert!(active.granted_by(&src("a")));
        assert!(active.granted_by(&src("b")));
        assert_eq!(active.downcast_ref::<Probe>().unwrap().ticks, 2);

        // Restore is a sync attach: on_added(true) only, no on_gained.
        assert_eq!(e2.messages, vec!["p:added:true"]);
    }

    #[test]
    fn restored_instance_keeps_ticking() {
        let rig = rig();
        rig.behaviors
            .register_definition("p", "p", &json!({"type": "probe", "label": "p"}))
            .unwrap();
        let ty = rig.behaviors.get("p").unwrap();

        let mut e = BasicEntity::new(20.0);
        let mut holder = Holder::new();
        holder.grant(&ty, src("a"), &mut e);
        let snapshot = holder.save();

        let mut restored = Holder::new();
        restored.load(&snapshot, &mut e, &rig.behaviors);
        e.messages.clear();
        restored.tick(Tick(1), &mut e, &rig.behaviors);
        assert_eq!(e.messages, vec!["p:tick"]);
    }

    #[test]
    fn unknown_snapshot_ids_are_skipped() {
        let rig = rig();
        rig.behaviors
            .register_definition("known", "known", &json!({"type": "probe", "label": "known"}))
            .unwrap();

        let snapshot = json!([
            {"id": "vanished", "sources": ["a"], "data": null},
            {"id": "known",    "sources": ["a"], "data": null},
            {"sources": ["a"]}
        ]);

        let mut e = BasicEntity::new(20.0);
        let mut holder = Holder::new();
        assert_eq!(holder.load(&snapshot, &mut e, &rig.behaviors), 1);
        assert!(holder.has("known"));
    }

    #[test]
    fn snapshot_falls_back_to_factory_defaults() {
        // A grant whose id names a factory (not a registered type) restores
        // from that factory's declared defaults.
        let rig = rig();
        let snapshot = json!([
            {"id": "probe", "sources": ["command"], "data": {"ticks": 7}}
        ]);

        let mut e = BasicEntity::new(20.0);
        let mut holder = Holder::new();
        assert_eq!(holder.load(&snapshot, &mut e, &rig.behaviors), 1);
        assert_eq!(holder.get("probe").unwrap().downcast_ref::<Probe>().unwrap().ticks, 7);
    }

    #[test]
    fn snapshot_shape() {
        let rig = rig();
        let ty = rig
            .behaviors
            .register_definition("p", "p", &json!({"type": "probe", "label": "p"}))
            .unwrap();
        let mut e = BasicEntity::new(20.0);
        let mut holder = Holder::new();
        holder.grant(&ty, src("a"), &mut e);

        let snapshot = holder.save();
        assert_eq!(
            snapshot,
            json!([{
                "id":      "p",
                "sources": ["a"],
                "params":  {"type": "probe", "label": "p", "always_tick": false, "conditions": []},
                "data":    {"ticks": 0}
            }])
        );
    }

    #[test]
    fn reparameterized_grant_keeps_its_parameters_across_a_snapshot() {
        let rig = rig();
        let ty = rig
            .behaviors
            .register_definition("p", "p", &json!({"type": "probe", "label": "template"}))
            .unwrap();

        let mut e = BasicEntity::new(20.0);
        let mut holder = Holder::new();
        holder
            .grant_with(&ty, &json!({"label": "custom"}), src("a"), &mut e)
            .unwrap();
        let snapshot = holder.save();

        let mut e2 = BasicEntity::new(20.0);
        let mut restored = Holder::new();
        assert_eq!(restored.load(&snapshot, &mut e2, &rig.behaviors), 1);
        assert_eq!(e2.messages, vec!["custom:added:true"]);
    }

    #[test]
    fn snapshot_entry_without_sources_is_skipped() {
        // An instance with no sources could never be destroyed by a revoke.
        let rig = rig();
        rig.behaviors
            .register_definition("p", "p", &json!({"type": "probe", "label": "p"}))
            .unwrap();
        let snapshot = json!([
            {"id": "p", "data": null},
            {"id": "p", "sources": [], "data": null}
        ]);

        let mut e = BasicEntity::new(20.0);
        let mut holder = Holder::new();
        assert_eq!(holder.load(&snapshot, &mut e, &rig.behaviors), 0);
        assert!(holder.is_empty());
    }
}
