//! grant — smallest end-to-end demo of the rust_bhv behavior engine.
//!
//! Loads three behavior definitions from embedded JSON, grants them to a
//! headless test entity, and runs 60 simulation ticks while an emergency
//! self-heal kicks in below half health.  Swap [`BasicEntity`] for an
//! adapter over a real game entity to run the same content in a live host.

use std::sync::Arc;

use anyhow::Result;

use bhv_content::register_defaults;
use bhv_core::{BasicEntity, SourceId, Tick};
use bhv_engine::{
    BehaviorRegistry, FactoryRegistry, Holder, register_composites, register_leaves,
};
use serde_json::Value;

// ── Constants ─────────────────────────────────────────────────────────────────

const TICKS:      u64 = 60;
const MAX_HEALTH: f64 = 20.0;

// ── Content definitions ───────────────────────────────────────────────────────

// Three definitions, exactly as a content pack would ship them on disk.
// `panic_heal` shows condition gating plus a delayed follow-up message.
const DEFINITIONS: &str = r#"
{
    "dash": { "type": "cooldown", "cooldown": 20 },
    "slow_mending": { "type": "regen", "amount": 0.5, "period": 4 },
    "panic_heal": {
        "type": "regen",
        "amount": 2.0,
        "period": 5,
        "conditions": [
            { "type": "health", "threshold": 10.0, "comparison": "<" },
            { "type": "alive" }
        ]
    }
}
"#;

// ── main ──────────────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    println!("=== grant — rust_bhv behavior engine ===");
    println!();

    // 1. Build the registries and register built-in + content factories.
    let conditions = Arc::new(FactoryRegistry::new("condition"));
    let actions = Arc::new(FactoryRegistry::new("action"));
    register_leaves(&conditions, &actions);
    register_composites(&conditions, &actions);

    let behaviors = BehaviorRegistry::new();
    register_defaults(&behaviors, &conditions);
    println!(
        "Registered factories: {} conditions, {} actions, {} behaviors",
        conditions.len(),
        actions.len(),
        behaviors.factories().len()
    );

    // 2. Decode the content definitions into behavior types.
    let pack: Value = serde_json::from_str(DEFINITIONS)?;
    let Value::Object(defs) = pack else {
        anyhow::bail!("definition pack must be a JSON object");
    };
    for (id, node) in &defs {
        behaviors.register_definition(id.as_str(), id.as_str(), node)?;
    }
    println!("Loaded {} behavior definitions", defs.len());

    // 3. Grant everything to a fresh entity, damaged below half health.
    let mut entity = BasicEntity::new(MAX_HEALTH);
    entity.health = 6.0;
    let mut holder = Holder::new();
    let source = SourceId::new("demo");
    for id in behaviors.ids() {
        let ty = behaviors
            .get(id.as_str())
            .ok_or_else(|| anyhow::anyhow!("definition `{id}` vanished"))?;
        holder.grant(&ty, source.clone(), &mut entity);
    }
    // Co-grant the cooldown from a second source: still one instance.
    if let Some(dash) = behaviors.get("dash") {
        holder.grant(&dash, SourceId::new("command"), &mut entity);
    }
    println!("Granted {} behaviors from source `demo`", holder.len());
    println!();

    // 4. Run the tick loop, logging health every 10 ticks.
    for t in 1..=TICKS {
        holder.tick(Tick(t), &mut entity, &behaviors);
        if t % 10 == 0 {
            println!(
                "T{t:>3}  health {:>5.1}/{MAX_HEALTH}  panic_heal {}",
                entity.health,
                if holder.get("panic_heal").is_some_and(|b| b.is_active(&entity)) {
                    "active"
                } else {
                    "idle"
                }
            );
        }
    }
    println!();

    // 5. Snapshot round trip: persist and restore onto a second entity.
    let snapshot = holder.save();
    let mut restored_entity = BasicEntity::new(MAX_HEALTH);
    let mut restored = Holder::new();
    let count = restored.load(&snapshot, &mut restored_entity, &behaviors);
    println!("Snapshot restored {count} behaviors: {:?}", restored.ids());

    Ok(())
}
