//! The `Entity` capability trait — the engine's sole boundary to host state.
//!
//! Conditions read through this surface and actions mutate through it; no
//! engine code touches a host API directly.  The host adapter implements
//! this trait over whatever its real entity type is and hands a `&mut dyn
//! Entity` to the holder once per tick.

/// Narrow capability surface over one simulated entity.
///
/// Every method has a direct host-side equivalent; the engine adds no
/// semantics of its own here.  Implementations are expected to be cheap —
/// these are called from condition evaluation inside the tick loop.
pub trait Entity {
    // ── Health ────────────────────────────────────────────────────────────

    fn health(&self) -> f64;

    fn set_health(&mut self, health: f64);

    /// Raise health by `amount` (host clamps to its own maximum).
    fn heal(&mut self, amount: f64) {
        let h = self.health();
        self.set_health(h + amount);
    }

    /// Lower health by `amount` (host applies its own damage pipeline).
    fn damage(&mut self, amount: f64) {
        let h = self.health();
        self.set_health(h - amount);
    }

    // ── Status flags ──────────────────────────────────────────────────────

    fn is_on_fire(&self) -> bool;

    fn set_on_fire(&mut self, lit: bool);

    fn is_sneaking(&self) -> bool;

    fn is_sprinting(&self) -> bool;

    fn is_swimming(&self) -> bool;

    fn is_on_ground(&self) -> bool;

    fn is_in_water(&self) -> bool;

    fn is_alive(&self) -> bool;

    // ── Imperatives ───────────────────────────────────────────────────────

    fn kill(&mut self);

    /// Apply a velocity impulse in host units.
    fn add_velocity(&mut self, x: f64, y: f64, z: f64);

    /// Deliver a text message to whoever observes this entity (chat, log…).
    fn send_message(&mut self, text: &str);
}

// ── BasicEntity ───────────────────────────────────────────────────────────────

/// A plain-struct [`Entity`] for tests, demos, and headless hosts.
///
/// All state is public; messages accumulate in `messages` and velocity
/// impulses sum into `velocity`.
#[derive(Clone, Debug)]
pub struct BasicEntity {
    pub health: f64,
    pub max_health: f64,
    pub on_fire: bool,
    pub sneaking: bool,
    pub sprinting: bool,
    pub swimming: bool,
    pub on_ground: bool,
    pub in_water: bool,
    pub velocity: (f64, f64, f64),
    pub messages: Vec<String>,
}

impl BasicEntity {
    pub fn new(max_health: f64) -> Self {
        Self {
            health: max_health,
            max_health,
            on_fire: false,
            sneaking: false,
            sprinting: false,
            swimming: false,
            on_ground: true,
            in_water: false,
            velocity: (0.0, 0.0, 0.0),
            messages: Vec::new(),
        }
    }
}

impl Default for BasicEntity {
    fn default() -> Self {
        Self::new(20.0)
    }
}

impl Entity for BasicEntity {
    fn health(&self) -> f64 {
        self.health
    }

    fn set_health(&mut self, health: f64) {
        self.health = health.clamp(0.0, self.max_health);
    }

    fn is_on_fire(&self) -> bool {
        self.on_fire
    }

    fn set_on_fire(&mut self, lit: bool) {
        self.on_fire = lit;
    }

    fn is_sneaking(&self) -> bool {
        self.sneaking
    }

    fn is_sprinting(&self) -> bool {
        self.sprinting
    }

    fn is_swimming(&self) -> bool {
        self.swimming
    }

    fn is_on_ground(&self) -> bool {
        self.on_ground
    }

    fn is_in_water(&self) -> bool {
        self.in_water
    }

    fn is_alive(&self) -> bool {
        self.health > 0.0
    }

    fn kill(&mut self) {
        self.health = 0.0;
    }

    fn add_velocity(&mut self, x: f64, y: f64, z: f64) {
        self.velocity.0 += x;
        self.velocity.1 += y;
        self.velocity.2 += z;
    }

    fn send_message(&mut self, text: &str) {
        self.messages.push(text.to_owned());
    }
}
