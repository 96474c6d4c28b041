//! Unit tests for bhv-core primitives.

#[cfg(test)]
mod tick {
    use crate::Tick;

    #[test]
    fn arithmetic() {
        let t = Tick(10);
        assert_eq!(t + 5, Tick(15));
        assert_eq!(t.offset(3), Tick(13));
        assert_eq!(Tick(15) - Tick(10), 5);
        assert_eq!(Tick(15).since(Tick(10)), 5);
    }

    #[test]
    fn display() {
        assert_eq!(Tick(42).to_string(), "T42");
    }

    #[test]
    fn default_is_zero() {
        assert_eq!(Tick::default(), Tick::ZERO);
    }
}

#[cfg(test)]
mod ids {
    use std::collections::HashMap;

    use crate::{BehaviorId, SourceId};

    #[test]
    fn borrow_str_map_lookup() {
        let mut map: HashMap<BehaviorId, u32> = HashMap::new();
        map.insert(BehaviorId::new("cooldown"), 1);
        // Query with a plain &str — no allocation.
        assert_eq!(map.get("cooldown"), Some(&1));
        assert_eq!(map.get("missing"), None);
    }

    #[test]
    fn display_is_bare_name() {
        assert_eq!(SourceId::new("command").to_string(), "command");
    }

    #[test]
    fn from_conversions() {
        assert_eq!(BehaviorId::from("x"), BehaviorId::new(String::from("x")));
    }
}

#[cfg(test)]
mod compare {
    use crate::Comparison;

    #[test]
    fn truth_table() {
        use Comparison::*;
        assert!(Less.evaluate(1, 2));
        assert!(!Less.evaluate(2, 2));
        assert!(LessOrEqual.evaluate(2, 2));
        assert!(Equal.evaluate(3.0, 3.0));
        assert!(NotEqual.evaluate(3.0, 4.0));
        assert!(GreaterOrEqual.evaluate(4, 4));
        assert!(Greater.evaluate(5, 4));
        assert!(!Greater.evaluate(4, 4));
    }

    #[test]
    fn names_and_symbols() {
        assert_eq!(Comparison::LessOrEqual.as_str(), "less_or_equal");
        assert_eq!(Comparison::LessOrEqual.symbol(), "<=");
        // Ordinal order is the wire order and must stay stable.
        assert_eq!(Comparison::ALL[0], Comparison::Less);
        assert_eq!(Comparison::ALL[5], Comparison::Greater);
    }
}

#[cfg(test)]
mod entity {
    use crate::{BasicEntity, Entity};

    #[test]
    fn health_clamps_to_max() {
        let mut e = BasicEntity::new(20.0);
        e.heal(10.0);
        assert_eq!(e.health(), 20.0);
        e.damage(25.0);
        assert_eq!(e.health(), 0.0);
        assert!(!e.is_alive());
    }

    #[test]
    fn kill_zeroes_health() {
        let mut e = BasicEntity::new(20.0);
        e.kill();
        assert!(!e.is_alive());
    }

    #[test]
    fn velocity_accumulates() {
        let mut e = BasicEntity::default();
        e.add_velocity(1.0, 0.5, 0.0);
        e.add_velocity(0.0, 0.5, -1.0);
        assert_eq!(e.velocity, (1.0, 1.0, -1.0));
    }

    #[test]
    fn messages_recorded() {
        let mut e = BasicEntity::default();
        e.send_message("hello");
        assert_eq!(e.messages, vec!["hello"]);
    }
}
