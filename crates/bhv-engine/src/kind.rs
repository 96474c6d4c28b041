//! `BehaviorType` — a registered, parameterized producer of behavior
//! instances.

use std::sync::Arc;

use bhv_core::BehaviorId;
use bhv_schema::{DecodeResult, Node, SchemaSet, list};

use crate::behavior::Behavior;
use crate::expr::condition_schema;
use crate::factory::{Factory, FactoryInstance};
use crate::holder::ActiveBehavior;
use crate::ops::Condition;
use crate::registry::ConditionRegistry;

/// What a behavior factory constructs.
pub type BehaviorProduct = Box<dyn Behavior>;

/// Reserved field every behavior schema carries: the attached conditions.
pub const CONDITIONS_FIELD: &str = "conditions";

/// Extend a behavior's field set with the reserved `conditions` field
/// (a list of conditions, default empty).
///
/// Content factories build their schema through this so `is_active` works
/// uniformly: an empty condition list is vacuously active.
pub fn behavior_schema(set: SchemaSet, conditions: &Arc<ConditionRegistry>) -> SchemaSet {
    set.with_default(
        CONDITIONS_FIELD,
        &list(condition_schema(conditions)),
        Vec::new(),
    )
}

/// Wraps one bound behavior factory instance and produces [`ActiveBehavior`]s.
pub struct BehaviorType {
    id:           BehaviorId,
    display_name: String,
    template:     FactoryInstance<BehaviorProduct>,
}

impl std::fmt::Debug for BehaviorType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BehaviorType")
            .field("id", &self.id)
            .field("display_name", &self.display_name)
            .field("template", &self.template)
            .finish()
    }
}

impl BehaviorType {
    pub fn new(
        id: impl Into<BehaviorId>,
        display_name: impl Into<String>,
        template: FactoryInstance<BehaviorProduct>,
    ) -> Self {
        Self {
            id:           id.into(),
            display_name: display_name.into(),
            template,
        }
    }

    /// Restore fallback: a type built from a factory's declared defaults,
    /// named after the factory itself.
    ///
    /// Fails if any of the factory's fields has no default.
    pub fn from_factory_defaults(factory: &Factory<BehaviorProduct>) -> DecodeResult<Self> {
        Ok(Self::new(factory.id(), factory.id(), factory.with_defaults()?))
    }

    pub fn id(&self) -> &BehaviorId {
        &self.id
    }

    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    pub fn template(&self) -> &FactoryInstance<BehaviorProduct> {
        &self.template
    }

    /// Produce a fresh instance from the bound template.
    pub fn create(&self) -> ActiveBehavior {
        Self::assemble(&self.id, &self.template)
    }

    /// Produce a fresh instance from `node` instead of the bound template —
    /// this is how one behavior type is reused with different
    /// parameterizations (content addressed as "definition-id:index").
    pub fn create_with(&self, node: &Node) -> DecodeResult<ActiveBehavior> {
        let bound = self.template.factory().read_text(node)?;
        Ok(Self::assemble(&self.id, &bound))
    }

    fn assemble(id: &BehaviorId, bound: &FactoryInstance<BehaviorProduct>) -> ActiveBehavior {
        let conditions: Vec<Condition> = bound
            .instance()
            .get::<Vec<FactoryInstance<Condition>>>(CONDITIONS_FIELD)
            .map(|list| list.iter().map(FactoryInstance::produce).collect())
            .unwrap_or_default();
        ActiveBehavior::new(id.clone(), bound.clone(), conditions)
    }
}
