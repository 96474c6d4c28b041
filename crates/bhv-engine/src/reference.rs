//! Lazily-resolved references to behavior types.
//!
//! Definitions may reference behaviors registered later in load order, so a
//! reference resolves on first use, not at decode time.  The result —
//! including "nothing there" — is cached; a dangling reference is logged
//! once and treated as absent everywhere it is queried.

use std::sync::{Arc, OnceLock};

use bhv_core::BehaviorId;
use bhv_schema::{SchemaType, builtin};
use tracing::warn;

use crate::kind::BehaviorType;
use crate::registry::BehaviorRegistry;

/// A by-id reference to a [`BehaviorType`], resolved and cached on first use.
pub struct BehaviorRef {
    id:   BehaviorId,
    cell: OnceLock<Option<Arc<BehaviorType>>>,
}

impl BehaviorRef {
    pub fn new(id: impl Into<BehaviorId>) -> Self {
        Self {
            id:   id.into(),
            cell: OnceLock::new(),
        }
    }

    pub fn id(&self) -> &BehaviorId {
        &self.id
    }

    /// Look the reference up, caching the outcome.
    ///
    /// Returns `None` (and warns, once) if no type is registered under the
    /// id at first query.
    pub fn resolve(&self, registry: &BehaviorRegistry) -> Option<&Arc<BehaviorType>> {
        self.cell
            .get_or_init(|| {
                let found = registry.get(self.id.as_str());
                if found.is_none() {
                    warn!(id = %self.id, "dangling behavior reference; treating as absent");
                }
                found
            })
            .as_ref()
    }

    /// Whether resolution has happened yet (regardless of outcome).
    pub fn is_resolved(&self) -> bool {
        self.cell.get().is_some()
    }
}

/// Schema type for behavior references: a plain identifier string in both
/// text and wire form, layered over the string codec via `wrap`.
pub fn behavior_ref_schema() -> SchemaType<Arc<BehaviorRef>> {
    builtin::string().wrap(
        "behavior_ref",
        |id| Arc::new(BehaviorRef::new(id)),
        |r: &Arc<BehaviorRef>| r.id().as_str().to_owned(),
    )
}
