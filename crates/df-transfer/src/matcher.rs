//! Resource eligibility across the two sides of a connector.

use std::collections::{BTreeMap, BTreeSet};

use df_core::{PoolId, ResourceName};
use df_graph::{FlowMode, PartGraph, Side};
use tracing::debug;

/// Configured exclusions and direction overrides.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MatchRules {
    /// Resources never moved.
    pub ignore: BTreeSet<ResourceName>,
    /// Resources moved far-to-near instead of near-to-far.
    pub reverse: BTreeSet<ResourceName>,
}

/// Which way a resource moves across the connector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    NearToFar,
    FarToNear,
}

/// One resource type present on both sides.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EligibleResource {
    pub resource: ResourceName,
    pub direction: Direction,
    /// Pools resource is drawn from.
    pub available: Vec<PoolId>,
    /// Pools resource is delivered to.
    pub required: Vec<PoolId>,
}

/// Resources to move for one running session, ordered by name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EligibleResourceSet {
    entries: Vec<EligibleResource>,
}

impl EligibleResourceSet {
    pub fn iter(&self) -> impl Iterator<Item = &EligibleResource> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, resource: &ResourceName) -> Option<&EligibleResource> {
        self.entries.iter().find(|e| &e.resource == resource)
    }

    pub fn resources(&self) -> impl Iterator<Item = &ResourceName> {
        self.entries.iter().map(|e| &e.resource)
    }
}

/// Group the transferable pools of a side by resource type.
///
/// Ignored resources and `NoFlow` pools are left out. Pools keep part order,
/// then attachment order within a part.
pub fn pools_by_resource<G: PartGraph + ?Sized>(
    graph: &G,
    side: &Side,
    rules: &MatchRules,
) -> BTreeMap<ResourceName, Vec<PoolId>> {
    let mut grouped: BTreeMap<ResourceName, Vec<PoolId>> = BTreeMap::new();
    for part in side.parts() {
        for &pool_id in graph.part_pools(part) {
            let Some(pool) = graph.pool(pool_id) else {
                continue;
            };
            if pool.flow_mode == FlowMode::NoFlow || rules.ignore.contains(&pool.resource) {
                continue;
            }
            grouped
                .entry(pool.resource.clone())
                .or_default()
                .push(pool_id);
        }
    }
    grouped
}

/// Resource types present on both sides, with their direction resolved.
pub fn identify<G: PartGraph + ?Sized>(
    graph: &G,
    near: &Side,
    far: &Side,
    rules: &MatchRules,
) -> EligibleResourceSet {
    let near_pools = pools_by_resource(graph, near, rules);
    let mut far_pools = pools_by_resource(graph, far, rules);

    let mut entries = Vec::new();
    for (resource, near_list) in near_pools {
        let Some(far_list) = far_pools.remove(&resource) else {
            continue;
        };
        let entry = if rules.reverse.contains(&resource) {
            EligibleResource {
                resource,
                direction: Direction::FarToNear,
                available: far_list,
                required: near_list,
            }
        } else {
            EligibleResource {
                resource,
                direction: Direction::NearToFar,
                available: near_list,
                required: far_list,
            }
        };
        entries.push(entry);
    }

    debug!(
        resources = ?entries.iter().map(|e| e.resource.as_str()).collect::<Vec<_>>(),
        "eligible resources matched"
    );
    EligibleResourceSet { entries }
}
