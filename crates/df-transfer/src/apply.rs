//! Snapshot, balance and write back through the host graph.

use df_core::{PoolId, Real, ResourceName};
use df_graph::{GraphResult, PartGraph};
use tracing::trace;

use crate::balancer::{PoolSnapshot, RateBudget, balance};
use crate::matcher::{EligibleResource, EligibleResourceSet};

/// Result of one tick across every eligible resource.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TickTransfer {
    pub per_resource: Vec<(ResourceName, Real)>,
    pub total: Real,
}

/// Move one resource for one tick. Returns the corrected volume moved.
///
/// Pools the host no longer knows about are skipped for this tick.
pub fn transfer_resource<G: PartGraph + ?Sized>(
    graph: &mut G,
    entry: &EligibleResource,
    budget: &RateBudget,
) -> GraphResult<Real> {
    let mut available = snapshots(&*graph, &entry.available);
    let mut required = snapshots(&*graph, &entry.required);
    let before: Vec<PoolSnapshot> = available.iter().chain(required.iter()).copied().collect();

    let outcome = balance(&mut available, &mut required, budget);
    trace!(
        resource = %entry.resource,
        available = outcome.available_volume,
        required = outcome.required_volume,
        rate = outcome.rate_volume,
        moved = outcome.transferred,
        "resource balanced"
    );

    for (old, new) in before.iter().zip(available.iter().chain(required.iter())) {
        if old.amount != new.amount {
            graph.set_pool_amount(new.id, new.amount)?;
        }
    }
    Ok(outcome.transferred)
}

fn snapshots<G: PartGraph + ?Sized>(graph: &G, ids: &[PoolId]) -> Vec<PoolSnapshot> {
    ids.iter()
        .filter_map(|&id| graph.pool(id).map(PoolSnapshot::capture))
        .collect()
}

/// Move every eligible resource for one tick.
pub fn transfer_all<G: PartGraph + ?Sized>(
    graph: &mut G,
    eligible: &EligibleResourceSet,
    budget: &RateBudget,
) -> GraphResult<TickTransfer> {
    let mut result = TickTransfer::default();
    for entry in eligible.iter() {
        let moved = transfer_resource(graph, entry, budget)?;
        result.total += moved;
        result.per_resource.push((entry.resource.clone(), moved));
    }
    Ok(result)
}
