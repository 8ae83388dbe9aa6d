//! Splitting the part graph into the two sides of a docking connection.

use std::collections::BTreeSet;

use df_core::PartId;
use tracing::{debug, warn};

use crate::host::PartGraph;

/// The traversal hit its iteration ceiling.
///
/// Only a host graph that lies about its size can cause this; the side is
/// returned with whatever had been collected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TraversalOverrun {
    pub focal: PartId,
    pub iterations: usize,
    pub collected: usize,
}

/// Parts on one side of a connector that own at least one pool.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Side {
    parts: BTreeSet<PartId>,
    overrun: Option<TraversalOverrun>,
}

impl Side {
    pub fn parts(&self) -> impl Iterator<Item = PartId> + '_ {
        self.parts.iter().copied()
    }

    pub fn contains(&self, part: PartId) -> bool {
        self.parts.contains(&part)
    }

    pub fn len(&self) -> usize {
        self.parts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }

    pub fn overrun(&self) -> Option<TraversalOverrun> {
        self.overrun
    }
}

/// Collect the parts reachable from `focal` without entering `excluded`.
///
/// Expansion is breadth-first over parent/child adjacency. Parts that do not
/// allow flow are never entered; `focal` itself is always included and
/// expanded.
pub fn partition<G: PartGraph + ?Sized>(graph: &G, focal: PartId, excluded: PartId) -> Side {
    let ceiling = graph.part_count();
    let mut reached = BTreeSet::from([focal]);
    let mut frontier = vec![focal];
    let mut iterations = 0;
    let mut overrun = None;

    while !frontier.is_empty() {
        if iterations >= ceiling {
            let report = TraversalOverrun {
                focal,
                iterations,
                collected: reached.len(),
            };
            warn!(
                focal = %focal,
                iterations,
                collected = reached.len(),
                "side traversal exceeded part count; keeping partial side"
            );
            overrun = Some(report);
            break;
        }
        iterations += 1;

        let mut next = Vec::new();
        for &part in &frontier {
            for neighbour in graph.neighbours(part) {
                if neighbour == excluded
                    || reached.contains(&neighbour)
                    || !graph.allows_flow(neighbour)
                {
                    continue;
                }
                reached.insert(neighbour);
                next.push(neighbour);
            }
        }
        frontier = next;
    }

    let parts: BTreeSet<PartId> = reached
        .into_iter()
        .filter(|&p| !graph.part_pools(p).is_empty())
        .collect();
    debug!(focal = %focal, parts = parts.len(), iterations, "side collected");

    Side { parts, overrun }
}

/// Partition around the link between `near` and `far`.
///
/// In a cyclic graph a part can be reachable from both ends; such parts
/// are dropped from both sides so the sides stay disjoint.
pub fn partition_pair<G: PartGraph + ?Sized>(graph: &G, near: PartId, far: PartId) -> (Side, Side) {
    let mut near_side = partition(graph, near, far);
    let mut far_side = partition(graph, far, near);

    let shared: Vec<PartId> = near_side
        .parts
        .intersection(&far_side.parts)
        .copied()
        .collect();
    if !shared.is_empty() {
        warn!(
            near = %near,
            far = %far,
            shared = shared.len(),
            "parts reachable from both sides of the link were dropped"
        );
        for part in &shared {
            near_side.parts.remove(part);
            far_side.parts.remove(part);
        }
    }

    (near_side, far_side)
}
