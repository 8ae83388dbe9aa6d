//! Integration tests for df-graph.

use df_core::{Mass, PartId, PoolId, Real, Temperature, kg};
use df_graph::{
    GraphResult, LinkState, PartGraph, Pool, Vessel, VesselBuilder, partition, partition_pair,
};

/// Two stacks docked port-to-port, with a side branch on each.
///
/// ```text
/// A0 - A1 - PortA == PortB - B1 - B2
///       \                     \
///        A2                    B3
/// ```
fn docked_stacks() -> (Vessel, PartId, PartId) {
    let mut b = VesselBuilder::new();
    let a0 = b.add_part("A0", kg(1.0));
    let a1 = b.attach_part("A1", a0, kg(1.0));
    let a2 = b.attach_part("A2", a1, kg(1.0));
    let port_a = b.attach_part("PortA", a1, kg(0.1));
    let port_b = b.add_part("PortB", kg(0.1));
    let b1 = b.attach_part("B1", port_b, kg(1.0));
    let b2 = b.attach_part("B2", b1, kg(1.0));
    let b3 = b.attach_part("B3", b1, kg(1.0));
    for part in [a0, a1, a2, port_a, port_b, b1, b2, b3] {
        b.add_pool(part, "MonoPropellant", 1.0, 10.0);
    }
    b.add_docking_port(port_a);
    b.add_docking_port(port_b);
    b.dock(port_a, port_b);
    (b.build().unwrap(), port_a, port_b)
}

#[test]
fn sides_are_disjoint_and_exclude_other_endpoint() {
    let (vessel, port_a, port_b) = docked_stacks();
    let (near, far) = partition_pair(&vessel, port_a, port_b);

    assert_eq!(near.len(), 4);
    assert_eq!(far.len(), 4);
    for part in near.parts() {
        assert!(!far.contains(part));
    }
    assert!(near.contains(port_a));
    assert!(!near.contains(port_b));
    assert!(far.contains(port_b));
    assert!(!far.contains(port_a));
}

#[test]
fn sides_cover_everything_reachable() {
    let (vessel, port_a, port_b) = docked_stacks();
    let (near, far) = partition_pair(&vessel, port_a, port_b);
    assert_eq!(near.len() + far.len(), vessel.part_count());
}

#[test]
fn partless_pools_are_filtered() {
    let (vessel, port_a, port_b) = docked_stacks();
    let a1 = vessel.find_part("A1").unwrap();
    let mut b = VesselBuilder::new();
    let root = b.add_part("Root", kg(1.0));
    let empty = b.attach_part("Strut", root, kg(0.05));
    b.add_pool(root, "Ore", 0.0, 1.0);
    let small = b.build().unwrap();

    let side = partition(&small, root, PartId::from_index(42));
    assert!(side.contains(root));
    assert!(!side.contains(empty));

    let near = partition(&vessel, port_a, port_b);
    assert!(near.contains(a1));
}

#[test]
fn link_states_follow_undock() {
    let (mut vessel, port_a, port_b) = docked_stacks();
    assert!(vessel.link_state(port_a).unwrap().is_linked());

    vessel.undock(port_b).unwrap();
    assert_eq!(vessel.link_state(port_a), Some(LinkState::Disengaging));
    vessel.set_link_state(port_a, LinkState::Ready).unwrap();
    assert_eq!(vessel.link_state(port_a), Some(LinkState::Ready));

    // After the split each side only sees its own stack
    let near = partition(&vessel, port_a, port_b);
    assert_eq!(near.len(), 4);
    let far = partition(&vessel, port_b, port_a);
    assert_eq!(far.len(), 4);
}

/// Host wrapper that can under-report its size and add one extra edge.
struct WrappedGraph {
    inner: Vessel,
    reported: usize,
    strut: Option<(PartId, PartId)>,
}

impl WrappedGraph {
    fn new(inner: Vessel) -> Self {
        let reported = inner.part_count();
        Self {
            inner,
            reported,
            strut: None,
        }
    }
}

impl PartGraph for WrappedGraph {
    fn part_count(&self) -> usize {
        self.reported
    }
    fn contains_part(&self, part: PartId) -> bool {
        self.inner.contains_part(part)
    }
    fn parent(&self, part: PartId) -> Option<PartId> {
        self.inner.parent(part)
    }
    fn children(&self, part: PartId) -> &[PartId] {
        self.inner.children(part)
    }
    fn part_pools(&self, part: PartId) -> &[PoolId] {
        self.inner.part_pools(part)
    }
    fn pool(&self, pool: PoolId) -> Option<&Pool> {
        self.inner.pool(pool)
    }
    fn allows_flow(&self, part: PartId) -> bool {
        self.inner.allows_flow(part)
    }
    fn linked_part(&self, part: PartId) -> Option<PartId> {
        self.inner.linked_part(part)
    }
    fn link_state(&self, part: PartId) -> Option<LinkState> {
        self.inner.link_state(part)
    }
    fn mass(&self, part: PartId) -> Option<Mass> {
        self.inner.mass(part)
    }
    fn temperature(&self, part: PartId) -> Option<Temperature> {
        self.inner.temperature(part)
    }
    fn max_temperature(&self, part: PartId) -> Option<Temperature> {
        self.inner.max_temperature(part)
    }
    fn set_pool_amount(&mut self, pool: PoolId, amount: Real) -> GraphResult<()> {
        self.inner.set_pool_amount(pool, amount)
    }
    fn set_temperature(&mut self, part: PartId, t: Temperature) -> GraphResult<()> {
        self.inner.set_temperature(part, t)
    }
    fn request_driving_resource(&mut self, part: PartId, amount: Real) -> Real {
        self.inner.request_driving_resource(part, amount)
    }
    fn neighbours(&self, part: PartId) -> Vec<PartId> {
        let mut out = self.inner.neighbours(part);
        match self.strut {
            Some((a, b)) if part == a => out.push(b),
            Some((a, b)) if part == b => out.push(a),
            _ => {}
        }
        out
    }
}

#[test]
fn overrun_returns_partial_side() {
    let (vessel, port_a, port_b) = docked_stacks();
    let mut graph = WrappedGraph::new(vessel);
    graph.reported = 1;

    let near = partition(&graph, port_a, port_b);
    let overrun = near.overrun().expect("ceiling of one iteration must trip");
    assert_eq!(overrun.focal, port_a);
    assert_eq!(overrun.iterations, 1);
    // First ring only: PortA and A1
    assert_eq!(near.len(), 2);
}

#[test]
fn loop_through_both_stacks_drops_shared_parts() {
    let (vessel, port_a, port_b) = docked_stacks();
    let a0 = vessel.find_part("A0").unwrap();
    let b2 = vessel.find_part("B2").unwrap();
    let mut graph = WrappedGraph::new(vessel);
    // A0 strutted to B2 closes a loop around the docking link
    graph.strut = Some((a0, b2));

    let near_only = partition(&graph, port_a, port_b);
    assert!(near_only.contains(b2));

    let (near, far) = partition_pair(&graph, port_a, port_b);
    for part in near.parts() {
        assert!(!far.contains(part));
    }
    assert!(!near.contains(a0) && !far.contains(a0));
    assert!(!near.contains(b2) && !far.contains(b2));
    assert_eq!(near.parts().collect::<Vec<_>>(), vec![port_a]);
    assert_eq!(far.parts().collect::<Vec<_>>(), vec![port_b]);
}
