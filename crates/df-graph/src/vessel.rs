//! In-memory host: a validated vessel tree with pools and docking ports.

use std::collections::BTreeSet;

use df_core::{Mass, PartId, PoolId, Real, ResourceName, Temperature, clamp_amount};
use tracing::{debug, warn};

use crate::error::{GraphError, GraphResult};
use crate::host::PartGraph;
use crate::model::{LinkState, Part, Pool};

/// Resource drawn to power the pumps unless the builder says otherwise.
pub const DEFAULT_DRIVING_RESOURCE: &str = "ElectricCharge";

/// Clamps smaller than this are rounding noise and are not logged.
const CLAMP_LOG_THRESHOLD: Real = 1e-9;

/// A set of parts (possibly several disconnected trees) with their pools.
///
/// Parts and pools are stored in vectors indexed by their IDs.
#[derive(Debug, Clone)]
pub struct Vessel {
    pub(crate) parts: Vec<Part>,
    pub(crate) pools: Vec<Pool>,
    pub(crate) driving_resource: ResourceName,
}

impl Vessel {
    /// Return all parts.
    pub fn parts(&self) -> &[Part] {
        &self.parts
    }

    /// Return all pools.
    pub fn pools(&self) -> &[Pool] {
        &self.pools
    }

    /// Get a part by ID (returns None if ID out of bounds).
    pub fn part(&self, id: PartId) -> Option<&Part> {
        self.parts.get(id.index() as usize)
    }

    /// Look a part up by name.
    pub fn find_part(&self, name: &str) -> Option<PartId> {
        self.parts.iter().find(|p| p.name == name).map(|p| p.id)
    }

    pub fn driving_resource(&self) -> &ResourceName {
        &self.driving_resource
    }

    fn part_mut(&mut self, id: PartId) -> GraphResult<&mut Part> {
        self.parts
            .get_mut(id.index() as usize)
            .ok_or(GraphError::UnknownPart { part: id })
    }

    fn pool_mut(&mut self, id: PoolId) -> GraphResult<&mut Pool> {
        self.pools
            .get_mut(id.index() as usize)
            .ok_or(GraphError::UnknownPool { pool: id })
    }

    /// Report a new docking port state without touching the tree.
    pub fn set_link_state(&mut self, part: PartId, state: LinkState) -> GraphResult<()> {
        let port = self
            .part_mut(part)?
            .port
            .as_mut()
            .ok_or(GraphError::NotAPort { part })?;
        port.state = state;
        Ok(())
    }

    pub fn set_pool_active(&mut self, pool: PoolId, active: bool) -> GraphResult<()> {
        self.pool_mut(pool)?.active = active;
        Ok(())
    }

    pub fn set_crossfeed(&mut self, part: PartId, crossfeed: bool) -> GraphResult<()> {
        self.part_mut(part)?.crossfeed = crossfeed;
        Ok(())
    }

    /// Break the link on `port`, splitting the tree between the two ports.
    ///
    /// Both ports are left `Disengaging`; the host moves them back to
    /// `Ready` once they have separated.
    pub fn undock(&mut self, port: PartId) -> GraphResult<()> {
        let other = self
            .part(port)
            .ok_or(GraphError::UnknownPart { part: port })?
            .port
            .ok_or(GraphError::NotAPort { part: port })?
            .linked;
        let Some(other) = other else {
            return Ok(());
        };

        for (a, b) in [(port, other), (other, port)] {
            let part = self.part_mut(a)?;
            if part.parent == Some(b) {
                part.parent = None;
            }
            part.children.retain(|&c| c != b);
            if let Some(p) = part.port.as_mut() {
                p.linked = None;
                p.state = LinkState::Disengaging;
            }
        }
        debug!(port = %port, other = %other, "undocked");
        Ok(())
    }

    /// Every part reachable from `start` ignoring cross-feed.
    fn connected_parts(&self, start: PartId) -> BTreeSet<PartId> {
        let mut seen = BTreeSet::from([start]);
        let mut stack = vec![start];
        while let Some(part) = stack.pop() {
            for n in self.neighbours(part) {
                if seen.insert(n) {
                    stack.push(n);
                }
            }
        }
        seen
    }
}

impl PartGraph for Vessel {
    fn part_count(&self) -> usize {
        self.parts.len()
    }

    fn contains_part(&self, part: PartId) -> bool {
        self.part(part).is_some()
    }

    fn parent(&self, part: PartId) -> Option<PartId> {
        self.part(part)?.parent
    }

    fn children(&self, part: PartId) -> &[PartId] {
        self.part(part).map_or(&[], |p| p.children.as_slice())
    }

    fn part_pools(&self, part: PartId) -> &[PoolId] {
        self.part(part).map_or(&[], |p| p.pools.as_slice())
    }

    fn pool(&self, pool: PoolId) -> Option<&Pool> {
        self.pools.get(pool.index() as usize)
    }

    fn allows_flow(&self, part: PartId) -> bool {
        self.part(part).is_some_and(Part::allows_flow)
    }

    fn linked_part(&self, part: PartId) -> Option<PartId> {
        self.part(part)?.port?.linked
    }

    fn link_state(&self, part: PartId) -> Option<LinkState> {
        Some(self.part(part)?.port?.state)
    }

    fn mass(&self, part: PartId) -> Option<Mass> {
        Some(self.part(part)?.mass)
    }

    fn temperature(&self, part: PartId) -> Option<Temperature> {
        Some(self.part(part)?.temperature)
    }

    fn max_temperature(&self, part: PartId) -> Option<Temperature> {
        Some(self.part(part)?.max_temperature)
    }

    fn set_pool_amount(&mut self, pool: PoolId, amount: Real) -> GraphResult<()> {
        let pool = self.pool_mut(pool)?;
        let (clamped, moved) = clamp_amount(amount, pool.capacity);
        if moved > CLAMP_LOG_THRESHOLD {
            warn!(
                pool = %pool.id,
                requested = amount,
                capacity = pool.capacity,
                "pool amount clamped into range"
            );
        }
        pool.amount = clamped;
        Ok(())
    }

    fn set_temperature(&mut self, part: PartId, temperature: Temperature) -> GraphResult<()> {
        self.part_mut(part)?.temperature = temperature;
        Ok(())
    }

    fn request_driving_resource(&mut self, part: PartId, amount: Real) -> Real {
        if amount <= 0.0 || !self.contains_part(part) {
            return 0.0;
        }
        let reachable = self.connected_parts(part);
        let mut remaining = amount;
        for pool in self.pools.iter_mut() {
            if remaining <= 0.0 {
                break;
            }
            if !pool.active
                || pool.resource != self.driving_resource
                || !reachable.contains(&pool.part)
            {
                continue;
            }
            let take = remaining.min(pool.amount);
            pool.amount -= take;
            remaining -= take;
        }
        amount - remaining
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::VesselBuilder;
    use df_core::kg;

    fn docked_pair() -> (Vessel, PartId, PartId, PoolId, PoolId) {
        let mut b = VesselBuilder::new();
        let core_a = b.add_part("CoreA", kg(2.0));
        let port_a = b.attach_part("PortA", core_a, kg(0.1));
        let port_b = b.add_part("PortB", kg(0.1));
        let core_b = b.attach_part("CoreB", port_b, kg(2.0));
        let ec_a = b.add_pool(core_a, DEFAULT_DRIVING_RESOURCE, 5.0, 10.0);
        let ec_b = b.add_pool(core_b, DEFAULT_DRIVING_RESOURCE, 50.0, 100.0);
        b.add_docking_port(port_a);
        b.add_docking_port(port_b);
        b.dock(port_a, port_b);
        (b.build().unwrap(), port_a, port_b, ec_a, ec_b)
    }

    #[test]
    fn driving_resource_drawn_in_pool_order() {
        let (mut vessel, port_a, _, ec_a, ec_b) = docked_pair();
        let granted = vessel.request_driving_resource(port_a, 8.0);
        assert_eq!(granted, 8.0);
        assert_eq!(vessel.pool(ec_a).unwrap().amount, 0.0);
        assert_eq!(vessel.pool(ec_b).unwrap().amount, 47.0);
    }

    #[test]
    fn driving_resource_shortfall_after_undock() {
        let (mut vessel, port_a, port_b, _, _) = docked_pair();
        vessel.undock(port_a).unwrap();
        assert_eq!(vessel.linked_part(port_a), None);
        assert_eq!(vessel.linked_part(port_b), None);
        assert_eq!(vessel.link_state(port_b), Some(LinkState::Disengaging));

        let granted = vessel.request_driving_resource(port_a, 8.0);
        assert_eq!(granted, 5.0);
    }

    #[test]
    fn set_pool_amount_clamps() {
        let (mut vessel, _, _, ec_a, _) = docked_pair();
        vessel.set_pool_amount(ec_a, 12.0).unwrap();
        assert_eq!(vessel.pool(ec_a).unwrap().amount, 10.0);
        vessel.set_pool_amount(ec_a, -1.0).unwrap();
        assert_eq!(vessel.pool(ec_a).unwrap().amount, 0.0);
    }

    #[test]
    fn unknown_ids_are_reported() {
        let (mut vessel, _, _, _, _) = docked_pair();
        let bogus = PoolId::from_index(99);
        assert_eq!(
            vessel.set_pool_amount(bogus, 1.0),
            Err(GraphError::UnknownPool { pool: bogus })
        );
        assert!(vessel.children(PartId::from_index(99)).is_empty());
    }
}
