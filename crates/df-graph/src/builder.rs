//! Incremental vessel builder.

use df_core::{DfResult, Mass, PartId, PoolId, Real, ResourceName, Temperature, k};

use crate::model::{DockingPort, FlowMode, LinkState, Part, Pool};
use crate::validate;
use crate::vessel::{DEFAULT_DRIVING_RESOURCE, Vessel};

pub const DEFAULT_TEMPERATURE_K: f64 = 300.0;
pub const DEFAULT_MAX_TEMPERATURE_K: f64 = 2000.0;

/// Builder for constructing a vessel incrementally.
///
/// Setters that name an unknown ID are ignored; links and amounts are
/// checked when `build()` validates the result.
#[derive(Debug, Default)]
pub struct VesselBuilder {
    parts: Vec<Part>,
    pools: Vec<Pool>,
    links: Vec<(PartId, PartId)>,
    driving_resource: Option<ResourceName>,
}

impl VesselBuilder {
    /// Create a new empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a root part (no parent) and return its ID.
    pub fn add_part(&mut self, name: impl Into<String>, mass: Mass) -> PartId {
        self.push_part(name.into(), None, mass)
    }

    /// Add a part as the last child of `parent`.
    pub fn attach_part(&mut self, name: impl Into<String>, parent: PartId, mass: Mass) -> PartId {
        let id = self.push_part(name.into(), Some(parent), mass);
        if let Some(p) = self.parts.get_mut(parent.index() as usize) {
            p.children.push(id);
        }
        id
    }

    fn push_part(&mut self, name: String, parent: Option<PartId>, mass: Mass) -> PartId {
        let id = PartId::from_index(self.parts.len() as u32);
        self.parts.push(Part {
            id,
            name,
            parent,
            children: Vec::new(),
            pools: Vec::new(),
            crossfeed: true,
            flow_override: false,
            mass,
            temperature: k(DEFAULT_TEMPERATURE_K),
            max_temperature: k(DEFAULT_MAX_TEMPERATURE_K),
            port: None,
        });
        id
    }

    /// Add an active, flowing pool to `part`.
    pub fn add_pool(
        &mut self,
        part: PartId,
        resource: impl Into<ResourceName>,
        amount: Real,
        capacity: Real,
    ) -> PoolId {
        let id = PoolId::from_index(self.pools.len() as u32);
        self.pools.push(Pool {
            id,
            part,
            resource: resource.into(),
            amount,
            capacity,
            active: true,
            flow_mode: FlowMode::Flow,
        });
        if let Some(p) = self.parts.get_mut(part.index() as usize) {
            p.pools.push(id);
        }
        id
    }

    pub fn set_crossfeed(&mut self, part: PartId, crossfeed: bool) {
        if let Some(p) = self.parts.get_mut(part.index() as usize) {
            p.crossfeed = crossfeed;
        }
    }

    pub fn set_flow_override(&mut self, part: PartId, flow_override: bool) {
        if let Some(p) = self.parts.get_mut(part.index() as usize) {
            p.flow_override = flow_override;
        }
    }

    pub fn set_temperatures(&mut self, part: PartId, current: Temperature, max: Temperature) {
        if let Some(p) = self.parts.get_mut(part.index() as usize) {
            p.temperature = current;
            p.max_temperature = max;
        }
    }

    pub fn set_pool_active(&mut self, pool: PoolId, active: bool) {
        if let Some(p) = self.pools.get_mut(pool.index() as usize) {
            p.active = active;
        }
    }

    pub fn set_pool_flow_mode(&mut self, pool: PoolId, mode: FlowMode) {
        if let Some(p) = self.pools.get_mut(pool.index() as usize) {
            p.flow_mode = mode;
        }
    }

    /// Give `part` an unlinked docking port.
    pub fn add_docking_port(&mut self, part: PartId) {
        if let Some(p) = self.parts.get_mut(part.index() as usize) {
            p.port = Some(DockingPort::default());
        }
    }

    /// Dock two ports. Whichever is a root is attached below the other.
    pub fn dock(&mut self, a: PartId, b: PartId) {
        self.links.push((a, b));
    }

    /// Override the resource used to power pumps.
    pub fn driving_resource(&mut self, resource: impl Into<ResourceName>) {
        self.driving_resource = Some(resource.into());
    }

    /// Build and validate the vessel.
    pub fn build(mut self) -> DfResult<Vessel> {
        validate::validate_parts(&self.parts)?;
        validate::validate_pools(&self.parts, &self.pools)?;

        for &(a, b) in &self.links {
            validate::validate_link(&self.parts, a, b)?;
            Self::apply_link(&mut self.parts, a, b);
        }

        // Docking may have joined trees; re-check for loops
        validate::validate_parts(&self.parts)?;

        Ok(Vessel {
            parts: self.parts,
            pools: self.pools,
            driving_resource: self
                .driving_resource
                .unwrap_or_else(|| ResourceName::from(DEFAULT_DRIVING_RESOURCE)),
        })
    }

    fn apply_link(parts: &mut [Part], a: PartId, b: PartId) {
        let (parent, child) = if parts[b.index() as usize].parent.is_none() {
            (a, b)
        } else {
            (b, a)
        };
        parts[child.index() as usize].parent = Some(parent);
        parts[parent.index() as usize].children.push(child);
        for (this, other) in [(a, b), (b, a)] {
            parts[this.index() as usize].port = Some(DockingPort {
                state: LinkState::Docked,
                linked: Some(other),
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::PartGraph;
    use df_core::kg;

    #[test]
    fn builder_basic() {
        let mut builder = VesselBuilder::new();
        let root = builder.add_part("Root", kg(1.0));
        let tank = builder.attach_part("Tank", root, kg(0.5));
        let pool = builder.add_pool(tank, "LiquidFuel", 10.0, 20.0);

        assert_eq!(root.index(), 0);
        assert_eq!(tank.index(), 1);
        assert_eq!(pool.index(), 0);
        assert_eq!(builder.parts[0].children, vec![tank]);
        assert_eq!(builder.parts[1].pools, vec![pool]);
    }

    #[test]
    fn dock_attaches_root_side_below_other() {
        let mut builder = VesselBuilder::new();
        let core = builder.add_part("Core", kg(1.0));
        let port_a = builder.attach_part("PortA", core, kg(0.1));
        let port_b = builder.add_part("PortB", kg(0.1));
        builder.add_docking_port(port_a);
        builder.add_docking_port(port_b);
        builder.dock(port_a, port_b);
        let vessel = builder.build().unwrap();

        assert_eq!(vessel.parent(port_b), Some(port_a));
        assert_eq!(vessel.children(port_a), &[port_b]);
        assert_eq!(vessel.linked_part(port_a), Some(port_b));
        assert_eq!(vessel.linked_part(port_b), Some(port_a));
        assert_eq!(vessel.link_state(port_a), Some(LinkState::Docked));
    }

    #[test]
    fn dock_requires_ports() {
        let mut builder = VesselBuilder::new();
        let a = builder.add_part("A", kg(1.0));
        let b = builder.add_part("B", kg(1.0));
        builder.dock(a, b);
        assert!(builder.build().is_err());
    }

    #[test]
    fn build_rejects_overfull_pool() {
        let mut builder = VesselBuilder::new();
        let a = builder.add_part("A", kg(1.0));
        builder.add_pool(a, "Ore", 11.0, 10.0);
        assert!(builder.build().is_err());
    }
}
