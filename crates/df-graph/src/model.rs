//! Core part and pool data structures.

use df_core::{Mass, PartId, PoolId, Real, ResourceName, Temperature};

/// Whether a pool's resource may leave the part at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum FlowMode {
    /// Resource may be moved between parts.
    #[default]
    Flow,
    /// Resource is locked to its part (e.g. solid fuel).
    NoFlow,
}

/// State reported by a docking port.
///
/// The state lags the real connectivity for a few ticks after a structural
/// change, which is why consumers debounce it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum LinkState {
    /// Free and waiting for a partner.
    #[default]
    Ready,
    /// Magnetically pulling a partner in.
    Acquiring,
    /// Docked to another port.
    Docked,
    /// Built attached to another port in the editor.
    PreAttached,
    /// Docked and locked by the host.
    Locked,
    /// Pushing a partner away after an undock.
    Disengaging,
}

impl LinkState {
    /// True for the states in which resources can cross the port.
    pub fn is_linked(self) -> bool {
        matches!(
            self,
            LinkState::Docked | LinkState::PreAttached | LinkState::Locked
        )
    }

    pub fn label(self) -> &'static str {
        match self {
            LinkState::Ready => "Ready",
            LinkState::Acquiring => "Acquire",
            LinkState::Docked => "Docked",
            LinkState::PreAttached => "PreAttached",
            LinkState::Locked => "Locked",
            LinkState::Disengaging => "Disengage",
        }
    }
}

/// A typed, bounded resource container owned by a single part.
#[derive(Debug, Clone, PartialEq)]
pub struct Pool {
    pub id: PoolId,
    pub part: PartId,
    pub resource: ResourceName,
    pub amount: Real,
    pub capacity: Real,
    /// Inactive pools are invisible to transfer.
    pub active: bool,
    pub flow_mode: FlowMode,
}

impl Pool {
    /// Free space left in the pool.
    pub fn spare(&self) -> Real {
        (self.capacity - self.amount).max(0.0)
    }
}

/// Docking hardware on a part.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DockingPort {
    pub state: LinkState,
    /// The port on the other side of the link, if any.
    pub linked: Option<PartId>,
}

/// A node of the vessel tree.
#[derive(Debug, Clone, PartialEq)]
pub struct Part {
    pub id: PartId,
    pub name: String,
    pub parent: Option<PartId>,
    pub children: Vec<PartId>,
    pub pools: Vec<PoolId>,
    /// Cross-feed enabled.
    pub crossfeed: bool,
    /// Carries hardware that passes resources regardless of cross-feed (a grapple).
    pub flow_override: bool,
    pub mass: Mass,
    pub temperature: Temperature,
    pub max_temperature: Temperature,
    pub port: Option<DockingPort>,
}

impl Part {
    pub fn allows_flow(&self) -> bool {
        self.crossfeed || self.flow_override
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use df_core::{Id, k, kg};

    #[test]
    fn linked_states() {
        assert!(LinkState::Docked.is_linked());
        assert!(LinkState::PreAttached.is_linked());
        assert!(LinkState::Locked.is_linked());
        assert!(!LinkState::Ready.is_linked());
        assert!(!LinkState::Disengaging.is_linked());
    }

    #[test]
    fn flow_override_bypasses_crossfeed() {
        let mut part = Part {
            id: Id::from_index(0),
            name: "Grapple".into(),
            parent: None,
            children: vec![],
            pools: vec![],
            crossfeed: false,
            flow_override: false,
            mass: kg(0.3),
            temperature: k(300.0),
            max_temperature: k(2000.0),
            port: None,
        };
        assert!(!part.allows_flow());
        part.flow_override = true;
        assert!(part.allows_flow());
    }

    #[test]
    fn pool_spare_never_negative() {
        let pool = Pool {
            id: Id::from_index(0),
            part: Id::from_index(0),
            resource: "Oxidizer".into(),
            amount: 100.0,
            capacity: 100.0,
            active: true,
            flow_mode: FlowMode::Flow,
        };
        assert_eq!(pool.spare(), 0.0);
    }
}
