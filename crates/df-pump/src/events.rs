//! Notifications queued by pumps for UI and logging observers.

use df_core::{PartId, Real, ResourceName};
use df_graph::{LinkState, TraversalOverrun};

/// Why a running pump went idle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StopReason {
    /// Less than the starve threshold moved in one tick.
    Starved,
    /// The host granted less driving resource than the tick needed.
    ResourceShortfall { requested: Real, granted: Real },
    /// The physical link is gone.
    Unlinked,
    /// The host or a user asked.
    Requested,
    /// The hosting part (or the opposite one) was removed.
    Destroyed,
}

impl StopReason {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Starved => "starved",
            Self::ResourceShortfall { .. } => "resource shortfall",
            Self::Unlinked => "unlinked",
            Self::Requested => "requested",
            Self::Destroyed => "destroyed",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum PumpEvent {
    Started {
        part: PartId,
        opposite: PartId,
        resources: Vec<ResourceName>,
    },
    Stopped {
        part: PartId,
        reason: StopReason,
    },
    /// Sides were rebuilt after a confirmed connectivity change.
    Repartitioned {
        part: PartId,
        resources: Vec<ResourceName>,
    },
    /// Parts to colour while running. Only queued with highlighting enabled.
    Highlight {
        part: PartId,
        near: Vec<PartId>,
        far: Vec<PartId>,
    },
    /// Undo a previous `Highlight`.
    ClearHighlight { part: PartId },
    LinkConfirmed {
        part: PartId,
        state: LinkState,
        can_start: bool,
    },
    /// Both linked ports are pumping at once. Queued once per session.
    MutualOverheat { part: PartId, opposite: PartId },
    TraversalOverrun {
        part: PartId,
        overrun: TraversalOverrun,
    },
}

impl PumpEvent {
    pub fn part(&self) -> PartId {
        match self {
            Self::Started { part, .. }
            | Self::Stopped { part, .. }
            | Self::Repartitioned { part, .. }
            | Self::Highlight { part, .. }
            | Self::ClearHighlight { part }
            | Self::LinkConfirmed { part, .. }
            | Self::MutualOverheat { part, .. }
            | Self::TraversalOverrun { part, .. } => *part,
        }
    }
}

/// Receiver of drained pump events.
pub trait PumpObserver {
    fn on_event(&mut self, event: &PumpEvent);
}

impl<F: FnMut(&PumpEvent)> PumpObserver for F {
    fn on_event(&mut self, event: &PumpEvent) {
        self(event)
    }
}
