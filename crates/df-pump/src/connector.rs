//! One pump and its Idle/Running state machine.
//!
//! A connector never holds references into the host graph between calls:
//! the session stores part IDs and pool IDs, and every call re-reads the
//! current amounts through [`PartGraph`].

use df_core::{PartId, Real, Time, k, to_kelvin, to_kg, to_seconds};
use df_graph::{LinkState, PartGraph, Side, partition_pair};
use df_transfer::{EligibleResourceSet, RateBudget, TickTransfer, identify, transfer_all};
use tracing::{debug, info, trace, warn};

use crate::error::PumpResult;
use crate::events::{PumpEvent, StopReason};
use crate::link::LinkDebounce;
use crate::settings::PumpSettings;
use crate::thermal::ThermalState;

/// Slack allowed when comparing granted against requested driving resource.
const DRAW_TOLERANCE: Real = 1e-9;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartOutcome {
    Started,
    AlreadyRunning,
    /// The port has no partner; nothing changed.
    NotLinked,
}

/// What a connector needs to know about the pump on the other port.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OppositeView {
    /// The opposite part hosts a connector too.
    pub hosted: bool,
    pub running: bool,
}

/// Everything fixed when a pump starts (or re-partitions).
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    pub opposite: PartId,
    /// Smaller of the two port masses, times the scale factor.
    pub size: Real,
    pub near: Side,
    pub far: Side,
    pub eligible: EligibleResourceSet,
    pub highlighted: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum PumpState {
    Idle,
    Running(Session),
}

/// Outcome of one [`Connector::tick`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TickReport {
    pub transfer: TickTransfer,
    pub heat: Real,
    pub rate_cap: Real,
    pub stopped: Option<StopReason>,
    /// Still running after the tick.
    pub running: bool,
    /// Both linked pumps ran this tick.
    pub mutual: bool,
}

#[derive(Debug, Clone)]
pub struct Connector {
    part: PartId,
    state: PumpState,
    thermal: ThermalState,
    link: LinkDebounce,
    status: String,
    info: String,
    events: Vec<PumpEvent>,
}

impl Connector {
    pub fn new(part: PartId, settings: &PumpSettings) -> Self {
        Self {
            part,
            state: PumpState::Idle,
            thermal: ThermalState::new(0.0, settings.base_rate),
            link: LinkDebounce::new(settings.debounce_ticks),
            status: String::new(),
            info: String::new(),
            events: Vec::new(),
        }
    }

    pub fn part(&self) -> PartId {
        self.part
    }

    pub fn state(&self) -> &PumpState {
        &self.state
    }

    pub fn session(&self) -> Option<&Session> {
        match &self.state {
            PumpState::Running(session) => Some(session),
            PumpState::Idle => None,
        }
    }

    pub fn is_running(&self) -> bool {
        matches!(self.state, PumpState::Running(_))
    }

    pub fn heat(&self) -> Real {
        self.thermal.heat()
    }

    pub fn rate_cap(&self) -> Real {
        self.thermal.rate_cap()
    }

    /// `"<rate>% temp: <heat>"`, set on start and every running tick.
    pub fn status_text(&self) -> &str {
        &self.status
    }

    /// Amount moved last tick while running, the link state label when idle.
    pub fn info_text(&self) -> &str {
        &self.info
    }

    pub fn link(&self) -> &LinkDebounce {
        &self.link
    }

    /// Idle, and the link has settled into a linked state.
    pub fn can_start(&self) -> bool {
        !self.is_running()
            && !self.link.is_settling()
            && self.link.confirmed().is_some_and(|s| s.is_linked())
    }

    pub fn drain_events(&mut self) -> Vec<PumpEvent> {
        std::mem::take(&mut self.events)
    }

    pub(crate) fn mirror_heat(&mut self, heat: Real) {
        self.thermal.set_heat(heat);
    }

    /// The host reports a structural change (dock, undock, part added or
    /// lost). Restarts the link debounce.
    pub fn notify_link_changed<G: PartGraph + ?Sized>(&mut self, graph: &G) {
        let state = graph.link_state(self.part).unwrap_or_default();
        self.link.notify(state);
    }

    pub fn start<G: PartGraph + ?Sized>(
        &mut self,
        graph: &G,
        settings: &PumpSettings,
    ) -> StartOutcome {
        if self.is_running() {
            return StartOutcome::AlreadyRunning;
        }
        let Some(opposite) = graph.linked_part(self.part) else {
            info!(part = %self.part, "start ignored, port is not linked");
            return StartOutcome::NotLinked;
        };

        let session = self.build_session(graph, opposite, settings);
        let heat = graph.temperature(self.part).map(to_kelvin).unwrap_or(0.0);
        self.thermal = ThermalState::new(heat, settings.base_rate);
        self.refresh_text(0.0);

        let resources: Vec<_> = session.eligible.resources().cloned().collect();
        info!(
            part = %self.part,
            opposite = %opposite,
            near = session.near.len(),
            far = session.far.len(),
            size = session.size,
            resources = ?resources.iter().map(|r| r.as_str()).collect::<Vec<_>>(),
            "pump started"
        );
        self.events.push(PumpEvent::Started {
            part: self.part,
            opposite,
            resources,
        });
        if session.highlighted {
            self.push_highlight(&session);
        }
        self.state = PumpState::Running(session);
        StartOutcome::Started
    }

    /// Return to Idle. Returns false if the pump was not running.
    pub fn stop(&mut self, reason: StopReason) -> bool {
        let PumpState::Running(session) = std::mem::replace(&mut self.state, PumpState::Idle)
        else {
            return false;
        };
        info!(part = %self.part, reason = reason.label(), "pump stopped");
        if session.highlighted {
            self.events.push(PumpEvent::ClearHighlight { part: self.part });
        }
        self.events.push(PumpEvent::Stopped {
            part: self.part,
            reason,
        });
        true
    }

    /// Advance by `dt` of simulated time.
    ///
    /// Debounces the link state, then, while running: transfers every
    /// eligible resource, updates heat and the rate cap, and stops when
    /// starved or short of the driving resource.
    pub fn tick<G: PartGraph + ?Sized>(
        &mut self,
        graph: &mut G,
        settings: &PumpSettings,
        dt: Time,
        opposite: OppositeView,
    ) -> PumpResult<TickReport> {
        self.link.set_delay(settings.debounce_ticks);

        if !graph.contains_part(self.part) {
            let stopped = self
                .stop(StopReason::Destroyed)
                .then_some(StopReason::Destroyed);
            return Ok(self.report(TickTransfer::default(), stopped, false));
        }

        let state = graph.link_state(self.part).unwrap_or_default();
        if let Some(confirmed) = self.link.tick(state) {
            self.on_link_confirmed(&*graph, settings, confirmed);
        }

        let Some((opposite_part, size)) = self.session().map(|s| (s.opposite, s.size)) else {
            return Ok(self.report(TickTransfer::default(), None, false));
        };
        if graph.linked_part(self.part) != Some(opposite_part) {
            self.stop(StopReason::Unlinked);
            return Ok(self.report(TickTransfer::default(), Some(StopReason::Unlinked), false));
        }

        let dt = to_seconds(dt);
        if dt <= 0.0 {
            return Ok(self.report(TickTransfer::default(), None, false));
        }

        let transfer = match &self.state {
            PumpState::Running(session) => {
                let budget = RateBudget {
                    rate_cap: self.thermal.rate_cap(),
                    rate_scale: settings.rate_scale,
                    connector_size: size,
                    dt,
                };
                transfer_all(&mut *graph, &session.eligible, &budget)?
            }
            PumpState::Idle => TickTransfer::default(),
        };

        let max_heat = graph
            .max_temperature(self.part)
            .map(to_kelvin)
            .unwrap_or(Real::INFINITY);
        self.thermal.after_transfer(transfer.total, size, max_heat, settings);

        let mutual = opposite.running;
        if mutual && self.thermal.apply_mutual(settings.mutual_heat) {
            warn!(
                part = %self.part,
                opposite = %opposite_part,
                "both linked ports are pumping, ports are overheating"
            );
            self.events.push(PumpEvent::MutualOverheat {
                part: self.part,
                opposite: opposite_part,
            });
        }

        if settings.heating || mutual {
            let heat = k(self.thermal.heat());
            graph.set_temperature(self.part, heat)?;
            if opposite.hosted {
                graph.set_temperature(opposite_part, heat)?;
            }
        }

        self.refresh_text(transfer.total);
        trace!(
            part = %self.part,
            moved = transfer.total,
            heat = self.thermal.heat(),
            rate_cap = self.thermal.rate_cap(),
            "pump tick"
        );

        let stopped = if transfer.total < settings.starve_epsilon {
            Some(StopReason::Starved)
        } else if settings.power_drain > 0.0 {
            let requested = settings.power_drain * transfer.total;
            let granted = graph.request_driving_resource(self.part, requested);
            (granted + DRAW_TOLERANCE < requested)
                .then_some(StopReason::ResourceShortfall { requested, granted })
        } else {
            None
        };
        if let Some(reason) = stopped {
            self.stop(reason);
        }
        Ok(self.report(transfer, stopped, mutual))
    }

    fn on_link_confirmed<G: PartGraph + ?Sized>(
        &mut self,
        graph: &G,
        settings: &PumpSettings,
        state: LinkState,
    ) {
        debug!(part = %self.part, state = state.label(), "link state confirmed");
        match self.session().map(|s| (s.opposite, s.highlighted)) {
            Some((opposite, _))
                if !state.is_linked() || graph.linked_part(self.part) != Some(opposite) =>
            {
                self.stop(StopReason::Unlinked);
            }
            Some((opposite, highlighted)) => {
                let mut session = self.build_session(graph, opposite, settings);
                session.highlighted = highlighted;
                let resources: Vec<_> = session.eligible.resources().cloned().collect();
                info!(
                    part = %self.part,
                    near = session.near.len(),
                    far = session.far.len(),
                    "sides rebuilt after connectivity change"
                );
                self.events.push(PumpEvent::Repartitioned {
                    part: self.part,
                    resources,
                });
                if highlighted {
                    self.push_highlight(&session);
                }
                self.state = PumpState::Running(session);
            }
            None => self.info = state.label().to_string(),
        }
        self.events.push(PumpEvent::LinkConfirmed {
            part: self.part,
            state,
            can_start: self.can_start(),
        });
    }

    fn build_session<G: PartGraph + ?Sized>(
        &mut self,
        graph: &G,
        opposite: PartId,
        settings: &PumpSettings,
    ) -> Session {
        let (near, far) = partition_pair(graph, self.part, opposite);
        for overrun in [near.overrun(), far.overrun()].into_iter().flatten() {
            self.events.push(PumpEvent::TraversalOverrun {
                part: self.part,
                overrun,
            });
        }
        let eligible = identify(graph, &near, &far, &settings.match_rules());
        let own = graph.mass(self.part).map(to_kg).unwrap_or(0.0);
        let linked = graph.mass(opposite).map(to_kg).unwrap_or(0.0);
        Session {
            opposite,
            size: own.min(linked) * settings.scale_factor,
            near,
            far,
            eligible,
            highlighted: settings.highlighting,
        }
    }

    fn refresh_text(&mut self, moved: Real) {
        self.status = format!(
            "{:.0}% temp: {:.2}",
            self.thermal.rate_cap() * 100.0,
            self.thermal.heat()
        );
        self.info = format!("transferred: {:.3}", moved);
    }

    fn push_highlight(&mut self, session: &Session) {
        self.events.push(PumpEvent::Highlight {
            part: self.part,
            near: session.near.parts().collect(),
            far: session.far.parts().collect(),
        });
    }

    fn report(
        &self,
        transfer: TickTransfer,
        stopped: Option<StopReason>,
        mutual: bool,
    ) -> TickReport {
        TickReport {
            transfer,
            heat: self.thermal.heat(),
            rate_cap: self.thermal.rate_cap(),
            stopped,
            running: self.is_running(),
            mutual,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use df_core::{Id, Mass, PoolId, Temperature, kg, s};
    use df_graph::{GraphResult, Pool, Vessel, VesselBuilder};

    fn docked() -> (Vessel, PartId, PartId) {
        let mut b = VesselBuilder::new();
        let tank_a = b.add_part("TankA", kg(1.0));
        let port_a = b.attach_part("PortA", tank_a, kg(0.05));
        let port_b = b.add_part("PortB", kg(0.05));
        let tank_b = b.attach_part("TankB", port_b, kg(1.0));
        b.add_pool(tank_a, "LiquidFuel", 100.0, 100.0);
        b.add_pool(tank_b, "LiquidFuel", 0.0, 100.0);
        b.add_docking_port(port_a);
        b.add_docking_port(port_b);
        b.dock(port_a, port_b);
        (b.build().unwrap(), port_a, port_b)
    }

    fn quiet() -> PumpSettings {
        PumpSettings {
            power_drain: 0.0,
            ..Default::default()
        }
    }

    #[test]
    fn start_builds_session() {
        let (vessel, port_a, port_b) = docked();
        let mut c = Connector::new(port_a, &quiet());
        assert_eq!(c.start(&vessel, &quiet()), StartOutcome::Started);

        let session = c.session().unwrap();
        assert_eq!(session.opposite, port_b);
        // min(0.05, 0.05) * 20
        assert!((session.size - 1.0).abs() < 1e-12);
        assert_eq!(session.eligible.len(), 1);
        assert_eq!(c.heat(), 300.0);

        assert_eq!(c.start(&vessel, &quiet()), StartOutcome::AlreadyRunning);
    }

    #[test]
    fn start_seeds_status_text() {
        let (vessel, port_a, _) = docked();
        let mut c = Connector::new(port_a, &quiet());
        assert_eq!(c.status_text(), "");
        c.start(&vessel, &quiet());
        assert_eq!(c.status_text(), "100% temp: 300.00");
        assert_eq!(c.info_text(), "transferred: 0.000");
    }

    #[test]
    fn stop_is_idempotent() {
        let (vessel, port_a, _) = docked();
        let mut c = Connector::new(port_a, &quiet());
        c.start(&vessel, &quiet());
        c.drain_events();

        assert!(c.stop(StopReason::Requested));
        assert!(!c.stop(StopReason::Requested));
        let events = c.drain_events();
        assert_eq!(
            events.last(),
            Some(&PumpEvent::Stopped {
                part: port_a,
                reason: StopReason::Requested
            })
        );
        assert!(events.contains(&PumpEvent::ClearHighlight { part: port_a }));
    }

    #[test]
    fn paused_tick_keeps_running() {
        let (mut vessel, port_a, _) = docked();
        let settings = quiet();
        let mut c = Connector::new(port_a, &settings);
        c.start(&vessel, &settings);

        let report = c
            .tick(&mut vessel, &settings, s(0.0), OppositeView::default())
            .unwrap();
        assert_eq!(report.transfer.total, 0.0);
        assert!(report.running);
        assert!(report.stopped.is_none());
    }

    #[test]
    fn status_text_reports_rate_and_heat() {
        let (mut vessel, port_a, _) = docked();
        let settings = quiet();
        let mut c = Connector::new(port_a, &settings);
        c.start(&vessel, &settings);
        c.tick(&mut vessel, &settings, s(0.02), OppositeView::default())
            .unwrap();

        // 400 * 1 * 0.02 = 8 moved; heat 300 + (0.5 + 8) * 0.6
        assert_eq!(c.info_text(), "transferred: 8.000");
        assert_eq!(c.status_text(), "100% temp: 305.10");
    }

    /// Vessel whose `lost` part disappears once `vanished` is set.
    struct Vanishing {
        inner: Vessel,
        lost: PartId,
        vanished: bool,
    }

    impl PartGraph for Vanishing {
        fn part_count(&self) -> usize {
            self.inner.part_count()
        }
        fn contains_part(&self, part: PartId) -> bool {
            !(self.vanished && part == self.lost) && self.inner.contains_part(part)
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
    }

    #[test]
    fn lost_part_stops_as_destroyed() {
        let (vessel, port_a, _) = docked();
        let settings = quiet();
        let mut graph = Vanishing {
            inner: vessel,
            lost: port_a,
            vanished: false,
        };
        let mut c = Connector::new(port_a, &settings);
        assert_eq!(c.start(&graph, &settings), StartOutcome::Started);
        c.drain_events();

        graph.vanished = true;
        let report = c
            .tick(&mut graph, &settings, s(0.02), OppositeView::default())
            .unwrap();
        assert_eq!(report.stopped, Some(StopReason::Destroyed));
        assert!(!report.running);
        assert_eq!(report.transfer.total, 0.0);
        assert!(!c.is_running());

        let events = c.drain_events();
        assert!(events.contains(&PumpEvent::ClearHighlight { part: port_a }));
        assert_eq!(
            events.last(),
            Some(&PumpEvent::Stopped {
                part: port_a,
                reason: StopReason::Destroyed
            })
        );
    }

    #[test]
    fn unknown_part_tick_is_idle() {
        let (mut vessel, _, _) = docked();
        let settings = quiet();
        let mut ghost = Connector::new(Id::from_index(99), &settings);
        let report = ghost
            .tick(&mut vessel, &settings, s(0.02), OppositeView::default())
            .unwrap();
        assert!(!report.running);
        assert!(report.stopped.is_none());
    }
}
