//! Owner of every connector on a host graph.
//!
//! Connectors are keyed by the part that hosts them, so the pump on the
//! other side of a link is found by asking the graph for the linked part and
//! looking that ID up here.

use std::collections::BTreeMap;

use df_core::{PartId, Time};
use df_graph::PartGraph;
use tracing::debug;

use crate::connector::{Connector, OppositeView, StartOutcome, TickReport};
use crate::error::{PumpError, PumpResult};
use crate::events::{PumpEvent, PumpObserver, StopReason};
use crate::settings::PumpSettings;

#[derive(Debug, Clone, Default)]
pub struct PumpBank {
    connectors: BTreeMap<PartId, Connector>,
    events: Vec<PumpEvent>,
}

impl PumpBank {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fit a connector to the docking port on `part`.
    pub fn add<G: PartGraph + ?Sized>(
        &mut self,
        graph: &G,
        part: PartId,
        settings: &PumpSettings,
    ) -> PumpResult<()> {
        if graph.link_state(part).is_none() {
            return Err(PumpError::NotAPort { part });
        }
        if self.connectors.contains_key(&part) {
            return Err(PumpError::DuplicateConnector { part });
        }
        let mut connector = Connector::new(part, settings);
        connector.notify_link_changed(graph);
        self.connectors.insert(part, connector);
        debug!(part = %part, "connector added");
        Ok(())
    }

    /// Remove a connector, stopping it and the pump on the opposite port.
    pub fn remove(&mut self, part: PartId) -> PumpResult<Connector> {
        let mut connector = self
            .connectors
            .remove(&part)
            .ok_or(PumpError::UnknownConnector { part })?;
        let opposite = connector.session().map(|s| s.opposite);
        connector.stop(StopReason::Destroyed);
        self.events.extend(connector.drain_events());

        if let Some(other) = opposite.and_then(|o| self.connectors.get_mut(&o)) {
            other.stop(StopReason::Destroyed);
        }
        Ok(connector)
    }

    pub fn get(&self, part: PartId) -> Option<&Connector> {
        self.connectors.get(&part)
    }

    pub fn connectors(&self) -> impl Iterator<Item = &Connector> {
        self.connectors.values()
    }

    pub fn len(&self) -> usize {
        self.connectors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.connectors.is_empty()
    }

    pub fn is_running(&self, part: PartId) -> bool {
        self.connectors.get(&part).is_some_and(Connector::is_running)
    }

    pub fn any_running(&self) -> bool {
        self.connectors.values().any(Connector::is_running)
    }

    pub fn start<G: PartGraph + ?Sized>(
        &mut self,
        graph: &G,
        part: PartId,
        settings: &PumpSettings,
    ) -> PumpResult<StartOutcome> {
        Ok(self.connector_mut(part)?.start(graph, settings))
    }

    /// Returns false if the pump was already idle.
    pub fn stop(&mut self, part: PartId, reason: StopReason) -> PumpResult<bool> {
        Ok(self.connector_mut(part)?.stop(reason))
    }

    /// The host changed connectivity; every connector re-debounces.
    pub fn notify_link_changed<G: PartGraph + ?Sized>(&mut self, graph: &G) {
        for connector in self.connectors.values_mut() {
            connector.notify_link_changed(graph);
        }
    }

    /// Advance every connector by one tick, in part order.
    ///
    /// After a running connector ticks, its heat is copied onto the
    /// connector on the opposite port.
    pub fn tick<G: PartGraph + ?Sized>(
        &mut self,
        graph: &mut G,
        settings: &PumpSettings,
        dt: Time,
    ) -> PumpResult<Vec<(PartId, TickReport)>> {
        let parts: Vec<PartId> = self.connectors.keys().copied().collect();
        let mut reports = Vec::with_capacity(parts.len());

        for part in parts {
            let opposite_part = graph.linked_part(part);
            let opposite = opposite_part
                .and_then(|o| self.connectors.get(&o))
                .map(|o| OppositeView {
                    hosted: true,
                    running: o.is_running(),
                })
                .unwrap_or_default();

            let connector = self.connector_mut(part)?;
            let was_running = connector.is_running();
            let report = connector.tick(&mut *graph, settings, dt, opposite)?;

            if was_running && opposite.hosted {
                if let Some(other) = opposite_part.and_then(|o| self.connectors.get_mut(&o)) {
                    other.mirror_heat(report.heat);
                }
            }
            reports.push((part, report));
        }
        Ok(reports)
    }

    /// Take every queued event, bank-level first, then per connector.
    pub fn drain_events(&mut self) -> Vec<PumpEvent> {
        let mut out = std::mem::take(&mut self.events);
        for connector in self.connectors.values_mut() {
            out.extend(connector.drain_events());
        }
        out
    }

    pub fn dispatch(&mut self, observer: &mut dyn PumpObserver) {
        for event in self.drain_events() {
            observer.on_event(&event);
        }
    }

    fn connector_mut(&mut self, part: PartId) -> PumpResult<&mut Connector> {
        self.connectors
            .get_mut(&part)
            .ok_or(PumpError::UnknownConnector { part })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use df_core::{kg, s};
    use df_graph::{Vessel, VesselBuilder};

    fn pair() -> (Vessel, PartId, PartId, PartId) {
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
        (b.build().unwrap(), port_a, port_b, tank_a)
    }

    #[test]
    fn add_rejects_duplicates_and_non_ports() {
        let (vessel, port_a, _, tank_a) = pair();
        let settings = PumpSettings::default();
        let mut bank = PumpBank::new();
        bank.add(&vessel, port_a, &settings).unwrap();
        assert!(matches!(
            bank.add(&vessel, port_a, &settings),
            Err(PumpError::DuplicateConnector { .. })
        ));
        assert!(matches!(
            bank.add(&vessel, tank_a, &settings),
            Err(PumpError::NotAPort { .. })
        ));
        assert_eq!(bank.len(), 1);
    }

    #[test]
    fn unknown_connector_errors() {
        let (vessel, _, port_b, _) = pair();
        let mut bank = PumpBank::new();
        let err = bank.start(&vessel, port_b, &PumpSettings::default());
        assert!(matches!(err, Err(PumpError::UnknownConnector { .. })));
    }

    #[test]
    fn removing_one_side_stops_both() {
        let (vessel, port_a, port_b, _) = pair();
        let settings = PumpSettings::default();
        let mut bank = PumpBank::new();
        bank.add(&vessel, port_a, &settings).unwrap();
        bank.add(&vessel, port_b, &settings).unwrap();
        bank.start(&vessel, port_a, &settings).unwrap();
        bank.start(&vessel, port_b, &settings).unwrap();
        bank.drain_events();

        let removed = bank.remove(port_a).unwrap();
        assert!(!removed.is_running());
        assert!(!bank.is_running(port_b));

        let stops: Vec<_> = bank
            .drain_events()
            .into_iter()
            .filter(|e| matches!(e, PumpEvent::Stopped { .. }))
            .collect();
        assert_eq!(stops.len(), 2);
    }

    #[test]
    fn heat_mirrors_onto_opposite_connector() {
        let (mut vessel, port_a, port_b, _) = pair();
        let settings = PumpSettings {
            power_drain: 0.0,
            ..Default::default()
        };
        let mut bank = PumpBank::new();
        bank.add(&vessel, port_a, &settings).unwrap();
        bank.add(&vessel, port_b, &settings).unwrap();
        bank.start(&vessel, port_a, &settings).unwrap();

        bank.tick(&mut vessel, &settings, s(0.02)).unwrap();
        let a = bank.get(port_a).unwrap().heat();
        assert!(a > 300.0);
        assert_eq!(bank.get(port_b).unwrap().heat(), a);
    }

    #[test]
    fn dispatch_feeds_closure_observer() {
        let (vessel, port_a, _, _) = pair();
        let settings = PumpSettings::default();
        let mut bank = PumpBank::new();
        bank.add(&vessel, port_a, &settings).unwrap();
        bank.start(&vessel, port_a, &settings).unwrap();

        let mut seen = Vec::new();
        bank.dispatch(&mut |e: &PumpEvent| seen.push(e.part()));
        // started + highlight
        assert_eq!(seen, vec![port_a, port_a]);
        assert!(bank.drain_events().is_empty());
    }
}
