//! Turn a validated scenario into a vessel and pump bank.

use std::collections::BTreeMap;

use df_core::{PartId, k, kg};
use df_graph::{FlowMode, Vessel, VesselBuilder};
use df_pump::{PumpBank, PumpSettings};
use tracing::debug;

use crate::schema::{FlowModeDef, PartDef, ScenarioDef};
use crate::validate::{ValidationError, validate_scenario};
use crate::{ProjectError, ProjectResult};

/// A scenario ready to simulate.
#[derive(Debug, Clone)]
pub struct CompiledScenario {
    pub name: String,
    pub vessel: Vessel,
    pub settings: PumpSettings,
    pub connectors: Vec<PartId>,
    part_ids: BTreeMap<String, PartId>,
}

impl CompiledScenario {
    /// Runtime ID of the part with scenario ID `id`.
    pub fn part(&self, id: &str) -> Option<PartId> {
        self.part_ids.get(id).copied()
    }

    /// Scenario ID of a runtime part.
    pub fn part_key(&self, part: PartId) -> Option<&str> {
        self.part_ids
            .iter()
            .find(|(_, p)| **p == part)
            .map(|(key, _)| key.as_str())
    }

    /// A bank with one connector per scenario connector.
    pub fn build_bank(&self) -> ProjectResult<PumpBank> {
        let mut bank = PumpBank::new();
        for &part in &self.connectors {
            bank.add(&self.vessel, part, &self.settings)?;
        }
        Ok(bank)
    }
}

pub fn compile(scenario: &ScenarioDef) -> ProjectResult<CompiledScenario> {
    validate_scenario(scenario)?;

    let mut builder = VesselBuilder::new();
    let mut part_ids: BTreeMap<String, PartId> = BTreeMap::new();

    // Parents before children; whatever cannot be placed is a cycle.
    let mut pending: Vec<&PartDef> = scenario.parts.iter().collect();
    while !pending.is_empty() {
        let before = pending.len();
        pending.retain(|def| {
            let parent = match &def.parent {
                None => None,
                Some(p) => match part_ids.get(p) {
                    Some(&id) => Some(id),
                    None => return true,
                },
            };
            let id = add_part(&mut builder, def, parent);
            part_ids.insert(def.id.clone(), id);
            false
        });
        if pending.len() == before {
            return Err(ProjectError::Validation(ValidationError::InvalidValue {
                field: "parts.parent".to_string(),
                value: pending[0].id.clone(),
                reason: "parent chain forms a cycle".to_string(),
            }));
        }
    }

    for link in &scenario.links {
        builder.dock(
            lookup(&part_ids, &link.a, "links")?,
            lookup(&part_ids, &link.b, "links")?,
        );
    }
    if let Some(resource) = &scenario.driving_resource {
        builder.driving_resource(resource.as_str());
    }

    let vessel = builder.build()?;
    let mut settings = scenario.settings.clone();
    settings.apply_resource_options(scenario.resource_options.iter().map(String::as_str));
    settings.validate()?;
    let connectors = scenario
        .connectors
        .iter()
        .map(|c| lookup(&part_ids, c, "connectors"))
        .collect::<Result<Vec<_>, _>>()?;
    debug!(
        scenario = %scenario.name,
        parts = part_ids.len(),
        links = scenario.links.len(),
        "scenario compiled"
    );

    Ok(CompiledScenario {
        name: scenario.name.clone(),
        vessel,
        settings,
        connectors,
        part_ids,
    })
}

fn lookup(
    part_ids: &BTreeMap<String, PartId>,
    id: &str,
    context: &str,
) -> Result<PartId, ValidationError> {
    part_ids
        .get(id)
        .copied()
        .ok_or_else(|| ValidationError::MissingReference {
            id: id.to_string(),
            context: context.to_string(),
        })
}

fn add_part(builder: &mut VesselBuilder, def: &PartDef, parent: Option<PartId>) -> PartId {
    let name = def.display_name().to_string();
    let mass = kg(def.mass_kg);
    let id = match parent {
        Some(parent) => builder.attach_part(name, parent, mass),
        None => builder.add_part(name, mass),
    };

    builder.set_crossfeed(id, def.crossfeed);
    builder.set_flow_override(id, def.flow_override);
    if def.temperature_k.is_some() || def.max_temperature_k.is_some() {
        builder.set_temperatures(
            id,
            k(def.temperature_k.unwrap_or(df_graph::DEFAULT_TEMPERATURE_K)),
            k(def
                .max_temperature_k
                .unwrap_or(df_graph::DEFAULT_MAX_TEMPERATURE_K)),
        );
    }
    if def.docking_port {
        builder.add_docking_port(id);
    }

    for pool in &def.pools {
        let pool_id = builder.add_pool(id, pool.resource.as_str(), pool.amount, pool.capacity);
        builder.set_pool_active(pool_id, pool.active);
        if pool.flow_mode == FlowModeDef::NoFlow {
            builder.set_pool_flow_mode(pool_id, FlowMode::NoFlow);
        }
    }
    id
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{LinkDef, PoolDef};
    use df_graph::PartGraph;

    fn part(id: &str, parent: Option<&str>) -> PartDef {
        PartDef {
            id: id.to_string(),
            name: String::new(),
            mass_kg: 1.0,
            parent: parent.map(str::to_string),
            crossfeed: true,
            flow_override: false,
            temperature_k: None,
            max_temperature_k: None,
            docking_port: false,
            pools: Vec::new(),
        }
    }

    fn scenario(parts: Vec<PartDef>) -> ScenarioDef {
        ScenarioDef {
            version: crate::LATEST_VERSION,
            name: "compile".into(),
            settings: Default::default(),
            resource_options: Vec::new(),
            driving_resource: None,
            parts,
            links: Vec::new(),
            connectors: Vec::new(),
        }
    }

    #[test]
    fn children_listed_before_parents_still_compile() {
        let mut tank = part("tank", Some("core"));
        tank.pools.push(PoolDef {
            resource: "Ore".into(),
            amount: 5.0,
            capacity: 10.0,
            active: false,
            flow_mode: FlowModeDef::NoFlow,
        });
        let compiled = compile(&scenario(vec![tank, part("core", None)])).unwrap();

        let core = compiled.part("core").unwrap();
        let tank = compiled.part("tank").unwrap();
        assert_eq!(compiled.vessel.parent(tank), Some(core));
        assert_eq!(compiled.part_key(tank), Some("tank"));

        let pool = compiled
            .vessel
            .pool(compiled.vessel.part_pools(tank)[0])
            .unwrap();
        assert!(!pool.active);
        assert_eq!(pool.flow_mode, FlowMode::NoFlow);
    }

    #[test]
    fn parent_cycle_rejected() {
        let s = scenario(vec![part("a", Some("b")), part("b", Some("a"))]);
        assert!(matches!(compile(&s), Err(ProjectError::Validation(_))));
    }

    #[test]
    fn option_lines_on_unloaded_def_still_apply() {
        let mut s = scenario(vec![part("core", None)]);
        s.resource_options = vec!["ignore, Ablator".into()];
        let compiled = compile(&s).unwrap();
        assert!(
            compiled
                .settings
                .ignore
                .contains(&df_core::ResourceName::from("Ablator"))
        );

        s.resource_options.push("reverse, Ablator".into());
        assert!(matches!(compile(&s), Err(ProjectError::Pump(_))));
    }

    #[test]
    fn linked_ports_and_bank() {
        let mut port_a = part("port_a", None);
        port_a.docking_port = true;
        let mut port_b = part("port_b", None);
        port_b.docking_port = true;
        let mut s = scenario(vec![port_a, port_b]);
        s.links.push(LinkDef {
            a: "port_a".into(),
            b: "port_b".into(),
        });
        s.connectors = vec!["port_a".into()];
        s.driving_resource = Some("LiquidHydrogen".into());

        let compiled = compile(&s).unwrap();
        let a = compiled.part("port_a").unwrap();
        let b = compiled.part("port_b").unwrap();
        assert_eq!(compiled.vessel.linked_part(a), Some(b));
        assert_eq!(compiled.vessel.driving_resource().as_str(), "LiquidHydrogen");

        let bank = compiled.build_bank().unwrap();
        assert_eq!(bank.len(), 1);
        assert!(bank.get(a).is_some());
    }
}
