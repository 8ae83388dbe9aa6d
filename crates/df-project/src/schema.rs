//! Scenario schema definitions.

use df_pump::PumpSettings;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScenarioDef {
    pub version: u32,
    pub name: String,
    #[serde(default)]
    pub settings: PumpSettings,
    /// Legacy `"ignore, X"` / `"reverse, X"` lines, folded into `settings`
    /// on load.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub resource_options: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub driving_resource: Option<String>,
    #[serde(default)]
    pub parts: Vec<PartDef>,
    #[serde(default)]
    pub links: Vec<LinkDef>,
    /// IDs of the parts that carry a pump.
    #[serde(default)]
    pub connectors: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PartDef {
    pub id: String,
    #[serde(default)]
    pub name: String,
    pub mass_kg: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<String>,
    #[serde(default = "default_true")]
    pub crossfeed: bool,
    /// Grapple-style override: always passable.
    #[serde(default)]
    pub flow_override: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature_k: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_temperature_k: Option<f64>,
    #[serde(default)]
    pub docking_port: bool,
    #[serde(default)]
    pub pools: Vec<PoolDef>,
}

impl PartDef {
    /// Display name, falling back to the ID.
    pub fn display_name(&self) -> &str {
        if self.name.is_empty() {
            &self.id
        } else {
            &self.name
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PoolDef {
    pub resource: String,
    pub amount: f64,
    pub capacity: f64,
    #[serde(default = "default_true")]
    pub active: bool,
    #[serde(default)]
    pub flow_mode: FlowModeDef,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum FlowModeDef {
    #[default]
    Flow,
    NoFlow,
}

/// Two docking ports joined at load time. At least one must be a root part.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LinkDef {
    pub a: String,
    pub b: String,
}

fn default_true() -> bool {
    true
}
