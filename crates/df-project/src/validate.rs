//! Scenario validation logic.

use std::collections::{HashMap, HashSet};

use crate::schema::{PartDef, ScenarioDef};

#[derive(thiserror::Error, Debug)]
pub enum ValidationError {
    #[error("Duplicate ID: {id} in {context}")]
    DuplicateId { id: String, context: String },

    #[error("Missing reference: {id} in {context}")]
    MissingReference { id: String, context: String },

    #[error("Invalid value: {field} = {value} ({reason})")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Unsupported version: {version}")]
    UnsupportedVersion { version: u32 },
}

fn invalid(field: String, value: impl ToString, reason: &str) -> ValidationError {
    ValidationError::InvalidValue {
        field,
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

pub fn validate_scenario(scenario: &ScenarioDef) -> Result<(), ValidationError> {
    if scenario.version > crate::migrate::LATEST_VERSION {
        return Err(ValidationError::UnsupportedVersion {
            version: scenario.version,
        });
    }

    if let Err(e) = scenario.settings.validate() {
        return Err(invalid("settings".to_string(), e, "out of range"));
    }

    if let Some(resource) = &scenario.driving_resource {
        if resource.trim().is_empty() {
            return Err(invalid(
                "driving_resource".to_string(),
                "\"\"",
                "must not be empty",
            ));
        }
    }

    let mut parts: HashMap<&str, &PartDef> = HashMap::new();
    for part in &scenario.parts {
        if parts.insert(part.id.as_str(), part).is_some() {
            return Err(ValidationError::DuplicateId {
                id: part.id.clone(),
                context: "parts".to_string(),
            });
        }
    }

    for part in &scenario.parts {
        validate_part(part)?;
        if let Some(parent) = &part.parent {
            if !parts.contains_key(parent.as_str()) {
                return Err(ValidationError::MissingReference {
                    id: parent.clone(),
                    context: format!("parent of part {}", part.id),
                });
            }
            if parent == &part.id {
                return Err(invalid(
                    format!("parts.{}.parent", part.id),
                    parent,
                    "part cannot be its own parent",
                ));
            }
        }
    }

    let mut linked: HashSet<&str> = HashSet::new();
    for link in &scenario.links {
        for end in [&link.a, &link.b] {
            let part = parts
                .get(end.as_str())
                .ok_or_else(|| ValidationError::MissingReference {
                    id: end.clone(),
                    context: "links".to_string(),
                })?;
            if !part.docking_port {
                return Err(invalid(
                    format!("links.{}", end),
                    end,
                    "linked part has no docking port",
                ));
            }
            if !linked.insert(end.as_str()) {
                return Err(ValidationError::DuplicateId {
                    id: end.clone(),
                    context: "links".to_string(),
                });
            }
        }
        if link.a == link.b {
            return Err(invalid(
                "links".to_string(),
                &link.a,
                "port cannot link to itself",
            ));
        }
    }

    let mut connectors: HashSet<&str> = HashSet::new();
    for id in &scenario.connectors {
        let part = parts
            .get(id.as_str())
            .ok_or_else(|| ValidationError::MissingReference {
                id: id.clone(),
                context: "connectors".to_string(),
            })?;
        if !part.docking_port {
            return Err(invalid(
                format!("connectors.{}", id),
                id,
                "connector part has no docking port",
            ));
        }
        if !connectors.insert(id.as_str()) {
            return Err(ValidationError::DuplicateId {
                id: id.clone(),
                context: "connectors".to_string(),
            });
        }
    }

    Ok(())
}

fn validate_part(part: &PartDef) -> Result<(), ValidationError> {
    let field = |name: &str| format!("parts.{}.{}", part.id, name);

    if !part.mass_kg.is_finite() || part.mass_kg < 0.0 {
        return Err(invalid(field("mass_kg"), part.mass_kg, "must be finite and >= 0"));
    }
    for (name, value) in [
        ("temperature_k", part.temperature_k),
        ("max_temperature_k", part.max_temperature_k),
    ] {
        if let Some(v) = value {
            if !v.is_finite() || v < 0.0 {
                return Err(invalid(field(name), v, "must be finite and >= 0"));
            }
        }
    }

    for (i, pool) in part.pools.iter().enumerate() {
        let pool_field = |name: &str| format!("parts.{}.pools[{}].{}", part.id, i, name);
        if pool.resource.trim().is_empty() {
            return Err(invalid(pool_field("resource"), "\"\"", "must not be empty"));
        }
        if !pool.capacity.is_finite() || pool.capacity < 0.0 {
            return Err(invalid(
                pool_field("capacity"),
                pool.capacity,
                "must be finite and >= 0",
            ));
        }
        if !pool.amount.is_finite() || pool.amount < 0.0 || pool.amount > pool.capacity {
            return Err(invalid(
                pool_field("amount"),
                pool.amount,
                "must lie within [0, capacity]",
            ));
        }
    }
    Ok(())
}
