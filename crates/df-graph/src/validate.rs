//! Vessel validation logic.

use df_core::{DfResult, PartId, ensure_finite, to_kelvin, to_kg};

use crate::error::GraphError;
use crate::model::{Part, Pool};

/// Validate part references, parent/child agreement, acyclic parent chains
/// and numeric attributes.
pub(crate) fn validate_parts(parts: &[Part]) -> DfResult<()> {
    // Check that part IDs are contiguous and match their indices
    for (i, part) in parts.iter().enumerate() {
        if part.id.index() as usize != i {
            return Err(GraphError::UnknownPart { part: part.id }.into());
        }
    }

    for part in parts {
        if let Some(parent) = part.parent {
            let Some(parent_part) = parts.get(parent.index() as usize) else {
                return Err(GraphError::UnknownPart { part: parent }.into());
            };
            if !parent_part.children.contains(&part.id) {
                return Err(GraphError::InconsistentAdjacency {
                    parent,
                    child: part.id,
                }
                .into());
            }
        }

        for &child in &part.children {
            let Some(child_part) = parts.get(child.index() as usize) else {
                return Err(GraphError::UnknownPart { part: child }.into());
            };
            if child_part.parent != Some(part.id) {
                return Err(GraphError::InconsistentAdjacency {
                    parent: part.id,
                    child,
                }
                .into());
            }
        }

        let mass = ensure_finite(to_kg(part.mass), "part mass")?;
        if mass < 0.0 {
            return Err(GraphError::InvalidPartValue {
                part: part.id,
                what: "mass",
            }
            .into());
        }
        let temp = to_kelvin(part.temperature);
        let max_temp = to_kelvin(part.max_temperature);
        if !temp.is_finite() || !max_temp.is_finite() || max_temp <= 0.0 {
            return Err(GraphError::InvalidPartValue {
                part: part.id,
                what: "temperature",
            }
            .into());
        }
    }

    // Walking up from any part must reach a root within parts.len() steps
    for part in parts {
        let mut cursor = part.parent;
        let mut steps = 0;
        while let Some(p) = cursor {
            steps += 1;
            if p == part.id || steps > parts.len() {
                return Err(GraphError::ParentCycle { part: part.id }.into());
            }
            cursor = parts[p.index() as usize].parent;
        }
    }

    Ok(())
}

/// Validate pool ownership and amounts.
pub(crate) fn validate_pools(parts: &[Part], pools: &[Pool]) -> DfResult<()> {
    for (i, pool) in pools.iter().enumerate() {
        if pool.id.index() as usize != i {
            return Err(GraphError::UnknownPool { pool: pool.id }.into());
        }
        let Some(owner) = parts.get(pool.part.index() as usize) else {
            return Err(GraphError::UnknownPart { part: pool.part }.into());
        };
        if !owner.pools.contains(&pool.id) {
            return Err(GraphError::UnknownPool { pool: pool.id }.into());
        }
        let in_range = pool.amount.is_finite()
            && pool.capacity.is_finite()
            && pool.capacity >= 0.0
            && (0.0..=pool.capacity).contains(&pool.amount);
        if !in_range {
            return Err(GraphError::AmountOutOfRange {
                pool: pool.id,
                amount: pool.amount,
                capacity: pool.capacity,
            }
            .into());
        }
    }
    Ok(())
}

/// Validate that `a` and `b` can be docked to each other.
pub(crate) fn validate_link(parts: &[Part], a: PartId, b: PartId) -> DfResult<()> {
    if a == b {
        return Err(GraphError::SelfLink { part: a }.into());
    }
    for this in [a, b] {
        let part = parts
            .get(this.index() as usize)
            .ok_or(GraphError::UnknownPart { part: this })?;
        let port = part.port.ok_or(GraphError::NotAPort { part: this })?;
        if let Some(other) = port.linked {
            return Err(GraphError::AlreadyLinked { part: this, other }.into());
        }
    }
    if parts[a.index() as usize].parent.is_some() && parts[b.index() as usize].parent.is_some() {
        return Err(GraphError::LinkNotRoot { a, b }.into());
    }
    Ok(())
}
