//! The interface the pump core uses to reach the host's parts.

use df_core::{Mass, PartId, PoolId, Real, Temperature};

use crate::error::GraphResult;
use crate::model::{LinkState, Pool};

/// Host-owned part graph.
///
/// The graph may be cyclic and is mutated by the host between ticks, so
/// callers keep only [`PartId`]/[`PoolId`] values across calls, never
/// borrowed parts or pools.
pub trait PartGraph {
    /// Number of parts in the connectivity domain.
    fn part_count(&self) -> usize;

    fn contains_part(&self, part: PartId) -> bool;

    fn parent(&self, part: PartId) -> Option<PartId>;

    /// Children in attachment order. Unknown parts have none.
    fn children(&self, part: PartId) -> &[PartId];

    fn part_pools(&self, part: PartId) -> &[PoolId];

    fn pool(&self, pool: PoolId) -> Option<&Pool>;

    /// Whether traversal may pass through this part.
    fn allows_flow(&self, part: PartId) -> bool;

    /// The part on the other side of a physical link, if any.
    fn linked_part(&self, part: PartId) -> Option<PartId>;

    /// Link state of the docking port on `part`, if it has one.
    fn link_state(&self, part: PartId) -> Option<LinkState>;

    fn mass(&self, part: PartId) -> Option<Mass>;

    fn temperature(&self, part: PartId) -> Option<Temperature>;

    fn max_temperature(&self, part: PartId) -> Option<Temperature>;

    /// Overwrite a pool amount. Hosts clamp into `[0, capacity]`.
    fn set_pool_amount(&mut self, pool: PoolId, amount: Real) -> GraphResult<()>;

    fn set_temperature(&mut self, part: PartId, temperature: Temperature) -> GraphResult<()>;

    /// Draw up to `amount` of the driving resource for `part`.
    ///
    /// Returns the amount actually granted; less than requested is a shortfall.
    fn request_driving_resource(&mut self, part: PartId, amount: Real) -> Real;

    /// Parent first, then children.
    fn neighbours(&self, part: PartId) -> Vec<PartId> {
        let children = self.children(part);
        let mut out = Vec::with_capacity(children.len() + 1);
        if let Some(parent) = self.parent(part) {
            out.push(parent);
        }
        out.extend_from_slice(children);
        out
    }
}
