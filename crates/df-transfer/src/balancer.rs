//! Per-tick balancing of one resource between source and sink pools.
//!
//! The split works on snapshots so the host's pools are only touched once,
//! when the result is written back.

use df_core::{PoolId, Real, clamp_amount};
use df_graph::Pool;

/// Copy of the pool fields the balancer reads and writes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PoolSnapshot {
    pub id: PoolId,
    pub amount: Real,
    pub capacity: Real,
    pub active: bool,
}

impl PoolSnapshot {
    pub fn capture(pool: &Pool) -> Self {
        Self {
            id: pool.id,
            amount: pool.amount,
            capacity: pool.capacity,
            active: pool.active,
        }
    }

    pub fn spare(&self) -> Real {
        (self.capacity - self.amount).max(0.0)
    }
}

/// Everything that limits how fast one tick may move resources.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RateBudget {
    /// Current rate cap after thermal derating.
    pub rate_cap: Real,
    /// Multiplier turning the configured rate into units per second.
    pub rate_scale: Real,
    pub connector_size: Real,
    /// Simulated seconds covered by this tick.
    pub dt: Real,
}

impl RateBudget {
    /// Volume allowed this tick for the given number of active pools.
    ///
    /// The rate is shared by the smaller of the two pool counts.
    pub fn volume(&self, available_pools: usize, required_pools: usize) -> Real {
        let bottleneck = available_pools.min(required_pools);
        if bottleneck == 0 || self.dt <= 0.0 || self.connector_size <= 0.0 {
            return 0.0;
        }
        let rate = (self.rate_cap * self.rate_scale).max(0.0) / bottleneck as Real;
        rate * self.connector_size.sqrt() * self.dt
    }
}

/// What one resource did during one tick.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct BalanceOutcome {
    pub available_volume: Real,
    pub required_volume: Real,
    pub rate_volume: Real,
    /// Net amount moved, after rounding correction.
    pub transferred: Real,
}

/// Move one tick's worth of resource from `available` into `required`.
///
/// Sinks are filled in order, each taking an equal share of what is left
/// (capped by its free space). Each share is drawn from the sources the same
/// way, capped by what each source holds. Whatever part of a share the
/// sources could not supply is taken back out of that sink, so amounts stay
/// exact and the returned total matches what actually moved.
pub fn balance(
    available: &mut [PoolSnapshot],
    required: &mut [PoolSnapshot],
    budget: &RateBudget,
) -> BalanceOutcome {
    let sources: Vec<usize> = (0..available.len())
        .filter(|&i| available[i].active && available[i].amount > 0.0)
        .collect();
    let sinks: Vec<usize> = (0..required.len())
        .filter(|&i| required[i].active && required[i].spare() > 0.0)
        .collect();

    let available_volume: Real = sources.iter().map(|&i| available[i].amount).sum();
    let required_volume: Real = sinks.iter().map(|&i| required[i].spare()).sum();
    let rate_volume = budget.volume(sources.len(), sinks.len());

    let mut outcome = BalanceOutcome {
        available_volume,
        required_volume,
        rate_volume,
        transferred: 0.0,
    };

    let mut to_place = available_volume.min(required_volume).min(rate_volume);
    if to_place.is_nan() || to_place <= 0.0 {
        return outcome;
    }

    let mut sinks_left = sinks.len();
    for &si in &sinks {
        let sink = &mut required[si];
        let mut share = (to_place / sinks_left as Real).min(sink.spare());
        sink.amount += share;
        to_place -= share;
        outcome.transferred += share;
        sinks_left -= 1;

        let mut sources_left = sources.len();
        for &ai in &sources {
            let source = &mut available[ai];
            let take = (share / sources_left as Real).min(source.amount);
            source.amount -= take;
            share -= take;
            sources_left -= 1;
        }

        // Undelivered remainder of this share
        sink.amount -= share;
        outcome.transferred -= share;
    }

    for snap in available.iter_mut().chain(required.iter_mut()) {
        snap.amount = clamp_amount(snap.amount, snap.capacity).0;
    }

    outcome
}
