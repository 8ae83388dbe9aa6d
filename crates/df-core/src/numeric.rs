use crate::DfError;

/// Floating point type used throughout system
pub type Real = f64;

/// One tolerance for everything
#[derive(Clone, Copy, Debug)]
pub struct Tolerances {
    pub abs: Real,
    pub rel: Real,
}

impl Default for Tolerances {
    fn default() -> Self {
        Self {
            abs: 1e-12,
            rel: 1e-9,
        }
    }
}

pub fn nearly_equal(a: Real, b: Real, tol: Tolerances) -> bool {
    let diff = (a - b).abs();
    if diff <= tol.abs {
        return true;
    }
    diff <= tol.rel * a.abs().max(b.abs())
}

pub fn ensure_finite(v: Real, what: &'static str) -> Result<Real, DfError> {
    if v.is_finite() {
        Ok(v)
    } else {
        Err(DfError::NonFinite { what, value: v })
    }
}

/// Force `amount` into `[0, capacity]`.
///
/// Returns the clamped value and how far it moved. NaN collapses to zero.
pub fn clamp_amount(amount: Real, capacity: Real) -> (Real, Real) {
    let capacity = capacity.max(0.0);
    let clamped = if amount.is_nan() {
        0.0
    } else {
        amount.clamp(0.0, capacity)
    };
    let moved = if amount.is_nan() {
        clamped
    } else {
        (amount - clamped).abs()
    };
    (clamped, moved)
}
