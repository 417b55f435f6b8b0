use crate::{TfError, TfResult};

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

pub fn ensure_finite(v: Real, what: &'static str) -> TfResult<Real> {
    if v.is_finite() {
        Ok(v)
    } else {
        Err(TfError::NonFinite { what, value: v })
    }
}

/// Normalize a set of fractions so they sum to one.
///
/// Negative entries are clipped to zero before normalizing. Fails if any entry
/// is non-finite or if nothing positive remains.
pub fn normalize_fractions(fractions: &[Real]) -> TfResult<Vec<Real>> {
    let mut clipped = Vec::with_capacity(fractions.len());
    for &f in fractions {
        clipped.push(ensure_finite(f, "fraction")?.max(0.0));
    }

    let sum: Real = clipped.iter().sum();
    if sum <= 0.0 {
        return Err(TfError::InvalidArg {
            what: "fractions sum to zero".to_string(),
        });
    }

    Ok(clipped.into_iter().map(|f| f / sum).collect())
}
