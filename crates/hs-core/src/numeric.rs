use crate::HsError;

/// Floating point type used throughout the simulation.
pub type Real = f64;

/// Pass `v` through if it is finite.
pub fn ensure_finite(v: Real, what: &'static str) -> Result<Real, HsError> {
    if v.is_finite() {
        Ok(v)
    } else {
        Err(HsError::NonFinite { what, value: v })
    }
}

/// Like [`ensure_finite`] but also rejects values `<= 0`.
pub fn ensure_positive(v: Real, what: &'static str) -> Result<Real, HsError> {
    let v = ensure_finite(v, what)?;
    if v > 0.0 {
        Ok(v)
    } else {
        Err(HsError::InvalidArg { what })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ensure_finite_detects_nan() {
        let err = ensure_finite(Real::NAN, "test").unwrap_err();
        let msg = format!("{err}");
        assert!(msg.contains("Non-finite"));
    }

    #[test]
    fn ensure_positive_rejects_zero() {
        assert!(ensure_positive(0.0, "dt").is_err());
        assert!(ensure_positive(-1.0, "dt").is_err());
        assert_eq!(ensure_positive(2.5, "dt").unwrap(), 2.5);
    }
}
