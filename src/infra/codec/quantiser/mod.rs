//! Bidirectional maps between engineering units and fixed-width unsigned
//! wire codes. Two shapes cover every field in the registry: an affine map
//! (`code = round((value-low)*(2^w-1)/(high-low))`) and a step map
//! (`code = round((value-low)/step)`). Both round half-away-from-zero
//! (the default behaviour of `f64::round`) and reject out-of-range input
//! at encode time rather than silently clamping; decode always yields an
//! in-range value because the wire code itself is width-bounded.

/// An affine quantisation over a closed interval, packed into `width` bits.
#[derive(Debug, Clone, Copy)]
pub struct Affine {
    pub low: f64,
    pub high: f64,
    pub width: u8,
}

impl Affine {
    /// Quantise `value` into a `width`-bit code. `Err(())` iff `value` lies
    /// outside `[low, high]`; callers attach the field identity to build a
    /// `FieldError::OutOfRange`.
    pub fn encode(&self, value: f64) -> Result<u32, ()> {
        if value < self.low || value > self.high {
            return Err(());
        }
        let max_code = (1u64 << self.width) - 1;
        let span = self.high - self.low;
        let code = if span == 0.0 {
            0.0
        } else {
            (value - self.low) * max_code as f64 / span
        };
        Ok(round_half_away_from_zero(code).clamp(0.0, max_code as f64) as u32)
    }

    /// Dequantise `code` (already masked to `width` bits) into engineering units.
    pub fn decode(&self, code: u32) -> f64 {
        let max_code = (1u64 << self.width) - 1;
        let span = self.high - self.low;
        self.low + (code as f64) * span / max_code as f64
    }
}

/// A fixed-step quantisation: `code = round((value-low)/step)`.
#[derive(Debug, Clone, Copy)]
pub struct Step {
    pub low: f64,
    pub high: f64,
    pub step: f64,
}

impl Step {
    pub fn encode(&self, value: f64) -> Result<u32, ()> {
        if value < self.low || value > self.high {
            return Err(());
        }
        let max_code = ((self.high - self.low) / self.step).round() as u32;
        let code = round_half_away_from_zero((value - self.low) / self.step);
        Ok((code.clamp(0.0, max_code as f64)) as u32)
    }

    pub fn decode(&self, code: u32) -> f64 {
        self.low + code as f64 * self.step
    }
}

#[inline]
fn round_half_away_from_zero(v: f64) -> f64 {
    v.round()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn affine_round_trips_within_tolerance() {
        let q = Affine {
            low: -40.0,
            high: 80.0,
            width: 9,
        };
        let code = q.encode(-5.25).unwrap();
        let back = q.decode(code);
        assert!((back - (-5.25)).abs() < 0.25, "back = {back}");
    }

    #[test]
    fn affine_rejects_out_of_range() {
        let q = Affine {
            low: 0.0,
            high: 100.0,
            width: 8,
        };
        assert!(q.encode(-0.1).is_err());
        assert!(q.encode(100.1).is_err());
        assert!(q.encode(0.0).is_ok());
        assert!(q.encode(100.0).is_ok());
    }

    #[test]
    fn affine_endpoints_map_to_endpoint_codes() {
        let q = Affine {
            low: 0.0,
            high: 100.0,
            width: 8,
        };
        assert_eq!(q.encode(0.0).unwrap(), 0);
        assert_eq!(q.encode(100.0).unwrap(), 255);
    }

    #[test]
    fn step_round_trips_exactly_on_grid_points() {
        let q = Step {
            low: 850.0,
            high: 1105.0,
            step: 1.0,
        };
        let code = q.encode(980.0).unwrap();
        assert_eq!(q.decode(code), 980.0);
    }

    #[test]
    fn step_rejects_out_of_range() {
        let q = Step {
            low: 0.0,
            high: 60.0,
            step: 4.0,
        };
        assert!(q.encode(-1.0).is_err());
        assert!(q.encode(60.1).is_err());
    }

    #[test]
    fn step_rounds_half_away_from_zero() {
        let q = Step {
            low: 0.0,
            high: 10.0,
            step: 1.0,
        };
        // 2.5 rounds to 3, not 2 (half-away-from-zero, not banker's rounding).
        assert_eq!(q.encode(2.5).unwrap(), 3);
    }
}
