use std::fmt;

/// How DOUBLE and REAL cells compare. Every other tag compares exactly.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum FloatPolicy {
    /// IEEE equality, except that NaN equals NaN.
    #[default]
    Exact,
    /// At most `n` representable values apart, same sign.
    Ulps(u32),
    /// `|a - b| <= epsilon * max(|a|, |b|)`.
    Relative(f64),
}

impl FloatPolicy {
    /// Parses the `[compare]` config pair, e.g. `("ulps", Some(4.0))`.
    pub fn from_config(kind: &str, tolerance: Option<f64>) -> Result<Self, String> {
        match kind.trim().to_ascii_lowercase().as_str() {
            "exact" => Ok(FloatPolicy::Exact),
            "ulps" => {
                let n = tolerance.ok_or("ulps policy needs float_tolerance")?;
                if n < 0.0 || n.fract() != 0.0 || n > u32::MAX as f64 {
                    return Err(format!("ulps tolerance must be a whole number, got {}", n));
                }
                Ok(FloatPolicy::Ulps(n as u32))
            }
            "relative" => {
                let eps = tolerance.ok_or("relative policy needs float_tolerance")?;
                if !(eps >= 0.0) {
                    return Err(format!("relative tolerance must be >= 0, got {}", eps));
                }
                Ok(FloatPolicy::Relative(eps))
            }
            other => Err(format!("unknown float policy '{}'", other)),
        }
    }

    pub fn doubles_equal(&self, a: f64, b: f64) -> bool {
        if a == b || (a.is_nan() && b.is_nan()) {
            return true;
        }
        if a.is_nan() || b.is_nan() || a.is_infinite() || b.is_infinite() {
            return false;
        }
        match *self {
            FloatPolicy::Exact => false,
            FloatPolicy::Ulps(max) => {
                if a.is_sign_negative() != b.is_sign_negative() {
                    return false;
                }
                let distance = (a.to_bits() as i64).abs_diff(b.to_bits() as i64);
                distance <= max as u64
            }
            FloatPolicy::Relative(epsilon) => {
                (a - b).abs() <= epsilon * a.abs().max(b.abs())
            }
        }
    }

    pub fn floats_equal(&self, a: f32, b: f32) -> bool {
        if a == b || (a.is_nan() && b.is_nan()) {
            return true;
        }
        if a.is_nan() || b.is_nan() || a.is_infinite() || b.is_infinite() {
            return false;
        }
        match *self {
            FloatPolicy::Exact => false,
            FloatPolicy::Ulps(max) => {
                if a.is_sign_negative() != b.is_sign_negative() {
                    return false;
                }
                let distance = (a.to_bits() as i32).abs_diff(b.to_bits() as i32);
                distance <= max
            }
            FloatPolicy::Relative(epsilon) => {
                let (a, b) = (a as f64, b as f64);
                (a - b).abs() <= epsilon * a.abs().max(b.abs())
            }
        }
    }
}

impl fmt::Display for FloatPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FloatPolicy::Exact => f.write_str("exact"),
            FloatPolicy::Ulps(n) => write!(f, "within {} ulps", n),
            FloatPolicy::Relative(eps) => write!(f, "relative {:e}", eps),
        }
    }
}
