use std::fmt;

/// A JSON-compatible number.
///
/// Non-finite floats are constructible (a caller may hand one in) but are
/// rejected when the arena is encoded to text.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Number {
    PosInt(u64),
    NegInt(i64),
    Float(f64),
}

impl Number {
    pub fn from_f64(f: f64) -> Option<Self> {
        if f.is_finite() {
            Some(Number::Float(f))
        } else {
            None
        }
    }

    pub fn is_finite(&self) -> bool {
        match self {
            Number::PosInt(_) | Number::NegInt(_) => true,
            Number::Float(f) => f.is_finite(),
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Number::PosInt(u) => {
                if *u <= i64::MAX as u64 {
                    Some(*u as i64)
                } else {
                    None
                }
            }
            Number::NegInt(i) => Some(*i),
            Number::Float(f) => {
                let i = *f as i64;
                if i as f64 == *f {
                    Some(i)
                } else {
                    None
                }
            }
        }
    }

    pub fn as_u64(&self) -> Option<u64> {
        match self {
            Number::PosInt(u) => Some(*u),
            Number::NegInt(_) => None,
            Number::Float(f) => {
                if *f >= 0.0 {
                    let u = *f as u64;
                    if u as f64 == *f {
                        Some(u)
                    } else {
                        None
                    }
                } else {
                    None
                }
            }
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Number::PosInt(u) => Some(*u as f64),
            Number::NegInt(i) => Some(*i as f64),
            Number::Float(f) => Some(*f),
        }
    }
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let json_num = match self {
            Number::PosInt(u) => serde_json::Number::from(*u),
            Number::NegInt(i) => serde_json::Number::from(*i),
            Number::Float(fl) => {
                serde_json::Number::from_f64(*fl).unwrap_or_else(|| serde_json::Number::from(0))
            }
        };
        write!(f, "{json_num}")
    }
}

impl From<i64> for Number {
    fn from(n: i64) -> Self {
        if n >= 0 {
            Number::PosInt(n as u64)
        } else {
            Number::NegInt(n)
        }
    }
}

impl From<i32> for Number {
    fn from(n: i32) -> Self {
        Number::from(n as i64)
    }
}

impl From<isize> for Number {
    fn from(n: isize) -> Self {
        Number::from(n as i64)
    }
}

impl From<u64> for Number {
    fn from(n: u64) -> Self {
        Number::PosInt(n)
    }
}

impl From<u32> for Number {
    fn from(n: u32) -> Self {
        Number::PosInt(n as u64)
    }
}

impl From<usize> for Number {
    fn from(n: usize) -> Self {
        Number::PosInt(n as u64)
    }
}

impl From<f64> for Number {
    fn from(n: f64) -> Self {
        Number::Float(n)
    }
}

impl From<f32> for Number {
    fn from(n: f32) -> Self {
        Number::Float(n as f64)
    }
}

impl From<&serde_json::Number> for Number {
    fn from(n: &serde_json::Number) -> Self {
        if let Some(u) = n.as_u64() {
            Number::PosInt(u)
        } else if let Some(i) = n.as_i64() {
            Number::NegInt(i)
        } else {
            Number::Float(n.as_f64().unwrap_or(0.0))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Number;

    #[rstest::rstest]
    fn test_from_f64_rejects_non_finite() {
        assert!(Number::from_f64(f64::NAN).is_none());
        assert!(Number::from_f64(f64::INFINITY).is_none());
        assert!(Number::from_f64(1.5).is_some());
    }

    #[rstest::rstest]
    fn test_signed_construction_canonicalizes() {
        assert_eq!(Number::from(5i64), Number::PosInt(5));
        assert_eq!(Number::from(-5i64), Number::NegInt(-5));
        assert_eq!(Number::from(7i32), Number::PosInt(7));
    }

    #[rstest::rstest]
    fn test_as_conversions() {
        let too_large = Number::PosInt(i64::MAX as u64 + 1);
        assert_eq!(too_large.as_i64(), None);

        let neg = Number::NegInt(-5);
        assert_eq!(neg.as_u64(), None);
        assert_eq!(neg.as_i64(), Some(-5));

        let float_exact = Number::Float(7.0);
        assert_eq!(float_exact.as_i64(), Some(7));
        assert_eq!(float_exact.as_u64(), Some(7));

        let float_frac = Number::Float(7.25);
        assert_eq!(float_frac.as_i64(), None);
        assert_eq!(float_frac.as_f64(), Some(7.25));
    }

    #[rstest::rstest]
    fn test_is_finite() {
        assert!(Number::PosInt(1).is_finite());
        assert!(Number::Float(1.5).is_finite());
        assert!(!Number::Float(f64::NAN).is_finite());
        assert!(!Number::Float(f64::NEG_INFINITY).is_finite());
    }
}
