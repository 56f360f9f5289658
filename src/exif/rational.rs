use std::fmt;

/// An unsigned EXIF rational (`RATIONAL`, two `u32`s).
///
/// Displays as its decimal value using Rust's shortest round-trip float
/// formatting, so `28/10` prints `2.8`, `8/1` prints `8` and `1/250`
/// prints `0.004`. A zero denominator displays as the raw fraction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rational {
    pub num: u32,
    pub den: u32,
}

impl Rational {
    pub fn new(num: u32, den: u32) -> Self {
        Self { num, den }
    }

    /// Decimal value, or `None` for a zero denominator.
    pub fn to_f64(self) -> Option<f64> {
        if self.den == 0 {
            None
        } else {
            Some(self.num as f64 / self.den as f64)
        }
    }
}

impl fmt::Display for Rational {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.to_f64() {
            Some(v) => write!(f, "{v}"),
            None => write!(f, "{}/{}", self.num, self.den),
        }
    }
}
