//! Rational numbers as stored by metadata formats

use std::fmt;

/// A numerator/denominator pair
///
/// Values are kept exactly as decoded; nothing is simplified on
/// construction. A zero numerator always converts to `0.0`, even over a zero
/// denominator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Rational {
    numerator: i64,
    denominator: i64,
}

impl Rational {
    /// Create a rational from its parts
    pub fn new(numerator: i64, denominator: i64) -> Self {
        Self {
            numerator,
            denominator,
        }
    }

    pub fn numerator(&self) -> i64 {
        self.numerator
    }

    pub fn denominator(&self) -> i64 {
        self.denominator
    }

    /// Value as a double
    ///
    /// A zero numerator yields `0.0` regardless of the denominator.
    pub fn to_f64(&self) -> f64 {
        if self.numerator == 0 {
            return 0.0;
        }
        self.numerator as f64 / self.denominator as f64
    }

    /// Value as a float
    pub fn to_f32(&self) -> f32 {
        if self.numerator == 0 {
            return 0.0;
        }
        self.numerator as f32 / self.denominator as f32
    }

    /// Value truncated toward zero after division
    ///
    /// Division by zero saturates at the bounds of the type.
    pub fn to_i32(&self) -> i32 {
        self.to_f64() as i32
    }

    /// Value truncated toward zero after division
    pub fn to_i64(&self) -> i64 {
        self.to_f64() as i64
    }

    /// The inverse of this rational (denominator over numerator)
    pub fn reciprocal(&self) -> Self {
        Self::new(self.denominator, self.numerator)
    }

    pub fn is_zero(&self) -> bool {
        self.numerator == 0
    }

    /// Whether the value is positive (a zero denominator is not)
    pub fn is_positive(&self) -> bool {
        self.denominator != 0 && self.to_f64() > 0.0
    }

    /// Whether the value is a whole number
    ///
    /// `0/0` counts as an integer; any other zero denominator does not.
    pub fn is_integer(&self) -> bool {
        if self.denominator == 0 {
            return self.numerator == 0;
        }
        // i64::MIN % -1 overflows; the quotient is whole either way
        self.numerator
            .checked_rem(self.denominator)
            .map_or(true, |remainder| remainder == 0)
    }

    /// The equivalent rational in lowest terms with a positive denominator
    ///
    /// Returns the value unchanged when the reduced form does not fit in
    /// `i64` (for example `3/i64::MIN`).
    pub fn simplified(&self) -> Self {
        let divisor = i128::from(gcd(self.numerator, self.denominator));
        if divisor == 0 {
            return *self;
        }
        let (mut n, mut d) = (
            i128::from(self.numerator) / divisor,
            i128::from(self.denominator) / divisor,
        );
        if d < 0 {
            n = -n;
            d = -d;
        }
        match (i64::try_from(n), i64::try_from(d)) {
            (Ok(n), Ok(d)) => Self::new(n, d),
            _ => *self,
        }
    }

    /// Render the value in the simplest form available
    ///
    /// Whole numbers are printed as integers. When `allow_decimal` is set and
    /// the decimal form is shorter than five characters it is used instead of
    /// a fraction.
    pub fn to_simple_string(&self, allow_decimal: bool) -> String {
        if self.denominator == 0 && self.numerator != 0 {
            return self.to_string();
        }
        if self.is_integer() {
            return self.to_i32().to_string();
        }

        let simplified = self.simplified();
        if allow_decimal {
            let decimal = simplified.to_f64().to_string();
            if decimal.len() < 5 {
                return decimal;
            }
        }
        simplified.to_string()
    }
}

impl fmt::Display for Rational {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.numerator, self.denominator)
    }
}

impl From<(i64, i64)> for Rational {
    fn from((numerator, denominator): (i64, i64)) -> Self {
        Self::new(numerator, denominator)
    }
}

fn gcd(a: i64, b: i64) -> u64 {
    let (mut a, mut b) = (a.unsigned_abs(), b.unsigned_abs());
    while b != 0 {
        (a, b) = (b, a % b);
    }
    a
}
