use rust_decimal::Decimal;
use std::ops::{Add, Div, Mul, Neg, Sub};

use crate::error::SimulationError;

/// A value of the form `constant + coefficient * R`, where R is the single
/// unknown of the reinvestment recurrence.
///
/// The recurrence only ever adds these values together or scales them by
/// known numbers, so it stays affine in R and one division solves it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Affine {
    pub constant: Decimal,
    pub coefficient: Decimal,
}

impl Affine {
    pub const fn known(value: Decimal) -> Self {
        Self {
            constant: value,
            coefficient: Decimal::ZERO,
        }
    }

    pub const fn unknown() -> Self {
        Self {
            constant: Decimal::ZERO,
            coefficient: Decimal::ONE,
        }
    }

    pub fn eval(self, r: Decimal) -> Decimal {
        self.constant + self.coefficient * r
    }

    /// The R for which this value is zero
    pub fn solve_zero(self) -> Result<Decimal, SimulationError> {
        if self.coefficient.is_zero() {
            return Err(SimulationError::NoUniqueSolution);
        }
        Ok(-self.constant / self.coefficient)
    }
}

impl From<Decimal> for Affine {
    fn from(value: Decimal) -> Self {
        Self::known(value)
    }
}

impl Add for Affine {
    type Output = Affine;

    fn add(self, rhs: Affine) -> Affine {
        Affine {
            constant: self.constant + rhs.constant,
            coefficient: self.coefficient + rhs.coefficient,
        }
    }
}

impl Sub for Affine {
    type Output = Affine;

    fn sub(self, rhs: Affine) -> Affine {
        self + (-rhs)
    }
}

impl Neg for Affine {
    type Output = Affine;

    fn neg(self) -> Affine {
        Affine {
            constant: -self.constant,
            coefficient: -self.coefficient,
        }
    }
}

impl Mul<Decimal> for Affine {
    type Output = Affine;

    fn mul(self, rhs: Decimal) -> Affine {
        Affine {
            constant: self.constant * rhs,
            coefficient: self.coefficient * rhs,
        }
    }
}

impl Div<Decimal> for Affine {
    type Output = Affine;

    fn div(self, rhs: Decimal) -> Affine {
        Affine {
            constant: self.constant / rhs,
            coefficient: self.coefficient / rhs,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_arithmetic_stays_affine() {
        let r = Affine::unknown();
        // 10 - (2R - 4) / 2 = 12 - R
        let value = Affine::known(dec!(10)) - (r * dec!(2) - Affine::known(dec!(4))) / dec!(2);
        assert_eq!(value.constant, dec!(12));
        assert_eq!(value.coefficient, dec!(-1));
        assert_eq!(value.eval(dec!(5)), dec!(7));
    }

    #[test]
    fn test_solve_zero() {
        let value = Affine {
            constant: dec!(30),
            coefficient: dec!(-4),
        };
        assert_eq!(value.solve_zero().unwrap(), dec!(7.5));
    }

    #[test]
    fn test_solve_zero_without_unknown() {
        assert!(matches!(
            Affine::known(dec!(3)).solve_zero(),
            Err(SimulationError::NoUniqueSolution)
        ));
    }
}
