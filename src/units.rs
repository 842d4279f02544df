//! This module defines the unit types used in margin calculations and their conversions.
//!
//! Amounts in the marketplace's currency are [`Money`]; amounts in the supplier's currency are
//! [`SourceMoney`]. The only way to get from one to the other is through an [`ExchangeRate`].
use serde::{Deserialize, Serialize};

macro_rules! unit_struct {
    ($name:ident) => {
        /// Represents a type of quantity.
        #[derive(
            Debug,
            Clone,
            Copy,
            Default,
            PartialEq,
            PartialOrd,
            Serialize,
            Deserialize,
            derive_more::Add,
            derive_more::Sub,
            derive_more::Display,
        )]
        #[serde(transparent)]
        pub struct $name(pub f64);

        impl $name {
            /// Creates a new instance of the unit type from a f64 value.
            pub fn new(val: f64) -> Self {
                Self(val)
            }

            /// Returns the value of the unit type as a f64.
            pub fn value(self) -> f64 {
                self.0
            }

            /// Whether the underlying value is finite
            pub fn is_finite(self) -> bool {
                self.0.is_finite()
            }

            /// Round to the given number of decimal places
            pub fn round_to(self, decimals: i32) -> Self {
                let factor = 10f64.powi(decimals);
                Self((self.0 * factor).round() / factor)
            }
        }

        impl From<f64> for $name {
            fn from(val: f64) -> Self {
                Self(val)
            }
        }

        impl From<$name> for f64 {
            fn from(val: $name) -> Self {
                val.0
            }
        }

        impl std::ops::Mul<Dimensionless> for $name {
            type Output = $name;
            fn mul(self, rhs: Dimensionless) -> $name {
                $name(self.0 * rhs.0)
            }
        }

        impl std::ops::Mul<$name> for Dimensionless {
            type Output = $name;
            fn mul(self, rhs: $name) -> $name {
                $name(self.0 * rhs.0)
            }
        }

        impl std::ops::Div<Dimensionless> for $name {
            type Output = $name;
            fn div(self, rhs: Dimensionless) -> $name {
                $name(self.0 / rhs.0)
            }
        }

        impl std::ops::Div<$name> for $name {
            type Output = Dimensionless;
            fn div(self, rhs: $name) -> Dimensionless {
                Dimensionless(self.0 / rhs.0)
            }
        }

        impl float_cmp::ApproxEq for $name {
            type Margin = float_cmp::F64Margin;

            fn approx_eq<M: Into<Self::Margin>>(self, other: Self, margin: M) -> bool {
                <f64 as float_cmp::ApproxEq>::approx_eq(self.0, other.0, margin)
            }
        }
    };
}

macro_rules! impl_mul {
    ($Lhs:ty, $Rhs:ty, $Out:ty) => {
        impl std::ops::Mul<$Rhs> for $Lhs {
            type Output = $Out;
            fn mul(self, rhs: $Rhs) -> $Out {
                <$Out>::new(self.0 * rhs.0)
            }
        }
        impl std::ops::Mul<$Lhs> for $Rhs {
            type Output = $Out;
            fn mul(self, lhs: $Lhs) -> $Out {
                <$Out>::new(self.0 * lhs.0)
            }
        }
    };
}

/// Represents a dimensionless quantity (ratios, proportions and unit counts).
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    PartialOrd,
    Serialize,
    Deserialize,
    derive_more::Add,
    derive_more::Sub,
    derive_more::Display,
)]
#[serde(transparent)]
pub struct Dimensionless(pub f64);

impl std::ops::Mul for Dimensionless {
    type Output = Dimensionless;

    fn mul(self, rhs: Dimensionless) -> Self::Output {
        Dimensionless(self.0 * rhs.0)
    }
}

impl std::ops::Div for Dimensionless {
    type Output = Dimensionless;

    fn div(self, rhs: Dimensionless) -> Self::Output {
        Dimensionless(self.0 / rhs.0)
    }
}

impl From<f64> for Dimensionless {
    fn from(val: f64) -> Self {
        Self(val)
    }
}

impl From<u32> for Dimensionless {
    fn from(val: u32) -> Self {
        Self(val as f64)
    }
}

impl From<Dimensionless> for f64 {
    fn from(val: Dimensionless) -> Self {
        val.0
    }
}

impl float_cmp::ApproxEq for Dimensionless {
    type Margin = float_cmp::F64Margin;

    fn approx_eq<M: Into<Self::Margin>>(self, other: Self, margin: M) -> bool {
        <f64 as float_cmp::ApproxEq>::approx_eq(self.0, other.0, margin)
    }
}

// Currencies
unit_struct!(Money);
unit_struct!(SourceMoney);
unit_struct!(ExchangeRate);

// Mass
unit_struct!(Grams);
unit_struct!(Kilograms);

// Conversion rules
impl_mul!(SourceMoney, ExchangeRate, Money);

impl From<Kilograms> for Grams {
    fn from(val: Kilograms) -> Self {
        Grams(val.0 * 1000.0)
    }
}

impl From<Grams> for Kilograms {
    fn from(val: Grams) -> Self {
        Kilograms(val.0 / 1000.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use float_cmp::assert_approx_eq;

    #[test]
    fn test_source_money_conversion() {
        let converted = SourceMoney(75.0) * ExchangeRate(22.15);
        assert_approx_eq!(Money, converted, Money(1661.25));

        // Multiplication is symmetric
        assert_approx_eq!(Money, ExchangeRate(22.15) * SourceMoney(20.0), Money(443.0));
    }

    #[test]
    fn test_mass_conversion() {
        assert_eq!(Grams::from(Kilograms(2.0)), Grams(2000.0));
        assert_eq!(Kilograms::from(Grams(300.0)), Kilograms(0.3));
    }

    #[test]
    fn test_ratio_of_same_unit() {
        assert_approx_eq!(
            Dimensionless,
            Money(683.25) / Money(1980.0),
            Dimensionless(683.25 / 1980.0)
        );
    }

    #[test]
    fn test_round_to() {
        assert_eq!(Money(553.75).round_to(0), Money(554.0));
        assert_eq!(Dimensionless::from(3u32), Dimensionless(3.0));
        assert_eq!(Money(34.507_575).round_to(2), Money(34.51));
    }
}
