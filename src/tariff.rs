//! Shipping tariffs charged by the freight forwarder, in the supplier's currency.
use crate::units::{Dimensionless, SourceMoney};
use serde::{Deserialize, Serialize};

/// A tiered shipping tariff: a base cost for the first kilogram plus a fixed increment for each
/// additional kilogram.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ShippingTariff {
    /// Cost of shipping the first kilogram
    pub base: SourceMoney,
    /// Cost of each additional kilogram
    pub increment_per_kg: SourceMoney,
}

impl ShippingTariff {
    /// Tariff applied to electronic goods
    pub const ELECTRONIC: Self = Self::new(190.0, 40.0);

    /// Tariff applied to everything else
    pub const STANDARD: Self = Self::new(75.0, 20.0);

    /// Create a new tariff from raw amounts in the supplier's currency
    pub const fn new(base: f64, increment_per_kg: f64) -> Self {
        Self {
            base: SourceMoney(base),
            increment_per_kg: SourceMoney(increment_per_kg),
        }
    }

    /// The cost of shipping a batch of the given weight.
    ///
    /// Tariffs are not defined below 1 kg, so any smaller weight is charged as exactly 1 kg.
    pub fn cost(&self, weight_kg: u32) -> SourceMoney {
        let extra_kg = weight_kg.max(1) - 1;
        self.base + self.increment_per_kg * Dimensionless::from(extra_kg)
    }
}

/// The pair of tariff tiers, selected by whether the goods are electronic
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TariffTable {
    /// Tariff for electronic goods
    #[serde(default = "default_electronic")]
    pub electronic: ShippingTariff,
    /// Tariff for non-electronic goods
    #[serde(default = "default_standard")]
    pub standard: ShippingTariff,
}

fn default_electronic() -> ShippingTariff {
    ShippingTariff::ELECTRONIC
}

fn default_standard() -> ShippingTariff {
    ShippingTariff::STANDARD
}

impl Default for TariffTable {
    fn default() -> Self {
        Self {
            electronic: ShippingTariff::ELECTRONIC,
            standard: ShippingTariff::STANDARD,
        }
    }
}

impl TariffTable {
    /// Get the tier which applies to the goods
    pub fn tier(&self, electronic: bool) -> &ShippingTariff {
        if electronic {
            &self.electronic
        } else {
            &self.standard
        }
    }

    /// The cost of shipping a batch of the given weight with the appropriate tier
    pub fn cost(&self, weight_kg: u32, electronic: bool) -> SourceMoney {
        self.tier(electronic).cost(weight_kg)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(1, true, 190.0)]
    #[case(5, true, 350.0)]
    #[case(20, true, 950.0)]
    #[case(1, false, 75.0)]
    #[case(2, false, 95.0)]
    #[case(20, false, 455.0)]
    fn test_tariff_cost(#[case] weight_kg: u32, #[case] electronic: bool, #[case] expected: f64) {
        let tariffs = TariffTable::default();
        assert_eq!(tariffs.cost(weight_kg, electronic), SourceMoney(expected));
    }

    #[rstest]
    #[case(true)]
    #[case(false)]
    fn test_tariff_cost_below_one_kg(#[case] electronic: bool) {
        let tariffs = TariffTable::default();
        assert_eq!(tariffs.cost(0, electronic), tariffs.cost(1, electronic));
    }

    #[test]
    fn test_electronic_tariff_dominates() {
        let tariffs = TariffTable::default();
        for weight_kg in 1..=20 {
            assert!(tariffs.cost(weight_kg, true) > tariffs.cost(weight_kg, false));
        }
    }

    #[test]
    fn test_custom_tariff() {
        let tariff = ShippingTariff::new(10.0, 0.0);
        assert_eq!(tariff.cost(1), SourceMoney(10.0));
        assert_eq!(tariff.cost(15), SourceMoney(10.0));
    }
}
