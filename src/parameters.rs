//! Defines the inputs to a margin calculation and how they are read from a parameters file.
use crate::input::{input_err_msg, read_toml};
use crate::tariff::{ShippingTariff, TariffTable};
use crate::units::{Dimensionless, ExchangeRate, Grams, Money, SourceMoney};
use anyhow::{Context, Result, ensure};
use documented::DocumentedFields;
use serde::{Deserialize, Serialize};
use std::fmt::Write;
use std::ops::RangeInclusive;
use std::path::Path;

const PARAMETERS_FILE_HEADER: &str = "# Parameters for a batch margin calculation
# Pass this file to `batchmargin calculate` to use it.
";

/// The default number of target currency units per unit of source currency
pub const DEFAULT_EXCHANGE_RATE: ExchangeRate = ExchangeRate(22.15);

/// The default smallest batch weight considered, in kg
pub const DEFAULT_MIN_BATCH_KG: u32 = 1;

/// The default largest batch weight considered, in kg
pub const DEFAULT_MAX_BATCH_KG: u32 = 20;

/// The fee charged by the marketplace for each unit sold
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MarketplaceFee {
    /// A fixed amount per unit
    Fixed(Money),
    /// A percentage (0-100) of the sale price
    Percentage(Dimensionless),
}

impl Default for MarketplaceFee {
    fn default() -> Self {
        Self::Fixed(Money(300.0))
    }
}

impl MarketplaceFee {
    /// The fee charged on one unit sold at the given price
    pub fn resolve(&self, unit_sale_price: Money) -> Money {
        match *self {
            Self::Fixed(amount) => amount,
            Self::Percentage(percent) => unit_sale_price * (percent / Dimensionless(100.0)),
        }
    }

    /// Check that the fee is valid
    fn validate(&self) -> Result<()> {
        match *self {
            Self::Fixed(amount) => ensure!(
                amount.is_finite() && amount >= Money(0.0),
                "Fixed marketplace fee must be a finite number of at least zero"
            ),
            Self::Percentage(percent) => ensure!(
                (0.0..=100.0).contains(&percent.0),
                "Marketplace fee percentage must be between 0 and 100"
            ),
        }

        Ok(())
    }
}

/// The economic parameters of a product
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, DocumentedFields)]
#[serde(default)]
pub struct CalculationParameters {
    /// Sale price of one unit on the marketplace
    pub unit_sale_price: Money,
    /// Mass of one unit in grams
    pub unit_weight: Grams,
    /// Price of one unit from the supplier, in the supplier's currency
    pub supplier_unit_price: SourceMoney,
    /// Whether the goods are electronic (selects the shipping tariff)
    pub is_electronic: bool,
    /// Fee charged by the marketplace per unit sold, either `{ fixed = <amount> }` or
    /// `{ percentage = <0-100> }`
    pub marketplace_fee: MarketplaceFee,
}

impl Default for CalculationParameters {
    fn default() -> Self {
        Self {
            unit_sale_price: Money(1980.0),
            unit_weight: Grams(300.0),
            supplier_unit_price: SourceMoney(20.0),
            is_electronic: false,
            marketplace_fee: MarketplaceFee::default(),
        }
    }
}

impl CalculationParameters {
    /// Check that the parameters are within their domains.
    ///
    /// The calculation itself is defined for any input; this is only used to catch mistakes in
    /// user-supplied values.
    pub fn validate(&self) -> Result<()> {
        ensure!(
            self.unit_sale_price.is_finite() && self.unit_sale_price >= Money(0.0),
            "unit_sale_price must be a finite number of at least zero"
        );
        ensure!(
            self.unit_weight.is_finite() && self.unit_weight > Grams(0.0),
            "unit_weight must be a finite number greater than zero"
        );
        ensure!(
            self.supplier_unit_price.is_finite() && self.supplier_unit_price >= SourceMoney(0.0),
            "supplier_unit_price must be a finite number of at least zero"
        );
        self.marketplace_fee.validate()?;

        Ok(())
    }
}

fn default_exchange_rate() -> ExchangeRate {
    DEFAULT_EXCHANGE_RATE
}

fn default_min_batch_kg() -> u32 {
    DEFAULT_MIN_BATCH_KG
}

fn default_max_batch_kg() -> u32 {
    DEFAULT_MAX_BATCH_KG
}

/// Constants of the trading route which apply to every product
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, DocumentedFields)]
pub struct CalculatorConfig {
    /// Units of the marketplace's currency per unit of the supplier's currency
    #[serde(default = "default_exchange_rate")]
    pub exchange_rate: ExchangeRate,
    /// Lightest batch weight to evaluate, in kg
    #[serde(default = "default_min_batch_kg")]
    pub min_batch_kg: u32,
    /// Heaviest batch weight to evaluate, in kg
    #[serde(default = "default_max_batch_kg")]
    pub max_batch_kg: u32,
    /// Shipping tariffs for electronic and standard goods
    #[serde(default)]
    pub tariffs: TariffTable,
}

impl Default for CalculatorConfig {
    fn default() -> Self {
        Self {
            exchange_rate: DEFAULT_EXCHANGE_RATE,
            min_batch_kg: DEFAULT_MIN_BATCH_KG,
            max_batch_kg: DEFAULT_MAX_BATCH_KG,
            tariffs: TariffTable::default(),
        }
    }
}

/// Check that a tariff tier is valid
fn check_tariff(tariff: &ShippingTariff, name: &str) -> Result<()> {
    ensure!(
        tariff.base.is_finite() && tariff.base >= SourceMoney(0.0),
        "{name} tariff base must be a finite number of at least zero"
    );
    ensure!(
        tariff.increment_per_kg.is_finite() && tariff.increment_per_kg >= SourceMoney(0.0),
        "{name} tariff increment_per_kg must be a finite number of at least zero"
    );

    Ok(())
}

impl CalculatorConfig {
    /// The batch weights to evaluate, in ascending order
    pub fn batch_weights(&self) -> RangeInclusive<u32> {
        self.min_batch_kg..=self.max_batch_kg
    }

    /// Check that the configuration is valid
    pub fn validate(&self) -> Result<()> {
        ensure!(
            self.exchange_rate.is_finite() && self.exchange_rate > ExchangeRate(0.0),
            "exchange_rate must be a finite number greater than zero"
        );
        ensure!(self.min_batch_kg >= 1, "min_batch_kg must be at least 1");
        ensure!(
            self.min_batch_kg <= self.max_batch_kg,
            "min_batch_kg cannot be greater than max_batch_kg"
        );
        check_tariff(&self.tariffs.electronic, "electronic")?;
        check_tariff(&self.tariffs.standard, "standard")?;

        Ok(())
    }
}

/// Everything needed to run a calculation, as read from a parameters file
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CalculationInput {
    /// Parameters of the product
    #[serde(flatten)]
    pub parameters: CalculationParameters,
    /// Route-wide constants
    #[serde(default)]
    pub config: CalculatorConfig,
}

impl CalculationInput {
    /// Read a parameters file from the specified path.
    ///
    /// Keys missing from the file take their default values.
    ///
    /// # Returns
    ///
    /// The file contents as a [`CalculationInput`] or an error if the file is invalid
    pub fn from_path(file_path: &Path) -> Result<CalculationInput> {
        let input: CalculationInput = read_toml(file_path)?;
        input.validate().with_context(|| input_err_msg(file_path))?;

        Ok(input)
    }

    /// Check that both parameters and configuration are valid
    pub fn validate(&self) -> Result<()> {
        self.parameters.validate()?;
        self.config.validate()
    }

    /// The contents of a parameters file containing the default values
    pub fn default_file_contents() -> String {
        let input = CalculationInput::default();
        let input_raw =
            toml::to_string(&input).expect("Could not convert default parameters to TOML");

        // Annotate top-level keys and those in the config table with their doc comments
        let mut out = PARAMETERS_FILE_HEADER.to_string();
        for line in input_raw.lines() {
            if let Some(last) = line.find('=') {
                let field = line[..last].trim();
                let docs = CalculationParameters::get_field_docs(field)
                    .or_else(|_| CalculatorConfig::get_field_docs(field));
                if let Ok(docs) = docs {
                    for doc_line in docs.split('\n') {
                        write!(&mut out, "\n# {}\n", doc_line.trim()).unwrap();
                    }
                }
            } else if !line.is_empty() {
                out.push('\n');
            }

            writeln!(&mut out, "{line}").unwrap();
        }

        out
    }
}
