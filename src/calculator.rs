//! The batch profit calculation.
//!
//! For each candidate batch weight, work out how many units fit in the batch, spread the cost of
//! shipping the batch evenly across those units and compare the resulting landed cost of one unit
//! with its sale price. The batch weight with the greatest total margin is the optimal one.
use crate::parameters::{CalculationParameters, CalculatorConfig};
use crate::units::{Dimensionless, Grams, Kilograms, Money, SourceMoney};
use serde::Serialize;
use strum::Display;

/// Costs and margins for a batch containing at least one unit
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BatchCosts {
    /// Cost of shipping the whole batch
    pub shipping_cost_total: Money,
    /// Shipping cost borne by each unit in the batch
    pub shipping_cost_per_unit: Money,
    /// Landed cost of one unit: supplier price, shipping share and marketplace fee
    pub cost_per_unit: Money,
    /// Sale price minus landed cost
    pub margin_per_unit: Money,
    /// Margin as a percentage of the sale price (zero if the sale price is zero)
    pub margin_percent: Dimensionless,
    /// Margin across every unit in the batch
    pub total_margin: Money,
}

/// Verdict on a single batch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Serialize)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum BatchStatus {
    /// Each unit sells for more than it costs
    Profitable,
    /// Each unit sells for no more than it costs
    Unprofitable,
    /// Not even one unit fits in the batch
    Infeasible,
}

/// The outcome for one batch weight
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchResult {
    /// Total weight of the batch
    pub total_weight_kg: u32,
    /// Number of units which fit in the batch
    pub unit_count: u32,
    /// Tariff charged for the batch, in the supplier's currency
    pub shipping_cost_source: SourceMoney,
    /// Costs and margins, absent if no units fit
    pub costs: Option<BatchCosts>,
}

impl BatchResult {
    /// Whether at least one unit fits in the batch
    pub fn feasible(&self) -> bool {
        self.unit_count >= 1
    }

    /// Whether the batch is feasible and each unit makes a positive margin
    pub fn profitable(&self) -> bool {
        self.costs
            .is_some_and(|costs| costs.margin_per_unit > Money(0.0))
    }

    /// Classify the batch
    pub fn status(&self) -> BatchStatus {
        if !self.feasible() {
            BatchStatus::Infeasible
        } else if self.profitable() {
            BatchStatus::Profitable
        } else {
            BatchStatus::Unprofitable
        }
    }

    /// The total margin, if the batch is feasible
    pub fn total_margin(&self) -> Option<Money> {
        self.costs.map(|costs| costs.total_margin)
    }
}

/// The result of evaluating every batch weight for a set of parameters
#[derive(Debug, Clone, PartialEq)]
pub struct Evaluation {
    rows: Vec<BatchResult>,
    optimal_idx: Option<usize>,
}

impl Evaluation {
    /// One row per batch weight, in ascending order of weight
    pub fn rows(&self) -> &[BatchResult] {
        &self.rows
    }

    /// The feasible batch with the greatest total margin, if any batch is feasible
    pub fn optimal(&self) -> Option<&BatchResult> {
        self.optimal_idx.map(|idx| &self.rows[idx])
    }

    /// The weight of the optimal batch, for identifying its row
    pub fn optimal_weight_kg(&self) -> Option<u32> {
        self.optimal().map(|row| row.total_weight_kg)
    }

    /// Whether the given row is the optimal one
    pub fn is_optimal(&self, row: &BatchResult) -> bool {
        self.optimal_weight_kg() == Some(row.total_weight_kg)
    }

    /// Consume the evaluation, returning the rows and the optimal row
    pub fn into_parts(self) -> (Vec<BatchResult>, Option<BatchResult>) {
        let optimal = self.optimal_idx.map(|idx| self.rows[idx].clone());
        (self.rows, optimal)
    }
}

/// The number of whole units of the given weight which fit in a batch.
///
/// Non-positive or non-finite unit weights fit zero units. The division is done in grams so that
/// exact multiples (e.g. ten 300 g units in 3 kg) are not lost to rounding.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn units_per_batch(total_weight_kg: u32, unit_weight: Grams) -> u32 {
    if !unit_weight.is_finite() || unit_weight <= Grams(0.0) {
        return 0;
    }

    let batch_weight = Grams::from(Kilograms(total_weight_kg as f64));
    let count = (batch_weight / unit_weight).0.floor();

    // Saturates at u32::MAX for absurdly light units
    count as u32
}

/// Evaluate a single batch weight
fn evaluate_batch(
    total_weight_kg: u32,
    params: &CalculationParameters,
    config: &CalculatorConfig,
    supplier_price: Money,
    fee: Money,
) -> BatchResult {
    let unit_count = units_per_batch(total_weight_kg, params.unit_weight);
    let shipping_cost_source = config
        .tariffs
        .cost(total_weight_kg, params.is_electronic);

    let costs = (unit_count >= 1).then(|| {
        let units = Dimensionless::from(unit_count);
        let shipping_cost_total = shipping_cost_source * config.exchange_rate;
        let shipping_cost_per_unit = shipping_cost_total / units;
        let cost_per_unit = supplier_price + shipping_cost_per_unit + fee;
        let margin_per_unit = params.unit_sale_price - cost_per_unit;
        let margin_percent = if params.unit_sale_price == Money(0.0) {
            Dimensionless(0.0)
        } else {
            (margin_per_unit / params.unit_sale_price) * Dimensionless(100.0)
        };

        BatchCosts {
            shipping_cost_total,
            shipping_cost_per_unit,
            cost_per_unit,
            margin_per_unit,
            margin_percent,
            total_margin: margin_per_unit * units,
        }
    });

    BatchResult {
        total_weight_kg,
        unit_count,
        shipping_cost_source,
        costs,
    }
}

/// Find the index of the feasible row with the greatest total margin.
///
/// Rows are scanned in order and only a strictly greater margin replaces the current best, so on
/// ties the lightest batch wins.
fn find_optimal(rows: &[BatchResult]) -> Option<usize> {
    let mut best: Option<(usize, Money)> = None;
    for (idx, total_margin) in rows
        .iter()
        .enumerate()
        .filter_map(|(idx, row)| row.total_margin().map(|margin| (idx, margin)))
    {
        match best {
            Some((_, best_margin)) if total_margin <= best_margin => {}
            _ => best = Some((idx, total_margin)),
        }
    }

    best.map(|(idx, _)| idx)
}

/// Evaluate every batch weight in the configured range.
///
/// This is a pure function of its arguments: it never fails and never touches global state. Out of
/// range inputs degrade to defined values (e.g. a non-positive unit weight means no batch is
/// feasible) rather than producing errors.
///
/// # Arguments
///
/// * `params` - The product's economic parameters
/// * `config` - Exchange rate, batch weight range and shipping tariffs
///
/// # Returns
///
/// One [`BatchResult`] per batch weight in ascending order, along with the optimal batch.
pub fn evaluate(params: &CalculationParameters, config: &CalculatorConfig) -> Evaluation {
    let supplier_price = params.supplier_unit_price * config.exchange_rate;
    let fee = params.marketplace_fee.resolve(params.unit_sale_price);

    let rows: Vec<_> = config
        .batch_weights()
        .map(|weight_kg| evaluate_batch(weight_kg, params, config, supplier_price, fee))
        .collect();
    let optimal_idx = find_optimal(&rows);

    Evaluation { rows, optimal_idx }
}

/// Evaluate every batch weight using the default configuration
pub fn evaluate_default(params: &CalculationParameters) -> Evaluation {
    evaluate(params, &CalculatorConfig::default())
}
