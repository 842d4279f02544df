//! Plain-text rendering of a calculation for the terminal.
use crate::calculator::{BatchResult, Evaluation};
use crate::output::PLACEHOLDER;
use crate::parameters::{CalculationParameters, CalculatorConfig, MarketplaceFee};
use crate::units::{Kilograms, Money};
use itertools::Itertools;
use std::fmt::Write;

/// Marks the optimal row in the table
const OPTIMAL_MARKER: &str = "*";

const TABLE_HEADER: [&str; 11] = [
    "",
    "kg",
    "units",
    "ship src",
    "ship",
    "ship/unit",
    "cost/unit",
    "margin/unit",
    "margin %",
    "total margin",
    "status",
];

/// Format an amount of money as a whole number, or a placeholder if absent
fn format_money(value: Option<Money>) -> String {
    value.map_or_else(|| PLACEHOLDER.to_string(), |value| format!("{:.0}", value.0))
}

/// Describe the inputs to the calculation
pub fn render_inputs(params: &CalculationParameters, config: &CalculatorConfig) -> String {
    let supplier_price = params.supplier_unit_price * config.exchange_rate;
    let fee = params.marketplace_fee.resolve(params.unit_sale_price);
    let fee_desc = match params.marketplace_fee {
        MarketplaceFee::Fixed(_) => format!("{:.0} (fixed)", fee.0),
        MarketplaceFee::Percentage(percent) => {
            format!("{:.0} ({}% of sale price)", fee.0, percent.0)
        }
    };
    let tariff = config.tariffs.tier(params.is_electronic);

    let mut out = String::new();
    writeln!(out, "Sale price:      {:.0}", params.unit_sale_price.0).unwrap();
    writeln!(out, "Marketplace fee: {fee_desc}").unwrap();
    writeln!(
        out,
        "Supplier price:  {:.2} -> {:.0}",
        params.supplier_unit_price.0, supplier_price.0
    )
    .unwrap();
    writeln!(
        out,
        "Unit weight:     {:.0} g -> {:.3} kg",
        params.unit_weight.0,
        Kilograms::from(params.unit_weight).0
    )
    .unwrap();
    writeln!(
        out,
        "Shipping:        {} ({} + {} per extra kg)",
        if params.is_electronic {
            "electronic"
        } else {
            "standard"
        },
        tariff.base,
        tariff.increment_per_kg
    )
    .unwrap();
    writeln!(out, "Exchange rate:   1 -> {}", config.exchange_rate).unwrap();

    out
}

/// The cells of one table row
fn row_cells(evaluation: &Evaluation, row: &BatchResult) -> Vec<String> {
    let costs = row.costs.as_ref();
    vec![
        if evaluation.is_optimal(row) {
            OPTIMAL_MARKER.to_string()
        } else {
            String::new()
        },
        row.total_weight_kg.to_string(),
        row.unit_count.to_string(),
        row.shipping_cost_source.to_string(),
        format_money(costs.map(|c| c.shipping_cost_total)),
        format_money(costs.map(|c| c.shipping_cost_per_unit)),
        format_money(costs.map(|c| c.cost_per_unit)),
        format_money(costs.map(|c| c.margin_per_unit)),
        costs.map_or_else(
            || PLACEHOLDER.to_string(),
            |c| format!("{:.2}", c.margin_percent.0),
        ),
        format_money(costs.map(|c| c.total_margin)),
        row.status().to_string(),
    ]
}

/// Render the table of batch results with the optimal row marked
pub fn render_table(evaluation: &Evaluation) -> String {
    let header = TABLE_HEADER.iter().map(ToString::to_string).collect_vec();
    let rows = evaluation
        .rows()
        .iter()
        .map(|row| row_cells(evaluation, row))
        .collect_vec();

    // Width of each column is that of its widest cell
    let widths = (0..header.len())
        .map(|col| {
            rows.iter()
                .chain(std::iter::once(&header))
                .map(|cells| cells[col].len())
                .max()
                .unwrap_or(0)
        })
        .collect_vec();

    std::iter::once(&header)
        .chain(&rows)
        .map(|cells| {
            cells
                .iter()
                .zip(&widths)
                .map(|(cell, &width)| format!("{cell:>width$}"))
                .join("  ")
                .trim_end()
                .to_string()
        })
        .join("\n")
}

/// Summarise the optimal batch, or explain that there isn't one
pub fn render_summary(
    evaluation: &Evaluation,
    params: &CalculationParameters,
    config: &CalculatorConfig,
) -> String {
    let Some(optimal) = evaluation.optimal() else {
        return format!(
            "No feasible batch: a {:.0} g unit does not fit in any batch of {} to {} kg.",
            params.unit_weight.0, config.min_batch_kg, config.max_batch_kg
        );
    };

    format!(
        "Optimal batch (greatest total margin): {} kg, {} units, margin per unit {}, total \
         margin {} ({})",
        optimal.total_weight_kg,
        optimal.unit_count,
        format_money(optimal.costs.map(|c| c.margin_per_unit)),
        format_money(optimal.total_margin()),
        optimal.status()
    )
}

/// Render inputs, table and summary together
pub fn render_report(
    evaluation: &Evaluation,
    params: &CalculationParameters,
    config: &CalculatorConfig,
) -> String {
    format!(
        "{}\n{}\n\n{}\n",
        render_inputs(params, config),
        render_table(evaluation),
        render_summary(evaluation, params, config)
    )
}
