//! The module responsible for writing calculation results to disk.
use crate::calculator::{BatchCosts, BatchResult, BatchStatus, Evaluation};
use crate::units::Money;
use anyhow::{Context, Result, ensure};
use serde::{Serialize, Serializer};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// The output file name for the table of batch results
pub const BATCH_MARGINS_FILE_NAME: &str = "batch_margins.csv";

/// Written in place of values which don't apply to a batch (e.g. margins when no units fit)
pub const PLACEHOLDER: &str = "-";

/// Create the output directory (and its parents) if it doesn't already exist
pub fn create_output_directory(output_dir: &Path) -> Result<()> {
    if output_dir.is_dir() {
        // already exists
        return Ok(());
    }

    fs::create_dir_all(output_dir)?;

    Ok(())
}

/// Get the path of the results file in the given output directory
pub fn get_output_file_path(output_dir: &Path) -> PathBuf {
    output_dir.join(BATCH_MARGINS_FILE_NAME)
}

/// Check that the results file can be written to the output directory.
///
/// An existing results file is only replaced if `overwrite` is set.
pub fn check_output_file(output_dir: &Path, overwrite: bool) -> Result<()> {
    let file_path = get_output_file_path(output_dir);
    ensure!(
        overwrite || !file_path.exists(),
        "Output file {} already exists. Use --overwrite to replace it.",
        file_path.display()
    );

    Ok(())
}

/// Write an optional value, using [`PLACEHOLDER`] if it is absent
#[allow(clippy::ref_option)]
fn serialise_or_placeholder<S>(value: &Option<f64>, serialiser: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    match value {
        Some(value) => serialiser.serialize_f64(*value),
        None => serialiser.serialize_str(PLACEHOLDER),
    }
}

/// Represents a row in the batch margins CSV file.
///
/// Amounts of money are rounded to whole units and percentages to two decimal places.
#[derive(Serialize, Debug, PartialEq)]
struct BatchRow {
    total_weight_kg: u32,
    unit_count: u32,
    shipping_cost_source: f64,
    #[serde(serialize_with = "serialise_or_placeholder")]
    shipping_cost_total: Option<f64>,
    #[serde(serialize_with = "serialise_or_placeholder")]
    shipping_cost_per_unit: Option<f64>,
    #[serde(serialize_with = "serialise_or_placeholder")]
    cost_per_unit: Option<f64>,
    #[serde(serialize_with = "serialise_or_placeholder")]
    margin_per_unit: Option<f64>,
    #[serde(serialize_with = "serialise_or_placeholder")]
    margin_percent: Option<f64>,
    #[serde(serialize_with = "serialise_or_placeholder")]
    total_margin: Option<f64>,
    status: BatchStatus,
    optimal: bool,
}

impl BatchRow {
    /// Create a new [`BatchRow`]
    fn new(result: &BatchResult, optimal: bool) -> Self {
        let money = |f: fn(&BatchCosts) -> Money| {
            result.costs.as_ref().map(|costs| f(costs).round_to(0).value())
        };

        Self {
            total_weight_kg: result.total_weight_kg,
            unit_count: result.unit_count,
            shipping_cost_source: result.shipping_cost_source.value(),
            shipping_cost_total: money(|costs| costs.shipping_cost_total),
            shipping_cost_per_unit: money(|costs| costs.shipping_cost_per_unit),
            cost_per_unit: money(|costs| costs.cost_per_unit),
            margin_per_unit: money(|costs| costs.margin_per_unit),
            margin_percent: result
                .costs
                .as_ref()
                .map(|costs| (costs.margin_percent.0 * 100.0).round() / 100.0),
            total_margin: money(|costs| costs.total_margin),
            status: result.status(),
            optimal,
        }
    }
}

/// Write the table of batch results as CSV to the given writer
pub fn write_batch_results_to<W: io::Write>(writer: W, evaluation: &Evaluation) -> Result<()> {
    let mut writer = csv::Writer::from_writer(writer);
    for result in evaluation.rows() {
        writer.serialize(BatchRow::new(result, evaluation.is_optimal(result)))?;
    }
    writer.flush()?;

    Ok(())
}

/// Write the table of batch results to a CSV file in the output directory.
///
/// The file is written to a temporary location first, so an existing file is never left half
/// written.
///
/// # Arguments
///
/// * `output_dir` - Folder where the file will be saved
/// * `evaluation` - The results to write
/// * `overwrite` - Whether to replace an existing results file
///
/// # Returns
///
/// The path to the file written
pub fn write_batch_results(
    output_dir: &Path,
    evaluation: &Evaluation,
    overwrite: bool,
) -> Result<PathBuf> {
    check_output_file(output_dir, overwrite)?;
    let file_path = get_output_file_path(output_dir);

    let mut temp_file = NamedTempFile::new_in(output_dir)
        .with_context(|| format!("Could not create file in {}", output_dir.display()))?;
    write_batch_results_to(temp_file.as_file_mut(), evaluation)?;
    temp_file
        .persist(&file_path)
        .with_context(|| format!("Could not write {}", file_path.display()))?;

    Ok(file_path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calculator::evaluate_default;
    use crate::fixture::default_params;
    use crate::parameters::CalculationParameters;
    use crate::units::Grams;
    use rstest::rstest;
    use tempfile::tempdir;

    fn read_records(file_path: &Path) -> Vec<csv::StringRecord> {
        let mut reader = csv::Reader::from_path(file_path).unwrap();
        reader.records().map(Result::unwrap).collect()
    }

    #[rstest]
    fn test_batch_row_feasible(default_params: CalculationParameters) {
        let evaluation = evaluate_default(&default_params);
        let row = BatchRow::new(&evaluation.rows()[0], false);
        assert_eq!(
            row,
            BatchRow {
                total_weight_kg: 1,
                unit_count: 3,
                shipping_cost_source: 75.0,
                shipping_cost_total: Some(1661.0),
                shipping_cost_per_unit: Some(554.0),
                cost_per_unit: Some(1297.0),
                margin_per_unit: Some(683.0),
                margin_percent: Some(34.51),
                total_margin: Some(2050.0),
                status: BatchStatus::Profitable,
                optimal: false,
            }
        );
    }

    #[test]
    fn test_batch_row_infeasible() {
        let params = CalculationParameters {
            unit_weight: Grams(5000.0),
            ..Default::default()
        };
        let evaluation = evaluate_default(&params);
        let row = BatchRow::new(&evaluation.rows()[0], false);
        assert_eq!(row.unit_count, 0);
        assert_eq!(row.total_margin, None);
        assert_eq!(row.status, BatchStatus::Infeasible);
    }

    #[rstest]
    fn test_write_batch_results(default_params: CalculationParameters) {
        let dir = tempdir().unwrap();
        let evaluation = evaluate_default(&default_params);
        let file_path = write_batch_results(dir.path(), &evaluation, false).unwrap();
        assert_eq!(file_path, dir.path().join(BATCH_MARGINS_FILE_NAME));

        let mut reader = csv::Reader::from_path(&file_path).unwrap();
        assert_eq!(
            reader.headers().unwrap().iter().collect::<Vec<_>>(),
            vec![
                "total_weight_kg",
                "unit_count",
                "shipping_cost_source",
                "shipping_cost_total",
                "shipping_cost_per_unit",
                "cost_per_unit",
                "margin_per_unit",
                "margin_percent",
                "total_margin",
                "status",
                "optimal",
            ]
        );

        let records = read_records(&file_path);
        assert_eq!(records.len(), 20);
        assert_eq!(&records[0][0], "1");
        assert_eq!(&records[0][1], "3");
        assert_eq!(&records[0][9], "profitable");
        assert_eq!(&records[0][10], "false");
        assert_eq!(&records[19][0], "20");
        assert_eq!(&records[19][10], "true");
    }

    #[test]
    fn test_write_batch_results_placeholder() {
        let dir = tempdir().unwrap();
        let params = CalculationParameters {
            unit_weight: Grams(25000.0),
            ..Default::default()
        };
        let evaluation = evaluate_default(&params);
        let file_path = write_batch_results(dir.path(), &evaluation, false).unwrap();

        for record in read_records(&file_path) {
            assert_eq!(&record[1], "0");
            for field in 3..=8 {
                assert_eq!(&record[field], PLACEHOLDER);
            }
            assert_eq!(&record[9], "infeasible");
            assert_eq!(&record[10], "false");
        }
    }

    #[rstest]
    fn test_write_batch_results_overwrite(default_params: CalculationParameters) {
        let dir = tempdir().unwrap();
        let evaluation = evaluate_default(&default_params);
        write_batch_results(dir.path(), &evaluation, false).unwrap();

        // Refuses to replace the existing file unless asked to
        assert!(write_batch_results(dir.path(), &evaluation, false).is_err());
        assert!(write_batch_results(dir.path(), &evaluation, true).is_ok());
    }

    #[test]
    fn test_check_output_file() {
        let dir = tempdir().unwrap();
        check_output_file(dir.path(), false).unwrap();

        fs::write(get_output_file_path(dir.path()), "old results").unwrap();
        assert!(check_output_file(dir.path(), false).is_err());
        check_output_file(dir.path(), true).unwrap();
    }

    #[test]
    fn test_create_output_directory() {
        let dir = tempdir().unwrap();
        let output_dir = dir.path().join("a").join("b");
        create_output_directory(&output_dir).unwrap();
        assert!(output_dir.is_dir());

        // Existing directory is fine
        create_output_directory(&output_dir).unwrap();
    }
}
