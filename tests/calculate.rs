//! Integration tests for the `calculate` command.
use batchmargin::cli::{CalculateOpts, ParameterArgs, handle_calculate_command};
use batchmargin::log::{LOG_INFO_FILE_NAME, LOG_LEVEL_ENV_VAR, is_logger_initialised};
use batchmargin::output::BATCH_MARGINS_FILE_NAME;
use batchmargin::settings::Settings;
use std::fs;
use tempfile::tempdir;

/// An integration test for the `calculate` command.
///
/// Runs with a parameters file, exports the results, then checks that a second export only
/// replaces the file when asked to.
#[test]
fn test_handle_calculate_command() {
    unsafe { std::env::set_var(LOG_LEVEL_ENV_VAR, "off") };

    let tempdir = tempdir().unwrap();
    let params_file = tempdir.path().join("parameters.toml");
    fs::write(
        &params_file,
        "unit_sale_price = 1980
unit_weight = 300
supplier_unit_price = 20
marketplace_fee = { fixed = 300 }
",
    )
    .unwrap();

    // Save results to non-existent directory to check that directory creation works
    let output_dir = tempdir.path().join("results");
    let opts = CalculateOpts {
        output_dir: Some(output_dir.clone()),
        overwrite: false,
    };

    assert!(!is_logger_initialised());
    let evaluation = handle_calculate_command(
        Some(params_file.as_path()),
        &ParameterArgs::default(),
        &opts,
        Some(Settings::default()),
    )
    .unwrap();
    assert!(is_logger_initialised());

    assert_eq!(evaluation.rows().len(), 20);
    assert_eq!(evaluation.optimal_weight_kg(), Some(20));

    let file_path = output_dir.join(BATCH_MARGINS_FILE_NAME);
    let contents = fs::read_to_string(&file_path).unwrap();
    assert_eq!(contents.lines().count(), 21);
    assert!(contents.starts_with("total_weight_kg,unit_count,"));
    assert!(output_dir.join("batchmargin_info.log").is_file());

    // Second time refuses to replace the results file
    let err = handle_calculate_command(
        Some(params_file.as_path()),
        &ParameterArgs::default(),
        &opts,
        Some(Settings::default()),
    )
    .unwrap_err();
    assert!(err.to_string().contains("already exists"));

    // With overwrite enabled it gets further, but fails because the logging is already initialised
    let opts = CalculateOpts {
        output_dir: Some(output_dir.clone()),
        overwrite: true,
    };
    assert_eq!(
        handle_calculate_command(
            Some(params_file.as_path()),
            &ParameterArgs::default(),
            &opts,
            Some(Settings::default()),
        )
        .unwrap_err()
        .chain()
        .next()
        .unwrap()
        .to_string(),
        "Failed to initialise logging."
    );
}

/// A run which won't replace existing results must leave that directory's logs alone
#[test]
fn test_calculate_refuses_existing_results_keeps_logs() {
    let tempdir = tempdir().unwrap();
    let output_dir = tempdir.path();
    let results_path = output_dir.join(BATCH_MARGINS_FILE_NAME);
    let log_path = output_dir.join(LOG_INFO_FILE_NAME);
    fs::write(&results_path, "previous results\n").unwrap();
    fs::write(&log_path, "previous run's log\n").unwrap();

    let opts = CalculateOpts {
        output_dir: Some(output_dir.to_path_buf()),
        overwrite: false,
    };
    let err = handle_calculate_command(
        None,
        &ParameterArgs::default(),
        &opts,
        Some(Settings::default()),
    )
    .unwrap_err();
    assert!(err.to_string().contains("already exists"));

    assert_eq!(
        fs::read_to_string(&log_path).unwrap(),
        "previous run's log\n"
    );
    assert_eq!(
        fs::read_to_string(&results_path).unwrap(),
        "previous results\n"
    );
}
