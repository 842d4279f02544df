//! Fixtures for tests
use crate::parameters::CalculationParameters;
use rstest::fixture;

/// Assert that an error with the given message occurs
macro_rules! assert_error {
    ($result:expr, $msg:expr) => {
        assert_eq!(
            $result.unwrap_err().chain().next().unwrap().to_string(),
            $msg
        );
    };
}
pub(crate) use assert_error;

/// The parameters the calculator starts with: a 300 g non-electronic product
#[fixture]
pub fn default_params() -> CalculationParameters {
    CalculationParameters::default()
}

/// As [`default_params`], but for an electronic product
#[fixture]
pub fn electronic_params() -> CalculationParameters {
    CalculationParameters {
        is_electronic: true,
        ..Default::default()
    }
}
