//! The command line interface for the calculator.
use crate::calculator::{Evaluation, evaluate};
use crate::log;
use crate::output::{check_output_file, create_output_directory, write_batch_results};
use crate::parameters::{CalculationInput, CalculationParameters, MarketplaceFee};
use crate::report::render_report;
use crate::settings::Settings;
use crate::units::{Dimensionless, Grams, Money, SourceMoney};
use ::log::{info, warn};
use anyhow::{Context, Result};
use clap::{Args, CommandFactory, Parser, Subcommand};
use std::path::{Path, PathBuf};

pub mod settings;
use settings::SettingsSubcommands;

/// The command line interface for the calculator.
#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// The available commands.
    #[command(subcommand)]
    command: Option<Commands>,
    /// Flag to provide the CLI docs as markdown
    #[arg(long, hide = true)]
    markdown_help: bool,
}

/// Values which override those in the defaults or the parameters file
#[derive(Args, Default)]
pub struct ParameterArgs {
    /// Sale price of one unit on the marketplace
    #[arg(long)]
    pub sale_price: Option<f64>,
    /// Mass of one unit in grams
    #[arg(long, value_name = "GRAMS")]
    pub unit_weight: Option<f64>,
    /// Fixed marketplace fee per unit sold
    #[arg(long, conflicts_with = "fee_percent")]
    pub fee: Option<f64>,
    /// Marketplace fee as a percentage (0-100) of the sale price
    #[arg(long, value_name = "PERCENT")]
    pub fee_percent: Option<f64>,
    /// Price of one unit from the supplier, in the supplier's currency
    #[arg(long)]
    pub supplier_price: Option<f64>,
    /// Ship using the tariff for electronic goods
    #[arg(long)]
    pub electronic: bool,
    /// Ship using the tariff for non-electronic goods
    #[arg(long, conflicts_with = "electronic")]
    pub standard: bool,
}

impl ParameterArgs {
    /// Apply any values given on the command line to the parameters
    pub fn apply(&self, params: &mut CalculationParameters) {
        if let Some(price) = self.sale_price {
            params.unit_sale_price = Money(price);
        }
        if let Some(weight) = self.unit_weight {
            params.unit_weight = Grams(weight);
        }
        if let Some(fee) = self.fee {
            params.marketplace_fee = MarketplaceFee::Fixed(Money(fee));
        }
        if let Some(percent) = self.fee_percent {
            params.marketplace_fee = MarketplaceFee::Percentage(Dimensionless(percent));
        }
        if let Some(price) = self.supplier_price {
            params.supplier_unit_price = SourceMoney(price);
        }
        if self.electronic {
            params.is_electronic = true;
        }
        if self.standard {
            params.is_electronic = false;
        }
    }
}

/// Options for the calculate command
#[derive(Args, Default)]
pub struct CalculateOpts {
    /// Directory to export the results table to as CSV
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,
    /// Whether to overwrite an existing results file
    #[arg(long)]
    pub overwrite: bool,
}

/// The available commands.
#[derive(Subcommand)]
enum Commands {
    /// Calculate margins for every batch weight and find the best one.
    Calculate {
        /// Path to a parameters file. Defaults are used for anything it doesn't set.
        params_file: Option<PathBuf>,
        /// Parameter values
        #[command(flatten)]
        params: ParameterArgs,
        /// Other calculate options
        #[command(flatten)]
        opts: CalculateOpts,
    },
    /// Write a parameters file containing the default values to the console.
    Template,
    /// Manage program settings.
    Settings {
        /// The subcommands for managing settings.
        #[command(subcommand)]
        subcommand: SettingsSubcommands,
    },
}

impl Commands {
    /// Execute the supplied CLI command
    fn execute(self) -> Result<()> {
        match self {
            Self::Calculate {
                params_file,
                params,
                opts,
            } => handle_calculate_command(params_file.as_deref(), &params, &opts, None)
                .map(|_| ()),
            Self::Template => {
                handle_template_command();
                Ok(())
            }
            Self::Settings { subcommand } => subcommand.execute(),
        }
    }
}

/// Parse CLI arguments and start the calculator
pub fn run_cli() -> Result<()> {
    let cli = Cli::parse();

    // Invoked as: `$ batchmargin --markdown-help`
    if cli.markdown_help {
        clap_markdown::print_help_markdown::<Cli>();
        return Ok(());
    }

    let Some(command) = cli.command else {
        // Output program help
        let help_str = Cli::command().render_long_help().to_string();
        println!("{help_str}");
        return Ok(());
    };

    command.execute()
}

/// Assemble the inputs from defaults, an optional parameters file and command-line overrides
pub fn load_input(
    params_file: Option<&Path>,
    overrides: &ParameterArgs,
) -> Result<CalculationInput> {
    let mut input = if let Some(file_path) = params_file {
        let input = CalculationInput::from_path(file_path)?;
        info!("Loaded parameters from {}", file_path.display());
        input
    } else {
        CalculationInput::default()
    };

    overrides.apply(&mut input.parameters);
    input.validate().context("Invalid parameters.")?;

    Ok(input)
}

/// Handle the `calculate` command.
///
/// Prints a report of the results and, if an output directory is given, exports the results
/// table to it.
pub fn handle_calculate_command(
    params_file: Option<&Path>,
    overrides: &ParameterArgs,
    opts: &CalculateOpts,
    settings: Option<Settings>,
) -> Result<Evaluation> {
    // Load program settings, if not provided
    let settings = if let Some(settings) = settings {
        settings
    } else {
        Settings::load().context("Failed to load settings.")?
    };

    // Refuse to touch the output directory (including its log files) if the results can't be
    // written there
    let overwrite = opts.overwrite || settings.overwrite;
    if let Some(output_dir) = opts.output_dir.as_deref() {
        create_output_directory(output_dir).with_context(|| {
            format!(
                "Failed to create output directory: {}",
                output_dir.display()
            )
        })?;
        check_output_file(output_dir, overwrite)?;
    }

    // Initialise program logger
    log::init(&settings.log_level, opts.output_dir.as_deref())
        .context("Failed to initialise logging.")?;

    let input = load_input(params_file, overrides).context("Failed to load parameters.")?;
    let evaluation = evaluate(&input.parameters, &input.config);
    print!(
        "{}",
        render_report(&evaluation, &input.parameters, &input.config)
    );

    match evaluation.optimal() {
        Some(optimal) => info!("Optimal batch weight: {} kg", optimal.total_weight_kg),
        None => warn!("No batch weight can hold a single unit"),
    }

    if let Some(output_dir) = opts.output_dir.as_deref() {
        let file_path = write_batch_results(output_dir, &evaluation, overwrite)
            .context("Failed to write results.")?;
        info!("Results written to {}", file_path.display());
    }

    Ok(evaluation)
}

/// Handle the `template` command.
fn handle_template_command() {
    print!("{}", CalculationInput::default_file_contents());
}
