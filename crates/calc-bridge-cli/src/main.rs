//! calc-bridge CLI - evaluate CSV models against the remote calc service

use anyhow::{bail, ensure, Context, Result};
use calc_bridge::prelude::*;
use calc_bridge::{reference_hints, ConfigLayer, CsvReadOptions, CsvWriteOptions};
use clap::{Args, Parser, Subcommand};
use std::io;
use std::path::{Path, PathBuf};
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "calc-bridge")]
#[command(
    author,
    version,
    about = "Evaluate spreadsheet formulas on a remote calculation service"
)]
struct Cli {
    /// TOML config file with calc_url, batch_url and timeout_secs
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Base URL of the single-operation service
    #[arg(long, global = true)]
    calc_url: Option<String>,

    /// Base URL of the whole-sheet service
    #[arg(long, global = true)]
    batch_url: Option<String>,

    /// Request timeout in seconds
    #[arg(long, global = true)]
    timeout: Option<u64>,

    /// Log debug output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Evaluate a whole CSV model and write the results sheet
    Compute {
        #[command(flatten)]
        input: SheetInput,

        /// Output CSV file for the results (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Turn live formulas into inert formula text
    Freeze {
        #[command(flatten)]
        input: SheetInput,

        /// Only convert cells in this range (e.g. B2:D10)
        #[arg(short, long)]
        range: Option<String>,

        /// Output CSV file (default: rewrite the input)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Turn frozen formula text back into live formulas
    Unfreeze {
        #[command(flatten)]
        input: SheetInput,

        /// Only convert cells in this range (e.g. B2:D10)
        #[arg(short, long)]
        range: Option<String>,

        /// Output CSV file (default: rewrite the input)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Run one operation on the calc service
    Calc {
        /// Operation name (e.g. plus, sum)
        operation: String,

        /// Arguments; numbers and TRUE/FALSE are typed, anything else is text
        args: Vec<String>,
    },

    /// List the operations a service supports
    Operations {
        /// Ask the whole-sheet service instead of the calc service
        #[arg(long)]
        batch: bool,
    },

    /// Check that both services answer
    Health,

    /// Print the reference hints of a formula
    Refs {
        /// Formula text, e.g. '=CLOUD_BATCH_CALC("sum",A1:B2,C3,ROW(),COLUMN())'
        formula: String,
    },
}

#[derive(Args)]
struct SheetInput {
    /// Input CSV file (`=` fields are live formulas, `'=` fields frozen text)
    input: PathBuf,

    /// Sheet name given to the CSV contents
    #[arg(short, long, default_value = "Model")]
    sheet: String,

    /// Field delimiter (default: comma)
    #[arg(short, long, default_value = ",")]
    delimiter: char,
}

impl SheetInput {
    fn delimiter(&self) -> Result<u8> {
        ensure!(
            self.delimiter.is_ascii(),
            "delimiter must be an ASCII character"
        );
        Ok(self.delimiter as u8)
    }

    fn load(&self) -> Result<Workbook> {
        let options = CsvReadOptions {
            sheet_name: self.sheet.clone(),
            delimiter: self.delimiter()?,
            ..Default::default()
        };
        let sheet = CsvReader::read_file(&self.input, &options)
            .with_context(|| format!("Failed to read '{}'", self.input.display()))?;

        let mut workbook = Workbook::empty();
        workbook
            .add_existing_worksheet(sheet)
            .with_context(|| format!("Invalid sheet name '{}'", self.sheet))?;
        Ok(workbook)
    }

    fn write_options(&self) -> Result<CsvWriteOptions> {
        Ok(CsvWriteOptions {
            delimiter: self.delimiter()?,
            ..Default::default()
        })
    }
}

/// Alerts and toasts on stderr
struct TerminalUi;

impl HostUi for TerminalUi {
    fn alert(&mut self, title: &str, message: &str) {
        eprintln!("{}: error: {}", title, message);
    }

    fn toast(&mut self, title: &str, message: &str) {
        eprintln!("{}: {}", title, message);
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match &cli.command {
        Commands::Compute { input, output } => compute(&cli, input, output.as_deref()),
        Commands::Freeze {
            input,
            range,
            output,
        } => convert(input, range.as_deref(), output.as_deref(), true),
        Commands::Unfreeze {
            input,
            range,
            output,
        } => convert(input, range.as_deref(), output.as_deref(), false),
        Commands::Calc { operation, args } => calc(&cli, operation, args),
        Commands::Operations { batch } => operations(&cli, *batch),
        Commands::Health => health(&cli),
        Commands::Refs { formula } => refs(formula),
    }
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)))
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

fn bridge(cli: &Cli) -> Result<CalcBridge> {
    let overrides = ConfigLayer {
        calc_url: cli.calc_url.clone(),
        batch_url: cli.batch_url.clone(),
        timeout_secs: cli.timeout,
    };
    let config =
        BridgeConfig::load(cli.config.as_deref(), overrides).context("Invalid configuration")?;
    debug!(?config, "configuration loaded");
    CalcBridge::new(config).context("Failed to create HTTP client")
}

fn compute(cli: &Cli, input: &SheetInput, output: Option<&Path>) -> Result<()> {
    let mut workbook = input.load()?;
    let bridge = bridge(cli)?;

    let selection = Selection {
        sheet: input.sheet.clone(),
        range: CellRange::single(CellAddress::new(0, 0)),
    };
    let Some(CommandOutcome::Computed(report)) = bridge.execute(
        MenuCommand::ComputeAll,
        &mut workbook,
        &mut TerminalUi,
        &selection,
    ) else {
        bail!("Compute failed for '{}'", input.input.display());
    };

    let results = workbook
        .worksheet_by_name(&report.target)
        .with_context(|| format!("Results sheet '{}' missing", report.target))?;
    write_sheet(results, output, &input.write_options()?)
}

fn convert(input: &SheetInput, range: Option<&str>, output: Option<&Path>, freeze: bool) -> Result<()> {
    let mut workbook = input.load()?;
    let sheet = input.sheet.as_str();

    let report = match range {
        Some(range) => {
            let range = CellRange::parse(range).with_context(|| format!("Invalid range '{}'", range))?;
            if freeze {
                freeze_range(&mut workbook, sheet, &range)?
            } else {
                unfreeze_range(&mut workbook, sheet, &range)?
            }
        }
        None if freeze => freeze_all(&mut workbook, sheet)?,
        None => unfreeze_all(&mut workbook, sheet)?,
    };
    let outcome = if freeze {
        CommandOutcome::Frozen(report)
    } else {
        CommandOutcome::Unfrozen(report)
    };
    eprintln!("{}", outcome);

    let worksheet = workbook
        .worksheet_by_name(sheet)
        .with_context(|| format!("Sheet '{}' missing", sheet))?;
    let target = output.unwrap_or(input.input.as_path());
    write_sheet(worksheet, Some(target), &input.write_options()?)
}

fn write_sheet(sheet: &Worksheet, output: Option<&Path>, options: &CsvWriteOptions) -> Result<()> {
    match output {
        Some(path) => {
            CsvWriter::write_file(sheet, path, options)
                .with_context(|| format!("Failed to write '{}'", path.display()))?;
            eprintln!("Wrote '{}' to '{}'", sheet.name(), path.display());
        }
        None => {
            CsvWriter::write(sheet, io::stdout().lock(), options).context("Failed to write to stdout")?;
        }
    }
    Ok(())
}

fn calc(cli: &Cli, operation: &str, args: &[String]) -> Result<()> {
    let bridge = bridge(cli)?;
    let args: Vec<FunctionArg> = args.iter().map(|a| FunctionArg::from(parse_arg(a))).collect();

    let output = bridge.cloud_calc(&CellValue::string(operation), &args);
    if output.is_error() {
        bail!("{}", output);
    }
    println!("{}", output);
    Ok(())
}

/// Type a command-line argument the way a cell would hold it
fn parse_arg(text: &str) -> CellValue {
    if let Ok(n) = text.parse::<f64>() {
        if n.is_finite() {
            return CellValue::Number(n);
        }
    }
    match text.to_ascii_uppercase().as_str() {
        "TRUE" => CellValue::Boolean(true),
        "FALSE" => CellValue::Boolean(false),
        _ => CellValue::string(text),
    }
}

fn operations(cli: &Cli, batch: bool) -> Result<()> {
    let endpoint = if batch { Endpoint::Batch } else { Endpoint::Calc };
    let operations = bridge(cli)?
        .dispatcher()
        .operations(endpoint)
        .context("Failed to list operations")?;
    for op in operations {
        println!("{}", op);
    }
    Ok(())
}

fn health(cli: &Cli) -> Result<()> {
    let bridge = bridge(cli)?;
    let mut healthy = true;

    for (label, endpoint) in [("calc", Endpoint::Calc), ("batch", Endpoint::Batch)] {
        let url = bridge.config().base_url(endpoint);
        match bridge.dispatcher().health(endpoint) {
            Ok(health) => match health.mode {
                Some(mode) => println!("{:<6} {}  {} ({})", label, url, health.status, mode),
                None => println!("{:<6} {}  {}", label, url, health.status),
            },
            Err(e) => {
                healthy = false;
                println!("{:<6} {}  unreachable: {}", label, url, e);
            }
        }
    }

    ensure!(healthy, "Service check failed");
    Ok(())
}

fn refs(formula: &str) -> Result<()> {
    let hints = reference_hints(formula);
    if hints.is_empty() {
        eprintln!("No cell references found");
    }
    for hint in hints {
        println!("{}", hint);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_arg() {
        assert_eq!(parse_arg("2"), CellValue::Number(2.0));
        assert_eq!(parse_arg("-1.5"), CellValue::Number(-1.5));
        assert_eq!(parse_arg("true"), CellValue::Boolean(true));
        assert_eq!(parse_arg("NaN"), CellValue::string("NaN"));
        assert_eq!(parse_arg("hello"), CellValue::string("hello"));
    }

    #[test]
    fn test_cli_parses() {
        let cli = Cli::try_parse_from([
            "calc-bridge",
            "--calc-url",
            "http://localhost:8080",
            "freeze",
            "model.csv",
            "--range",
            "B1:B9",
        ])
        .unwrap();
        assert_eq!(cli.calc_url.as_deref(), Some("http://localhost:8080"));
        assert!(matches!(cli.command, Commands::Freeze { range: Some(ref r), .. } if r == "B1:B9"));
    }

    #[test]
    fn test_cli_definition() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
