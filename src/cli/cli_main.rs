use crate::Microkinetics::coverage::CoverageTable;
use crate::Microkinetics::deck_model::parse_table;
use crate::Microkinetics::deck_writer::InputDeckWriter;
use crate::Microkinetics::errors::DeckError;
use crate::Microkinetics::number_format::Numeric;
use crate::Microkinetics::sweep::{DEFAULT_SWEEP_ROOT, SweepOrchestrator};
use crate::Utils::load_from_file::{create_template, load_tables_from_file};
use crate::settings::{DEFAULT_SETTINGS_FILE, RunSettings};
use clap::{Args, Parser, Subcommand};
use log::info;
use std::path::{Path, PathBuf};

pub const DEFAULT_SINGLE_RUN_DIR: &str = "single_run";

#[derive(Parser, Debug)]
#[command(
    name = "mkm_deck",
    about = "Generates MKMCXX input decks from reaction network tables, for one environment or a sweep over pH and potential.",
    version,
    arg_required_else_help = true
)]
pub struct Cli {
    /// Run settings (JSON). Defaults are used when the file does not exist.
    #[arg(long, value_name = "FILE", global = true, default_value = DEFAULT_SETTINGS_FILE)]
    pub settings: PathBuf,
    /// off, error, warn, info, debug or trace
    #[arg(long = "log-level", global = true, default_value = "info")]
    pub log_level: String,
    /// Also write the log to this file.
    #[arg(long = "log-file", value_name = "FILE", global = true)]
    pub log_file: Option<PathBuf>,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Write one deck for the environment given in the task file.
    Single(SingleArgs),
    /// Write one deck per (pH, potential) grid point.
    Sweep(SweepArgs),
    /// Write an example task file.
    Template {
        #[arg(short, long, value_name = "FILE", default_value = "template.txt")]
        output: PathBuf,
    },
    /// Show the final surface coverages from a solver coverage.dat file.
    Coverage {
        #[arg(short, long, value_name = "FILE")]
        file: PathBuf,
    },
}

/// Per-invocation overrides of the run settings.
#[derive(Args, Debug, Clone, Default)]
pub struct SettingsOverrides {
    /// Temperature, K
    #[arg(long)]
    pub temperature: Option<f64>,
    /// Integration time, s
    #[arg(long = "run-time")]
    pub run_time: Option<f64>,
}

impl SettingsOverrides {
    pub fn apply(&self, settings: &mut RunSettings) {
        if let Some(t) = self.temperature {
            settings.temperature = Numeric::Float(t);
        }
        if let Some(time) = self.run_time {
            settings.run_time = time;
        }
    }
}

#[derive(Args, Debug)]
pub struct SingleArgs {
    /// Task file with the REACTIONS, LOCAL_ENVIRONMENT and INPUT_OUTPUT_SPECIES sections
    #[arg(short, long, value_name = "FILE")]
    pub input: PathBuf,
    #[arg(long = "output-dir", value_name = "DIR", default_value = DEFAULT_SINGLE_RUN_DIR)]
    pub output_dir: PathBuf,
    /// Print the species and reaction tables of the deck.
    #[arg(long)]
    pub show: bool,
    #[command(flatten)]
    pub overrides: SettingsOverrides,
}

#[derive(Args, Debug)]
pub struct SweepArgs {
    #[arg(short, long, value_name = "FILE")]
    pub input: PathBuf,
    /// pH values, space or comma separated
    #[arg(long, num_args = 1.., value_delimiter = ',', required = true, allow_negative_numbers = true)]
    pub ph: Vec<f64>,
    /// Potentials in V, space or comma separated
    #[arg(long, num_args = 1.., value_delimiter = ',', required = true, allow_negative_numbers = true)]
    pub potential: Vec<f64>,
    #[arg(long, value_name = "DIR", default_value = DEFAULT_SWEEP_ROOT)]
    pub root: PathBuf,
    /// Worker threads, overrides the settings file
    #[arg(long)]
    pub workers: Option<usize>,
    #[command(flatten)]
    pub overrides: SettingsOverrides,
}

fn load_settings(path: &Path, overrides: &SettingsOverrides) -> Result<RunSettings, DeckError> {
    let mut settings = RunSettings::load(path)?;
    overrides.apply(&mut settings);
    settings.validate()?;
    Ok(settings)
}

fn input_name(path: &Path) -> Result<&str, DeckError> {
    path.to_str()
        .ok_or_else(|| DeckError::Config(format!("input path {} is not UTF-8", path.display())))
}

/// Writes the deck and returns its path.
pub fn run_single(settings_path: &Path, args: &SingleArgs) -> Result<PathBuf, DeckError> {
    let settings = load_settings(settings_path, &args.overrides)?;
    let tables = load_tables_from_file(input_name(&args.input)?)?;
    let model = parse_table(&tables, &settings)?;
    if args.show {
        model.pretty_print();
    }
    let path = args.output_dir.join(&settings.deck_file_name);
    InputDeckWriter::new().write_atomically(&model, &path)?;
    Ok(path)
}

/// Returns true when every grid point got its deck.
pub fn run_sweep(settings_path: &Path, args: &SweepArgs) -> Result<bool, DeckError> {
    let mut settings = load_settings(settings_path, &args.overrides)?;
    if args.workers.is_some() {
        settings.workers = args.workers;
        settings.validate()?;
    }
    let tables = load_tables_from_file(input_name(&args.input)?)?;
    let sweep = SweepOrchestrator::new(tables, settings, &args.root);
    let report = sweep.run(&args.ph, &args.potential)?;
    report.print_summary();
    Ok(report.all_succeeded())
}

/// Dispatches a parsed command line. `Ok(false)` means the command ran but some of its work
/// failed (sweep points), which the binary turns into a non-zero exit status.
pub fn run(cli: &Cli) -> Result<bool, DeckError> {
    match &cli.command {
        Command::Single(args) => {
            let path = run_single(&cli.settings, args)?;
            println!("Input file successfully created at {}", path.display());
            Ok(true)
        }
        Command::Sweep(args) => run_sweep(&cli.settings, args),
        Command::Template { output } => {
            create_template(output)?;
            println!("Template generated at {}", output.display());
            Ok(true)
        }
        Command::Coverage { file } => {
            let table = CoverageTable::from_file(file)?;
            info!("{} time steps read", table.rows.len());
            table.pretty_print();
            Ok(true)
        }
    }
}
