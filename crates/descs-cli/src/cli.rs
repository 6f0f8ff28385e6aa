use clap::{Args, Parser, Subcommand};
use descs::core::models::residue::MoleculeType;
use std::path::PathBuf;

const HELP_TEMPLATE: &str = "\
{before-help}{name} {version}
{author-with-newline}{about-with-newline}
{usage-heading} {usage}

{all-args}{after-help}
";

#[derive(Parser, Debug)]
#[command(
    version,
    about = "descs - build contact-based structural descriptors of proteins and nucleic acids and compare them.",
    help_template = HELP_TEMPLATE,
)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity level (-v for INFO, -vv for DEBUG, -vvv for TRACE)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all log output except for errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Write logs to a specified file in addition to the console output
    #[arg(long, global = true, value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    /// Set the number of threads for parallel computation.
    /// Defaults to the number of available logical cores.
    #[arg(short = 'j', long, global = true, value_name = "NUM")]
    pub threads: Option<usize>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Build descriptors for every model of one or more structure files.
    Build(BuildArgs),
    /// Compare a query descriptor file against target descriptor files.
    Compare(CompareArgs),
    /// Check a contact expression without running anything.
    Validate(ValidateArgs),
}

/// Options shared by `build` and `compare`.
#[derive(Args, Debug, Clone)]
pub struct CommonArgs {
    /// Path to a configuration file in TOML format.
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Override the molecule type (protein, rna or dna).
    #[arg(short, long, value_name = "TYPE")]
    pub molecule_type: Option<MoleculeType>,

    /// Override the number of residues per descriptor element (odd).
    #[arg(short = 'k', long, value_name = "INT")]
    pub element_size: Option<usize>,

    /// Override the contact expression, e.g. "DIST:CA;CA < 8.0".
    #[arg(short = 'e', long = "contact", value_name = "EXPR")]
    pub contact_expression: Option<String>,

    /// Set a specific configuration value, overriding the config file.
    /// Can be used multiple times. Example: -S build.min-contacts=4
    #[arg(short = 'S', long = "set", value_name = "KEY=VALUE", num_args(0..))]
    pub set_values: Vec<String>,
}

/// Arguments for the `build` subcommand.
#[derive(Args, Debug)]
pub struct BuildArgs {
    /// Input structure files (PDB).
    #[arg(short, long, required = true, num_args(1..), value_name = "PATH")]
    pub input: Vec<PathBuf>,

    /// Output directory. Each input gets a sub-directory named after it.
    #[arg(short, long, required = true, value_name = "DIR")]
    pub output: PathBuf,

    #[command(flatten)]
    pub common: CommonArgs,

    /// Build extended descriptors (central window plus contacting windows).
    #[arg(long)]
    pub extended: bool,

    /// Override the minimum number of contacts a descriptor must have.
    #[arg(long, value_name = "INT")]
    pub min_contacts: Option<usize>,
}

/// Arguments for the `compare` subcommand.
#[derive(Args, Debug)]
pub struct CompareArgs {
    /// The query descriptor file.
    #[arg(long, required = true, value_name = "PATH")]
    pub query: PathBuf,

    /// Target descriptor files.
    #[arg(short, long, required = true, num_args(1..), value_name = "PATH")]
    pub targets: Vec<PathBuf>,

    /// Output directory for the report and aligned targets.
    #[arg(short, long, required = true, value_name = "DIR")]
    pub output: PathBuf,

    #[command(flatten)]
    pub common: CommonArgs,

    /// Override the alignment atom names (whitespace separated).
    #[arg(short, long, value_name = "NAMES")]
    pub atoms: Option<String>,

    /// Override the RMSD threshold for accepting a duplex match.
    #[arg(short, long, value_name = "FLOAT")]
    pub rmsd_threshold: Option<f64>,

    /// Override the number of tolerated contact mismatches per duplex.
    #[arg(long, value_name = "INT")]
    pub max_mismatches: Option<usize>,

    /// Judge similarity by the fraction of accepted duplexes instead of
    /// requiring all of them.
    #[arg(long, value_name = "FRACTION")]
    pub majority: Option<f64>,
}

/// Arguments for the `validate` subcommand.
#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// The contact expression to check.
    #[arg(required = true, value_name = "EXPR")]
    pub expression: String,

    /// The molecule type the expression is written for.
    #[arg(short, long, default_value = "protein", value_name = "TYPE")]
    pub molecule_type: MoleculeType,
}
