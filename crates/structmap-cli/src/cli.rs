use clap::{Args, Parser, Subcommand, ValueEnum};
use serde::Deserialize;
use std::path::PathBuf;

const HELP_TEMPLATE: &str = "\
{before-help}{name} {version}
{author-with-newline}{about-with-newline}
{usage-heading} {usage}

{all-args}{after-help}
";

#[derive(Parser, Debug)]
#[command(
    author = "StructMap Developers",
    version,
    about = "StructMap CLI - Map per-residue data onto protein structures with a 3D sliding window, and compute Tajima's D over sequence alignments.",
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
    /// Aggregate per-residue data over the spatial neighborhood of every residue.
    Map(MapArgs),
    /// Compute Tajima's D over a nucleotide alignment, whole or in sliding windows.
    Tajima(TajimaArgs),
}

/// How mapped values are written.
#[derive(ValueEnum, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "kebab-case")]
pub enum OutputFormat {
    /// One `model,chain,residue,value` line per residue.
    #[default]
    Residue,
    /// One `serial,value` line per atom of the first model.
    Atom,
    /// A copy of the input structure with values in the B-factor column.
    BFactor,
}

/// Arguments for the `map` subcommand.
#[derive(Args, Debug)]
pub struct MapArgs {
    // --- Core Arguments ---
    /// Path to the input structure file (PDB or mmCIF).
    #[arg(short, long, required = true, value_name = "PATH")]
    pub input: PathBuf,

    /// Path to the data file: CSV for values, variant counts and scales; FASTA for alignments.
    #[arg(short, long, required = true, value_name = "PATH")]
    pub data: PathBuf,

    /// Path for the output file. Residue and atom output go to stdout when omitted.
    #[arg(short, long, value_name = "PATH")]
    pub output: Option<PathBuf>,

    /// Path to an optional configuration file in TOML format.
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    // --- Mapping Overrides ---
    /// Aggregation method: default, snps, snp_frequency, aa_scale or tajimasd.
    #[arg(short, long, value_name = "NAME")]
    pub method: Option<String>,

    /// Neighborhood radius in angstroms.
    #[arg(short, long, value_name = "FLOAT")]
    pub radius: Option<f64>,

    /// Atom used to measure distances ('all' for the closest pair of atoms).
    #[arg(long, value_name = "ATOM")]
    pub selector: Option<String>,

    /// FASTA file whose first record is the reference sequence.
    #[arg(long = "ref", value_name = "PATH")]
    pub reference: Option<PathBuf>,

    /// Map a single chain of the first model instead of every chain.
    #[arg(long, value_name = "ID")]
    pub chain: Option<String>,

    /// Annotate residue output with DSSP secondary structure and relative accessibility.
    #[arg(long)]
    pub dssp: bool,

    // --- Output Overrides ---
    /// Output representation.
    #[arg(short, long, value_enum, value_name = "FORMAT")]
    pub format: Option<OutputFormat>,

    /// Field delimiter for residue and atom output.
    #[arg(long, value_name = "CHAR")]
    pub delimiter: Option<char>,

    /// Value written for atoms of residues without a mapped value.
    #[arg(long, value_name = "FLOAT", allow_negative_numbers = true)]
    pub default_value: Option<f64>,

    /// Set a specific configuration value, overriding the config file.
    /// Can be used multiple times. Example: -S mapping.radius=10
    #[arg(short = 'S', long = "set", value_name = "KEY=VALUE", num_args(0..))]
    pub set_values: Vec<String>,
}

/// Arguments for the `tajima` subcommand.
#[derive(Args, Debug)]
pub struct TajimaArgs {
    /// Path to the nucleotide alignment in FASTA format.
    #[arg(short, long, required = true, value_name = "PATH")]
    pub alignment: PathBuf,

    /// Path for the CSV output. Written to stdout when omitted.
    #[arg(short, long, value_name = "PATH")]
    pub output: Option<PathBuf>,

    /// Path to an optional configuration file in TOML format.
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Window size in alignment columns. Without it the whole alignment is evaluated.
    #[arg(short, long, value_name = "INT")]
    pub window: Option<usize>,

    /// Step between consecutive windows.
    #[arg(short, long, value_name = "INT")]
    pub step: Option<usize>,

    /// FASTA file with the protein reference; restricts the analysis to its coding columns.
    #[arg(long, value_name = "PATH", requires = "genome_ref")]
    pub protein_ref: Option<PathBuf>,

    /// FASTA file with the genomic reference the protein is located in.
    #[arg(long, value_name = "PATH", requires = "protein_ref")]
    pub genome_ref: Option<PathBuf>,

    /// Key coding windows by protein position instead of genomic position.
    #[arg(long, requires = "protein_ref")]
    pub protein_numbering: bool,

    /// Field delimiter for the output.
    #[arg(long, value_name = "CHAR")]
    pub delimiter: Option<char>,

    /// Set a specific configuration value, overriding the config file.
    /// Can be used multiple times. Example: -S tajima.step=1
    #[arg(short = 'S', long = "set", value_name = "KEY=VALUE", num_args(0..))]
    pub set_values: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn map_arguments_parse() {
        let cli = Cli::parse_from([
            "structmap", "-vv", "map", "-i", "1abc.pdb", "-d", "values.csv", "-m", "snps",
            "-r", "7.5", "--selector", "CA", "--ref", "ref.fasta", "-f", "b-factor",
            "--default-value", "-1", "-S", "output.delimiter=;",
        ]);
        assert_eq!(cli.verbose, 2);
        let Commands::Map(args) = cli.command else {
            panic!("expected the map subcommand");
        };
        assert_eq!(args.method.as_deref(), Some("snps"));
        assert_eq!(args.radius, Some(7.5));
        assert_eq!(args.format, Some(OutputFormat::BFactor));
        assert_eq!(args.default_value, Some(-1.0));
        assert_eq!(args.reference, Some(PathBuf::from("ref.fasta")));
        assert_eq!(args.set_values, vec!["output.delimiter=;".to_string()]);
    }

    #[test]
    fn tajima_references_must_come_in_pairs() {
        let result = Cli::try_parse_from([
            "structmap", "tajima", "-a", "aln.fasta", "--protein-ref", "p.fasta",
        ]);
        assert!(result.is_err());

        let cli = Cli::try_parse_from([
            "structmap", "tajima", "-a", "aln.fasta", "-w", "30", "--protein-ref", "p.fasta",
            "--genome-ref", "g.fasta",
        ])
        .unwrap();
        let Commands::Tajima(args) = cli.command else {
            panic!("expected the tajima subcommand");
        };
        assert_eq!(args.window, Some(30));
        assert!(args.protein_ref.is_some() && args.genome_ref.is_some());
    }

    #[test]
    fn quiet_conflicts_with_verbose() {
        let result = Cli::try_parse_from(["structmap", "-q", "-v", "tajima", "-a", "aln.fasta"]);
        assert!(result.is_err());
    }
}
