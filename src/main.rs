use clap::error::ErrorKind;
use clap::{Parser, ValueEnum};
use rust_python_tree_compare::compare::{CompareOptions, compare_tree_files};
use rust_python_tree_compare::distances::EmptySplitPolicy;
use rust_python_tree_compare::io::TreeFormat;
use rust_python_tree_compare::report::Report;
use rust_python_tree_compare::snapshot::SplitMode;
use std::path::PathBuf;
use std::time::Instant;

/// Compare an estimated tree against a true tree and write a report with the
/// Robinson-Foulds distance and the FN / FP split rates.
///
/// Comparison errors are written into the report; the exit code is 0 unless
/// the arguments are wrong or the report cannot be written.
#[derive(Parser, Debug)]
#[command(name = "compare-trees", version, about = "RF distance and FN/FP rates of an estimated tree")]
struct Args {
    /// Estimated tree file (Newick or NEXUS, optionally .gz)
    estimated: PathBuf,

    /// True (reference) tree file
    true_tree: PathBuf,

    /// Output path for the comparison report
    output: PathBuf,

    /// Compare rooted clusters instead of unrooted bipartitions
    #[arg(long = "rooted", default_value_t = false)]
    rooted: bool,

    /// Tree formats to try, in order
    #[arg(long = "formats", value_enum, value_delimiter = ',',
          default_values_t = [FormatArg::Newick, FormatArg::Nexus])]
    formats: Vec<FormatArg>,

    /// Rate reported when a tree has no splits: divide-by-one | worst-case
    #[arg(long = "empty-splits", value_enum, default_value_t = EmptySplitsArg::DivideByOne)]
    empty_splits: EmptySplitsArg,

    /// Quiet mode: only warnings and errors are logged
    #[arg(short = 'q', long = "quiet", default_value_t = false)]
    quiet: bool,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum FormatArg { Newick, Nexus }

#[derive(Copy, Clone, Debug, ValueEnum)]
enum EmptySplitsArg { DivideByOne, WorstCase }

impl From<FormatArg> for TreeFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Newick => TreeFormat::Newick,
            FormatArg::Nexus => TreeFormat::Nexus,
        }
    }
}

impl From<EmptySplitsArg> for EmptySplitPolicy {
    fn from(arg: EmptySplitsArg) -> Self {
        match arg {
            EmptySplitsArg::DivideByOne => EmptySplitPolicy::DivideByOne,
            EmptySplitsArg::WorstCase => EmptySplitPolicy::WorstCase,
        }
    }
}

fn main() {
    let args = parse_args();
    init_logging(args.quiet);

    let options = CompareOptions {
        formats: args.formats.iter().copied().map(TreeFormat::from).collect(),
        split_mode: if args.rooted { SplitMode::Rooted } else { SplitMode::Unrooted },
        empty_splits: args.empty_splits.into(),
    };

    let t0 = Instant::now();
    let result = compare_tree_files(&args.estimated, &args.true_tree, &options);
    if let Err(e) = &result {
        log::error!("Error in tree comparison: {e}");
    }

    let report = Report::from_result(&result);
    if let Err(e) = report.write_to(&args.output) {
        log::error!("Failed to write output {:?}: {e}", args.output);
        std::process::exit(4);
    }
    let secs = t0.elapsed().as_secs_f64();
    log::info!("Tree comparison completed: {} ({secs:.3}s)", args.output.display());
}

/// Wrong arguments exit with 1 after printing usage; help and version exit 0.
fn parse_args() -> Args {
    match Args::try_parse() {
        Ok(args) => args,
        Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => e.exit(),
        Err(e) => {
            let _ = e.print();
            std::process::exit(1);
        }
    }
}

fn init_logging(quiet: bool) {
    let level = if quiet { "warn" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_target(false)
        .init();
}
