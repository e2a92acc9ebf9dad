use clap::Parser;
use clap::error::ErrorKind;
use rust_python_tree_compare::config::SummaryConfig;
use rust_python_tree_compare::summary::summarize_results;
use std::path::PathBuf;
use std::time::Instant;

/// Collect `<results>/<model>/<replicate>/<method>_comparison.txt` reports
/// into raw and summary CSV tables and FN / FP bar charts.
#[derive(Parser, Debug)]
#[command(name = "summarize-results", version, about = "Summarize tree comparison reports")]
struct Args {
    /// Results root directory; outputs are written here too
    results_dir: PathBuf,

    /// TOML file listing models and methods (defaults to the 1000M1/1000M4 study)
    #[arg(short = 'c', long = "config")]
    config: Option<PathBuf>,

    /// Skip rendering the PNG charts
    #[arg(long = "no-plots", default_value_t = false)]
    no_plots: bool,

    /// Quiet mode: only warnings and errors are logged
    #[arg(short = 'q', long = "quiet", default_value_t = false)]
    quiet: bool,
}

fn main() {
    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => e.exit(),
        Err(e) => {
            let _ = e.print();
            std::process::exit(1);
        }
    };

    let level = if args.quiet { "warn" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_target(false)
        .init();

    let config = match &args.config {
        Some(path) => match SummaryConfig::from_file(path) {
            Ok(c) => c,
            Err(e) => {
                log::error!("Failed to load {:?}: {e}", path);
                std::process::exit(1);
            }
        },
        None => SummaryConfig::default(),
    };

    if !args.results_dir.is_dir() {
        log::error!("Results directory {:?} does not exist", args.results_dir);
        std::process::exit(1);
    }

    let t0 = Instant::now();
    match summarize_results(&args.results_dir, &config, !args.no_plots) {
        Ok(out) => {
            let secs = t0.elapsed().as_secs_f64();
            log::info!(
                "Summarized {} reports, {} plots written ({secs:.3}s)",
                out.records,
                out.plots.len()
            );
        }
        Err(e) => {
            log::error!("Summarization failed: {e}");
            std::process::exit(2);
        }
    }
}
