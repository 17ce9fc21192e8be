#![forbid(unsafe_code)]

use clap::Parser;
use simplelog::{ColorChoice, Config, LevelFilter, TermLogger, TerminalMode};

/// Estimates the percolation threshold of an n-by-n grid by Monte Carlo
/// simulation.
#[derive(Parser)]
struct Args {
    /// Grid side length.
    n: usize,

    /// Number of independent trials.
    trials: usize,

    /// Log every trial outcome.
    #[arg(short, long)]
    verbose: bool,
}

fn main() {
    let args = Args::parse();

    let level = if args.verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    let _ = TermLogger::init(
        level,
        Config::default(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    );

    match perc_stats::run(args.n, args.trials) {
        Ok(stats) => {
            println!("mean                    = {}", stats.mean());
            println!("stddev                  = {}", stats.stddev());
            println!(
                "95% confidence interval = [{}, {}]",
                stats.confidence_lo(),
                stats.confidence_hi()
            );
        }
        Err(e) => {
            eprintln!("error: {e}");
            std::process::exit(1);
        }
    }
}
