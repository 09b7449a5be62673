//! pulse-rank CLI binary.

use std::io::Write;
use std::process;

use clap::Parser;
use env_logger::Builder;
use log::LevelFilter;

use pulse_rank::cli::args::PulseRankArgs;
use pulse_rank::cli::commands::execute_command;

fn main() {
    // Parse command line arguments using clap
    let args = PulseRankArgs::parse();

    let log_level = match args.verbosity() {
        0 => LevelFilter::Error, // Quiet mode
        1 => LevelFilter::Warn,  // Default
        2 => LevelFilter::Info,  // -v
        _ => LevelFilter::Debug, // -vv and more
    };

    Builder::new()
        .filter_level(log_level)
        .format(|buf, record| writeln!(buf, "[{}] {}", record.level(), record.args()))
        .init();

    if let Err(e) = execute_command(args) {
        eprintln!("Error: {e}");
        // Bad configuration or an empty corpus: nothing was run.
        process::exit(if e.is_precondition() { 2 } else { 1 });
    }
}
