//! edcmd - a sam-style structural-regex edit command filter
//!
//! This is the main entry point. It parses CLI arguments, installs the
//! development logger, and delegates to the filter runner.

mod cli;
mod logger;
mod run;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    logger::init();

    let cli = cli::Cli::parse()?;
    run::run_filter_mode(&cli)
}
