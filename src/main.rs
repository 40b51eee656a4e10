use anyhow::Result;
use clap::Parser;
use tracing::{debug, Level};

use xmlconv::cli::{execute, handle_error, write_output, Args, CliConfig};

/// Log to stderr so converted output on stdout stays clean
fn init_logging(verbose: bool, quiet: bool) {
    let level = if verbose {
        Level::DEBUG
    } else if quiet {
        Level::WARN
    } else {
        Level::INFO
    };

    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose, args.quiet);

    let config = match CliConfig::from_args(args) {
        Ok(config) => config,
        Err(e) => {
            handle_error(&e);
            std::process::exit(2);
        }
    };
    debug!(command = ?config.args.command, output = %config.output_description(), "starting");

    let output = match execute(&config) {
        Ok(output) => output,
        Err(e) => {
            handle_error(&e);
            std::process::exit(1);
        }
    };

    write_output(&config, &output)?;

    if !output.success {
        std::process::exit(1);
    }
    Ok(())
}
