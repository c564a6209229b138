//! html2pdf CLI entrypoint.
//!
//! Provides a thin wrapper over the `cli` module: parse args, build and run the
//! renderer invocation, and exit with the renderer's status.
//! For programmatic use, prefer the library API (`html2pdf::Html2Pdf`).

use std::process::ExitCode;

use clap::Parser;

mod cli;

fn main() -> ExitCode {
    let args = cli::CliArgs::parse();
    match cli::run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::from(e.exit_status())
        }
    }
}
