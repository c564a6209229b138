//! Command Line Interface (CLI) layer for html2pdf.
//!
//! This module defines argument parsing (`args`), error types (`errors`),
//! and the orchestration logic (`runner`) that turns command-line options and
//! JSON job files into a renderer invocation via `html2pdf::Html2Pdf`.
//!
//! If you are embedding html2pdf into another application, use the library
//! API directly instead of calling the CLI code.
pub mod args;
pub mod errors;
pub mod runner;

pub use args::CliArgs;
pub use runner::run;
