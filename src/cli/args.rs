use clap::Parser;
use std::path::PathBuf;

pub const DEFAULT_BINARY: &str = "/usr/local/bin/wkhtmltopdf";

#[derive(Parser, Debug)]
#[command(name = "html2pdf", version, about = "Compile and run HTML-to-PDF renderer invocations")]
pub struct CliArgs {
    /// Path to the renderer executable
    #[arg(long, env = "HTML2PDF_BINARY", default_value = DEFAULT_BINARY)]
    pub binary: PathBuf,

    /// JSON job description, applied before the options below
    #[arg(long, value_name = "FILE")]
    pub job: Option<PathBuf>,

    /// Global renderer option as NAME or NAME=VALUE (repeatable; repeated names accumulate)
    #[arg(short = 'g', long = "global", value_name = "NAME[=VALUE]", allow_hyphen_values = true)]
    pub global: Vec<String>,

    /// Cover page source (repeatable)
    #[arg(long, value_name = "SOURCE")]
    pub cover: Vec<String>,

    /// Page source (repeatable)
    #[arg(long, value_name = "SOURCE")]
    pub page: Vec<String>,

    /// Emit a table of contents
    #[arg(long, default_value_t = false)]
    pub toc: bool,

    /// Table-of-contents option as NAME or NAME=VALUE (repeatable; implies --toc)
    #[arg(long = "toc-option", value_name = "NAME[=VALUE]", allow_hyphen_values = true)]
    pub toc_option: Vec<String>,

    /// Output PDF path
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Kill the renderer after this many seconds
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Print the compiled command instead of running it
    #[arg(long, default_value_t = false)]
    pub dry_run: bool,

    /// Enable logging
    #[arg(long, default_value_t = false)]
    pub log: bool,
}
