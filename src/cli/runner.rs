use std::time::Duration;

use tracing::info;
use tracing_subscriber::EnvFilter;

use html2pdf::{Html2Pdf, JobSpec, OptionSet, OptionValue, TracingSink};

use super::args::CliArgs;
use super::errors::AppError;

/// Splits `NAME=VALUE` on the first `=`; a bare `NAME` is a flag.
fn parse_option(raw: &str) -> Result<(String, OptionValue), AppError> {
    let (name, value) = match raw.split_once('=') {
        Some((name, value)) => (name, OptionValue::from(value)),
        None => (raw, OptionValue::Flag),
    };
    if name.is_empty() {
        return Err(AppError::InvalidOption {
            raw: raw.to_string(),
        });
    }
    Ok((name.to_string(), value))
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

pub fn run(args: CliArgs) -> Result<(), AppError> {
    if args.log {
        init_logging();
    }

    let mut pdf = Html2Pdf::new(args.binary.clone())?;
    if args.log {
        pdf = pdf.with_sink(TracingSink);
    }
    if let Some(secs) = args.timeout {
        pdf = pdf.with_timeout(Duration::from_secs(secs));
    }

    if let Some(path) = &args.job {
        info!("Loading job description: {:?}", path);
        pdf.apply(JobSpec::load(path)?)?;
    }

    for raw in &args.global {
        let (name, value) = parse_option(raw)?;
        pdf.set_global_options(OptionSet::new().with(name, value))?;
    }
    for source in &args.cover {
        pdf.add_cover(source.as_str(), OptionSet::new())?;
    }
    for source in &args.page {
        pdf.add_page(source.as_str(), OptionSet::new())?;
    }
    if args.toc {
        pdf.set_toc_options(OptionSet::new())?;
    }
    for raw in &args.toc_option {
        let (name, value) = parse_option(raw)?;
        pdf.set_toc_option(name, value)?;
    }
    if let Some(output) = &args.output {
        pdf.set_output(output)?;
    }

    if args.dry_run {
        println!("{}", pdf.compile());
        return Ok(());
    }

    let job = pdf.job();
    if job.pages().is_empty() && job.covers().is_empty() {
        return Err(AppError::MissingArgument {
            arg: "--page".to_string(),
        });
    }
    let output = job
        .output()
        .ok_or(AppError::MissingArgument {
            arg: "--output".to_string(),
        })?
        .display()
        .to_string();

    info!(
        "Rendering {} cover(s) and {} page(s) to {}",
        job.covers().len(),
        job.pages().len(),
        output
    );
    pdf.run()?;
    info!("Successfully rendered: {}", output);

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_flags_and_values() {
        let (name, value) = parse_option("--grayscale").unwrap();
        assert_eq!(name, "--grayscale");
        assert_eq!(value, OptionValue::Flag);

        let (name, value) = parse_option("--title=a=b").unwrap();
        assert_eq!(name, "--title");
        assert_eq!(value, OptionValue::from("a=b"));

        let (_, value) = parse_option("--footer-center=").unwrap();
        assert_eq!(value, OptionValue::from(""));
    }

    #[test]
    fn rejects_missing_name() {
        assert!(matches!(
            parse_option("=1.5"),
            Err(AppError::InvalidOption { .. })
        ));
    }
}
