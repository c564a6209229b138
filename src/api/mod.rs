//! High-level, ergonomic library API: configure a renderer invocation step by step,
//! then run it. Prefer this entrypoint over the lower-level `core` and `io` modules.
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use tempfile::NamedTempFile;

use crate::core::command::CompiledCommand;
use crate::core::job::RenderJob;
use crate::core::params::JobSpec;
use crate::error::{Error, Result};
use crate::io::logging::LogSink;
use crate::io::process::ProcessRunner;
use crate::types::{OptionSet, OptionValue, check_token, validate_entry};

/// Builder and runner for one renderer binary.
///
/// Each instance owns its job exclusively; distinct instances can run concurrently.
pub struct Html2Pdf {
    binary: PathBuf,
    job: RenderJob,
    runner: ProcessRunner,
    sink: Option<Arc<dyn LogSink>>,
    // Pages materialized from HTML strings; removed when the builder is dropped.
    scratch: Vec<NamedTempFile>,
}

impl Html2Pdf {
    /// Fails with [`Error::ExecutableNotFound`] when `binary` does not exist.
    pub fn new(binary: impl Into<PathBuf>) -> Result<Self> {
        let binary = binary.into();
        if !binary.exists() {
            return Err(Error::ExecutableNotFound { path: binary });
        }
        Ok(Self {
            binary,
            job: RenderJob::new(),
            runner: ProcessRunner::new(),
            sink: None,
            scratch: Vec::new(),
        })
    }

    pub fn with_sink<S: LogSink + 'static>(mut self, sink: S) -> Self {
        self.sink = Some(Arc::new(sink));
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.runner = self.runner.with_timeout(timeout);
        self
    }

    pub fn binary(&self) -> &Path {
        &self.binary
    }

    pub fn job(&self) -> &RenderJob {
        &self.job
    }

    /// Files created by [`Html2Pdf::add_page_from_html`].
    pub fn temporary_pages(&self) -> impl Iterator<Item = &Path> {
        self.scratch.iter().map(|file| file.path())
    }

    /// Overwrites one global option.
    pub fn set_global_option(
        &mut self,
        name: impl Into<String>,
        value: impl Into<OptionValue>,
    ) -> Result<&mut Self> {
        let (name, value) = checked_entry(name.into(), value.into())?;
        self.job.set_global_option(name, value);
        Ok(self)
    }

    pub fn set_global_flag(&mut self, name: impl Into<String>) -> Result<&mut Self> {
        self.set_global_option(name, OptionValue::Flag)
    }

    /// Merges `options` into the global options; repeated names accumulate.
    pub fn set_global_options(&mut self, options: OptionSet) -> Result<&mut Self> {
        options.validate()?;
        self.job.set_global_options(options);
        Ok(self)
    }

    /// Adds a page, replacing the options of an existing page with the same source.
    pub fn add_page(&mut self, source: impl Into<String>, options: OptionSet) -> Result<&mut Self> {
        let source = checked_source(source.into())?;
        options.validate()?;
        self.job.add_page(source, options);
        Ok(self)
    }

    /// Writes `html` to a temporary `.html` file and adds it as a page.
    pub fn add_page_from_html(&mut self, html: &str, options: OptionSet) -> Result<&mut Self> {
        let mut file = tempfile::Builder::new()
            .prefix("htm")
            .suffix(".html")
            .tempfile()?;
        file.write_all(html.as_bytes())?;
        file.flush()?;

        let source = file
            .path()
            .to_str()
            .ok_or_else(|| Error::invalid("temporary page path is not valid UTF-8"))?
            .to_string();
        self.scratch.push(file);
        self.add_page(source, options)
    }

    pub fn add_cover(&mut self, source: impl Into<String>, options: OptionSet) -> Result<&mut Self> {
        let source = checked_source(source.into())?;
        options.validate()?;
        self.job.add_cover(source, options);
        Ok(self)
    }

    /// Requests a table of contents; later calls merge into the existing options.
    pub fn set_toc_options(&mut self, options: OptionSet) -> Result<&mut Self> {
        options.validate()?;
        self.job.set_toc_options(options);
        Ok(self)
    }

    /// Overwrites one table-of-contents option.
    pub fn set_toc_option(
        &mut self,
        name: impl Into<String>,
        value: impl Into<OptionValue>,
    ) -> Result<&mut Self> {
        let (name, value) = checked_entry(name.into(), value.into())?;
        self.job.set_toc_option(name, value);
        Ok(self)
    }

    pub fn set_output(&mut self, output: impl AsRef<Path>) -> Result<&mut Self> {
        let output = output
            .as_ref()
            .to_str()
            .ok_or_else(|| Error::invalid("output path is not valid UTF-8"))?;
        check_token(output, "output path")?;
        self.job.set_output(output);
        Ok(self)
    }

    /// Applies a job description through the regular mutators.
    pub fn apply(&mut self, spec: JobSpec) -> Result<&mut Self> {
        self.set_global_options(spec.global)?;
        for cover in spec.covers {
            self.add_cover(cover.source, cover.options)?;
        }
        for page in spec.pages {
            self.add_page(page.source, page.options)?;
        }
        if let Some(toc) = spec.toc {
            self.set_toc_options(toc)?;
        }
        if let Some(output) = spec.output {
            self.set_output(output)?;
        }
        Ok(self)
    }

    /// Compiles the current configuration.
    pub fn compile(&self) -> CompiledCommand {
        self.job.compile(&self.binary)
    }

    /// Runs the renderer and returns its exit code (always 0 on success).
    ///
    /// Each call recompiles from the current configuration.
    pub fn run(&self) -> Result<i32> {
        let command = self.compile();
        self.runner.run(&command, self.sink.as_deref())
    }
}

fn checked_entry(name: String, value: OptionValue) -> Result<(String, OptionValue)> {
    validate_entry(&name, &value)?;
    Ok((name, value))
}

fn checked_source(source: String) -> Result<String> {
    if source.is_empty() {
        return Err(Error::invalid("page source must not be empty"));
    }
    check_token(&source, "page source")?;
    Ok(source)
}
