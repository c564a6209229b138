#![doc = r#"
html2pdf — a typed command builder and process runner for HTML-to-PDF renderers.

This crate accumulates a description of a rendering job (global renderer flags,
cover pages, pages with per-page flags, an optional table of contents and an output
destination), compiles it into the argument vector of an external renderer such as
`wkhtmltopdf`, runs it as a subprocess and reports a typed error when the renderer
exits with a nonzero code. It powers the `html2pdf` CLI and can be embedded in your
own Rust applications.

The renderer itself produces the PDF; this crate never interprets individual flags.

Add dependency
--------------
```toml
[dependencies]
html2pdf = "0.1"
```

Quick start
-----------
```rust,no_run
use html2pdf::{Html2Pdf, OptionSet, TracingSink};

fn main() -> html2pdf::Result<()> {
    let mut pdf = Html2Pdf::new("/usr/local/bin/wkhtmltopdf")?.with_sink(TracingSink);

    pdf.set_global_option("--page-size", "A4")?
        .add_cover("cover.html", OptionSet::new())?
        .add_page("report.html", OptionSet::new().with("--zoom", "1.5"))?
        .set_toc_option("--toc-header-text", "Contents")?
        .set_output("out.pdf")?;

    // --quiet --page-size A4 cover cover.html page report.html --zoom 1.5 toc ...
    println!("{}", pdf.compile());

    pdf.run()?;
    Ok(())
}
```

Single vs. bulk setters
-----------------------
`set_global_option` and `set_toc_option` overwrite. `set_global_options` and
`set_toc_options` merge: values under a repeated name accumulate and the flag is
emitted once per value.

```rust
use html2pdf::{OptionSet, RenderJob};
use std::path::Path;

let mut job = RenderJob::new();
job.set_global_options(OptionSet::new().with("--cookie", ["a", "1"]));
job.set_global_options(OptionSet::new().with("--cookie", ["b", "2"]));

assert_eq!(
    job.compile(Path::new("wkhtmltopdf")).arguments_line(),
    "--quiet --cookie a --cookie 1 --cookie b --cookie 2"
);
```

Error handling
--------------
All fallible functions return `html2pdf::Result<T>`; match on `html2pdf::Error` to
handle specific cases.

```rust,no_run
use html2pdf::{Error, Html2Pdf, OptionSet};

fn render() -> html2pdf::Result<()> {
    let mut pdf = Html2Pdf::new("/usr/local/bin/wkhtmltopdf")?;
    pdf.add_page("report.html", OptionSet::new())?.set_output("out.pdf")?;
    pdf.run().map(|_| ())
}

match render() {
    Ok(()) => {}
    Err(Error::ExecutableNotFound { path }) => eprintln!("install wkhtmltopdf at {}", path.display()),
    Err(Error::RenderFailed { code, .. }) => eprintln!("renderer exited with {code}"),
    Err(other) => eprintln!("Other error: {other}"),
}
```

Useful modules
--------------
- [`api`] — the `Html2Pdf` builder and runner.
- [`types`] — `OptionSet` and its keys and values.
- [`core`] — the `RenderJob` aggregate, compilation and JSON job descriptions.
- [`io`] — the process runner and logging sinks.
- [`error`] — crate-level `Error` and `Result`.
"#]

// Core modules (public)
pub mod api;
pub mod core;
pub mod error;
pub mod io;
pub mod types;

// Curated public API surface
pub use api::Html2Pdf;
pub use core::command::{CompiledCommand, Token, construct_options, quote};
pub use core::job::{EntryList, PageEntry, QUIET_FLAG, RenderJob};
pub use core::params::{EntrySpec, JobSpec};
pub use error::{Error, Result};
pub use io::logging::{LogEntry, LogSink, MemorySink, TracingSink};
pub use io::process::{ExecutionResult, ProcessRunner};
pub use types::{OptionKey, OptionSet, OptionValue};
