//! The `RenderJob` aggregate: everything one renderer invocation needs.
use std::path::{Path, PathBuf};

use crate::core::command::{self, CompiledCommand};
use crate::types::{OptionSet, OptionValue};

/// Flag every job starts with; the renderer's progress output is never wanted.
pub const QUIET_FLAG: &str = "--quiet";

/// A cover or page source with its own options.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct PageEntry {
    pub source: String,
    pub options: OptionSet,
}

/// Insertion-ordered entries keyed by source.
#[derive(Clone, PartialEq, Eq, Debug, Default)]
pub struct EntryList {
    entries: Vec<PageEntry>,
}

impl EntryList {
    /// Adds `source`, or replaces the options of an existing entry wholesale.
    /// A replaced entry keeps its original position.
    pub fn insert(&mut self, source: impl Into<String>, options: OptionSet) {
        let source = source.into();
        match self.entries.iter_mut().find(|e| e.source == source) {
            Some(entry) => entry.options = options,
            None => self.entries.push(PageEntry { source, options }),
        }
    }

    pub fn get(&self, source: &str) -> Option<&OptionSet> {
        self.entries
            .iter()
            .find(|e| e.source == source)
            .map(|e| &e.options)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, PageEntry> {
        self.entries.iter()
    }
}

#[derive(Clone, PartialEq, Eq, Debug)]
pub struct RenderJob {
    global: OptionSet,
    covers: EntryList,
    pages: EntryList,
    toc: Option<OptionSet>,
    output: Option<PathBuf>,
}

impl Default for RenderJob {
    fn default() -> Self {
        Self::new()
    }
}

impl RenderJob {
    /// A fresh job whose global options hold only `--quiet`.
    pub fn new() -> Self {
        Self {
            global: OptionSet::new().with_flag(QUIET_FLAG),
            covers: EntryList::default(),
            pages: EntryList::default(),
            toc: None,
            output: None,
        }
    }

    pub fn global(&self) -> &OptionSet {
        &self.global
    }

    pub fn covers(&self) -> &EntryList {
        &self.covers
    }

    pub fn pages(&self) -> &EntryList {
        &self.pages
    }

    /// `None` when no table of contents was requested; `Some` of an empty set when one
    /// was requested without options.
    pub fn toc(&self) -> Option<&OptionSet> {
        self.toc.as_ref()
    }

    pub fn output(&self) -> Option<&Path> {
        self.output.as_deref()
    }

    pub fn set_global_option(&mut self, name: impl Into<String>, value: impl Into<OptionValue>) {
        self.global.set(name, value);
    }

    pub fn set_global_options(&mut self, options: OptionSet) {
        self.global.merge(options);
    }

    pub fn add_page(&mut self, source: impl Into<String>, options: OptionSet) {
        self.pages.insert(source, options);
    }

    pub fn add_cover(&mut self, source: impl Into<String>, options: OptionSet) {
        self.covers.insert(source, options);
    }

    /// Sets the table-of-contents options on first use and merges them afterwards.
    pub fn set_toc_options(&mut self, options: OptionSet) {
        match &mut self.toc {
            Some(toc) => {
                toc.merge(options);
            }
            None => self.toc = Some(options),
        }
    }

    /// Overwrites a single table-of-contents option, requesting the section if needed.
    pub fn set_toc_option(&mut self, name: impl Into<String>, value: impl Into<OptionValue>) {
        self.toc
            .get_or_insert_with(OptionSet::new)
            .set(name, value);
    }

    pub fn set_output(&mut self, output: impl Into<PathBuf>) {
        self.output = Some(output.into());
    }

    pub fn compile(&self, program: &Path) -> CompiledCommand {
        command::compile(self, program)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_job_is_quiet() {
        let job = RenderJob::new();
        assert_eq!(job.global().get(QUIET_FLAG), Some(&OptionValue::Flag));
        assert!(job.toc().is_none());
        assert!(job.output().is_none());
    }

    #[test]
    fn re_adding_a_page_replaces_its_options() {
        let mut job = RenderJob::new();
        job.add_page("a.html", OptionSet::new().with("--zoom", "1").with_flag("--x"));
        job.add_page("b.html", OptionSet::new());
        job.add_page("a.html", OptionSet::new().with("--zoom", "2"));

        assert_eq!(job.pages().len(), 2);
        assert_eq!(
            job.pages().get("a.html"),
            Some(&OptionSet::new().with("--zoom", "2"))
        );
        let order: Vec<&str> = job.pages().iter().map(|e| e.source.as_str()).collect();
        assert_eq!(order, vec!["a.html", "b.html"]);
    }

    #[test]
    fn output_is_kept_as_a_path() {
        let mut job = RenderJob::new();
        job.set_output(PathBuf::from("reports/q3 summary.pdf"));
        assert_eq!(job.output(), Some(Path::new("reports/q3 summary.pdf")));
        assert_eq!(
            job.compile(Path::new("bin")).args().last(),
            Some("reports/q3 summary.pdf")
        );
    }

    #[test]
    fn covers_and_pages_are_separate() {
        let mut job = RenderJob::new();
        job.add_cover("a.html", OptionSet::new());
        job.add_page("a.html", OptionSet::new());
        assert_eq!(job.covers().len(), 1);
        assert_eq!(job.pages().len(), 1);
    }

    #[test]
    fn bulk_global_options_merge_while_single_setter_overwrites() {
        let mut job = RenderJob::new();
        job.set_global_options(OptionSet::new().with("--x", ["1"]));
        job.set_global_options(OptionSet::new().with("--x", ["2"]));
        assert_eq!(job.global().get("--x"), Some(&OptionValue::from(["1", "2"])));

        let mut job = RenderJob::new();
        job.set_global_option("--x", "1");
        job.set_global_option("--x", "2");
        assert_eq!(job.global().get("--x"), Some(&OptionValue::from("2")));
    }

    #[test]
    fn toc_bulk_setter_merges_and_single_setter_overwrites() {
        let mut job = RenderJob::new();
        job.set_toc_options(OptionSet::new().with("--a", "1"));
        job.set_toc_options(OptionSet::new().with("--a", "2"));
        assert_eq!(
            job.toc().and_then(|t| t.get("--a")),
            Some(&OptionValue::from(["1", "2"]))
        );

        job.set_toc_option("--a", "3");
        assert_eq!(
            job.toc().and_then(|t| t.get("--a")),
            Some(&OptionValue::from("3"))
        );
    }

    #[test]
    fn single_toc_option_requests_the_section() {
        let mut job = RenderJob::new();
        job.set_toc_option("--disable-dotted-lines", None::<String>);
        assert_eq!(
            job.toc(),
            Some(&OptionSet::new().with_flag("--disable-dotted-lines"))
        );
    }

    #[test]
    fn empty_toc_is_distinct_from_no_toc() {
        let mut job = RenderJob::new();
        job.set_toc_options(OptionSet::new());
        assert_eq!(job.toc(), Some(&OptionSet::new()));
    }
}
