use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::error::Result;
use crate::types::OptionSet;

/// One cover or page in a job description.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EntrySpec {
    pub source: String,
    #[serde(default)]
    pub options: OptionSet,
}

/// Whole-job description suitable for JSON job files
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct JobSpec {
    /// Merged into the global options, like a bulk set
    pub global: OptionSet,
    pub covers: Vec<EntrySpec>,
    pub pages: Vec<EntrySpec>,
    /// `null` or missing means no table of contents; `{}` requests an empty one
    pub toc: Option<OptionSet>,
    pub output: Option<String>,
}

impl JobSpec {
    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        Self::from_json(&text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::OptionValue;

    #[test]
    fn parses_full_description() {
        let spec = JobSpec::from_json(
            r#"{
                "global": {"--page-size": "A4", "--grayscale": null},
                "covers": [{"source": "cover.html"}],
                "pages": [
                    {"source": "report.html", "options": {"--zoom": 1.5}},
                    {"source": "appendix.html"}
                ],
                "toc": {},
                "output": "out.pdf"
            }"#,
        )
        .unwrap();

        assert_eq!(spec.global.get("--grayscale"), Some(&OptionValue::Flag));
        assert_eq!(spec.covers.len(), 1);
        assert_eq!(spec.pages[0].options.get("--zoom"), Some(&OptionValue::from("1.5")));
        assert!(spec.pages[1].options.is_empty());
        assert_eq!(spec.toc, Some(OptionSet::new()));
        assert_eq!(spec.output.as_deref(), Some("out.pdf"));
    }

    #[test]
    fn missing_sections_default_to_empty() {
        let spec = JobSpec::from_json("{}").unwrap();
        assert_eq!(spec, JobSpec::default());
        assert!(spec.toc.is_none());
    }

    #[test]
    fn unknown_fields_are_rejected() {
        assert!(JobSpec::from_json(r#"{"outptu": "x.pdf"}"#).is_err());
    }
}
