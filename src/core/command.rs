//! Option-to-argument compilation.
//!
//! A [`RenderJob`] compiles to a flat token sequence in a fixed order: global options,
//! covers, pages, table of contents, output. Tokens are handed to the renderer as an
//! argument vector; the escaped single-line form only exists for logs and dry runs.
use std::borrow::Cow;
use std::fmt;
use std::path::{Path, PathBuf};

use crate::core::job::{EntryList, RenderJob};
use crate::types::{OptionKey, OptionSet, OptionValue};

const COVER_KEYWORD: &str = "cover";
const PAGE_KEYWORD: &str = "page";
const TOC_KEYWORD: &str = "toc";

/// One argument of a compiled command.
#[derive(Clone, PartialEq, Eq, Debug)]
pub enum Token {
    /// Flag names and section keywords, rendered verbatim.
    Bare(String),
    /// Values, sources and paths, rendered shell-escaped.
    Quoted(String),
}

impl Token {
    pub fn as_str(&self) -> &str {
        match self {
            Token::Bare(s) | Token::Quoted(s) => s,
        }
    }

    /// Textual form used in a command line.
    pub fn rendered(&self) -> Cow<'_, str> {
        match self {
            Token::Bare(s) => Cow::Borrowed(s),
            Token::Quoted(s) => quote(s),
        }
    }
}

/// Escapes `arg` as a single POSIX shell word.
///
/// Words made only of characters the shell never interprets are returned unchanged;
/// everything else is wrapped in single quotes.
pub fn quote(arg: &str) -> Cow<'_, str> {
    let is_plain = |c: char| c.is_ascii_alphanumeric() || "_@%+=:,./-".contains(c);
    if !arg.is_empty() && arg.chars().all(is_plain) {
        return Cow::Borrowed(arg);
    }
    let mut quoted = String::with_capacity(arg.len() + 2);
    quoted.push('\'');
    for c in arg.chars() {
        if c == '\'' {
            quoted.push_str("'\\''");
        } else {
            quoted.push(c);
        }
    }
    quoted.push('\'');
    Cow::Owned(quoted)
}

/// Tokens for one option set, in insertion order.
pub fn option_tokens(options: &OptionSet) -> Vec<Token> {
    let mut tokens = Vec::new();
    push_options(&mut tokens, options);
    tokens
}

/// Compiles an option set into its escaped textual form.
///
/// Positional entries become bare values, list values repeat the option name once per
/// element and flags are emitted alone. An empty set yields an empty string.
pub fn construct_options(options: &OptionSet) -> String {
    join(&option_tokens(options))
}

fn push_options(tokens: &mut Vec<Token>, options: &OptionSet) {
    for (key, value) in options.iter() {
        match key {
            OptionKey::Positional(_) => {
                for v in value.values() {
                    tokens.push(Token::Quoted(v.clone()));
                }
            }
            OptionKey::Named(name) => match value {
                OptionValue::Flag => tokens.push(Token::Bare(name.clone())),
                OptionValue::Single(v) => {
                    tokens.push(Token::Bare(name.clone()));
                    tokens.push(Token::Quoted(v.clone()));
                }
                OptionValue::List(values) => {
                    for v in values {
                        tokens.push(Token::Bare(name.clone()));
                        tokens.push(Token::Quoted(v.clone()));
                    }
                }
            },
        }
    }
}

fn push_entries(tokens: &mut Vec<Token>, keyword: &str, entries: &EntryList) {
    for entry in entries.iter() {
        tokens.push(Token::Bare(keyword.to_string()));
        tokens.push(Token::Quoted(entry.source.clone()));
        push_options(tokens, &entry.options);
    }
}

fn has_toc_marker(options: &OptionSet) -> bool {
    options.iter().any(|(key, value)| {
        matches!(key, OptionKey::Positional(_))
            && value.values().iter().any(|v| v == TOC_KEYWORD)
    })
}

fn join(tokens: &[Token]) -> String {
    tokens
        .iter()
        .map(Token::rendered)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Compiles `job` into the full invocation of `program`.
pub fn compile(job: &RenderJob, program: &Path) -> CompiledCommand {
    let mut tokens = Vec::new();

    push_options(&mut tokens, job.global());
    push_entries(&mut tokens, COVER_KEYWORD, job.covers());
    push_entries(&mut tokens, PAGE_KEYWORD, job.pages());

    if let Some(toc) = job.toc() {
        // Legacy option sets carry the marker themselves as a bare token.
        if !has_toc_marker(toc) {
            tokens.push(Token::Bare(TOC_KEYWORD.to_string()));
        }
        push_options(&mut tokens, toc);
    }

    if let Some(output) = job.output() {
        tokens.push(Token::Quoted(output.to_string_lossy().into_owned()));
    }

    CompiledCommand {
        program: program.to_path_buf(),
        tokens,
    }
}

/// A renderer invocation ready to be spawned.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct CompiledCommand {
    program: PathBuf,
    tokens: Vec<Token>,
}

impl CompiledCommand {
    pub fn program(&self) -> &Path {
        &self.program
    }

    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    /// Argument vector, without the program.
    pub fn args(&self) -> impl Iterator<Item = &str> {
        self.tokens.iter().map(Token::as_str)
    }

    /// Escaped argument line, without the program.
    pub fn arguments_line(&self) -> String {
        join(&self.tokens)
    }
}

impl fmt::Display for CompiledCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let program = self.program.to_string_lossy();
        write!(f, "{}", quote(&program))?;
        if !self.tokens.is_empty() {
            write!(f, " {}", self.arguments_line())?;
        }
        Ok(())
    }
}
