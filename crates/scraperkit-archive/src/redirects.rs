//! Redirects side-file parsing.
//!
//! One redirect per line, four tab-separated columns:
//!
//! ```text
//! <namespace>\t<path>\t<title>\t<target>
//! ```
//!
//! The namespace is a single character and may be blank; when set the alias
//! lives at `<namespace>/<path>`. The title may be empty. Blank lines are
//! skipped.

use crate::{Error, Result};
use std::io::BufRead;
use std::path::Path;

/// An alias entry pointing at an existing content entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Redirect {
    pub namespace: Option<char>,
    pub path: String,
    pub title: String,
    pub target: String,
}

impl Redirect {
    /// Path the alias is stored under.
    pub fn alias_path(&self) -> String {
        match self.namespace {
            Some(ns) => format!("{ns}/{}", self.path),
            None => self.path.clone(),
        }
    }

    /// Parse a single line (without its line terminator).
    pub fn parse_line(line: &str, line_no: usize) -> Result<Self> {
        let malformed = || Error::RedirectFormat {
            line: line_no,
            content: line.to_string(),
        };

        let mut columns = line.splitn(4, '\t');
        let (Some(namespace), Some(path), Some(title), Some(target)) = (
            columns.next(),
            columns.next(),
            columns.next(),
            columns.next(),
        ) else {
            return Err(malformed());
        };

        let mut ns_chars = namespace.chars();
        let namespace = match (ns_chars.next(), ns_chars.next()) {
            (Some(c), None) => c,
            _ => return Err(malformed()),
        };
        if path.is_empty() || target.is_empty() || target.contains('\t') {
            return Err(malformed());
        }

        Ok(Self {
            namespace: Some(namespace).filter(|c| !c.is_whitespace()),
            path: path.to_string(),
            title: title.to_string(),
            target: target.to_string(),
        })
    }
}

/// Parse every redirect from a reader.
pub fn parse_redirects<R: BufRead>(reader: R) -> Result<Vec<Redirect>> {
    let mut redirects = Vec::new();
    for (idx, line) in reader.lines().enumerate() {
        let line = line?;
        let line = line.strip_suffix('\r').unwrap_or(&line);
        if line.trim().is_empty() {
            continue;
        }
        redirects.push(Redirect::parse_line(line, idx + 1)?);
    }
    Ok(redirects)
}

/// Parse a redirects file.
pub fn read_redirects_file(path: &Path) -> Result<Vec<Redirect>> {
    let file = std::fs::File::open(path)?;
    parse_redirects(std::io::BufReader::new(file))
}
