//! Read-back access to archives written by [`Creator`](crate::Creator).

use crate::manifest::{
    metadata_member, title_words, EntryRecord, Manifest, MANIFEST_MEMBER, MANIFEST_VERSION,
};
use crate::{Error, Result};
use std::collections::{BTreeMap, BTreeSet};
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;
use zip::ZipArchive;

/// Redirect chains longer than this are treated as corrupt.
const MAX_REDIRECT_DEPTH: usize = 16;

/// A resolved content entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Item {
    /// Path of the item itself, after following redirects.
    pub path: String,
    pub title: String,
    pub mimetype: String,
    pub content: Vec<u8>,
}

impl Item {
    /// Content as UTF-8 text, when it is valid.
    pub fn text(&self) -> Option<&str> {
        std::str::from_utf8(&self.content).ok()
    }
}

/// An opened archive.
pub struct Archive {
    zip: ZipArchive<BufReader<File>>,
    manifest: Manifest,
}

impl Archive {
    /// Open an archive and load its manifest.
    pub fn open(path: &Path) -> Result<Self> {
        let file = File::open(path)?;
        let mut zip = ZipArchive::new(BufReader::new(file))?;

        let manifest: Manifest = {
            let member = zip.by_name(MANIFEST_MEMBER).map_err(|_| {
                Error::InvalidArchive(format!("{} has no manifest", path.display()))
            })?;
            serde_json::from_reader(member)?
        };
        if manifest.version != MANIFEST_VERSION {
            return Err(Error::InvalidArchive(format!(
                "unsupported manifest version {}",
                manifest.version
            )));
        }

        Ok(Self { zip, manifest })
    }

    /// Number of entries, redirects and front entries included.
    pub fn entry_count(&self) -> usize {
        self.manifest.entries.len()
    }

    /// Path of the main page, when the archive has one.
    pub fn main_path(&self) -> Option<&str> {
        self.manifest.main_path.as_deref()
    }

    /// All metadata values.
    pub fn metadata(&self) -> &BTreeMap<String, String> {
        &self.manifest.metadata
    }

    /// A single metadata value, read from its member.
    pub fn metadata_value(&mut self, name: &str) -> Result<String> {
        let mut member = self
            .zip
            .by_name(&metadata_member(name))
            .map_err(|_| Error::EntryNotFound(metadata_member(name)))?;
        let mut value = String::new();
        member.read_to_string(&mut value)?;
        Ok(value)
    }

    pub fn has_entry(&self, path: &str) -> bool {
        self.manifest.entries.contains_key(path)
    }

    /// Paths of every entry, sorted.
    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.manifest.entries.keys().map(String::as_str)
    }

    /// Whether `path` is an alias.
    pub fn is_redirect(&self, path: &str) -> bool {
        matches!(
            self.manifest.entries.get(path),
            Some(EntryRecord::Redirect { .. })
        )
    }

    /// Fetch an entry, following redirects to the item they point at.
    pub fn get_item(&mut self, path: &str) -> Result<Item> {
        let mut current = path.to_string();
        for _ in 0..MAX_REDIRECT_DEPTH {
            let record = self
                .manifest
                .entries
                .get(&current)
                .ok_or_else(|| Error::EntryNotFound(current.clone()))?;

            match record {
                EntryRecord::Redirect { target, .. } => current = target.clone(),
                EntryRecord::Item {
                    title,
                    mimetype,
                    member,
                } => {
                    let (title, mimetype) = (title.clone(), mimetype.clone());
                    let mut file = self.zip.by_name(member).map_err(|_| {
                        Error::InvalidArchive(format!("missing member {member}"))
                    })?;
                    let mut content = Vec::with_capacity(file.size() as usize);
                    file.read_to_end(&mut content)?;
                    return Ok(Item {
                        path: current,
                        title,
                        mimetype,
                        content,
                    });
                }
            }
        }
        Err(Error::InvalidArchive(format!("redirect loop at {path}")))
    }

    /// Paths whose title matches every word of `query`.
    ///
    /// A query word matches when it prefixes a title word, ignoring case.
    pub fn get_suggestions(&self, query: &str) -> Vec<String> {
        let mut matched: Option<BTreeSet<&String>> = None;
        for word in title_words(query) {
            let hits: BTreeSet<&String> = self
                .manifest
                .suggestions
                .range(word.clone()..)
                .take_while(|(token, _)| token.starts_with(&word))
                .flat_map(|(_, paths)| paths)
                .collect();
            matched = Some(match matched {
                Some(prev) => prev.intersection(&hits).copied().collect(),
                None => hits,
            });
        }
        matched
            .unwrap_or_default()
            .into_iter()
            .cloned()
            .collect()
    }

    pub fn get_suggestions_count(&self, query: &str) -> usize {
        self.get_suggestions(query).len()
    }
}
