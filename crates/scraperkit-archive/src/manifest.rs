//! On-disk layout shared by the creator and the reader.
//!
//! Content lives in `C/<path>` members, metadata in `M/<Name>` members, and
//! `X/manifest.json` describes every entry plus the suggestion index.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

pub(crate) const MANIFEST_VERSION: u32 = 1;
pub(crate) const MANIFEST_MEMBER: &str = "X/manifest.json";

pub(crate) const MAIN_PAGE_PATH: &str = "W/mainPage";
pub(crate) const ILLUSTRATION_PATH: &str = "M/Illustration_48x48@1";
pub(crate) const COUNTER_PATH: &str = "M/Counter";

/// Paths written by the creator itself.
pub(crate) const RESERVED_PATHS: [&str; 3] = [MAIN_PAGE_PATH, ILLUSTRATION_PATH, COUNTER_PATH];

/// Zip member holding an item's content.
pub(crate) fn content_member(path: &str) -> String {
    format!("C/{path}")
}

/// Zip member holding a metadata value.
pub(crate) fn metadata_member(name: &str) -> String {
    format!("M/{name}")
}

#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct Manifest {
    pub version: u32,
    pub main_path: Option<String>,
    pub metadata: BTreeMap<String, String>,
    pub entries: BTreeMap<String, EntryRecord>,
    /// Lowercased title word -> paths whose title contains it.
    pub suggestions: BTreeMap<String, BTreeSet<String>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub(crate) enum EntryRecord {
    Item {
        title: String,
        mimetype: String,
        member: String,
    },
    Redirect {
        title: String,
        target: String,
    },
}

impl EntryRecord {
    pub fn title(&self) -> &str {
        match self {
            Self::Item { title, .. } | Self::Redirect { title, .. } => title,
        }
    }
}

/// Lowercased words of a title, split on anything that is not alphanumeric.
pub(crate) fn title_words(title: &str) -> impl Iterator<Item = String> + '_ {
    title
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .map(str::to_lowercase)
}
