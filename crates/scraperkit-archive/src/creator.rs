//! Archive writer.
//!
//! A [`Creator`] stages everything into a temporary file next to the target
//! path. Only [`Creator::finish`] makes the archive appear at that path;
//! dropping or cancelling the creator discards the staged data.

use crate::manifest::{
    content_member, metadata_member, title_words, EntryRecord, Manifest, COUNTER_PATH,
    ILLUSTRATION_PATH, MAIN_PAGE_PATH, MANIFEST_MEMBER, MANIFEST_VERSION, RESERVED_PATHS,
};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

/// Descriptive metadata stored in `M/<Name>` members.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Metadata {
    pub name: String,
    pub title: String,
    pub description: String,
    pub language: String,
    pub creator: String,
    pub publisher: String,
    /// `YYYY-MM-DD`.
    pub date: String,
    pub tags: Vec<String>,
    pub source: Option<String>,
    pub flavour: Option<String>,
    pub scraper: Option<String>,
}

impl Metadata {
    /// Metadata with the usual defaults: English, unknown creator and
    /// publisher, dated today.
    pub fn new(
        name: impl Into<String>,
        title: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            title: title.into(),
            description: description.into(),
            language: "eng".to_string(),
            creator: "-".to_string(),
            publisher: "-".to_string(),
            date: today(),
            tags: Vec::new(),
            source: None,
            flavour: None,
            scraper: None,
        }
    }

    /// Name/value pairs in member order; unset optional values are skipped.
    pub fn to_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = vec![
            ("Name", self.name.clone()),
            ("Title", self.title.clone()),
            ("Description", self.description.clone()),
            ("Language", self.language.clone()),
            ("Creator", self.creator.clone()),
            ("Publisher", self.publisher.clone()),
            ("Date", self.date.clone()),
        ];
        if !self.tags.is_empty() {
            pairs.push(("Tags", self.tags.join(";")));
        }
        let optional = [
            ("Source", &self.source),
            ("Flavour", &self.flavour),
            ("Scraper", &self.scraper),
        ];
        for (name, value) in optional {
            if let Some(value) = value {
                pairs.push((name, value.clone()));
            }
        }
        pairs
    }
}

/// Current local date as `YYYY-MM-DD`.
pub fn today() -> String {
    chrono::Local::now().format("%Y-%m-%d").to_string()
}

/// Incrementally writes one archive file.
pub struct Creator {
    fpath: PathBuf,
    main_path: String,
    metadata: Metadata,
    illustration: Option<Vec<u8>>,
    ignore_duplicates: bool,
    staging_path: PathBuf,
    writer: ZipWriter<NamedTempFile>,
    entries: BTreeMap<String, EntryRecord>,
    mimetype_counts: BTreeMap<String, u64>,
}

impl Creator {
    /// Start a new archive destined for `fpath`.
    ///
    /// The parent directory of `fpath` must already exist.
    pub fn create(
        fpath: impl Into<PathBuf>,
        main_path: impl Into<String>,
        metadata: Metadata,
    ) -> Result<Self> {
        let fpath = fpath.into();
        let parent = match fpath.parent() {
            Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
            _ => PathBuf::from("."),
        };
        let staging = tempfile::Builder::new()
            .prefix(".scraperkit-")
            .suffix(".tmp")
            .tempfile_in(&parent)?;

        #[cfg(feature = "tracing")]
        tracing::debug!(
            "Staging archive for {} in {}",
            fpath.display(),
            staging.path().display()
        );

        Ok(Self {
            fpath,
            main_path: main_path.into(),
            metadata,
            illustration: None,
            ignore_duplicates: false,
            staging_path: staging.path().to_path_buf(),
            writer: ZipWriter::new(staging),
            entries: BTreeMap::new(),
            mimetype_counts: BTreeMap::new(),
        })
    }

    /// Skip entries whose path is already taken instead of failing.
    pub fn ignore_duplicates(mut self, ignore: bool) -> Self {
        self.ignore_duplicates = ignore;
        self
    }

    /// PNG bytes for the 48x48 illustration.
    pub fn set_illustration(&mut self, png: Vec<u8>) {
        self.illustration = Some(png);
    }

    /// Final path of the archive.
    pub fn fpath(&self) -> &Path {
        &self.fpath
    }

    /// Temporary file the archive is written to until `finish`.
    pub fn staging_path(&self) -> &Path {
        &self.staging_path
    }

    /// Number of entries added so far (front entries are added by `finish`).
    pub fn entry_count(&self) -> usize {
        self.entries.len()
    }

    /// Whether `path` is already an entry.
    pub fn has_entry(&self, path: &str) -> bool {
        self.entries.contains_key(path)
    }

    /// Add a content entry. Returns `false` when a duplicate was skipped.
    pub fn add_item(
        &mut self,
        path: &str,
        title: &str,
        mimetype: &str,
        content: &[u8],
    ) -> Result<bool> {
        reject_reserved(path)?;
        if !self.claim(path)? {
            return Ok(false);
        }

        let member = content_member(path);
        self.write_member(&member, mimetype, content)?;
        *self.mimetype_counts.entry(mimetype.to_string()).or_default() += 1;
        self.entries.insert(
            path.to_string(),
            EntryRecord::Item {
                title: title.to_string(),
                mimetype: mimetype.to_string(),
                member,
            },
        );
        Ok(true)
    }

    /// Add an alias at `path` for the existing item `target`.
    /// Returns `false` when a duplicate was skipped.
    pub fn add_redirect(&mut self, path: &str, title: &str, target: &str) -> Result<bool> {
        reject_reserved(path)?;
        if !matches!(self.entries.get(target), Some(EntryRecord::Item { .. })) {
            return Err(Error::RedirectTarget {
                alias: path.to_string(),
                target: target.to_string(),
            });
        }
        if !self.claim(path)? {
            return Ok(false);
        }

        self.entries.insert(
            path.to_string(),
            EntryRecord::Redirect {
                title: title.to_string(),
                target: target.to_string(),
            },
        );
        Ok(true)
    }

    /// Reserve `path`, honouring the duplicate policy.
    fn claim(&self, path: &str) -> Result<bool> {
        if !self.entries.contains_key(path) {
            return Ok(true);
        }
        if self.ignore_duplicates {
            #[cfg(feature = "tracing")]
            tracing::warn!("Skipping duplicate entry {}", path);
            return Ok(false);
        }
        Err(Error::DuplicateEntry(path.to_string()))
    }

    fn write_member(&mut self, member: &str, mimetype: &str, content: &[u8]) -> Result<()> {
        // Already-compressed media gains nothing from deflate.
        let method = if crate::classify::is_textual(mimetype) {
            CompressionMethod::Deflated
        } else {
            CompressionMethod::Stored
        };
        let options = SimpleFileOptions::default()
            .compression_method(method)
            .large_file(content.len() as u64 >= u32::MAX as u64);
        self.writer.start_file(member, options)?;
        self.writer.write_all(content)?;
        Ok(())
    }

    /// Write front entries, metadata and the manifest, then move the
    /// archive into place.
    pub fn finish(self) -> Result<PathBuf> {
        let fpath = self.fpath.clone();
        let (staging, _entry_count) = self.finalize()?;
        staging.persist(&fpath).map_err(|e| Error::Io(e.error))?;

        #[cfg(feature = "tracing")]
        tracing::info!("Created {} with {} entries", fpath.display(), _entry_count);

        Ok(fpath)
    }

    /// Complete the archive, then delete it without ever writing to `fpath`.
    pub fn abandon(self) -> Result<()> {
        #[cfg(feature = "tracing")]
        tracing::debug!("Abandoning finalized archive for {}", self.fpath.display());

        let (staging, _) = self.finalize()?;
        staging.close()?;
        Ok(())
    }

    /// Write everything into the staging file and close the container.
    fn finalize(mut self) -> Result<(NamedTempFile, usize)> {
        self.add_front_entries()?;

        let metadata: BTreeMap<String, String> = self
            .metadata
            .to_pairs()
            .into_iter()
            .map(|(name, value)| (name.to_string(), value))
            .collect();
        for (name, value) in &metadata {
            self.write_member(&metadata_member(name), "text/plain", value.as_bytes())?;
        }

        let manifest = Manifest {
            version: MANIFEST_VERSION,
            main_path: self
                .entries
                .contains_key(MAIN_PAGE_PATH)
                .then(|| self.main_path.clone()),
            metadata,
            suggestions: self.suggestion_index(),
            entries: self.entries,
        };
        self.writer.start_file(
            MANIFEST_MEMBER,
            SimpleFileOptions::default().compression_method(CompressionMethod::Deflated),
        )?;
        serde_json::to_writer(&mut self.writer, &manifest)?;

        let staging = self.writer.finish()?;
        Ok((staging, manifest.entries.len()))
    }

    /// Discard everything staged so far.
    pub fn cancel(self) {
        #[cfg(feature = "tracing")]
        tracing::debug!("Cancelled archive {}", self.fpath.display());
        drop(self);
    }

    fn add_front_entries(&mut self) -> Result<()> {
        let main_is_item = matches!(
            self.entries.get(&self.main_path),
            Some(EntryRecord::Item { .. })
        );
        if main_is_item {
            self.entries.insert(
                MAIN_PAGE_PATH.to_string(),
                EntryRecord::Redirect {
                    title: String::new(),
                    target: self.main_path.clone(),
                },
            );
        } else {
            #[cfg(feature = "tracing")]
            tracing::warn!("Main page {} is not an item in the archive", self.main_path);
        }

        if let Some(png) = self.illustration.take() {
            self.add_front_item(ILLUSTRATION_PATH, "image/png", &png)?;
        }

        let counter = self
            .mimetype_counts
            .iter()
            .map(|(mimetype, count)| format!("{mimetype}={count}"))
            .collect::<Vec<_>>()
            .join(";");
        self.add_front_item(COUNTER_PATH, "text/plain", counter.as_bytes())
    }

    /// Front entries are stored under their own path, outside `C/`.
    fn add_front_item(&mut self, path: &str, mimetype: &str, content: &[u8]) -> Result<()> {
        self.write_member(path, mimetype, content)?;
        self.entries.insert(
            path.to_string(),
            EntryRecord::Item {
                title: String::new(),
                mimetype: mimetype.to_string(),
                member: path.to_string(),
            },
        );
        Ok(())
    }

    fn suggestion_index(&self) -> BTreeMap<String, BTreeSet<String>> {
        let mut index: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();
        for (path, record) in &self.entries {
            for word in title_words(record.title()) {
                index.entry(word).or_default().insert(path.clone());
            }
        }
        index
    }
}

/// Front entry paths belong to the creator.
fn reject_reserved(path: &str) -> Result<()> {
    if RESERVED_PATHS.contains(&path) {
        return Err(Error::ReservedPath(path.to_string()));
    }
    Ok(())
}
