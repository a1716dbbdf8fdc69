//! Directory-to-archive builder.

use crate::classify::{classify, find_title};
use crate::creator::{today, Creator, Metadata};
use crate::redirects::read_redirects_file;
use crate::{Error, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Everything needed to turn a directory into an archive.
#[derive(Debug, Clone, Deserialize)]
pub struct BuildRequest {
    /// Source directory.
    pub build_dir: PathBuf,
    /// Archive path to create.
    pub fpath: PathBuf,
    pub name: String,
    /// Path of the main page, relative to `build_dir`.
    pub main_page: String,
    /// PNG illustration, relative to `build_dir`.
    pub illustration: String,
    pub title: String,
    pub description: String,
    /// Optional TSV file of redirects.
    #[serde(default)]
    pub redirects_file: Option<PathBuf>,
    /// Cancel the creator on failure instead of finalizing and removing
    /// the partial archive.
    #[serde(default = "default_true")]
    pub workaround_nocancel: bool,
    #[serde(default = "default_language")]
    pub language: String,
    #[serde(default = "default_unknown")]
    pub creator: String,
    #[serde(default = "default_unknown")]
    pub publisher: String,
    #[serde(default = "today")]
    pub date: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub flavour: Option<String>,
    #[serde(default)]
    pub scraper: Option<String>,
    #[serde(default)]
    pub ignore_duplicates: bool,
}

fn default_true() -> bool {
    true
}

fn default_language() -> String {
    "eng".to_string()
}

fn default_unknown() -> String {
    "-".to_string()
}

impl BuildRequest {
    /// Request with default optional fields.
    pub fn new(
        build_dir: impl Into<PathBuf>,
        fpath: impl Into<PathBuf>,
        name: impl Into<String>,
        main_page: impl Into<String>,
        illustration: impl Into<String>,
        title: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        let metadata = Metadata::new(name, title, description);
        Self {
            build_dir: build_dir.into(),
            fpath: fpath.into(),
            main_page: main_page.into(),
            illustration: illustration.into(),
            redirects_file: None,
            workaround_nocancel: true,
            ignore_duplicates: false,
            name: metadata.name,
            title: metadata.title,
            description: metadata.description,
            language: metadata.language,
            creator: metadata.creator,
            publisher: metadata.publisher,
            date: metadata.date,
            tags: metadata.tags,
            source: metadata.source,
            flavour: metadata.flavour,
            scraper: metadata.scraper,
        }
    }

    /// Metadata as stored in the archive.
    pub fn metadata(&self) -> Metadata {
        Metadata {
            name: self.name.clone(),
            title: self.title.clone(),
            description: self.description.clone(),
            language: self.language.clone(),
            creator: self.creator.clone(),
            publisher: self.publisher.clone(),
            date: self.date.clone(),
            tags: self.tags.clone(),
            source: self.source.clone(),
            flavour: self.flavour.clone(),
            scraper: self.scraper.clone(),
        }
    }
}

/// Build an archive at `request.fpath` from `request.build_dir`.
///
/// The archive only appears at `fpath` once every step succeeded. On failure
/// `fpath` is left as it was: absent, or still holding an earlier file.
/// Symbolic links to files are followed.
pub fn make_archive(request: &BuildRequest) -> Result<PathBuf> {
    let build_dir = &request.build_dir;
    if !build_dir.is_dir() {
        return Err(Error::BuildDirNotFound {
            path: build_dir.clone(),
        });
    }
    let illustration = build_dir.join(&request.illustration);
    if !illustration.is_file() {
        return Err(Error::IllustrationNotFound { path: illustration });
    }

    #[cfg(feature = "tracing")]
    tracing::info!(
        "Building {} from {}",
        request.fpath.display(),
        build_dir.display()
    );

    let mut creator = Creator::create(&request.fpath, &request.main_page, request.metadata())?
        .ignore_duplicates(request.ignore_duplicates);
    creator.set_illustration(fs::read(&illustration)?);

    if let Err(err) = populate(&mut creator, request) {
        #[cfg(feature = "tracing")]
        tracing::error!("Archive build failed: {}", err);

        if request.workaround_nocancel {
            creator.cancel();
        } else {
            discard_finalized(creator);
        }
        return Err(err);
    }

    creator.finish()
}

/// Add every file under the build dir, then the redirects.
fn populate(creator: &mut Creator, request: &BuildRequest) -> Result<()> {
    let build_dir = &request.build_dir;
    for entry in WalkDir::new(build_dir).follow_links(true).sort_by_file_name() {
        let entry = entry?;
        if !entry.file_type().is_file()
            || entry.path() == creator.staging_path()
            || entry.path() == creator.fpath()
        {
            continue;
        }
        let path = relative_path(build_dir, entry.path());
        add_file(creator, &path, entry.path())?;
    }

    if let Some(redirects_file) = &request.redirects_file {
        for redirect in read_redirects_file(redirects_file)? {
            creator.add_redirect(&redirect.alias_path(), &redirect.title, &redirect.target)?;
        }
    }
    Ok(())
}

fn add_file(creator: &mut Creator, path: &str, file: &Path) -> Result<()> {
    let classification = classify(file)?;
    let content = fs::read(file)?;
    let title = if classification.is_html() {
        find_title(&String::from_utf8_lossy(&content)).unwrap_or_default()
    } else {
        String::new()
    };

    #[cfg(feature = "tracing")]
    tracing::debug!("Adding {} ({})", path, classification.mimetype);

    creator.add_item(path, &title, &classification.mimetype, &content)?;
    Ok(())
}

/// Legacy failure path: finalize the partial archive, then remove it.
fn discard_finalized(creator: Creator) {
    if let Err(_e) = creator.abandon() {
        #[cfg(feature = "tracing")]
        tracing::warn!("Finalizing partial archive failed: {}", _e);
    }
}

/// `/`-separated path of `file` relative to `root`.
fn relative_path(root: &Path, file: &Path) -> String {
    let relative = file.strip_prefix(root).unwrap_or(file);
    relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}
