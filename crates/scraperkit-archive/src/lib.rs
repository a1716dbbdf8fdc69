//! # scraperkit-archive
//!
//! Self-contained offline content archives built from a directory tree.
//!
//! This crate provides:
//! - [`make_archive`]: walk a build directory, classify every file, add
//!   redirects from a TSV side file and write one archive
//! - [`Creator`]: the lower-level writer, staging into a temporary file that
//!   only becomes visible once finished
//! - [`Archive`]: read-back access, including title suggestions
//!
//! ## Features
//!
//! - `tracing` - Enable tracing support
//!
//! ## Example
//!
//! ```no_run
//! use scraperkit_archive::{make_archive, Archive, BuildRequest};
//!
//! let mut request = BuildRequest::new(
//!     "build", "test.zim", "test", "welcome", "commons48.png", "Test", "A test archive",
//! );
//! request.redirects_file = Some("redirects.tsv".into());
//! let fpath = make_archive(&request)?;
//!
//! let archive = Archive::open(&fpath)?;
//! println!("{} entries", archive.entry_count());
//! # Ok::<(), scraperkit_archive::Error>(())
//! ```

pub mod build;
pub mod classify;
pub mod creator;
mod error;
mod manifest;
pub mod reader;
pub mod redirects;

// Re-exports
pub use build::{make_archive, BuildRequest};
pub use classify::{classify, find_title, Classification};
pub use creator::{Creator, Metadata};
pub use error::{Error, Result};
pub use reader::{Archive, Item};
pub use redirects::{parse_redirects, read_redirects_file, Redirect};
