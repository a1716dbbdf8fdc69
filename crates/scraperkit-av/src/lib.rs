//! # scraperkit-av
//!
//! Typed ffmpeg configuration and invocation for offline content scrapers.
//!
//! This crate provides:
//! - [`Config`]: semantic encoding parameters mapped to ffmpeg flags, with
//!   validated quantizer bounds, raw flag overrides and deterministic
//!   serialization
//! - [`Preset`]: low-bandwidth audio/video configurations
//! - [`probe_media`]: stream codecs, duration and bitrate through ffprobe
//! - [`Transcoder`]: re-encoding with optional source removal and failsafe mode
//!
//! ## Features
//!
//! - `tracing` - Enable tracing support
//!
//! ## Example
//!
//! ```no_run
//! use scraperkit_av::{Preset, ReencodeOptions, Transcoder};
//! use std::path::Path;
//!
//! let args = Preset::VideoWebmLow.config().to_args();
//! let ok = Transcoder::new().reencode(
//!     Path::new("video.mp4"),
//!     Path::new("video.webm"),
//!     &args,
//!     &ReencodeOptions::default(),
//! )?;
//! assert!(ok);
//! # Ok::<(), scraperkit_av::Error>(())
//! ```

mod command;
mod config;
mod error;
pub mod presets;
pub mod probe;
pub mod tools;
pub mod transcode;
pub mod workspace;

// Re-exports
pub use command::{ToolCommand, ToolOutput};
pub use config::{Config, Param, ParamValue, QUANTIZER_BOUNDS};
pub use error::{Error, Result};
pub use presets::Preset;
pub use probe::{probe_media, MediaInfo, Prober};
pub use tools::{check_tool, check_tools, get_tool_path, require_tool, ToolInfo};
pub use transcode::{ReencodeOptions, Transcoder};
pub use workspace::Workspace;
