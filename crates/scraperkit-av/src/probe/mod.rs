//! Media file probing through ffprobe.

mod ffprobe;
mod types;

pub use ffprobe::{parse_ffprobe_output, Prober};
pub use types::MediaInfo;

use crate::Result;
use std::path::Path;

/// Probe a media file with the `ffprobe` found in `PATH`.
pub fn probe_media(path: &Path) -> Result<MediaInfo> {
    Prober::new().probe(path)
}
