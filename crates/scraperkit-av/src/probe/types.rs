//! Media information types.

use serde::{Deserialize, Serialize};

/// Summary of a media file as reported by ffprobe.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaInfo {
    /// Codec name of every stream, in stream order.
    pub codecs: Vec<String>,
    /// Duration in whole seconds (fraction truncated).
    pub duration: u64,
    /// Overall bitrate in bits per second.
    pub bitrate: u64,
}

impl MediaInfo {
    /// Whether any stream uses the given codec.
    pub fn has_codec(&self, codec: &str) -> bool {
        self.codecs.iter().any(|c| c.eq_ignore_ascii_case(codec))
    }
}
