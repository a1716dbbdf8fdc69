//! FFprobe-based media probing.

use super::types::MediaInfo;
use crate::command::ToolCommand;
use crate::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize)]
struct FfprobeOutput {
    #[serde(default)]
    streams: Vec<FfprobeStream>,
    format: Option<FfprobeFormat>,
}

#[derive(Debug, Deserialize)]
struct FfprobeStream {
    codec_name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct FfprobeFormat {
    duration: Option<String>,
    bit_rate: Option<String>,
}

/// Runs ffprobe against media files.
#[derive(Debug, Clone)]
pub struct Prober {
    program: PathBuf,
}

impl Default for Prober {
    fn default() -> Self {
        Self::new()
    }
}

impl Prober {
    /// Prober using `ffprobe` from `PATH`.
    pub fn new() -> Self {
        Self::with_program("ffprobe")
    }

    /// Prober using an explicit ffprobe binary.
    pub fn with_program(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// Probe a media file for its stream codecs, duration and bitrate.
    ///
    /// # Errors
    ///
    /// - [`Error::FileNotFound`] if `path` does not exist.
    /// - [`Error::ProcessFailed`] if ffprobe exits with a non-zero status.
    /// - [`Error::ParseError`] if the output lacks the expected fields.
    pub fn probe(&self, path: &Path) -> Result<MediaInfo> {
        if !path.exists() {
            return Err(Error::file_not_found(path));
        }

        #[cfg(feature = "tracing")]
        tracing::debug!("Probing {:?} with {:?}", path, self.program);

        let output = ToolCommand::new(&self.program)
            .args([
                "-v",
                "quiet",
                "-print_format",
                "json",
                "-show_entries",
                "stream=codec_name:format=duration,bit_rate",
            ])
            .arg(crate::transcode::file_url(path))
            .execute()?;

        parse_ffprobe_output(&output.stdout)
    }
}

/// Parse ffprobe's JSON output into a [`MediaInfo`].
pub fn parse_ffprobe_output(json: &str) -> Result<MediaInfo> {
    let output: FfprobeOutput = serde_json::from_str(json)
        .map_err(|e| Error::parse_error("ffprobe", format!("invalid JSON: {e}")))?;

    let format = output
        .format
        .ok_or_else(|| Error::parse_error("ffprobe", "missing format section"))?;

    let duration = format
        .duration
        .as_deref()
        .and_then(parse_whole_seconds)
        .ok_or_else(|| Error::parse_error("ffprobe", "missing or invalid duration"))?;

    let bitrate = format
        .bit_rate
        .as_deref()
        .and_then(|s| s.trim().parse::<u64>().ok())
        .ok_or_else(|| Error::parse_error("ffprobe", "missing or invalid bit_rate"))?;

    let codecs = output
        .streams
        .into_iter()
        .filter_map(|s| s.codec_name)
        .collect();

    Ok(MediaInfo {
        codecs,
        duration,
        bitrate,
    })
}

/// `"2.043000"` -> `2`; the fraction is dropped, not rounded.
fn parse_whole_seconds(value: &str) -> Option<u64> {
    let whole = value.trim().split('.').next()?;
    whole.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_video_output() {
        let json = r#"{
            "programs": [],
            "streams": [{"codec_name": "h264"}, {"codec_name": "vorbis"}],
            "format": {"duration": "2.043000", "bit_rate": "3819022"}
        }"#;
        let info = parse_ffprobe_output(json).unwrap();
        assert_eq!(info.codecs, ["h264", "vorbis"]);
        assert_eq!(info.duration, 2);
        assert_eq!(info.bitrate, 3_819_022);
    }

    #[test]
    fn test_duration_is_truncated() {
        let json = r#"{"streams": [{"codec_name": "mp3"}],
                       "format": {"duration": "2.951000", "bit_rate": "129066"}}"#;
        assert_eq!(parse_ffprobe_output(json).unwrap().duration, 2);
    }

    #[test]
    fn test_missing_format_is_parse_error() {
        let err = parse_ffprobe_output(r#"{"streams": []}"#).unwrap_err();
        assert!(matches!(err, Error::ParseError { .. }));
    }

    #[test]
    fn test_garbage_is_parse_error() {
        let err = parse_ffprobe_output("stream,h264\nformat,2.0,1000").unwrap_err();
        assert!(matches!(err, Error::ParseError { .. }));
    }

    #[test]
    fn test_missing_file() {
        let err = Prober::new()
            .probe(Path::new("/nonexistent/clip.mkv"))
            .unwrap_err();
        assert!(matches!(err, Error::FileNotFound { .. }));
    }

    #[test]
    fn test_parse_whole_seconds() {
        assert_eq!(parse_whole_seconds("2"), Some(2));
        assert_eq!(parse_whole_seconds("7200.5"), Some(7200));
        assert_eq!(parse_whole_seconds("N/A"), None);
    }
}
