//! Ready-made encoding configurations for low-bandwidth offline content.

use crate::{Config, Error, Result};
use std::fmt;
use std::str::FromStr;

const VOICE_MP3_LOW: &[(&str, &str)] = &[
    ("-vn", ""),
    ("-codec:a", "mp3"),
    ("-ar", "44100"),
    ("-b:a", "48k"),
];

const VIDEO_WEBM_LOW: &[(&str, &str)] = &[
    ("-codec:v", "libvpx"),
    ("-quality", "best"),
    ("-b:v", "300k"),
    ("-maxrate", "300k"),
    ("-minrate", "300k"),
    ("-qmin", "30"),
    ("-qmax", "42"),
    ("-vf", "scale='480:trunc(ow/a/2)*2'"),
    ("-codec:a", "libvorbis"),
    ("-ar", "44100"),
    ("-b:a", "48k"),
];

const VIDEO_MP4_LOW: &[(&str, &str)] = &[
    ("-codec:v", "h264"),
    ("-b:v", "300k"),
    ("-maxrate", "300k"),
    ("-minrate", "300k"),
    ("-qmin", "30"),
    ("-qmax", "42"),
    ("-vf", "scale='480:trunc(ow/a/2)*2'"),
    ("-codec:a", "aac"),
    ("-ar", "44100"),
    ("-b:a", "48k"),
    ("-movflags", "+faststart"),
];

/// A named encoding preset for a (container, codec) combination.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Preset {
    /// Low bitrate mono-friendly MP3 for spoken audio.
    VoiceMp3Low,
    /// Low bitrate VP8/Vorbis WebM video.
    VideoWebmLow,
    /// Low bitrate H.264/AAC MP4 video.
    VideoMp4Low,
}

impl Preset {
    /// All presets.
    pub const ALL: [Preset; 3] = [Preset::VoiceMp3Low, Preset::VideoWebmLow, Preset::VideoMp4Low];

    /// CLI name of the preset.
    pub fn name(&self) -> &'static str {
        match self {
            Preset::VoiceMp3Low => "voice-mp3-low",
            Preset::VideoWebmLow => "video-webm-low",
            Preset::VideoMp4Low => "video-mp4-low",
        }
    }

    /// Output file extension.
    pub fn extension(&self) -> &'static str {
        match self {
            Preset::VoiceMp3Low => "mp3",
            Preset::VideoWebmLow => "webm",
            Preset::VideoMp4Low => "mp4",
        }
    }

    /// Mimetype of the produced file.
    pub fn mimetype(&self) -> &'static str {
        match self {
            Preset::VoiceMp3Low => "audio/mp3",
            Preset::VideoWebmLow => "video/webm",
            Preset::VideoMp4Low => "video/mp4",
        }
    }

    fn options(&self) -> &'static [(&'static str, &'static str)] {
        match self {
            Preset::VoiceMp3Low => VOICE_MP3_LOW,
            Preset::VideoWebmLow => VIDEO_WEBM_LOW,
            Preset::VideoMp4Low => VIDEO_MP4_LOW,
        }
    }

    /// Build the configuration for this preset.
    pub fn config(&self) -> Config {
        let base = Config::new();
        let base_defaults: Vec<(String, String)> = base
            .defaults()
            .map(|(flag, value)| (flag.to_string(), value.unwrap_or_default().to_string()))
            .collect();

        Config::with_defaults(
            self.options()
                .iter()
                .map(|&(flag, value)| (flag.to_string(), value.to_string()))
                .chain(base_defaults),
        )
    }

    /// Build the configuration and apply literal flag overrides.
    pub fn config_with<I, F, V>(&self, raw: I) -> Config
    where
        I: IntoIterator<Item = (F, V)>,
        F: Into<String>,
        V: Into<String>,
    {
        let mut config = self.config();
        for (flag, value) in raw {
            config.set_raw(flag, value);
        }
        config
    }
}

impl FromStr for Preset {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let normalized = s.to_lowercase().replace('_', "-");
        Preset::ALL
            .into_iter()
            .find(|p| p.name() == normalized)
            .ok_or_else(|| Error::InvalidInput(format!("unknown preset: {s}")))
    }
}

impl fmt::Display for Preset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn value_after(args: &[String], flag: &str) -> Option<String> {
        let idx = args.iter().position(|a| a == flag)?;
        args.get(idx + 1).cloned()
    }

    fn assert_options(args: &[String], expected: &[(&str, &str)]) {
        for (flag, value) in expected {
            assert_eq!(value_after(args, flag).as_deref(), Some(*value), "{flag}");
        }
    }

    #[test]
    fn test_video_webm_low() {
        let config = Preset::VideoWebmLow.config();
        assert_eq!(config.version(), 1);
        let args = config.to_args();
        assert_eq!(args.len(), 24);
        assert_options(
            &args,
            &[
                ("-codec:v", "libvpx"),
                ("-codec:a", "libvorbis"),
                ("-maxrate", "300k"),
                ("-minrate", "300k"),
                ("-b:v", "300k"),
                ("-ar", "44100"),
                ("-b:a", "48k"),
                ("-quality", "best"),
                ("-qmin", "30"),
                ("-qmax", "42"),
                ("-vf", "scale='480:trunc(ow/a/2)*2'"),
                ("-max_muxing_queue_size", "9999"),
            ],
        );
    }

    #[test]
    fn test_video_mp4_low() {
        let args = Preset::VideoMp4Low.config().to_args();
        assert_eq!(args.len(), 24);
        assert_options(
            &args,
            &[
                ("-codec:v", "h264"),
                ("-codec:a", "aac"),
                ("-maxrate", "300k"),
                ("-minrate", "300k"),
                ("-b:v", "300k"),
                ("-ar", "44100"),
                ("-b:a", "48k"),
                ("-movflags", "+faststart"),
                ("-qmin", "30"),
                ("-qmax", "42"),
                ("-vf", "scale='480:trunc(ow/a/2)*2'"),
            ],
        );
    }

    #[test]
    fn test_voice_mp3_low() {
        let args = Preset::VoiceMp3Low.config().to_args();
        assert_eq!(args.len(), 9);
        assert_eq!(args[0], "-vn");
        assert_options(&args, &[("-codec:a", "mp3"), ("-ar", "44100"), ("-b:a", "48k")]);
    }

    #[test]
    fn test_raw_overrides_keep_length() {
        let mut config = Preset::VideoWebmLow.config_with([("-ar", "50000")]);
        config.set_raw("-bufsize", "900k");
        let args = config.to_args();
        assert_eq!(value_after(&args, "-ar").as_deref(), Some("50000"));
        assert_eq!(value_after(&args, "-bufsize").as_deref(), Some("900k"));
        assert_eq!(args.len(), 26);

        let mut config = Preset::VoiceMp3Low.config_with([("-ar", "50000")]);
        config.set_raw("-b:a", "128k");
        let args = config.to_args();
        assert_eq!(args.len(), 9);
        assert_eq!(value_after(&args, "-ar").as_deref(), Some("50000"));
        assert_eq!(value_after(&args, "-b:a").as_deref(), Some("128k"));
    }

    #[test]
    fn test_semantic_update_on_preset() {
        let mut config = Preset::VideoMp4Low.config();
        config
            .update([("quantizer_scale_range", crate::ParamValue::Range(20, 28))])
            .unwrap();
        let args = config.to_args();
        assert_eq!(args.len(), 24);
        assert_eq!(value_after(&args, "-qmin").as_deref(), Some("20"));
        assert_eq!(value_after(&args, "-qmax").as_deref(), Some("28"));
    }

    #[test]
    fn test_preset_metadata() {
        assert_eq!(Preset::VoiceMp3Low.extension(), "mp3");
        assert_eq!(Preset::VideoWebmLow.mimetype(), "video/webm");
        assert_eq!("video_mp4_low".parse::<Preset>().unwrap(), Preset::VideoMp4Low);
        assert_eq!("Voice-MP3-Low".parse::<Preset>().unwrap(), Preset::VoiceMp3Low);
        assert!("video-avi-high".parse::<Preset>().is_err());
    }
}
