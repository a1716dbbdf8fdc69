//! Typed ffmpeg encoding configuration.
//!
//! A [`Config`] holds three layers of flags:
//!
//! - **defaults**: always-present flag/value pairs fixed at construction
//!   (presets differ from the base config only here);
//! - **semantic parameters** ([`Param`]): validated values such as bitrates or
//!   the quantizer range, each expanded to one or more flags;
//! - **raw flags**: literal overrides that bypass validation and win over
//!   everything else for the same flag.
//!
//! ```
//! use scraperkit_av::{Config, ParamValue};
//!
//! let mut config = Config::new();
//! config
//!     .update([
//!         ("video_codec", ParamValue::from("h264")),
//!         ("quantizer_scale_range", (21, 35).into()),
//!     ])
//!     .unwrap();
//! assert_eq!(
//!     config.to_args(),
//!     ["-codec:v", "h264", "-qmin", "21", "-qmax", "35", "-max_muxing_queue_size", "9999"]
//! );
//! ```

use crate::{Error, Result};
use std::collections::HashMap;
use std::fmt;
use std::ops::RangeInclusive;
use std::str::FromStr;

/// Valid bounds for each side of the quantizer scale range.
pub const QUANTIZER_BOUNDS: RangeInclusive<i64> = 0..=51;

/// Flags present in every configuration unless overridden.
const BASE_DEFAULTS: &[(&str, &str)] = &[("-max_muxing_queue_size", "9999")];

/// A semantic encoding parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Param {
    VideoCodec,
    AudioCodec,
    MaxVideoBitrate,
    MinVideoBitrate,
    TargetVideoBitrate,
    Buffersize,
    AudioSamplingRate,
    TargetAudioBitrate,
    /// `(qmin, qmax)`, expanded to `-qmin` and `-qmax`.
    QuantizerScaleRange,
    /// Scaling expression, emitted as `-vf scale='<expr>'`.
    VideoScale,
}

impl Param {
    /// All parameters, in serialization order.
    pub const ALL: [Param; 10] = [
        Param::VideoCodec,
        Param::AudioCodec,
        Param::MaxVideoBitrate,
        Param::MinVideoBitrate,
        Param::TargetVideoBitrate,
        Param::Buffersize,
        Param::AudioSamplingRate,
        Param::TargetAudioBitrate,
        Param::QuantizerScaleRange,
        Param::VideoScale,
    ];

    /// Name used in override mappings and on the command line.
    pub fn name(&self) -> &'static str {
        match self {
            Param::VideoCodec => "video_codec",
            Param::AudioCodec => "audio_codec",
            Param::MaxVideoBitrate => "max_video_bitrate",
            Param::MinVideoBitrate => "min_video_bitrate",
            Param::TargetVideoBitrate => "target_video_bitrate",
            Param::Buffersize => "buffersize",
            Param::AudioSamplingRate => "audio_sampling_rate",
            Param::TargetAudioBitrate => "target_audio_bitrate",
            Param::QuantizerScaleRange => "quantizer_scale_range",
            Param::VideoScale => "video_scale",
        }
    }

    /// The ffmpeg flags this parameter writes.
    pub fn flags(&self) -> &'static [&'static str] {
        match self {
            Param::VideoCodec => &["-codec:v"],
            Param::AudioCodec => &["-codec:a"],
            Param::MaxVideoBitrate => &["-maxrate"],
            Param::MinVideoBitrate => &["-minrate"],
            Param::TargetVideoBitrate => &["-b:v"],
            Param::Buffersize => &["-bufsize"],
            Param::AudioSamplingRate => &["-ar"],
            Param::TargetAudioBitrate => &["-b:a"],
            Param::QuantizerScaleRange => &["-qmin", "-qmax"],
            Param::VideoScale => &["-vf"],
        }
    }

    /// Whether the parameter takes a `(min, max)` pair.
    pub fn is_range(&self) -> bool {
        matches!(self, Param::QuantizerScaleRange)
    }

    /// Parse a textual value (as given on a command line) for this parameter.
    ///
    /// Ranges accept `min,max` or `min:max`.
    pub fn parse_value(&self, raw: &str) -> Result<ParamValue> {
        if !self.is_range() {
            return Ok(ParamValue::Text(raw.to_string()));
        }

        let (min, max) = raw
            .split_once(',')
            .or_else(|| raw.split_once(':'))
            .ok_or_else(|| Error::invalid_value(self.name(), format!("expected min,max: {raw}")))?;
        let parse = |s: &str| {
            s.trim()
                .parse::<i64>()
                .map_err(|e| Error::invalid_value(self.name(), format!("{s:?}: {e}")))
        };
        Ok(ParamValue::Range(parse(min)?, parse(max)?))
    }

    fn validate(&self, value: &ParamValue) -> Result<()> {
        match (self.is_range(), value) {
            (true, ParamValue::Range(min, max)) => {
                for (label, bound) in [("qmin", min), ("qmax", max)] {
                    if !QUANTIZER_BOUNDS.contains(bound) {
                        return Err(Error::invalid_value(
                            self.name(),
                            format!(
                                "{label} {bound} outside {}..={}",
                                QUANTIZER_BOUNDS.start(),
                                QUANTIZER_BOUNDS.end()
                            ),
                        ));
                    }
                }
                if min > max {
                    return Err(Error::invalid_value(
                        self.name(),
                        format!("qmin {min} greater than qmax {max}"),
                    ));
                }
                Ok(())
            }
            (true, ParamValue::Text(_)) => Err(Error::invalid_value(
                self.name(),
                "expected a (min, max) pair",
            )),
            (false, ParamValue::Range(..)) => {
                Err(Error::invalid_value(self.name(), "expected a text value"))
            }
            (false, ParamValue::Text(_)) => Ok(()),
        }
    }
}

impl FromStr for Param {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Param::ALL
            .into_iter()
            .find(|p| p.name() == s)
            .ok_or_else(|| Error::UnknownParameter(s.to_string()))
    }
}

impl fmt::Display for Param {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Value of a semantic parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParamValue {
    Text(String),
    Range(i64, i64),
}

impl From<&str> for ParamValue {
    fn from(s: &str) -> Self {
        ParamValue::Text(s.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(s: String) -> Self {
        ParamValue::Text(s)
    }
}

impl From<(i64, i64)> for ParamValue {
    fn from((min, max): (i64, i64)) -> Self {
        ParamValue::Range(min, max)
    }
}

/// Versioned ffmpeg encoding configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    defaults: Vec<(String, Option<String>)>,
    semantic: HashMap<Param, ParamValue>,
    raw: Vec<(String, Option<String>)>,
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

impl Config {
    /// Configuration format version.
    pub const VERSION: u32 = 1;

    /// Configuration with the base default flags only.
    pub fn new() -> Self {
        Self::with_defaults(BASE_DEFAULTS.iter().copied())
    }

    /// Configuration with an explicit set of always-present flags.
    ///
    /// An empty value marks a switch (a flag emitted without value).
    pub fn with_defaults<I, F, V>(defaults: I) -> Self
    where
        I: IntoIterator<Item = (F, V)>,
        F: Into<String>,
        V: Into<String>,
    {
        let mut config = Self {
            defaults: Vec::new(),
            semantic: HashMap::new(),
            raw: Vec::new(),
        };
        for (flag, value) in defaults {
            upsert(&mut config.defaults, flag.into(), switch_or_value(value.into()));
        }
        config
    }

    /// Base configuration updated with the given semantic overrides.
    pub fn build_from<I, K, V>(overrides: I) -> Result<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<ParamValue>,
    {
        let mut config = Self::new();
        config.update(overrides)?;
        Ok(config)
    }

    /// Configuration format version.
    pub fn version(&self) -> u32 {
        Self::VERSION
    }

    /// The always-present flags, in emission order.
    pub fn defaults(&self) -> impl Iterator<Item = (&str, Option<&str>)> {
        self.defaults
            .iter()
            .map(|(flag, value)| (flag.as_str(), value.as_deref()))
    }

    /// Apply semantic overrides by parameter name.
    ///
    /// Unknown names are rejected. Either every override is applied or, on
    /// the first invalid one, none is.
    pub fn update<I, K, V>(&mut self, overrides: I) -> Result<()>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<ParamValue>,
    {
        let mut staged = Vec::new();
        for (name, value) in overrides {
            let param: Param = name.as_ref().parse()?;
            let value = value.into();
            param.validate(&value)?;
            staged.push((param, value));
        }

        for (param, value) in staged {
            self.semantic.insert(param, value);
        }
        Ok(())
    }

    /// Set a single semantic parameter.
    pub fn set(&mut self, param: Param, value: impl Into<ParamValue>) -> Result<()> {
        let value = value.into();
        param.validate(&value)?;
        self.semantic.insert(param, value);
        Ok(())
    }

    /// Current value of a semantic parameter.
    pub fn get(&self, param: Param) -> Option<&ParamValue> {
        self.semantic.get(&param)
    }

    /// Override a literal flag. An empty value turns the flag into a switch.
    pub fn set_raw(&mut self, flag: impl Into<String>, value: impl Into<String>) -> &mut Self {
        upsert(&mut self.raw, flag.into(), switch_or_value(value.into()));
        self
    }

    /// Add a flag emitted without value (e.g. `-vn`).
    pub fn set_switch(&mut self, flag: impl Into<String>) -> &mut Self {
        upsert(&mut self.raw, flag.into(), None);
        self
    }

    /// Value a flag will be serialized with, if it is emitted at all.
    ///
    /// Switches resolve to an empty string.
    pub fn flag(&self, flag: &str) -> Option<String> {
        self.resolve(flag, &self.semantic_flags())
            .map(Option::unwrap_or_default)
    }

    /// Serialize to the ordered ffmpeg argument list.
    pub fn to_args(&self) -> Vec<String> {
        let semantic = self.semantic_flags();
        let mut args = Vec::new();

        let declared: Vec<&str> = Param::ALL.iter().flat_map(|p| p.flags()).copied().collect();

        for flag in &declared {
            if self.is_default(flag) {
                continue;
            }
            if let Some(value) = self.resolve(flag, &semantic) {
                push_flag(&mut args, flag, value);
            }
        }

        for (flag, value) in &self.raw {
            if declared.contains(&flag.as_str()) || self.is_default(flag) {
                continue;
            }
            push_flag(&mut args, flag, value.clone());
        }

        for (flag, default) in &self.defaults {
            let value = self
                .resolve_override(flag, &semantic)
                .unwrap_or_else(|| default.clone());
            push_flag(&mut args, flag, value);
        }

        args
    }

    fn is_default(&self, flag: &str) -> bool {
        self.defaults.iter().any(|(f, _)| f == flag)
    }

    /// Raw, then semantic, then default value of a flag.
    fn resolve(&self, flag: &str, semantic: &HashMap<&'static str, String>) -> Option<Option<String>> {
        self.resolve_override(flag, semantic).or_else(|| {
            self.defaults
                .iter()
                .find(|(f, _)| f == flag)
                .map(|(_, v)| v.clone())
        })
    }

    fn resolve_override(
        &self,
        flag: &str,
        semantic: &HashMap<&'static str, String>,
    ) -> Option<Option<String>> {
        self.raw
            .iter()
            .find(|(f, _)| f == flag)
            .map(|(_, v)| v.clone())
            .or_else(|| semantic.get(flag).map(|v| Some(v.clone())))
    }

    fn semantic_flags(&self) -> HashMap<&'static str, String> {
        let mut flags = HashMap::new();
        for (param, value) in &self.semantic {
            match (param, value) {
                (Param::QuantizerScaleRange, ParamValue::Range(min, max)) => {
                    flags.insert("-qmin", min.to_string());
                    flags.insert("-qmax", max.to_string());
                }
                (Param::VideoScale, ParamValue::Text(expr)) => {
                    flags.insert("-vf", format!("scale='{expr}'"));
                }
                (param, ParamValue::Text(text)) => {
                    flags.insert(param.flags()[0], text.clone());
                }
                // Rejected by validation.
                (_, ParamValue::Range(..)) => {}
            }
        }
        flags
    }
}

fn switch_or_value(value: String) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value)
    }
}

fn upsert(entries: &mut Vec<(String, Option<String>)>, flag: String, value: Option<String>) {
    match entries.iter_mut().find(|(f, _)| *f == flag) {
        Some(entry) => entry.1 = value,
        None => entries.push((flag, value)),
    }
}

fn push_flag(args: &mut Vec<String>, flag: &str, value: Option<String>) {
    args.push(flag.to_string());
    if let Some(value) = value.filter(|v| !v.is_empty()) {
        args.push(value);
    }
}
