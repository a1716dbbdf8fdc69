use scraperkit_av::ReencodeOptions;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub tools: ToolsConfig,

    #[serde(default)]
    pub reencode: ReencodeConfig,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ToolsConfig {
    #[serde(default)]
    pub ffmpeg_path: Option<PathBuf>,

    #[serde(default)]
    pub ffprobe_path: Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ReencodeConfig {
    /// Report a failed ffmpeg run instead of erroring (default: true)
    #[serde(default = "default_failsafe")]
    pub failsafe: bool,

    /// Remove sources after a successful run
    #[serde(default)]
    pub delete_src: bool,
}

fn default_failsafe() -> bool {
    true
}

impl Default for ReencodeConfig {
    fn default() -> Self {
        Self {
            failsafe: default_failsafe(),
            delete_src: false,
        }
    }
}

impl From<&ReencodeConfig> for ReencodeOptions {
    fn from(config: &ReencodeConfig) -> Self {
        Self {
            delete_src: config.delete_src,
            failsafe: config.failsafe,
        }
    }
}
