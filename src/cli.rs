use clap::{Parser, Subcommand};
use scraperkit_av::Preset;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "scraperkit")]
#[command(author, version, about = "Media re-encoding and offline archive building")]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Probe a media file for codecs, duration and bitrate
    Probe {
        /// File to probe
        #[arg(required = true)]
        file: PathBuf,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Re-encode a media file with ffmpeg
    Reencode {
        /// Source media file
        src: PathBuf,

        /// Destination file
        dest: PathBuf,

        /// Start from a preset (voice-mp3-low, video-webm-low, video-mp4-low)
        #[arg(short, long)]
        preset: Option<Preset>,

        /// Semantic parameter, e.g. `quantizer_scale_range=30,42`
        #[arg(long = "set", value_name = "NAME=VALUE", value_parser = parse_key_val)]
        set: Vec<(String, String)>,

        /// Literal ffmpeg flag, e.g. `-bufsize=900k`; an empty value adds a switch
        #[arg(long = "raw", value_name = "FLAG=VALUE", value_parser = parse_key_val, allow_hyphen_values = true)]
        raw: Vec<(String, String)>,

        /// Remove the source once re-encoding succeeded
        #[arg(long)]
        delete_src: bool,

        /// Fail with ffmpeg's output instead of reporting an unsuccessful run
        #[arg(long)]
        strict: bool,

        /// Print the ffmpeg arguments without running it
        #[arg(long)]
        dry_run: bool,
    },

    /// Build an archive from a build request file
    MakeArchive {
        /// TOML build request
        #[arg(required = true)]
        request: PathBuf,

        /// Finalize then remove the partial archive on failure instead of cancelling
        #[arg(long)]
        no_workaround: bool,
    },

    /// Show an archive's contents
    InspectArchive {
        /// Archive file
        #[arg(required = true)]
        file: PathBuf,

        /// Print one entry (redirects are followed)
        #[arg(long)]
        entry: Option<String>,

        /// List title suggestions for a query
        #[arg(long)]
        suggest: Option<String>,
    },

    /// Check that required external tools are available
    CheckTools,

    /// Display version information
    Version,
}

/// Split `key=value`; everything after the first `=` is the value.
pub fn parse_key_val(s: &str) -> Result<(String, String), String> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected KEY=VALUE, got `{s}`"))?;
    if key.is_empty() {
        return Err(format!("empty key in `{s}`"));
    }
    Ok((key.to_string(), value.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_key_val() {
        assert_eq!(
            parse_key_val("video_codec=libvpx").unwrap(),
            ("video_codec".to_string(), "libvpx".to_string())
        );
        assert_eq!(
            parse_key_val("-vf=scale=480:-1").unwrap(),
            ("-vf".to_string(), "scale=480:-1".to_string())
        );
        assert_eq!(parse_key_val("-an=").unwrap().1, "");
        assert!(parse_key_val("novalue").is_err());
        assert!(parse_key_val("=x").is_err());
    }

    #[test]
    fn test_cli_parses_reencode() {
        let cli = Cli::try_parse_from([
            "scraperkit",
            "reencode",
            "in.mp4",
            "out.webm",
            "--preset",
            "video-webm-low",
            "--set",
            "quantizer_scale_range=30,40",
            "--raw",
            "-bufsize=900k",
        ])
        .unwrap();

        match cli.command {
            Commands::Reencode {
                preset, set, raw, ..
            } => {
                assert_eq!(preset, Some(Preset::VideoWebmLow));
                assert_eq!(set[0].0, "quantizer_scale_range");
                assert_eq!(raw[0], ("-bufsize".to_string(), "900k".to_string()));
            }
            _ => panic!("expected reencode"),
        }
    }
}
