//! Re-encoding media files with ffmpeg.

use crate::command::{ToolCommand, ToolOutput};
use crate::workspace::Workspace;
use crate::{Error, Result};
use std::ffi::OsString;
use std::path::{Path, PathBuf};

/// Options for [`Transcoder::reencode`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReencodeOptions {
    /// Remove the source file once the run succeeded.
    pub delete_src: bool,
    /// Report a failing run as `Ok(false)` instead of an error.
    pub failsafe: bool,
}

impl Default for ReencodeOptions {
    fn default() -> Self {
        Self {
            delete_src: false,
            failsafe: true,
        }
    }
}

/// Runs ffmpeg to re-encode one file into another.
#[derive(Debug, Clone)]
pub struct Transcoder {
    program: PathBuf,
}

impl Default for Transcoder {
    fn default() -> Self {
        Self::new()
    }
}

impl Transcoder {
    /// Transcoder using `ffmpeg` from `PATH`.
    pub fn new() -> Self {
        Self::with_program("ffmpeg")
    }

    /// Transcoder using an explicit ffmpeg binary.
    pub fn with_program(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// Re-encode `src` into `dest` using `args` between input and output.
    ///
    /// Returns whether ffmpeg succeeded. With `failsafe` unset, a failing
    /// run is an [`Error::ProcessFailed`] carrying ffmpeg's output instead.
    pub fn reencode<S: AsRef<str>>(
        &self,
        src: &Path,
        dest: &Path,
        args: &[S],
        options: &ReencodeOptions,
    ) -> Result<bool> {
        self.run(src, dest, args, options).map(|(success, _)| success)
    }

    /// Same as [`Transcoder::reencode`], also returning the captured process
    /// output.
    pub fn reencode_with_output<S: AsRef<str>>(
        &self,
        src: &Path,
        dest: &Path,
        args: &[S],
        options: &ReencodeOptions,
    ) -> Result<(bool, ToolOutput)> {
        self.run(src, dest, args, options)
    }

    fn run<S: AsRef<str>>(
        &self,
        src: &Path,
        dest: &Path,
        args: &[S],
        options: &ReencodeOptions,
    ) -> Result<(bool, ToolOutput)> {
        if !src.exists() {
            return Err(Error::file_not_found(src));
        }

        let workspace = Workspace::new(dest)?;

        let mut cmd = ToolCommand::new(&self.program);
        cmd.args(["-y", "-i"])
            .arg(file_url(src))
            .args(args.iter().map(|a| AsRef::<str>::as_ref(a)))
            .arg(file_url(workspace.output()));

        #[cfg(feature = "tracing")]
        tracing::info!("Re-encoding {:?} -> {:?}", src, dest);

        let output = cmd.output()?;
        let success = output.success();

        if !success {
            #[cfg(feature = "tracing")]
            tracing::warn!("ffmpeg failed on {:?} ({})", src, output.status);

            if !options.failsafe {
                return Err(Error::ProcessFailed {
                    tool: cmd.program_name(),
                    status: output.status.code(),
                    output: output.combined(),
                });
            }
            return Ok((false, output));
        }

        // In-place runs replace the source through finalize itself.
        let in_place = same_file(src, dest);
        workspace.finalize()?;

        if options.delete_src && !in_place {
            std::fs::remove_file(src)?;

            #[cfg(feature = "tracing")]
            tracing::debug!("Removed source {:?}", src);
        }

        Ok((true, output))
    }
}

/// `file:` prefix keeps ffmpeg from reading protocol names out of paths.
pub(crate) fn file_url(path: &Path) -> OsString {
    let mut url = OsString::from("file:");
    url.push(path.as_os_str());
    url
}

fn same_file(a: &Path, b: &Path) -> bool {
    match (a.canonicalize(), b.canonicalize()) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}
