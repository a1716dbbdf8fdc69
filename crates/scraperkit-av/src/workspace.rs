//! Scratch space for tool invocations.

use crate::{Error, Result};
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Temporary directory holding a tool's output until it is known to be good.
///
/// The scratch output keeps the destination's extension so tools that infer
/// the container from the file name still do so.
///
/// ```no_run
/// use scraperkit_av::Workspace;
///
/// let workspace = Workspace::new("/path/to/output.webm")?;
/// // ... let the tool write workspace.output() ...
/// workspace.finalize()?;
/// # Ok::<(), scraperkit_av::Error>(())
/// ```
pub struct Workspace {
    temp_dir: TempDir,
    destination: PathBuf,
    output_path: PathBuf,
}

impl Workspace {
    /// Create a workspace whose output will end up at `destination`.
    pub fn new<P: AsRef<Path>>(destination: P) -> Result<Self> {
        let destination = destination.as_ref();
        let temp_dir = TempDir::new().map_err(|e| Error::Workspace(e.to_string()))?;

        let file_name = match destination.extension() {
            Some(ext) => format!("output.tmp.{}", ext.to_string_lossy()),
            None => "output.tmp".to_string(),
        };
        let output_path = temp_dir.path().join(file_name);

        Ok(Self {
            temp_dir,
            destination: destination.to_path_buf(),
            output_path,
        })
    }

    /// Where the output lands after [`Workspace::finalize`].
    pub fn destination(&self) -> &Path {
        &self.destination
    }

    /// Scratch output path for the tool to write.
    pub fn output(&self) -> &Path {
        &self.output_path
    }

    /// Get the temp directory path.
    pub fn temp_dir(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Move the scratch output to the destination, replacing any file there.
    ///
    /// Tries a rename first and falls back to copying across filesystems.
    pub fn finalize(self) -> Result<PathBuf> {
        if !self.output_path.exists() {
            return Err(Error::Workspace(format!(
                "output file does not exist: {:?}",
                self.output_path
            )));
        }

        if std::fs::rename(&self.output_path, &self.destination).is_err() {
            std::fs::copy(&self.output_path, &self.destination).map_err(|e| {
                Error::Workspace(format!(
                    "failed to copy output to {:?}: {e}",
                    self.destination
                ))
            })?;
        }

        Ok(self.destination)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_workspace_paths() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("clip.webm");
        let workspace = Workspace::new(&dest).unwrap();

        assert_eq!(workspace.destination(), dest);
        assert!(workspace.output().starts_with(workspace.temp_dir()));
        assert_eq!(workspace.output().extension().unwrap(), "webm");
    }

    #[test]
    fn test_finalize_replaces_destination() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("audio.mp3");
        fs::write(&dest, b"stale").unwrap();

        let workspace = Workspace::new(&dest).unwrap();
        fs::write(workspace.output(), b"fresh").unwrap();

        assert_eq!(workspace.finalize().unwrap(), dest);
        assert_eq!(fs::read(&dest).unwrap(), b"fresh");
    }

    #[test]
    fn test_finalize_fails_when_output_missing() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("audio.mp3");
        let workspace = Workspace::new(&dest).unwrap();

        assert!(workspace.finalize().is_err());
        assert!(!dest.exists());
    }
}
