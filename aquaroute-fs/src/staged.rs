//! Uniquely named input files handed to child processes.

use camino::{Utf8Path, Utf8PathBuf};
use std::io::{self, Write};
use tempfile::TempPath;

/// A JSON payload written to a freshly created file.
///
/// The file name is random, so concurrent stagings in the same directory
/// never collide. The file is deleted by [`StagedInput::release`] or, failing
/// that, when the value is dropped.
#[derive(Debug)]
pub struct StagedInput {
    path: TempPath,
    utf8: Utf8PathBuf,
}

impl StagedInput {
    /// Write `contents` to `<dir>/<prefix><random>.json`.
    ///
    /// The returned path is absolute, so it stays valid for a child process
    /// running in a different directory.
    pub fn write(dir: &Utf8Path, prefix: &str, contents: &[u8]) -> io::Result<Self> {
        let dir = std::path::absolute(dir.as_std_path())?;
        let mut file = tempfile::Builder::new()
            .prefix(prefix)
            .suffix(".json")
            .tempfile_in(dir)?;
        file.write_all(contents)?;
        file.flush()?;

        let path = file.into_temp_path();
        let utf8 = Utf8PathBuf::from_path_buf(path.to_path_buf())
            .map_err(|_| io::Error::other("non-UTF-8 staging path"))?;
        Ok(Self { path, utf8 })
    }

    /// Location of the staged file.
    pub fn path(&self) -> &Utf8Path {
        &self.utf8
    }

    /// Delete the staged file, reporting any failure.
    pub fn release(self) -> io::Result<()> {
        self.path.close()
    }
}
