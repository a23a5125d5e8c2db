//! Transient image files
//!
//! Each request gets its own file, `temp_image_<user_id>_<random>.png`,
//! so concurrent prompts from one user never share a path.

use std::io::Write;
use std::path::Path;

use tempfile::{Builder, NamedTempFile};
use tracing::debug;

use crate::error::BotResult;

/// A PNG written to disk for the duration of one upload
///
/// Dropping it removes the file; [`TempImage::remove`] does the same but
/// reports failures.
#[derive(Debug)]
pub struct TempImage {
    file: NamedTempFile,
}

impl TempImage {
    /// Write `png` to a fresh file in `dir` tagged with the sender's id
    pub fn write(dir: &Path, user_id: u64, png: &[u8]) -> BotResult<Self> {
        let mut file = Builder::new()
            .prefix(&format!("temp_image_{}_", user_id))
            .suffix(".png")
            .tempfile_in(dir)?;
        file.write_all(png)?;
        file.flush()?;

        debug!("Wrote {} bytes to {}", png.len(), file.path().display());
        Ok(Self { file })
    }

    /// Location of the file on disk
    pub fn path(&self) -> &Path {
        self.file.path()
    }

    /// Delete the file now
    pub fn remove(self) -> BotResult<()> {
        let path = self.file.path().to_path_buf();
        self.file.close()?;
        debug!("Removed {}", path.display());
        Ok(())
    }
}
