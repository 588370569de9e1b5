//! Reading and writing catalog files.
use super::CatalogEntry;
use crate::error::{Error, Result};
use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::Path;

/// Writes the full entry list as pretty-printed JSON, replacing any existing file.
///
/// Every failure, including one raised while serializing, is [`Error::Io`].
pub fn save(entries: &[CatalogEntry], path: &Path) -> Result<()> {
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, entries).map_err(io::Error::other)?;
    writer.write_all(b"\n")?;
    writer.flush()?;
    log::debug!("Wrote {} entries to {}", entries.len(), path.display());
    Ok(())
}

/// Reads a catalog file.
///
/// # Errors
///
/// - [`Error::NotFound`] if `path` does not exist.
/// - [`Error::Parse`] if the content is not a JSON array of entry objects.
pub fn load(path: &Path) -> Result<Vec<CatalogEntry>> {
    if !path.exists() {
        return Err(Error::NotFound(path.to_path_buf()));
    }
    let text = fs::read_to_string(path)?;
    serde_json::from_str(&text).map_err(|e| Error::Parse {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })
}
