//! Recognising images on the data volume.
//!
//! An entry matches when any of its hints is a case-insensitive substring of
//! the discovered filename. The catalog is walked in stored order and the
//! first matching entry wins, so a short hint early in the catalog shadows
//! more specific entries after it. An empty hint matches every filename.
use crate::catalog::CatalogEntry;
use crate::error::Result;
use crate::scraper::is_image;
use std::fs;
use std::path::Path;

/// A catalog entry paired with the image file it was recognised from.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchedImage {
    /// Filename as found on the data volume.
    pub filename: String,
    pub entry: CatalogEntry,
}

/// Returns the first entry with a hint contained in `filename`.
pub fn match_image<'a>(filename: &str, catalog: &'a [CatalogEntry]) -> Option<&'a CatalogEntry> {
    let filename = filename.to_lowercase();
    catalog.iter().find(|entry| {
        entry
            .match_hints
            .iter()
            .any(|hint| filename.contains(&hint.to_lowercase()))
    })
}

/// Matches every discovered filename, in order. Misses are logged and skipped.
pub fn match_all(discovered: &[String], catalog: &[CatalogEntry]) -> Vec<MatchedImage> {
    discovered
        .iter()
        .filter_map(|filename| match match_image(filename, catalog) {
            Some(entry) => {
                log::info!("Matched {filename} to {}", entry.label);
                Some(MatchedImage {
                    filename: filename.clone(),
                    entry: entry.clone(),
                })
            }
            None => {
                log::warn!("No match for {filename}");
                None
            }
        })
        .collect()
}

/// Lists the image files directly inside `dir`, sorted by name.
///
/// Entries that cannot be read and names that are not valid UTF-8 are logged
/// and skipped.
pub fn discover_images(dir: &Path) -> Result<Vec<String>> {
    let mut images = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                log::warn!("Skipping unreadable entry in {}: {e}", dir.display());
                continue;
            }
        };
        if !entry.file_type().map(|t| t.is_file()).unwrap_or(false) {
            continue;
        }
        let name = match entry.file_name().into_string() {
            Ok(name) => name,
            Err(raw) => {
                log::warn!("Skipping {}: name is not valid UTF-8", raw.to_string_lossy());
                continue;
            }
        };
        if is_image(&name) {
            images.push(name);
        }
    }
    images.sort();
    Ok(images)
}
