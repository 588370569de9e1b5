//! The image catalog.
//!
//! A catalog is an ordered list of [`CatalogEntry`] records, written by a
//! scraper run and read by the matcher. Entries are never edited in place; a
//! catalog is regenerated wholesale by scraping again.

mod store;

pub use store::{load, save};

use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of image file, derived from the filename suffix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum FileType {
    Iso,
    Img,
}

impl FileType {
    /// "ISO" iff the name ends in `.iso`, "IMG" for everything else.
    pub fn from_filename(filename: &str) -> Self {
        if filename.ends_with(".iso") {
            FileType::Iso
        } else {
            FileType::Img
        }
    }
}

impl fmt::Display for FileType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FileType::Iso => f.write_str("ISO"),
            FileType::Img => f.write_str("IMG"),
        }
    }
}

/// One bootable image the matcher can recognise.
///
/// Hand-written catalogs may leave out most fields; only `label` is always
/// required.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogEntry {
    /// Display string used in both boot menus.
    pub label: String,
    /// Short identifier, may be empty or "unknown".
    #[serde(default)]
    pub codename: String,
    #[serde(default)]
    pub version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flavor: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub desktop: Option<String>,
    #[serde(default = "unknown")]
    pub architecture: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_type: Option<FileType>,
    /// Base name of the image as it appears on the data volume.
    #[serde(default)]
    pub filename: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// Substrings that identify this entry inside a discovered filename.
    #[serde(default)]
    pub match_hints: Vec<String>,
    #[serde(default)]
    pub boot_params: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default)]
    pub kernel: Option<String>,
    #[serde(default)]
    pub initrd: Option<String>,
}

fn unknown() -> String {
    "unknown".to_string()
}

impl CatalogEntry {
    /// Creates an entry for `filename` with its file type filled in and the
    /// filename itself as the only hint.
    pub fn new(label: impl Into<String>, filename: impl Into<String>) -> Self {
        let filename = filename.into();
        Self {
            label: label.into(),
            codename: String::new(),
            version: String::new(),
            flavor: None,
            desktop: None,
            architecture: unknown(),
            file_type: Some(FileType::from_filename(&filename)),
            match_hints: vec![filename.clone()],
            filename,
            url: None,
            boot_params: None,
            category: None,
            kernel: None,
            initrd: None,
        }
    }

    /// The stored file type, or the one implied by `filename` when the
    /// catalog left it out.
    pub fn file_type(&self) -> FileType {
        self.file_type
            .unwrap_or_else(|| FileType::from_filename(&self.filename))
    }

    /// Identifier used for the syslinux `LABEL` line.
    pub fn menu_id(&self) -> String {
        format!("{}{}", self.codename.to_lowercase(), self.version)
    }
}
