//! Rendering boot menus for matched images.
//!
//! Two syntaxes are produced: a syslinux menu (images booted through
//! `memdisk`) and a rEFInd menu whose entries start out disabled. Both are
//! appended to the existing config files after an auto-generated marker.
//! Nothing is deduplicated, so running an update twice leaves two copies of
//! every block.
use crate::catalog;
use crate::config::Config;
use crate::error::Result;
use crate::matcher::{self, MatchedImage};
use crate::mounts::VolumeMounts;
use std::fmt::Write as _;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::Path;

/// Line written before every batch of appended blocks.
pub const MARKER: &str = "# --- Auto-generated ---";

fn boot_params(image: &MatchedImage) -> Option<&str> {
    image
        .entry
        .boot_params
        .as_deref()
        .map(str::trim)
        .filter(|params| !params.is_empty())
}

/// Renders one syslinux block per image.
pub fn render_syslinux(images: &[MatchedImage]) -> String {
    let mut out = String::new();
    for image in images {
        let append = match boot_params(image) {
            Some(params) => format!("iso {params}"),
            None => "iso".to_string(),
        };
        let _ = write!(
            out,
            "\nLABEL {id}\n  MENU LABEL {label}\n  LINUX memdisk\n  INITRD /{file}\n  APPEND {append}\n",
            id = image.entry.menu_id(),
            label = image.entry.label,
            file = image.filename,
        );
    }
    out
}

/// rEFInd has no escape for `"` inside a quoted token, so it becomes `'`.
fn refind_quoted(text: &str) -> String {
    text.replace('"', "'")
}

/// Renders one disabled rEFInd `menuentry` per image.
pub fn render_refind(images: &[MatchedImage], loader: &str) -> String {
    let mut out = String::new();
    for image in images {
        let _ = write!(
            out,
            "\nmenuentry \"{label}\" {{\n  disabled\n  loader {loader}\n  initrd /{file}\n",
            label = refind_quoted(&image.entry.label),
            file = image.filename,
        );
        if let Some(params) = boot_params(image) {
            let _ = writeln!(out, "  options \"{}\"", refind_quoted(params));
        }
        out.push_str("}\n");
    }
    out
}

/// Appends the marker and `rendered` to `path`, creating the file if needed.
pub fn append_blocks(path: &Path, rendered: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let mut file = OpenOptions::new().create(true).append(true).open(path)?;
    write!(file, "\n{MARKER}\n{rendered}")?;
    file.flush()?;
    Ok(())
}

/// Outcome of one boot-entry update.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpdateReport {
    pub discovered: usize,
    pub matched: usize,
}

impl UpdateReport {
    pub fn unmatched(&self) -> usize {
        self.discovered - self.matched
    }
}

/// Scans the data volume, matches its images against the catalog and appends
/// the resulting entries to both boot menus.
///
/// When the data volume holds no images nothing is written.
///
/// # Errors
///
/// Fails if the catalog cannot be loaded, the data volume cannot be listed,
/// or either config file cannot be appended to.
pub fn update_boot_entries(config: &Config, mounts: &VolumeMounts) -> Result<UpdateReport> {
    log::info!("Scanning for images in {}", mounts.data.display());
    let catalog = catalog::load(&config.catalog_path)?;

    let discovered = matcher::discover_images(&mounts.data)?;
    if discovered.is_empty() {
        log::warn!("No images found on the {} partition.", config.layout.data_label);
        return Ok(UpdateReport::default());
    }

    let matched = matcher::match_all(&discovered, &catalog);

    append_blocks(
        &mounts.boot.join(&config.bootloaders.syslinux_config),
        &render_syslinux(&matched),
    )?;
    append_blocks(
        &mounts.boot.join(&config.bootloaders.refind_config),
        &render_refind(&matched, &config.bootloaders.efi_loader),
    )?;

    log::info!("Boot entries updated.");
    Ok(UpdateReport {
        discovered: discovered.len(),
        matched: matched.len(),
    })
}
