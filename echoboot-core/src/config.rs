//! Configuration for every EchoBoot component.
//!
//! All base URLs, file paths and partition labels live in one [`Config`]
//! value that callers pass into each component. Every field has a default, so
//! a TOML file only needs to name what it overrides:
//!
//! ```toml
//! catalog_path = "iso_definitions.json"
//!
//! [layout]
//! boot_size_mb = 512
//! ```

use crate::error::{Error, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

pub const DEBIAN_LIVE_URL: &str = "https://cdimage.debian.org/debian-cd/current-live/amd64/iso-hybrid/";
pub const FREEBSD_RELEASES_URL: &str = "https://download.freebsd.org/ftp/releases/amd64/";

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Catalog read by the matcher.
    pub catalog_path: PathBuf,
    /// Schema document for `validate`. The bundled schema is used when unset.
    pub schema_path: Option<PathBuf>,
    /// Explicit BOOT volume mount point, bypassing the label lookup.
    pub boot_mount: Option<PathBuf>,
    /// Explicit DATA volume mount point, bypassing the label lookup.
    pub data_mount: Option<PathBuf>,
    /// Connect/read timeout of the HTTP client.
    pub http_timeout_secs: u64,
    pub mirrors: Mirrors,
    pub layout: Layout,
    pub bootloaders: Bootloaders,
}

/// Base URLs of the mirror listings, one per scraper family.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Mirrors {
    pub debian: String,
    pub debian_mirror: String,
    pub freebsd: String,
}

/// Partition layout of a prepared drive.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Layout {
    pub boot_label: String,
    pub data_label: String,
    pub boot_size_mb: u64,
    /// Directory under which freshly formatted partitions are mounted.
    pub mount_root: PathBuf,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Bootloaders {
    /// GPT-aware MBR boot code shipped with syslinux.
    pub syslinux_mbr: PathBuf,
    /// Directory holding the BIOS `.c32` menu modules.
    pub syslinux_modules: PathBuf,
    /// The `memdisk` loader that boots whole images from the menu.
    pub memdisk: PathBuf,
    /// Loader referenced by every generated rEFInd entry.
    pub efi_loader: String,
    /// Relative to the BOOT volume.
    pub syslinux_config: PathBuf,
    /// Relative to the BOOT volume.
    pub refind_config: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            catalog_path: PathBuf::from("iso_definitions.json"),
            schema_path: None,
            boot_mount: None,
            data_mount: None,
            http_timeout_secs: 15,
            mirrors: Mirrors::default(),
            layout: Layout::default(),
            bootloaders: Bootloaders::default(),
        }
    }
}

impl Default for Mirrors {
    fn default() -> Self {
        Self {
            debian: DEBIAN_LIVE_URL.to_string(),
            debian_mirror: DEBIAN_LIVE_URL.to_string(),
            freebsd: FREEBSD_RELEASES_URL.to_string(),
        }
    }
}

impl Default for Layout {
    fn default() -> Self {
        Self {
            boot_label: "BOOT".to_string(),
            data_label: "DATA".to_string(),
            boot_size_mb: 200,
            mount_root: PathBuf::from("/mnt/echoboot"),
        }
    }
}

impl Default for Bootloaders {
    fn default() -> Self {
        Self {
            syslinux_mbr: PathBuf::from("/usr/lib/syslinux/mbr/gptmbr.bin"),
            syslinux_modules: PathBuf::from("/usr/lib/syslinux/modules/bios"),
            memdisk: PathBuf::from("/usr/lib/syslinux/memdisk"),
            efi_loader: "/EFI/tools/loader.efi".to_string(),
            syslinux_config: PathBuf::from("syslinux.cfg"),
            refind_config: PathBuf::from("EFI/BOOT/refind.conf"),
        }
    }
}

impl Config {
    /// Loads a configuration file, or the defaults when no path is given.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if `path` does not exist and
    /// [`Error::Config`] if it is not valid TOML for this structure.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        if !path.exists() {
            return Err(Error::NotFound(path.to_path_buf()));
        }
        let text = fs::read_to_string(path)?;
        toml::from_str(&text).map_err(|e| Error::Config {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }
}
