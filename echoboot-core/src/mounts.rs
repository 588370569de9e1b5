//! Locating the BOOT and DATA volumes of a prepared drive.
use crate::config::Config;
use crate::error::{Error, Result};
use std::path::{Path, PathBuf};

/// Where the two partitions of a prepared drive are mounted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VolumeMounts {
    pub boot: PathBuf,
    pub data: PathBuf,
}

impl VolumeMounts {
    /// Uses the mount points named in `config`, falling back to a lookup by
    /// partition label for whichever one is missing.
    pub fn resolve(config: &Config) -> Result<Self> {
        let boot = match &config.boot_mount {
            Some(path) => path.clone(),
            None => find_mount_point(&config.layout.boot_label)
                .ok_or_else(|| Error::MountNotFound(config.layout.boot_label.clone()))?,
        };
        let data = match &config.data_mount {
            Some(path) => path.clone(),
            None => find_mount_point(&config.layout.data_label)
                .ok_or_else(|| Error::MountNotFound(config.layout.data_label.clone()))?,
        };
        Ok(Self { boot, data })
    }
}

/// Finds the first mounted filesystem whose mount path contains `label`,
/// e.g. `/media/user/BOOT` for "BOOT".
pub fn find_mount_point(label: &str) -> Option<PathBuf> {
    let disks = sysinfo::Disks::new_with_refreshed_list();
    find_labeled(disks.iter().map(|disk| disk.mount_point()), label)
}

fn find_labeled<'a>(mut mounts: impl Iterator<Item = &'a Path>, label: &str) -> Option<PathBuf> {
    mounts
        .find(|mount| mount.to_string_lossy().contains(label))
        .map(Path::to_path_buf)
}
