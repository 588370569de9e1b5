use std::fmt;
use std::path::{Path, PathBuf};

/// A removable drive that can be turned into a multiboot stick.
///
/// Populated by the platform-specific discovery functions in the
/// [`crate::platform`] module.
#[derive(Clone, Debug, PartialEq)]
pub struct Device {
    /// The system path to the device (e.g., `/dev/sdb`).
    pub path: PathBuf,
    /// The kernel-provided name of the device (e.g., "sdb").
    pub name: String,
    /// The total size of the device in gigabytes (GB).
    pub size_gb: f64,
    /// Mount points of any of the device's partitions that are mounted.
    pub mount_points: Vec<PathBuf>,
}

impl Device {
    /// Path of partition `number` on this device, following kernel naming:
    /// `sdb` -> `sdb1`, `nvme0n1` -> `nvme0n1p1`, `mmcblk0` -> `mmcblk0p1`.
    pub fn partition_path(&self, number: u32) -> PathBuf {
        partition_path(&self.path, number)
    }
}

pub(crate) fn partition_path(device: &Path, number: u32) -> PathBuf {
    let base = device.to_string_lossy();
    if base.ends_with(|c: char| c.is_ascii_digit()) {
        PathBuf::from(format!("{base}p{number}"))
    } else {
        PathBuf::from(format!("{base}{number}"))
    }
}

impl fmt::Display for Device {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mount_info = match self.mount_points.as_slice() {
            [] => "[Not mounted]".to_string(),
            [only] => format!("[Mounted at {}]", only.display()),
            [first, rest @ ..] => format!("[Mounted at {} +{}]", first.display(), rest.len()),
        };

        write!(
            f,
            "{:<15} {:.1} GB {}",
            self.path.display(),
            self.size_gb,
            mount_info
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn device(path: &str) -> Device {
        Device {
            path: PathBuf::from(path),
            name: path.trim_start_matches("/dev/").to_string(),
            size_gb: 29.8,
            mount_points: Vec::new(),
        }
    }

    #[test]
    fn partition_names_follow_kernel_conventions() {
        assert_eq!(device("/dev/sdb").partition_path(1), PathBuf::from("/dev/sdb1"));
        assert_eq!(device("/dev/nvme0n1").partition_path(2), PathBuf::from("/dev/nvme0n1p2"));
        assert_eq!(device("/dev/mmcblk0").partition_path(1), PathBuf::from("/dev/mmcblk0p1"));
    }

    #[test]
    fn display_summarises_mounts() {
        let mut dev = device("/dev/sdb");
        assert!(dev.to_string().ends_with("29.8 GB [Not mounted]"));

        dev.mount_points = vec![PathBuf::from("/media/u/BOOT"), PathBuf::from("/media/u/DATA")];
        assert!(dev.to_string().ends_with("[Mounted at /media/u/BOOT +1]"));
    }
}
