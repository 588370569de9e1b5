use crate::device::Device;
use crate::error::{Error, Result};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Helper to read a specific file from the /sys/block filesystem.
fn read_sys_file(device_name: &str, file: &str) -> io::Result<String> {
    let path = PathBuf::from("/sys/block").join(device_name).join(file);
    fs::read_to_string(path).map(|s| s.trim().to_string())
}

/// Helper to find the parent device of a partition (e.g., /dev/sda1 -> /dev/sda).
fn get_parent_device_path(path: &Path) -> PathBuf {
    let path_str = path.to_string_lossy();

    if path_str.starts_with("/dev/sd") {
        if let Some(index) = path_str.rfind(|c: char| c.is_alphabetic()) {
            return PathBuf::from(&path_str[..=index]);
        }
    } else if path_str.starts_with("/dev/mmcblk") || path_str.starts_with("/dev/nvme") {
        if let Some(index) = path_str.rfind('p') {
            return PathBuf::from(&path_str[..index]);
        }
    }

    path.to_path_buf()
}

/// Scans for removable block devices that can be turned into a multiboot drive.
///
/// Devices come from `/sys/block`. The system drive and loop devices are
/// never offered; neither are non-removable disks or empty card readers that
/// report a size of zero. Mount points of each device's partitions are
/// attached so callers can unmount them before partitioning.
///
/// # Errors
///
/// Fails if the system drive cannot be determined or `/sys/block` cannot be read.
pub fn get_removable_devices() -> Result<Vec<Device>> {
    let disks = sysinfo::Disks::new_with_refreshed_list();
    let system_disk_parent = disks
        .iter()
        .find(|disk| disk.mount_point() == Path::new("/"))
        .map(|disk| get_parent_device_path(&PathBuf::from("/dev/").join(disk.name())))
        .ok_or_else(|| Error::Discovery("could not determine the system drive".to_string()))?;

    let mut devices = Vec::new();
    for entry in fs::read_dir("/sys/block")?.filter_map(|e| e.ok()) {
        let device_name = entry.file_name().to_string_lossy().to_string();
        let device_path = PathBuf::from("/dev/").join(&device_name);

        if device_name.starts_with("loop") || device_path == system_disk_parent {
            continue;
        }

        let is_removable = read_sys_file(&device_name, "removable")
            .map(|s| s == "1")
            .unwrap_or(false);
        if !is_removable {
            continue;
        }

        let size_sectors = read_sys_file(&device_name, "size")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .unwrap_or(0);
        if size_sectors == 0 {
            continue;
        }

        let size_gb = (size_sectors * 512) as f64 / (1024.0 * 1024.0 * 1024.0);

        let mount_points = disks
            .iter()
            .filter(|disk| disk.name().to_string_lossy().contains(&device_name))
            .map(|disk| disk.mount_point().to_path_buf())
            .filter(|mp| !mp.as_os_str().is_empty())
            .collect();

        devices.push(Device {
            path: device_path,
            name: device_name,
            size_gb,
            mount_points,
        });
    }

    log::debug!("Found {} removable devices", devices.len());
    Ok(devices)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partitions_map_to_their_parent_disk() {
        assert_eq!(get_parent_device_path(Path::new("/dev/sda2")), PathBuf::from("/dev/sda"));
        assert_eq!(
            get_parent_device_path(Path::new("/dev/nvme0n1p3")),
            PathBuf::from("/dev/nvme0n1")
        );
        assert_eq!(
            get_parent_device_path(Path::new("/dev/mmcblk0p1")),
            PathBuf::from("/dev/mmcblk0")
        );
        assert_eq!(get_parent_device_path(Path::new("/dev/vda1")), PathBuf::from("/dev/vda1"));
    }
}
