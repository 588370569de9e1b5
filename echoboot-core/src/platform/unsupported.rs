use crate::device::Device;
use crate::error::{Error, Result};

/// Device discovery is only implemented for Linux.
pub fn get_removable_devices() -> Result<Vec<Device>> {
    Err(Error::Unsupported("removable device discovery"))
}
