//! Provides platform-specific functionality.
//!
//! This module holds the logic for discovering removable block devices. It
//! uses conditional compilation (`#[cfg]`) to expose the implementation for
//! the target OS; every submodule exposes the same public API.

#[cfg(target_os = "linux")]
mod linux;
#[cfg(target_os = "linux")]
pub use self::linux::*;

#[cfg(not(target_os = "linux"))]
mod unsupported;
#[cfg(not(target_os = "linux"))]
pub use self::unsupported::*;
