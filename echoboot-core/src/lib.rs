//! The core, UI-agnostic library for EchoBoot, the multiboot USB creator.
//!
//! `echoboot-core` is designed to be used as a library by any front-end,
//! whether it's a command-line interface (like `echoboot`) or a graphical one.
//! It covers the whole pipeline, from mirror listing to boot menu:
//!
//! - [`scraper`]: fetches distro mirror listings and turns image filenames
//!   into [`catalog::CatalogEntry`] records, one [`scraper::ScraperFamily`]
//!   per mirror layout.
//! - [`catalog`]: the entry model and the JSON catalog store.
//! - [`validate`]: checks catalog files against the entry schema.
//! - [`matcher`]: recognises images found on the data volume by hint.
//! - [`emitter`]: appends syslinux and rEFInd menu entries for them.
//! - [`device`] and [`platform`]: removable-drive discovery.
//! - [`orchestrator`]: the drive-preparation state machine, with partitioning
//!   and bootloader installation delegated to external tools via [`command`].
//!
//! Every component takes its URLs, paths and labels from a [`config::Config`].
//!
//! ## Example: Regenerating Boot Entries
//!
//! ```rust,no_run
//! use echoboot_core::{config::Config, emitter, mounts::VolumeMounts};
//!
//! fn main() -> echoboot_core::Result<()> {
//!     let config = Config::load(None)?;
//!     let mounts = VolumeMounts::resolve(&config)?;
//!
//!     let report = emitter::update_boot_entries(&config, &mounts)?;
//!     println!("{} of {} images matched", report.matched, report.discovered);
//!
//!     Ok(())
//! }
//! ```

pub mod catalog;
pub mod command;
pub mod config;
pub mod device;
pub mod emitter;
mod error;
pub mod matcher;
pub mod mounts;
pub mod orchestrator;
pub mod platform;
pub mod scraper;
pub mod validate;

pub use error::{Error, Result};
