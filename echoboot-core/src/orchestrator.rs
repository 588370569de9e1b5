//! Turning a removable drive into a multiboot stick.
//!
//! The flow is a state machine:
//!
//! ```text
//! SelectDrive -> Confirm -> Partition -> InstallBootloaders
//!             -> AwaitUserCopy -> UpdateBootEntries -> Done
//! ```
//!
//! `SelectDrive` and `Confirm` may end in `Cancelled` instead. Every question
//! for the user goes through an [`Operator`], so a script can drive the whole
//! flow without a terminal, one [`Orchestrator::advance`] call per step.
//!
//! Partitioning and bootloader installation are delegated to external tools
//! through a [`CommandRunner`]. The first failing command aborts the run.
use crate::command::{CommandRunner, CommandSpec};
use crate::config::Config;
use crate::device::Device;
use crate::emitter::{self, UpdateReport};
use crate::error::{Error, Result};
use crate::mounts::VolumeMounts;
use crate::platform;
use std::fs;
use std::path::Path;

const SYSLINUX_SEED: &str = "UI menu.c32\nPROMPT 0\nTIMEOUT 100\nMENU TITLE EchoBoot\n";
const REFIND_SEED: &str = "timeout 20\nscanfor manual,external\n";

/// One step of the drive preparation flow.
#[derive(Debug, Clone, PartialEq)]
pub enum Stage {
    SelectDrive,
    Confirm(Device),
    Partition(Device),
    InstallBootloaders(Device),
    AwaitUserCopy,
    UpdateBootEntries,
    Done(UpdateReport),
    Cancelled,
}

impl Stage {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Stage::Done(_) | Stage::Cancelled)
    }

    pub fn name(&self) -> &'static str {
        match self {
            Stage::SelectDrive => "select drive",
            Stage::Confirm(_) => "confirm",
            Stage::Partition(_) => "partition",
            Stage::InstallBootloaders(_) => "install bootloaders",
            Stage::AwaitUserCopy => "await image copy",
            Stage::UpdateBootEntries => "update boot entries",
            Stage::Done(_) => "done",
            Stage::Cancelled => "cancelled",
        }
    }
}

/// Answers the questions the flow needs a human for.
pub trait Operator {
    /// Picks one of `devices` by index, or `None` to cancel.
    fn select_drive(&mut self, devices: &[Device]) -> Result<Option<usize>>;

    /// Last chance to back out before `device` is wiped.
    fn confirm_erase(&mut self, device: &Device) -> Result<bool>;

    /// Returns once the images have been copied to `mounts.data`.
    fn await_copy(&mut self, mounts: &VolumeMounts) -> Result<()>;

    /// Called before each step runs.
    fn on_stage(&mut self, _stage: &Stage) {}
}

/// Drives the [`Stage`] machine for one drive.
pub struct Orchestrator<'a, R: CommandRunner> {
    config: &'a Config,
    runner: R,
    devices: Option<Vec<Device>>,
    mounts: Option<VolumeMounts>,
}

impl<'a, R: CommandRunner> Orchestrator<'a, R> {
    pub fn new(config: &'a Config, runner: R) -> Self {
        Self {
            config,
            runner,
            devices: None,
            mounts: None,
        }
    }

    /// Offers `devices` instead of scanning the system.
    pub fn with_devices(mut self, devices: Vec<Device>) -> Self {
        self.devices = Some(devices);
        self
    }

    pub fn runner(&self) -> &R {
        &self.runner
    }

    /// Runs from `SelectDrive` until the flow is done or cancelled.
    pub fn run(&mut self, operator: &mut dyn Operator) -> Result<Stage> {
        let mut stage = Stage::SelectDrive;
        while !stage.is_terminal() {
            stage = self.advance(stage, operator)?;
        }
        Ok(stage)
    }

    /// Performs `stage` and returns the one that follows it. Terminal stages
    /// are returned unchanged.
    pub fn advance(&mut self, stage: Stage, operator: &mut dyn Operator) -> Result<Stage> {
        operator.on_stage(&stage);
        match stage {
            Stage::SelectDrive => {
                let devices = match self.devices.take() {
                    Some(devices) => devices,
                    None => platform::get_removable_devices()?,
                };
                if devices.is_empty() {
                    return Err(Error::Discovery("no USB drives found".to_string()));
                }
                let Some(index) = operator.select_drive(&devices)? else {
                    return Ok(Stage::Cancelled);
                };
                let device = devices
                    .get(index)
                    .cloned()
                    .ok_or_else(|| Error::Discovery(format!("no drive at index {index}")))?;
                Ok(Stage::Confirm(device))
            }
            Stage::Confirm(device) => {
                log::warn!("ALL DATA on {} will be erased.", device.path.display());
                if operator.confirm_erase(&device)? {
                    Ok(Stage::Partition(device))
                } else {
                    log::info!("Cancelled, {} left untouched.", device.path.display());
                    Ok(Stage::Cancelled)
                }
            }
            Stage::Partition(device) => {
                log::info!("Partitioning {}...", device.path.display());
                self.run_all(&partition_plan(&device, self.config))?;
                Ok(Stage::InstallBootloaders(device))
            }
            Stage::InstallBootloaders(device) => {
                log::info!("Installing bootloaders...");
                let mounts = self.planned_mounts();
                fs::create_dir_all(&mounts.boot)?;
                fs::create_dir_all(&mounts.data)?;
                self.run_all(&bootloader_plan(&device, self.config, &mounts))?;
                seed_configs(self.config, &mounts.boot)?;
                self.mounts = Some(mounts);
                Ok(Stage::AwaitUserCopy)
            }
            Stage::AwaitUserCopy => {
                let mounts = self.mounts()?;
                operator.await_copy(&mounts)?;
                Ok(Stage::UpdateBootEntries)
            }
            Stage::UpdateBootEntries => {
                let mounts = self.mounts()?;
                let report = emitter::update_boot_entries(self.config, &mounts)?;
                Ok(Stage::Done(report))
            }
            terminal @ (Stage::Done(_) | Stage::Cancelled) => Ok(terminal),
        }
    }

    fn run_all(&mut self, plan: &[CommandSpec]) -> Result<()> {
        for command in plan {
            log::debug!("{command}");
            self.runner.run(command)?;
        }
        Ok(())
    }

    /// Mount points this run mounts the fresh partitions on.
    fn planned_mounts(&self) -> VolumeMounts {
        let layout = &self.config.layout;
        VolumeMounts {
            boot: self
                .config
                .boot_mount
                .clone()
                .unwrap_or_else(|| layout.mount_root.join(&layout.boot_label)),
            data: self
                .config
                .data_mount
                .clone()
                .unwrap_or_else(|| layout.mount_root.join(&layout.data_label)),
        }
    }

    /// Mounts set up by this run, or found by label when the flow was
    /// entered after bootloader installation.
    fn mounts(&self) -> Result<VolumeMounts> {
        match &self.mounts {
            Some(mounts) => Ok(mounts.clone()),
            None => VolumeMounts::resolve(self.config),
        }
    }
}

/// Commands that wipe `device` and lay out the BOOT and DATA partitions.
pub fn partition_plan(device: &Device, config: &Config) -> Vec<CommandSpec> {
    let layout = &config.layout;
    let dev = &device.path;
    let boot_end = format!("{}MiB", 1 + layout.boot_size_mb);

    let mut plan: Vec<CommandSpec> = device
        .mount_points
        .iter()
        .map(|mount| CommandSpec::new("umount").path(mount))
        .collect();

    let parted = || CommandSpec::new("parted").arg("-s").path(dev);
    plan.extend([
        parted().args(["mklabel", "gpt"]),
        parted().args(["mkpart", layout.boot_label.as_str(), "fat32", "1MiB", boot_end.as_str()]),
        parted().args(["set", "1", "esp", "on"]),
        parted().args(["mkpart", layout.data_label.as_str(), boot_end.as_str(), "100%"]),
        CommandSpec::new("partprobe").path(dev),
        CommandSpec::new("mkfs.vfat")
            .args(["-F", "32", "-n", layout.boot_label.as_str()])
            .path(&device.partition_path(1)),
        CommandSpec::new("mkfs.exfat")
            .args(["-n", layout.data_label.as_str()])
            .path(&device.partition_path(2)),
    ]);
    plan
}

/// Commands that install syslinux and rEFInd and mount both partitions.
pub fn bootloader_plan(device: &Device, config: &Config, mounts: &VolumeMounts) -> Vec<CommandSpec> {
    let loaders = &config.bootloaders;
    let boot_part = device.partition_path(1);
    let data_part = device.partition_path(2);

    let mut plan = vec![
        CommandSpec::new("syslinux").arg("--install").path(&boot_part),
        CommandSpec::new("dd")
            .args(["bs=440", "count=1", "conv=notrunc"])
            .arg(format!("if={}", loaders.syslinux_mbr.display()))
            .arg(format!("of={}", device.path.display())),
        CommandSpec::new("refind-install").arg("--usedefault").path(&boot_part),
        CommandSpec::new("mount").path(&boot_part).path(&mounts.boot),
        CommandSpec::new("mount").path(&data_part).path(&mounts.data),
    ];

    let modules = ["menu.c32", "libutil.c32"]
        .iter()
        .map(|module| loaders.syslinux_modules.join(module));
    plan.push(
        CommandSpec::new("cp")
            .args(modules)
            .path(&loaders.memdisk)
            .path(&mounts.boot),
    );
    plan
}

/// Writes minimal syslinux and rEFInd configs unless they already exist.
fn seed_configs(config: &Config, boot: &Path) -> Result<()> {
    let seeds = [
        (&config.bootloaders.syslinux_config, SYSLINUX_SEED),
        (&config.bootloaders.refind_config, REFIND_SEED),
    ];
    for (relative, seed) in seeds {
        let path = boot.join(relative);
        if path.exists() {
            continue;
        }
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, seed)?;
        log::debug!("Seeded {}", path.display());
    }
    Ok(())
}
