use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use console::style;
use dialoguer::{Confirm, Input, Select, theme::ColorfulTheme};
use echoboot_core::catalog;
use echoboot_core::command::SystemRunner;
use echoboot_core::config::Config;
use echoboot_core::device::Device;
use echoboot_core::emitter;
use echoboot_core::mounts::VolumeMounts;
use echoboot_core::orchestrator::{Operator, Orchestrator, Stage};
use echoboot_core::scraper::{HttpFetcher, ScraperFamily};
use echoboot_core::validate::{self, Outcome};
use indicatif::{ProgressBar, ProgressStyle};
use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

#[derive(Parser)]
#[command(name = "echoboot")]
#[command(about = "Build multiboot USB drives from distro mirror catalogs", version)]
struct Cli {
    /// Configuration file (TOML)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Show debug output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Scrape a distro mirror into a catalog file
    Scrape {
        /// Mirror family: debian, debian-mirror or freebsd
        family: ScraperFamily,

        /// Listing URL to scrape instead of the configured mirror
        #[arg(long)]
        url: Option<String>,

        /// Catalog file to write
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Validate each entry of a catalog file against the entry schema
    Validate {
        /// Catalog file to check (defaults to the configured catalog)
        file: Option<PathBuf>,

        /// Schema document to validate against
        #[arg(long)]
        schema: Option<PathBuf>,
    },
    /// List available removable devices
    List,
    /// Match images on the DATA partition and append boot menu entries
    UpdateEntries {
        /// Catalog to match against
        #[arg(long)]
        catalog: Option<PathBuf>,

        /// BOOT partition mount point
        #[arg(long)]
        boot: Option<PathBuf>,

        /// DATA partition mount point
        #[arg(long)]
        data: Option<PathBuf>,
    },
    /// Prepare a drive interactively: partition, install bootloaders, add entries
    Create {
        /// Catalog to match against once images are copied
        #[arg(long)]
        catalog: Option<PathBuf>,
    },
}

/// Prints every log record as a single `[LEVEL] message` line.
fn init_logging(verbose: bool) {
    let default_filter = if verbose {
        "info,echoboot=debug,echoboot_core=debug"
    } else {
        "info"
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .target(env_logger::Target::Stdout)
        .format(|buf, record| writeln!(buf, "[{}] {}", record.level(), record.args()))
        .init();
}

fn spinner(prefix: &'static str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_prefix(prefix);
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{prefix:12} [{elapsed_precise}] {spinner:.blue} {msg}")
            .unwrap(),
    );
    pb
}

/// Presents an interactive menu for the user to select a device.
fn select_device(devices: &[Device], prompt: &str) -> Result<Option<usize>> {
    let items: Vec<String> = devices.iter().map(|d| d.to_string()).collect();

    let selection = Select::with_theme(&ColorfulTheme::default())
        .with_prompt(prompt)
        .items(&items)
        .default(0)
        .interact_opt()?;

    Ok(selection)
}

/// Presents a final "Yes/No" confirmation to the user.
fn confirm_operation(prompt: &str) -> Result<bool> {
    let confirmation = Confirm::with_theme(&ColorfulTheme::default())
        .with_prompt(prompt)
        .default(false)
        .interact()?;

    Ok(confirmation)
}

/// Answers the orchestrator's questions on the terminal.
struct TerminalOperator {
    status: Option<ProgressBar>,
}

impl TerminalOperator {
    fn new() -> Self {
        Self { status: None }
    }

    fn finish_status(&mut self) {
        if let Some(pb) = self.status.take() {
            pb.finish_with_message("done.");
        }
    }
}

impl Operator for TerminalOperator {
    fn select_drive(&mut self, devices: &[Device]) -> echoboot_core::Result<Option<usize>> {
        select_device(devices, "Select the drive to turn into an EchoBoot drive")
            .map_err(|e| echoboot_core::Error::Prompt(e.to_string()))
    }

    fn confirm_erase(&mut self, device: &Device) -> echoboot_core::Result<bool> {
        println!(
            "{} This will erase all data on '{}' ({:.1} GB).",
            style("WARNING:").red().bold(),
            device.name,
            device.size_gb,
        );
        println!("  Device: {}", style(device.path.display()).cyan());
        println!();

        confirm_operation("Are you sure you want to proceed?")
            .map_err(|e| echoboot_core::Error::Prompt(e.to_string()))
    }

    fn await_copy(&mut self, mounts: &VolumeMounts) -> echoboot_core::Result<()> {
        println!();
        println!(
            "Copy your ISO/IMG files to {}.",
            style(mounts.data.display()).cyan()
        );
        Input::<String>::with_theme(&ColorfulTheme::default())
            .with_prompt("Press Enter when done")
            .allow_empty(true)
            .interact_text()
            .map_err(|e| echoboot_core::Error::Prompt(e.to_string()))?;
        Ok(())
    }

    fn on_stage(&mut self, stage: &Stage) {
        self.finish_status();
        let prefix = match stage {
            Stage::Partition(_) => "Partition",
            Stage::InstallBootloaders(_) => "Bootloaders",
            Stage::UpdateBootEntries => "Entries",
            _ => return,
        };
        let pb = spinner(prefix);
        pb.set_message(format!("{}...", stage.name()));
        pb.tick();
        self.status = Some(pb);
    }
}

fn run(cli: Cli) -> Result<()> {
    let mut config = Config::load(cli.config.as_deref()).context("Failed to load configuration")?;

    match cli.command {
        Commands::Scrape {
            family,
            url,
            output,
        } => {
            let url = url.unwrap_or_else(|| family.base_url(&config.mirrors).to_string());
            let output = output.unwrap_or_else(|| PathBuf::from(family.default_output()));
            let fetcher = HttpFetcher::new(Duration::from_secs(config.http_timeout_secs))?;

            let pb = spinner("Scraping");
            let entries = family.scrape(&fetcher, &url, |fetching| {
                pb.set_message(fetching.to_string());
                pb.tick();
            });
            pb.finish_and_clear();

            catalog::save(&entries, &output)
                .with_context(|| format!("Failed to write {}", output.display()))?;
            println!(
                "{} Saved {} entries to {}",
                style("[OK]").green().bold(),
                entries.len(),
                style(output.display()).cyan()
            );
        }
        Commands::Validate { file, schema } => {
            let target = file.unwrap_or_else(|| config.catalog_path.clone());
            let schema = schema.or_else(|| config.schema_path.clone());

            let reports = validate::validate_file(&target, schema.as_deref())?;
            for report in &reports {
                let line = report.to_string();
                match report.outcome {
                    Outcome::Ok(_) => println!("{}", style(line).green()),
                    Outcome::Fail(_) => println!("{}", style(line).red()),
                }
            }
        }
        Commands::List => {
            let devices = echoboot_core::platform::get_removable_devices()?;
            if devices.is_empty() {
                println!("No removable devices found.");
                return Ok(());
            }

            println!("Found {} removable devices:", devices.len());
            println!(
                "\n  {:<12} {:<25} {:<10} {}",
                "DEVICE", "NAME", "SIZE", "LOCATION"
            );
            println!("  {:-<12} {:-<25} {:-<10} {:-<20}", "", "", "", "");
            for device in devices {
                let location = if device.mount_points.is_empty() {
                    "(Not mounted)".to_string()
                } else {
                    device
                        .mount_points
                        .iter()
                        .map(|mp| mp.display().to_string())
                        .collect::<Vec<_>>()
                        .join(", ")
                };
                println!(
                    "  {:<12} {:<25} {:>8.1} GB  {}",
                    device.path.display(),
                    device.name,
                    device.size_gb,
                    location
                );
            }
        }
        Commands::UpdateEntries {
            catalog,
            boot,
            data,
        } => {
            if let Some(catalog) = catalog {
                config.catalog_path = catalog;
            }
            config.boot_mount = boot.or(config.boot_mount);
            config.data_mount = data.or(config.data_mount);

            let mounts = VolumeMounts::resolve(&config)?;
            let report = emitter::update_boot_entries(&config, &mounts)?;
            println!(
                "\n✨ {} of {} images added to the boot menus on {}.",
                report.matched,
                report.discovered,
                style(mounts.boot.display()).cyan()
            );
        }
        Commands::Create { catalog } => {
            if let Some(catalog) = catalog {
                config.catalog_path = catalog;
            }
            log::info!("Welcome to EchoBoot v{}", env!("CARGO_PKG_VERSION"));

            let mut operator = TerminalOperator::new();
            let mut orchestrator = Orchestrator::new(&config, SystemRunner);
            let result = orchestrator.run(&mut operator);
            operator.finish_status();

            match result? {
                Stage::Done(report) => println!(
                    "\n✨ Complete. {} of {} images added to the boot menus.",
                    report.matched, report.discovered
                ),
                _ => println!("Operation cancelled."),
            }
        }
    }

    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{e:#}");
            ExitCode::FAILURE
        }
    }
}
