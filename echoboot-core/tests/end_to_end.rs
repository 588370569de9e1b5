use echoboot_core::catalog::{self, CatalogEntry};
use echoboot_core::config::Config;
use echoboot_core::emitter::{self, MARKER, UpdateReport};
use echoboot_core::mounts::VolumeMounts;
use echoboot_core::scraper::{Fetch, ScraperFamily};
use echoboot_core::{Error, Result};
use std::fs;
use std::path::Path;

struct StaticListing(&'static str);

impl Fetch for StaticListing {
    fn fetch(&self, _url: &str) -> Result<String> {
        Ok(self.0.to_string())
    }
}

fn prepared_volumes(root: &Path, images: &[&str]) -> VolumeMounts {
    let mounts = VolumeMounts {
        boot: root.join("BOOT"),
        data: root.join("DATA"),
    };
    fs::create_dir_all(mounts.boot.join("EFI/BOOT")).unwrap();
    fs::create_dir_all(&mounts.data).unwrap();
    fs::write(mounts.boot.join("syslinux.cfg"), "UI menu.c32\n").unwrap();
    fs::write(mounts.boot.join("EFI/BOOT/refind.conf"), "timeout 20\n").unwrap();
    for image in images {
        fs::write(mounts.data.join(image), b"").unwrap();
    }
    mounts
}

fn config_with_catalog(root: &Path, entries: &[CatalogEntry]) -> Config {
    let path = root.join("iso_definitions.json");
    catalog::save(entries, &path).unwrap();
    Config {
        catalog_path: path,
        ..Config::default()
    }
}

#[test]
fn hand_written_catalog_produces_both_menus() {
    let dir = tempfile::tempdir().unwrap();
    let catalog_path = dir.path().join("iso_definitions.json");
    fs::write(
        &catalog_path,
        r#"[{"label":"Debian 12 Gnome","codename":"bookworm","version":"12.0","match_hints":["debian-12","gnome"]}]"#,
    )
    .unwrap();
    let config = Config {
        catalog_path,
        ..Config::default()
    };
    let mounts = prepared_volumes(dir.path(), &["debian-12.5.0-amd64-gnome.iso"]);

    let report = emitter::update_boot_entries(&config, &mounts).unwrap();
    assert_eq!(report, UpdateReport { discovered: 1, matched: 1 });

    let syslinux = fs::read_to_string(mounts.boot.join("syslinux.cfg")).unwrap();
    assert_eq!(
        syslinux,
        format!(
            "UI menu.c32\n\n{MARKER}\n\nLABEL bookworm12.0\n  MENU LABEL Debian 12 Gnome\n  LINUX memdisk\n  INITRD /debian-12.5.0-amd64-gnome.iso\n  APPEND iso\n"
        )
    );

    let refind = fs::read_to_string(mounts.boot.join("EFI/BOOT/refind.conf")).unwrap();
    assert!(refind.starts_with("timeout 20\n"));
    assert!(refind.contains("menuentry \"Debian 12 Gnome\" {\n  disabled\n"));
}

#[test]
fn scraped_catalog_round_trips_and_matches() {
    let listing = StaticListing(
        r#"<a href="debian-12.5.0-amd64-gnome.iso">g</a>
<a href="debian-12.5.0-amd64-xfce.iso">x</a>"#,
    );
    let entries = ScraperFamily::Debian.scrape(&listing, "https://mirror/", |_| {});
    assert_eq!(entries.len(), 2);

    let dir = tempfile::tempdir().unwrap();
    let config = config_with_catalog(dir.path(), &entries);
    assert_eq!(catalog::load(&config.catalog_path).unwrap(), entries);

    let mounts = prepared_volumes(dir.path(), &["debian-12.5.0-amd64-xfce.iso", "memtest.img"]);
    let report = emitter::update_boot_entries(&config, &mounts).unwrap();
    assert_eq!(report.matched, 1);
    assert_eq!(report.unmatched(), 1);

    // The gnome entry comes first and its "debian-12" hint also fits the xfce image.
    let syslinux = fs::read_to_string(mounts.boot.join("syslinux.cfg")).unwrap();
    assert!(syslinux.contains("MENU LABEL Debian 12.5 Gnome\n"));
    assert!(syslinux.contains("INITRD /debian-12.5.0-amd64-xfce.iso\n"));
}

#[test]
fn rerunning_update_accumulates_blocks() {
    let dir = tempfile::tempdir().unwrap();
    let mut entry = CatalogEntry::new("FreeBSD 14.1 (ISO)", "FreeBSD-14.1-RELEASE-amd64-disc1.iso");
    entry.codename = "FreeBSD-14.1".to_string();
    entry.version = "14.1".to_string();
    let config = config_with_catalog(dir.path(), &[entry]);
    let mounts = prepared_volumes(dir.path(), &["FreeBSD-14.1-RELEASE-amd64-disc1.iso"]);

    emitter::update_boot_entries(&config, &mounts).unwrap();
    emitter::update_boot_entries(&config, &mounts).unwrap();

    let refind = fs::read_to_string(mounts.boot.join("EFI/BOOT/refind.conf")).unwrap();
    assert_eq!(refind.matches(MARKER).count(), 2);
    assert_eq!(refind.matches("menuentry \"FreeBSD 14.1 (ISO)\"").count(), 2);
}

#[test]
fn empty_data_volume_writes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_with_catalog(dir.path(), &[]);
    let mounts = prepared_volumes(dir.path(), &[]);

    let report = emitter::update_boot_entries(&config, &mounts).unwrap();
    assert_eq!(report, UpdateReport::default());
    assert_eq!(
        fs::read_to_string(mounts.boot.join("syslinux.cfg")).unwrap(),
        "UI menu.c32\n"
    );
}

#[test]
fn missing_catalog_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let config = Config {
        catalog_path: dir.path().join("absent.json"),
        ..Config::default()
    };
    let mounts = prepared_volumes(dir.path(), &["debian-12.iso"]);

    let err = emitter::update_boot_entries(&config, &mounts).unwrap_err();
    assert!(matches!(err, Error::NotFound(_)));
}
