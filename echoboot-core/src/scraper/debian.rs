//! Debian listing parsers.
use super::listing::{extract_files, guess_architecture, guess_desktop, join_url};
use crate::catalog::CatalogEntry;
use regex::{Regex, RegexBuilder};
use std::sync::LazyLock;

static LIVE_IMAGE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"debian-(\d{1,2})\.(\d+).*-(\w+)\.(iso|img)").expect("live image pattern is valid")
});

static VERSION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d{1,2}\.\d+|\d{4})").expect("version pattern is valid"));

static FLAVOR: LazyLock<Regex> = LazyLock::new(|| {
    RegexBuilder::new(r"(xfce|gnome|kde|lxde|lxqt|netinst|live)")
        .case_insensitive(true)
        .build()
        .expect("flavor pattern is valid")
});

/// Builds entries from a Debian live listing.
///
/// Only names shaped like `debian-<major>.<minor>...-<flavor>.<iso|img>` become
/// entries; everything else is skipped.
pub fn parse_live(base_url: &str, links: &[String]) -> Vec<CatalogEntry> {
    extract_files(links)
        .into_iter()
        .filter_map(|filename| live_entry(base_url, filename))
        .collect()
}

fn live_entry(base_url: &str, filename: String) -> Option<CatalogEntry> {
    let caps = LIVE_IMAGE.captures(&filename)?;
    let (major, minor, flavor) = (&caps[1], &caps[2], &caps[3]);

    let mut entry = CatalogEntry::new(
        format!("Debian {major}.{minor} {}", capitalize(flavor)),
        filename.clone(),
    );
    entry.codename = if major == "12" { "bookworm" } else { "unknown" }.to_string();
    entry.version = format!("{major}.{minor}");
    entry.flavor = Some(flavor.to_lowercase());
    entry.desktop = Some(guess_desktop(&filename));
    entry.architecture = guess_architecture(&filename);
    entry.url = Some(join_url(base_url, &filename));
    entry
        .match_hints
        .extend([format!("debian-{major}"), flavor.to_string()]);
    entry.boot_params = Some(String::new());
    Some(entry)
}

/// Builds an entry for every image on a Debian mirror listing, taking version
/// and flavor from whatever the filename offers.
pub fn parse_mirror(base_url: &str, links: &[String]) -> Vec<CatalogEntry> {
    extract_files(links)
        .into_iter()
        .map(|filename| mirror_entry(base_url, filename))
        .collect()
}

fn mirror_entry(base_url: &str, filename: String) -> CatalogEntry {
    let version = VERSION
        .captures(&filename)
        .map(|caps| caps[1].to_string())
        .unwrap_or_else(|| "Unknown".to_string());
    let flavor = FLAVOR
        .captures(&filename)
        .map(|caps| caps[1].to_uppercase())
        .unwrap_or_else(|| "Standard".to_string());
    let stem = filename
        .replace('-', " ")
        .replace(".iso", "")
        .replace(".img", "");

    let mut entry = CatalogEntry::new(format!("Debian {}", title_case(stem.trim())), filename.clone());
    entry.version = version;
    entry.flavor = Some(flavor);
    entry.desktop = Some(guess_desktop(&filename));
    entry.architecture = guess_architecture(&filename);
    entry.url = Some(join_url(base_url, &filename));
    entry.match_hints = vec![filename.to_lowercase()];
    entry.boot_params = Some(String::new());
    entry
}

/// Upper-cases the first character and lower-cases the rest.
fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}

/// Title-cases every run of letters: "live 12.5.0 amd64" -> "Live 12.5.0 Amd64".
fn title_case(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut prev_is_letter = false;
    for c in text.chars() {
        if c.is_alphabetic() {
            if prev_is_letter {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            prev_is_letter = true;
        } else {
            out.push(c);
            prev_is_letter = false;
        }
    }
    out
}
