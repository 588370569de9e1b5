//! FreeBSD release tree: an index of `<version>-RELEASE/` directories, each
//! holding its own image listing.
use super::fetch::Fetch;
use super::listing::{extract_files, extract_links, guess_architecture, join_url};
use super::fetch_or_empty;
use crate::catalog::{CatalogEntry, FileType};
use regex::Regex;
use std::sync::LazyLock;

static RELEASE_DIR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d+\.\d+[-RELEASE]+/").expect("release pattern is valid"));

/// Release directory names from the top-level index, slashes stripped.
pub fn release_dirs(links: &[String]) -> Vec<String> {
    links
        .iter()
        .filter(|href| RELEASE_DIR.is_match(href))
        .map(|href| href.trim_matches('/').to_string())
        .collect()
}

/// Walks the index and every release directory below it.
///
/// A release directory that fails to load contributes nothing; the others are
/// still scanned.
pub fn scrape(fetcher: &dyn Fetch, base_url: &str, on_fetch: &mut dyn FnMut(&str)) -> Vec<CatalogEntry> {
    let Some(index) = fetch_or_empty(fetcher, base_url, on_fetch) else {
        return Vec::new();
    };

    let mut entries = Vec::new();
    for release in release_dirs(&extract_links(&index)) {
        let release_url = join_url(base_url, &format!("{release}/"));
        log::info!("Scanning release: {release}");
        let Some(listing) = fetch_or_empty(fetcher, &release_url, on_fetch) else {
            continue;
        };
        for filename in extract_files(&extract_links(&listing)) {
            entries.push(release_entry(&release_url, &release, filename));
        }
    }
    entries
}

pub(super) fn release_entry(release_url: &str, release: &str, filename: String) -> CatalogEntry {
    let version = release.split('-').next().unwrap_or(release);
    let file_type = FileType::from_filename(&filename);

    let mut entry = CatalogEntry::new(format!("FreeBSD {version} ({file_type})"), filename.clone());
    entry.codename = format!("FreeBSD-{version}");
    entry.version = version.to_string();
    entry.match_hints.push(release.to_string());
    entry.category = Some("BSD".to_string());
    entry.desktop = Some("None".to_string());
    entry.architecture = guess_architecture(&filename);
    entry.url = Some(join_url(release_url, &filename));
    entry
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{Error, Result};
    use std::collections::HashMap;

    const BASE: &str = "https://download.freebsd.org/ftp/releases/amd64/";

    struct CannedFetcher(HashMap<String, String>);

    impl Fetch for CannedFetcher {
        fn fetch(&self, url: &str) -> Result<String> {
            self.0.get(url).cloned().ok_or_else(|| Error::Fetch {
                url: url.to_string(),
                reason: "server answered 404 Not Found".to_string(),
            })
        }
    }

    fn anchors(hrefs: &[&str]) -> String {
        hrefs
            .iter()
            .map(|h| format!("<a href=\"{h}\">{h}</a>\n"))
            .collect()
    }

    #[test]
    fn release_dirs_match_versioned_directories_only() {
        let links: Vec<String> = ["../", "13.3-RELEASE/", "14.1-RELEASE/", "ISO-IMAGES/", "14.1-RELEASE", "README.TXT"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        assert_eq!(release_dirs(&links), vec!["13.3-RELEASE", "14.1-RELEASE"]);
    }

    #[test]
    fn scrape_fetches_index_then_each_release() {
        let mut pages = HashMap::new();
        pages.insert(BASE.to_string(), anchors(&["../", "13.3-RELEASE/", "14.1-RELEASE/"]));
        pages.insert(
            format!("{BASE}13.3-RELEASE/"),
            anchors(&["MANIFEST", "FreeBSD-13.3-RELEASE-amd64-disc1.iso"]),
        );
        pages.insert(
            format!("{BASE}14.1-RELEASE/"),
            anchors(&["FreeBSD-14.1-RELEASE-amd64-disc1.iso", "FreeBSD-14.1-RELEASE-amd64-memstick.img"]),
        );
        let fetcher = CannedFetcher(pages);

        let mut fetched = Vec::new();
        let entries = scrape(&fetcher, BASE, &mut |url| fetched.push(url.to_string()));

        assert_eq!(fetched.len(), 3);
        assert_eq!(entries.len(), 3);

        let memstick = &entries[2];
        assert_eq!(memstick.label, "FreeBSD 14.1 (IMG)");
        assert_eq!(memstick.codename, "FreeBSD-14.1");
        assert_eq!(memstick.version, "14.1");
        assert_eq!(memstick.match_hints, vec!["FreeBSD-14.1-RELEASE-amd64-memstick.img", "14.1-RELEASE"]);
        assert_eq!(memstick.category.as_deref(), Some("BSD"));
        assert_eq!(memstick.architecture, "amd64");
        assert_eq!(memstick.boot_params, None);
        assert_eq!(
            memstick.url.as_deref(),
            Some("https://download.freebsd.org/ftp/releases/amd64/14.1-RELEASE/FreeBSD-14.1-RELEASE-amd64-memstick.img")
        );
    }

    #[test]
    fn failing_release_directory_is_skipped() {
        let mut pages = HashMap::new();
        pages.insert(BASE.to_string(), anchors(&["13.3-RELEASE/", "14.1-RELEASE/"]));
        pages.insert(
            format!("{BASE}14.1-RELEASE/"),
            anchors(&["FreeBSD-14.1-RELEASE-amd64-disc1.iso"]),
        );
        let entries = scrape(&CannedFetcher(pages), BASE, &mut |_| {});
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].label, "FreeBSD 14.1 (ISO)");
    }

    #[test]
    fn failing_index_yields_nothing() {
        let entries = scrape(&CannedFetcher(HashMap::new()), BASE, &mut |_| {});
        assert!(entries.is_empty());
    }

    #[test]
    fn architecture_comes_from_the_image_name() {
        let release_url = "https://download.freebsd.org/ftp/releases/arm64/aarch64/14.1-RELEASE/";
        let arm = release_entry(release_url, "14.1-RELEASE", "FreeBSD-14.1-RELEASE-arm64-aarch64-memstick.img".to_string());
        assert_eq!(arm.architecture, "arm64");

        let riscv = release_entry(release_url, "14.1-RELEASE", "FreeBSD-14.1-RELEASE-riscv-riscv64-disc1.iso".to_string());
        assert_eq!(riscv.architecture, "riscv64");

        let bare = release_entry(release_url, "14.1-RELEASE", "FreeBSD-14.1-RELEASE-bootonly.iso".to_string());
        assert_eq!(bare.architecture, "unknown");
    }
}
