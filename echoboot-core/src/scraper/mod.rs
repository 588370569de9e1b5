//! Mirror scrapers.
//!
//! Every family shares the same plumbing: fetch a directory listing, pull the
//! anchor targets out of it, keep the image files, and turn their names into
//! [`CatalogEntry`] records. The families differ only in how names map to
//! entries, and in the FreeBSD case, in walking one extra directory level.
//!
//! Fetch failures never abort a run. A listing that cannot be loaded is logged
//! and contributes zero entries.

mod debian;
mod fetch;
mod freebsd;
mod listing;

pub use fetch::{Fetch, HttpFetcher};
pub use listing::{
    extract_files, extract_links, guess_architecture, guess_desktop, is_image, IMAGE_EXTENSIONS,
};

use crate::catalog::CatalogEntry;
use crate::config::Mirrors;
use std::fmt;
use std::str::FromStr;

/// The mirror layouts EchoBoot knows how to read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScraperFamily {
    /// Debian live images named `debian-<major>.<minor>...-<flavor>.iso`.
    Debian,
    /// Any Debian mirror directory; every image becomes an entry.
    DebianMirror,
    /// FreeBSD release tree, two levels deep.
    FreeBsd,
}

impl ScraperFamily {
    pub const ALL: [ScraperFamily; 3] = [Self::Debian, Self::DebianMirror, Self::FreeBsd];

    pub fn name(&self) -> &'static str {
        match self {
            Self::Debian => "debian",
            Self::DebianMirror => "debian-mirror",
            Self::FreeBsd => "freebsd",
        }
    }

    /// Catalog file a scrape of this family writes unless told otherwise.
    pub fn default_output(&self) -> &'static str {
        match self {
            Self::Debian | Self::DebianMirror => "debian_autogen.json",
            Self::FreeBsd => "freebsd_autogen.json",
        }
    }

    pub fn base_url<'a>(&self, mirrors: &'a Mirrors) -> &'a str {
        match self {
            Self::Debian => &mirrors.debian,
            Self::DebianMirror => &mirrors.debian_mirror,
            Self::FreeBsd => &mirrors.freebsd,
        }
    }

    /// Maps one listing's links to entries. For the FreeBSD family `base_url`
    /// must be a release directory; its last path segment names the release.
    pub fn parse_entries(&self, base_url: &str, links: &[String]) -> Vec<CatalogEntry> {
        match self {
            Self::Debian => debian::parse_live(base_url, links),
            Self::DebianMirror => debian::parse_mirror(base_url, links),
            Self::FreeBsd => {
                let release = base_url.trim_end_matches('/').rsplit('/').next().unwrap_or_default();
                extract_files(links)
                    .into_iter()
                    .map(|filename| freebsd::release_entry(base_url, release, filename))
                    .collect()
            }
        }
    }

    /// Scrapes `base_url` and returns the resulting entries.
    ///
    /// `on_fetch` is called with each URL just before it is requested.
    pub fn scrape(
        &self,
        fetcher: &dyn Fetch,
        base_url: &str,
        mut on_fetch: impl FnMut(&str),
    ) -> Vec<CatalogEntry> {
        let entries = match self {
            Self::FreeBsd => freebsd::scrape(fetcher, base_url, &mut on_fetch),
            Self::Debian | Self::DebianMirror => {
                match fetch_or_empty(fetcher, base_url, &mut on_fetch) {
                    Some(html) => {
                        let links = extract_links(&html);
                        log::info!(
                            "Found {} files (.iso/.img) at {base_url}",
                            extract_files(&links).len()
                        );
                        self.parse_entries(base_url, &links)
                    }
                    None => Vec::new(),
                }
            }
        };
        log::info!("{} scraper produced {} entries", self.name(), entries.len());
        entries
    }
}

impl fmt::Display for ScraperFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ScraperFamily {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|family| family.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| {
                let known: Vec<&str> = Self::ALL.iter().map(|f| f.name()).collect();
                format!("unknown scraper family '{s}' (expected one of: {})", known.join(", "))
            })
    }
}

/// Fetches `url`, logging and swallowing any failure.
pub(crate) fn fetch_or_empty(
    fetcher: &dyn Fetch,
    url: &str,
    on_fetch: &mut dyn FnMut(&str),
) -> Option<String> {
    on_fetch(url);
    match fetcher.fetch(url) {
        Ok(text) => Some(text),
        Err(e) => {
            log::error!("{e}");
            None
        }
    }
}
