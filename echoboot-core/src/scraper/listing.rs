//! Helpers for picking apart directory-listing HTML.
use std::sync::LazyLock;

use regex::Regex;

static ANCHOR_HREF: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?is)<a(?:\s[^>]*?)?\shref\s*=\s*(?:"([^"]*)"|'([^']*)'|([^\s>]+))"#)
        .expect("anchor pattern is valid")
});

/// Suffixes that mark a listing entry as a bootable image.
pub const IMAGE_EXTENSIONS: [&str; 2] = [".iso", ".img"];

/// Desktop environments recognised in filenames, in priority order.
const DESKTOPS: [&str; 7] = ["gnome", "kde", "xfce", "lxde", "lxqt", "mate", "cinnamon"];

const ARCHITECTURES: [&str; 6] = ["amd64", "arm64", "i386", "riscv64", "ppc64el", "s390x"];

/// Returns the `href` of every anchor in `html`, in document order.
///
/// Duplicates are kept. Anchors without an `href` attribute are ignored.
pub fn extract_links(html: &str) -> Vec<String> {
    ANCHOR_HREF
        .captures_iter(html)
        .filter_map(|caps| caps.get(1).or_else(|| caps.get(2)).or_else(|| caps.get(3)))
        .map(|m| html_escape::decode_html_entities(m.as_str()).into_owned())
        .collect()
}

/// Whether `href` names an image file. The suffix match is case-sensitive.
pub fn is_image(href: &str) -> bool {
    IMAGE_EXTENSIONS.iter().any(|ext| href.ends_with(ext))
}

/// Keeps the links that name image files, preserving their order.
pub fn extract_files(links: &[String]) -> Vec<String> {
    links.iter().filter(|href| is_image(href)).cloned().collect()
}

/// Guesses the desktop environment from a filename; first listed match wins.
pub fn guess_desktop(filename: &str) -> String {
    let lower = filename.to_lowercase();
    DESKTOPS
        .iter()
        .find(|de| lower.contains(*de))
        .map(|de| de.to_uppercase())
        .unwrap_or_else(|| "Unknown".to_string())
}

pub fn guess_architecture(filename: &str) -> String {
    ARCHITECTURES
        .iter()
        .find(|arch| filename.contains(*arch))
        .map(|arch| arch.to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

/// Joins a listing URL and a relative href.
pub fn join_url(base: &str, href: &str) -> String {
    if base.ends_with('/') {
        format!("{base}{href}")
    } else {
        format!("{base}/{href}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LISTING: &str = r#"<html><body><pre>
<a href="?C=N;O=D">Name</a>
<a href="../">Parent Directory</a>
<a href="SHA256SUMS">SHA256SUMS</a>
<a href="debian-live-12.5.0-amd64-kde.iso">debian-live-12.5.0-amd64-kde.iso</a>
<a class="x" HREF='debian-12.5.0-amd64-gnome.iso'>gnome</a>
<a href=memstick.img>memstick</a>
<a name="anchor-only">no href</a>
<a href="debian-12.5.0-amd64-gnome.iso.torrent">torrent</a>
<a href="debian-live-12.5.0-amd64-kde.iso">again</a>
</pre></body></html>"#;

    #[test]
    fn links_come_back_in_document_order_with_duplicates() {
        let links = extract_links(LISTING);
        assert_eq!(
            links,
            vec![
                "?C=N;O=D",
                "../",
                "SHA256SUMS",
                "debian-live-12.5.0-amd64-kde.iso",
                "debian-12.5.0-amd64-gnome.iso",
                "memstick.img",
                "debian-12.5.0-amd64-gnome.iso.torrent",
                "debian-live-12.5.0-amd64-kde.iso",
            ]
        );
    }

    #[test]
    fn extract_files_keeps_only_images_in_order() {
        let files = extract_files(&extract_links(LISTING));
        assert_eq!(
            files,
            vec![
                "debian-live-12.5.0-amd64-kde.iso",
                "debian-12.5.0-amd64-gnome.iso",
                "memstick.img",
                "debian-live-12.5.0-amd64-kde.iso",
            ]
        );
    }

    #[test]
    fn image_suffix_is_case_sensitive() {
        assert!(is_image("a.iso"));
        assert!(is_image("a.img"));
        assert!(!is_image("A.ISO"));
        assert!(!is_image("a.iso.sig"));
        assert!(!is_image(""));
    }

    #[test]
    fn entities_in_hrefs_are_decoded() {
        let links = extract_links(r#"<a href="get?file=a.iso&amp;mirror=1">x</a>"#);
        assert_eq!(links, vec!["get?file=a.iso&mirror=1"]);

        let links = extract_links(r#"<a href="debian&#45;12.iso">x</a><a href="tails&#x2D;6.img">y</a>"#);
        assert_eq!(links, vec!["debian-12.iso", "tails-6.img"]);
    }

    #[test]
    fn only_the_href_attribute_itself_is_read() {
        let links = extract_links(
            r#"<a data-href="thumb.img" href="debian-12.5.0-amd64-gnome.iso">g</a>
<a
   href="memstick.img">m</a>"#,
        );
        assert_eq!(links, vec!["debian-12.5.0-amd64-gnome.iso", "memstick.img"]);
    }

    #[test]
    fn desktop_detection_takes_first_listed_match() {
        assert_eq!(guess_desktop("debian-live-12.5.0-amd64-GNOME.iso"), "GNOME");
        // "kde" is listed before "lxqt", so it wins regardless of position.
        assert_eq!(guess_desktop("lxqt-and-kde.iso"), "KDE");
        assert_eq!(guess_desktop("debian-12.5.0-amd64-netinst.iso"), "Unknown");
    }

    #[test]
    fn architecture_detection_defaults_to_unknown() {
        assert_eq!(guess_architecture("debian-12.5.0-amd64-netinst.iso"), "amd64");
        assert_eq!(guess_architecture("FreeBSD-14.1-RELEASE-arm64-aarch64.img"), "arm64");
        assert_eq!(guess_architecture("tails.img"), "unknown");
    }

    #[test]
    fn join_url_adds_missing_slash() {
        assert_eq!(join_url("https://m/x/", "a.iso"), "https://m/x/a.iso");
        assert_eq!(join_url("https://m/x", "a.iso"), "https://m/x/a.iso");
    }
}
