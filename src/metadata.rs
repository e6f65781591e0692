use std::fmt;
use std::fs;
use std::path::Path;

use chrono::{DateTime, Utc};
use select::document::Document;
use select::predicate::Name;
use serde::Serialize;
use url::Url;

use crate::error::{MirrorError, Result};

/// Summary of a saved page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageMetadata {
    #[serde(rename = "site")]
    pub hostname: String,
    #[serde(rename = "num_links")]
    pub link_count: usize,
    #[serde(rename = "images")]
    pub image_count: usize,
    pub last_fetch: DateTime<Utc>,
}

impl PageMetadata {
    /// Last fetch time in the `Mon, 19 Oct 2026 08:30:00 GMT` form.
    pub fn last_fetch_display(&self) -> String {
        self.last_fetch.format("%a, %d %b %Y %H:%M:%S GMT").to_string()
    }
}

impl fmt::Display for PageMetadata {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "site: {}", self.hostname)?;
        writeln!(f, "num_links: {}", self.link_count)?;
        writeln!(f, "images: {}", self.image_count)?;
        write!(f, "last_fetch: {}", self.last_fetch_display())
    }
}

/// Builds the metadata record for a page from its final markup and the file
/// it was written to. Reads nothing but the file's modification time.
pub fn report(html: &str, url: &Url, file_path: &Path) -> Result<PageMetadata> {
    let document = Document::from(html);
    let link_count = document.find(Name("a")).count();
    let image_count = document.find(Name("img")).count();

    let modified = fs::metadata(file_path)
        .and_then(|meta| meta.modified())
        .map_err(|e| MirrorError::io(file_path, e))?;

    Ok(PageMetadata {
        hostname: url.host_str().unwrap_or_default().to_string(),
        link_count,
        image_count,
        last_fetch: DateTime::<Utc>::from(modified),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use tempfile::tempdir;

    #[test]
    fn test_counts_links_and_images() {
        let html = r##"
            <html>
                <body>
                    <a href="#">Link 1</a>
                    <a href="#">Link 2</a>
                    <img src="image1.jpg">
                    <img src="image2.jpg">
                </body>
            </html>
        "##;
        let temp_dir = tempdir().unwrap();
        let file_path = temp_dir.path().join("index.html");
        fs::write(&file_path, html).unwrap();
        let url = Url::parse("https://example.com/news").unwrap();

        let metadata = report(html, &url, &file_path).unwrap();

        assert_eq!(metadata.hostname, "example.com");
        assert_eq!(metadata.link_count, 2);
        assert_eq!(metadata.image_count, 2);
        let text = metadata.to_string();
        assert!(text.contains("num_links: 2"));
        assert!(text.contains("images: 2"));
    }

    #[test]
    fn test_missing_file_is_an_io_error() {
        let temp_dir = tempdir().unwrap();
        let url = Url::parse("https://example.com/").unwrap();
        let err = report("<html></html>", &url, &temp_dir.path().join("absent.html")).unwrap_err();
        assert!(matches!(err, MirrorError::Io { .. }));
    }

    #[test]
    fn test_record_format() {
        let metadata = PageMetadata {
            hostname: "some.api".to_string(),
            link_count: 3,
            image_count: 1,
            last_fetch: Utc.with_ymd_and_hms(2026, 10, 19, 8, 5, 9).unwrap(),
        };

        assert_eq!(
            metadata.to_string(),
            "site: some.api\nnum_links: 3\nimages: 1\nlast_fetch: Mon, 19 Oct 2026 08:05:09 GMT"
        );

        let json = serde_json::to_value(&metadata).unwrap();
        assert_eq!(json["site"], "some.api");
        assert_eq!(json["num_links"], 3);
        assert_eq!(json["images"], 1);
    }
}
