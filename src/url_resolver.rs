use std::path::PathBuf;

use url::Url;

use crate::error::{MirrorError, Result};

/// An asset reference resolved against its page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedAsset {
    /// Absolute URL the asset is downloaded from.
    pub fetch_url: Url,
    /// Location of the local copy, relative to the page's output directory.
    pub local_path: PathBuf,
}

/// Resolves asset references found in a page against that page's URL.
#[derive(Debug, Clone)]
pub struct UrlResolver {
    base_url: Url,
}

impl UrlResolver {
    pub fn new(base_url: &str) -> Result<Self> {
        let base_url = Url::parse(base_url).map_err(|source| MirrorError::InvalidUrl {
            url: base_url.to_string(),
            source,
        })?;

        Ok(Self { base_url })
    }

    pub fn from_url(base_url: Url) -> Self {
        Self { base_url }
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Resolves `reference` the way a browser would and derives the local
    /// path from the resulting URL's path component. The host and the query
    /// string do not take part in the local path.
    pub fn resolve(&self, reference: &str) -> Result<ResolvedAsset> {
        let fetch_url = self
            .base_url
            .join(reference)
            .map_err(|source| MirrorError::Resolution {
                reference: reference.to_string(),
                source,
            })?;

        match fetch_url.scheme() {
            "http" | "https" => {}
            scheme => {
                return Err(MirrorError::UnsupportedScheme {
                    url: fetch_url.to_string(),
                    scheme: scheme.to_string(),
                })
            }
        }

        let local_path = local_path_for(&fetch_url)?;
        Ok(ResolvedAsset {
            fetch_url,
            local_path,
        })
    }
}

/// Convenience wrapper resolving a single reference against `base_url`.
pub fn resolve(reference: &str, base_url: &str) -> Result<ResolvedAsset> {
    UrlResolver::new(base_url)?.resolve(reference)
}

fn local_path_for(url: &Url) -> Result<PathBuf> {
    if url.path().ends_with('/') {
        return Err(MirrorError::MissingFileName {
            url: url.to_string(),
        });
    }

    let segments: Vec<&str> = url
        .path_segments()
        .map(|segments| segments.filter(|s| !s.is_empty()).collect())
        .unwrap_or_default();

    if segments.is_empty() {
        return Err(MirrorError::MissingFileName {
            url: url.to_string(),
        });
    }

    // URL parsing already collapses dot segments; anything left over must not
    // reach the filesystem.
    if segments
        .iter()
        .any(|s| *s == "." || *s == ".." || s.contains('\\'))
    {
        return Err(MirrorError::UnsafePath {
            url: url.to_string(),
        });
    }

    Ok(segments.iter().collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use std::path::Path;

    #[test]
    fn test_url_resolution() {
        let resolver = UrlResolver::new("https://example.com/subdir/page.html").unwrap();

        let test_cases = vec![
            ("../style.css", "https://example.com/style.css", "style.css"),
            ("./script.js", "https://example.com/subdir/script.js", "subdir/script.js"),
            ("images/photo.jpg", "https://example.com/subdir/images/photo.jpg", "subdir/images/photo.jpg"),
            ("/css/main.css", "https://example.com/css/main.css", "css/main.css"),
            ("https://cdn.example.com/lib/app.js", "https://cdn.example.com/lib/app.js", "lib/app.js"),
            ("//cdn.example.com/script.js", "https://cdn.example.com/script.js", "script.js"),
        ];

        for (input, expected_url, expected_path) in test_cases {
            let asset = resolver.resolve(input).unwrap();
            assert_eq!(asset.fetch_url.as_str(), expected_url, "Failed for input: {}", input);
            assert_eq!(asset.local_path, Path::new(expected_path), "Failed for input: {}", input);
        }
    }

    #[test]
    fn test_query_and_fragment_do_not_reach_the_path() {
        let asset = resolve("/css/site.css?v=3#top", "https://example.com/").unwrap();
        assert_eq!(asset.fetch_url.as_str(), "https://example.com/css/site.css?v=3#top");
        assert_eq!(asset.local_path, Path::new("css/site.css"));
    }

    #[test]
    fn test_segments_are_kept_verbatim() {
        let asset = resolve("/img/my%20photo.png", "https://example.com/").unwrap();
        assert_eq!(asset.local_path, Path::new("img/my%20photo.png"));

        let asset = resolve("/a//b/c.png", "https://example.com/").unwrap();
        assert_eq!(asset.local_path, Path::new("a/b/c.png"));
    }

    #[test]
    fn test_parent_segments_cannot_escape() {
        let resolver = UrlResolver::new("https://example.com/").unwrap();

        for reference in ["../../etc/passwd", "/../../x.png", "%2e%2e/%2e%2e/x.png", "a/../../../b.png"] {
            let asset = resolver.resolve(reference).unwrap();
            assert!(
                asset.local_path.components().all(|c| matches!(c, std::path::Component::Normal(_))),
                "{} escaped to {:?}",
                reference,
                asset.local_path
            );
        }
    }

    #[test]
    fn test_malformed_reference() {
        let err = resolve("http://[broken", "https://example.com/").unwrap_err();
        assert!(matches!(err, MirrorError::Resolution { .. }));
        assert_eq!(err.kind(), ErrorKind::UrlResolution);
    }

    #[test]
    fn test_invalid_base_url() {
        let err = resolve("image.jpg", "not a url").unwrap_err();
        assert!(matches!(err, MirrorError::InvalidUrl { .. }));
    }

    #[test]
    fn test_non_http_schemes_are_rejected() {
        let resolver = UrlResolver::new("https://example.com/").unwrap();
        for reference in ["data:image/png;base64,AAAA", "javascript:void(0)", "ftp://example.com/a.js"] {
            let err = resolver.resolve(reference).unwrap_err();
            assert!(matches!(err, MirrorError::UnsupportedScheme { .. }), "{}", reference);
        }
    }

    #[test]
    fn test_directory_references_are_rejected() {
        let resolver = UrlResolver::new("https://example.com/blog/").unwrap();
        for reference in ["/", "assets/", "https://cdn.example.com"] {
            let err = resolver.resolve(reference).unwrap_err();
            assert!(matches!(err, MirrorError::MissingFileName { .. }), "{}", reference);
        }
    }

    #[test]
    fn test_path_segments_round_trip() {
        let base = "https://example.com/docs/index.html";
        for original in [
            "https://example.com/css/main.css",
            "https://example.com/a/b/c/d.png",
            "https://example.com/js/app.min.js?v=2",
        ] {
            let asset = resolve(original, base).unwrap();
            let rebuilt_path = asset
                .local_path
                .components()
                .map(|c| c.as_os_str().to_string_lossy().into_owned())
                .collect::<Vec<_>>()
                .join("/");
            let origin = Url::parse(base).unwrap();
            let rebuilt = origin.join(&format!("/{}", rebuilt_path)).unwrap();
            assert_eq!(rebuilt.path(), Url::parse(original).unwrap().path());
        }
    }
}
