use std::ffi::OsStr;
use std::fs;
use std::path::{Component, Path, PathBuf};

use crate::error::{MirrorError, Result};
use crate::url_resolver::ResolvedAsset;

/// File name of the saved page inside its output directory.
pub const PAGE_FILE_NAME: &str = "index.html";

/// Writes a page and its assets under one output directory.
#[derive(Debug, Clone)]
pub struct AssetStore {
    output_dir: PathBuf,
}

impl AssetStore {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    pub fn ensure_output_dir(&self) -> Result<()> {
        fs::create_dir_all(&self.output_dir).map_err(|e| MirrorError::io(&self.output_dir, e))
    }

    /// Saves `bytes` as the local copy of `asset`, replacing any previous
    /// copy, and returns the path to use in the rewritten markup.
    pub fn persist(&self, asset: &ResolvedAsset, bytes: &[u8]) -> Result<String> {
        let file_path = self.create_directories_for(&asset.local_path)?;

        fs::write(&file_path, bytes).map_err(|e| MirrorError::io(&file_path, e))?;

        self.relative_reference(&file_path)
    }

    /// Writes the serialized page to `<output_dir>/index.html`.
    pub fn write_page(&self, html: &str) -> Result<PathBuf> {
        self.ensure_output_dir()?;
        let file_path = self.output_dir.join(PAGE_FILE_NAME);

        fs::write(&file_path, html).map_err(|e| MirrorError::io(&file_path, e))?;

        Ok(file_path)
    }

    fn create_directories_for(&self, local_path: &Path) -> Result<PathBuf> {
        // The page file owns this name at the top of the output directory.
        if local_path.components().next() == Some(Component::Normal(OsStr::new(PAGE_FILE_NAME))) {
            return Err(MirrorError::PageFileCollision {
                path: local_path.display().to_string(),
            });
        }

        let mut path = self.output_dir.clone();
        for component in local_path.components() {
            match component {
                Component::Normal(segment) => path.push(segment),
                _ => {
                    return Err(MirrorError::UnsafePath {
                        url: local_path.display().to_string(),
                    })
                }
            }
        }

        if path == self.output_dir {
            return Err(MirrorError::UnsafePath {
                url: local_path.display().to_string(),
            });
        }

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| MirrorError::io(parent, e))?;
        }

        Ok(path)
    }

    fn relative_reference(&self, file_path: &Path) -> Result<String> {
        let relative = pathdiff::diff_paths(file_path, &self.output_dir).ok_or_else(|| {
            MirrorError::UnsafePath {
                url: file_path.display().to_string(),
            }
        })?;

        let segments: Vec<String> = relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy().into_owned())
            .collect();

        Ok(segments.join("/"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::url_resolver::resolve;
    use tempfile::tempdir;

    #[test]
    fn test_persist_recreates_nested_directories() {
        let temp_dir = tempdir().unwrap();
        let store = AssetStore::new(temp_dir.path().join("example.com"));
        let asset = resolve("/css/themes/main.css", "https://example.com/").unwrap();

        let reference = store.persist(&asset, b"body { color: red; }").unwrap();

        assert_eq!(reference, "css/themes/main.css");
        let saved = temp_dir.path().join("example.com/css/themes/main.css");
        assert_eq!(fs::read(saved).unwrap(), b"body { color: red; }");
    }

    #[test]
    fn test_persist_overwrites_existing_file() {
        let temp_dir = tempdir().unwrap();
        let store = AssetStore::new(temp_dir.path());
        let asset = resolve("logo.png", "https://example.com/").unwrap();

        store.persist(&asset, b"a much longer first version").unwrap();
        store.persist(&asset, b"second").unwrap();

        assert_eq!(fs::read(temp_dir.path().join("logo.png")).unwrap(), b"second");
    }

    #[test]
    fn test_persist_reports_blocked_directory() {
        let temp_dir = tempdir().unwrap();
        let store = AssetStore::new(temp_dir.path());
        fs::write(temp_dir.path().join("img"), b"not a directory").unwrap();
        let asset = resolve("/img/a.png", "https://example.com/").unwrap();

        let err = store.persist(&asset, b"png").unwrap_err();
        assert!(matches!(err, MirrorError::Io { .. }));
    }

    #[test]
    fn test_persist_rejects_traversal() {
        let temp_dir = tempdir().unwrap();
        let store = AssetStore::new(temp_dir.path().join("site"));
        let asset = ResolvedAsset {
            fetch_url: url::Url::parse("https://example.com/x.png").unwrap(),
            local_path: PathBuf::from("../x.png"),
        };

        let err = store.persist(&asset, b"png").unwrap_err();
        assert!(matches!(err, MirrorError::UnsafePath { .. }));
        assert!(!temp_dir.path().join("x.png").exists());
    }

    #[test]
    fn test_persist_refuses_page_file_name() {
        let temp_dir = tempdir().unwrap();
        let store = AssetStore::new(temp_dir.path());

        for reference in ["/index.html", "/index.html/logo.png"] {
            let asset = resolve(reference, "https://example.com/").unwrap();
            let err = store.persist(&asset, b"asset").unwrap_err();
            assert!(matches!(err, MirrorError::PageFileCollision { .. }), "{}", reference);
        }
        assert!(!temp_dir.path().join(PAGE_FILE_NAME).exists());

        // Deeper paths may still use the name.
        let asset = resolve("/docs/index.html", "https://example.com/").unwrap();
        assert_eq!(store.persist(&asset, b"doc").unwrap(), "docs/index.html");
    }

    #[test]
    fn test_write_page_creates_index() {
        let temp_dir = tempdir().unwrap();
        let store = AssetStore::new(temp_dir.path().join("example.com"));

        let path = store.write_page("<html></html>").unwrap();

        assert_eq!(path, temp_dir.path().join("example.com").join(PAGE_FILE_NAME));
        assert_eq!(fs::read_to_string(path).unwrap(), "<html></html>");
    }
}
