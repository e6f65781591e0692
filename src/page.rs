use std::fmt;
use std::path::{Path, PathBuf};

use indicatif::ProgressBar;
use url::Url;

use crate::asset_store::AssetStore;
use crate::downloader::Fetcher;
use crate::error::{MirrorError, Result};
use crate::html_parser::HtmlDocument;
use crate::localizer::{AssetLocalizer, LocalizationReport, DEFAULT_MAX_CONCURRENT};
use crate::url_resolver::UrlResolver;

/// Steps a page goes through; logged as the page advances.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageStage {
    Init,
    DirectoryEnsured,
    PageDownloaded,
    Parsed,
    AssetsLocalized,
    Serialized,
    Written,
    Done,
}

impl fmt::Display for PageStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PageStage::Init => "init",
            PageStage::DirectoryEnsured => "directory ensured",
            PageStage::PageDownloaded => "page downloaded",
            PageStage::Parsed => "parsed",
            PageStage::AssetsLocalized => "assets localized",
            PageStage::Serialized => "serialized",
            PageStage::Written => "written",
            PageStage::Done => "done",
        };
        f.write_str(name)
    }
}

/// A page saved to disk.
#[derive(Debug)]
pub struct SavedPage {
    pub url: Url,
    pub file_path: PathBuf,
    /// Final markup, as written to `file_path`.
    pub html: String,
    pub report: LocalizationReport,
}

/// Fetches single pages into `<output_root>/<hostname>/`.
pub struct PageFetcher<F> {
    fetcher: F,
    output_root: PathBuf,
    max_concurrent: usize,
    show_progress: bool,
}

impl<F: Fetcher> PageFetcher<F> {
    pub fn new(fetcher: F, output_root: impl Into<PathBuf>) -> Self {
        Self {
            fetcher,
            output_root: output_root.into(),
            max_concurrent: DEFAULT_MAX_CONCURRENT,
            show_progress: false,
        }
    }

    pub fn max_concurrent(mut self, max_concurrent: usize) -> Self {
        self.max_concurrent = max_concurrent.max(1);
        self
    }

    pub fn show_progress(mut self, show_progress: bool) -> Self {
        self.show_progress = show_progress;
        self
    }

    pub fn output_root(&self) -> &Path {
        &self.output_root
    }

    pub fn fetcher(&self) -> &F {
        &self.fetcher
    }

    /// Directory a page URL is saved into.
    pub fn output_dir_for(&self, url: &Url) -> Result<PathBuf> {
        let host = url.host_str().ok_or_else(|| MirrorError::MissingHost {
            url: url.to_string(),
        })?;
        Ok(self.output_root.join(host))
    }

    pub async fn fetch_page(&self, url: &str) -> Result<SavedPage> {
        let mut stage = PageStage::Init;
        log::debug!("{}: {}", url, stage);

        let page_url = parse_page_url(url)?;
        let store = AssetStore::new(self.output_dir_for(&page_url)?);
        store.ensure_output_dir()?;
        advance(url, &mut stage, PageStage::DirectoryEnsured);

        let body = self.fetcher.fetch_text(&page_url).await?;
        advance(url, &mut stage, PageStage::PageDownloaded);

        let mut document = HtmlDocument::parse(&body);
        advance(url, &mut stage, PageStage::Parsed);

        let resolver = UrlResolver::from_url(page_url.clone());
        let progress = if self.show_progress {
            ProgressBar::new(0)
        } else {
            ProgressBar::hidden()
        };
        let report = AssetLocalizer::new(&self.fetcher, &resolver, &store)
            .max_concurrent(self.max_concurrent)
            .with_progress(progress.clone())
            .localize(&mut document)
            .await;
        progress.finish_and_clear();
        advance(url, &mut stage, PageStage::AssetsLocalized);

        let html = document.serialize()?;
        advance(url, &mut stage, PageStage::Serialized);

        let file_path = store.write_page(&html)?;
        advance(url, &mut stage, PageStage::Written);

        log::info!(
            "{}: {} of {} assets localized",
            url,
            report.localized.len(),
            report.total()
        );
        advance(url, &mut stage, PageStage::Done);

        Ok(SavedPage {
            url: page_url,
            file_path,
            html,
            report,
        })
    }
}

fn parse_page_url(url: &str) -> Result<Url> {
    let parsed = Url::parse(url).map_err(|source| MirrorError::InvalidUrl {
        url: url.to_string(),
        source,
    })?;

    match parsed.scheme() {
        "http" | "https" => Ok(parsed),
        scheme => Err(MirrorError::UnsupportedScheme {
            url: url.to_string(),
            scheme: scheme.to_string(),
        }),
    }
}

fn advance(url: &str, stage: &mut PageStage, next: PageStage) {
    log::debug!("{}: {} -> {}", url, stage, next);
    *stage = next;
}
