use colored::*;

use crate::config::MirrorConfig;
use crate::downloader::Fetcher;
use crate::error::{MirrorError, Result};
use crate::metadata::{self, PageMetadata};
use crate::page::{PageFetcher, SavedPage};

/// A page that was saved, with its metadata when requested.
#[derive(Debug)]
pub struct PageOutcome {
    pub page: SavedPage,
    pub metadata: Option<PageMetadata>,
    /// Set when metadata was requested but could not be read.
    pub metadata_error: Option<MirrorError>,
}

#[derive(Debug)]
pub struct PageFailure {
    pub url: String,
    pub error: MirrorError,
}

#[derive(Debug, Default)]
pub struct RunSummary {
    pub saved: Vec<PageOutcome>,
    pub failed: Vec<PageFailure>,
}

/// Fetches a list of pages one after the other.
///
/// A failing page is reported and skipped; it never stops the pages after it.
pub struct Mirror<F> {
    pages: PageFetcher<F>,
    show_metadata: bool,
    json: bool,
}

impl<F: Fetcher> Mirror<F> {
    pub fn new(fetcher: F, config: &MirrorConfig) -> Self {
        let pages = PageFetcher::new(fetcher, config.output_root.clone())
            .max_concurrent(config.max_concurrent);

        Self {
            pages,
            show_metadata: config.show_metadata,
            json: config.json,
        }
    }

    pub fn show_progress(mut self, show_progress: bool) -> Self {
        self.pages = self.pages.show_progress(show_progress);
        self
    }

    pub fn page_fetcher(&self) -> &PageFetcher<F> {
        &self.pages
    }

    pub async fn run(&self, urls: &[String]) -> Result<RunSummary> {
        if urls.is_empty() {
            return Err(MirrorError::NoUrls);
        }

        let mut summary = RunSummary::default();
        for url in urls {
            match self.pages.fetch_page(url).await {
                Ok(page) => summary.saved.push(self.complete(page)),
                Err(error) => {
                    eprintln!("{} Error fetching {}: {}", "❌".red(), url, error);
                    summary.failed.push(PageFailure {
                        url: url.clone(),
                        error,
                    });
                }
            }
        }

        Ok(summary)
    }

    /// Announces a written page, then reads its metadata when asked to.
    /// The page counts as saved even if the metadata cannot be read.
    fn complete(&self, page: SavedPage) -> PageOutcome {
        println!("{} Saved {}", "✅".green(), page.file_path.display());

        let mut outcome = PageOutcome {
            page,
            metadata: None,
            metadata_error: None,
        };
        if !self.show_metadata {
            return outcome;
        }

        match metadata::report(&outcome.page.html, &outcome.page.url, &outcome.page.file_path) {
            Ok(metadata) => {
                self.print_metadata(&metadata);
                outcome.metadata = Some(metadata);
            }
            Err(error) => {
                eprintln!(
                    "{} Error reading metadata for {}: {}",
                    "❌".red(),
                    outcome.page.url,
                    error
                );
                outcome.metadata_error = Some(error);
            }
        }
        outcome
    }

    fn print_metadata(&self, metadata: &PageMetadata) {
        if self.json {
            match serde_json::to_string(metadata) {
                Ok(json) => println!("{}", json),
                Err(e) => log::warn!("cannot encode metadata for {}: {}", metadata.hostname, e),
            }
        } else {
            println!("{}", metadata);
        }
    }
}
