use colored::*;
use futures::stream::{self, StreamExt};
use indicatif::ProgressBar;

use crate::asset_store::AssetStore;
use crate::downloader::Fetcher;
use crate::error::{MirrorError, Result};
use crate::html_parser::{AssetKind, AssetReference, HtmlDocument};
use crate::url_resolver::{ResolvedAsset, UrlResolver};

pub const DEFAULT_MAX_CONCURRENT: usize = 10;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalizedAsset {
    /// Position of the element in scan order.
    pub position: usize,
    pub kind: AssetKind,
    pub original: String,
    pub local: String,
}

#[derive(Debug)]
pub struct AssetFailure {
    pub position: usize,
    pub kind: AssetKind,
    pub reference: String,
    pub error: MirrorError,
}

/// Outcome of localizing one document, both lists in scan order.
#[derive(Debug, Default)]
pub struct LocalizationReport {
    pub localized: Vec<LocalizedAsset>,
    pub failed: Vec<AssetFailure>,
}

impl LocalizationReport {
    pub fn total(&self) -> usize {
        self.localized.len() + self.failed.len()
    }
}

/// Downloads the images, stylesheets and scripts of a page and points the
/// page at the local copies.
///
/// Downloads run concurrently, up to `max_concurrent` at a time. Attribute
/// rewrites are applied one by one on the calling task as downloads finish,
/// so the document is never touched from more than one place. A failing
/// asset leaves its element as it was and does not affect the others.
pub struct AssetLocalizer<'a, F> {
    fetcher: &'a F,
    resolver: &'a UrlResolver,
    store: &'a AssetStore,
    max_concurrent: usize,
    progress: ProgressBar,
}

impl<'a, F: Fetcher> AssetLocalizer<'a, F> {
    pub fn new(fetcher: &'a F, resolver: &'a UrlResolver, store: &'a AssetStore) -> Self {
        Self {
            fetcher,
            resolver,
            store,
            max_concurrent: DEFAULT_MAX_CONCURRENT,
            progress: ProgressBar::hidden(),
        }
    }

    pub fn max_concurrent(mut self, max_concurrent: usize) -> Self {
        self.max_concurrent = max_concurrent.max(1);
        self
    }

    pub fn with_progress(mut self, progress: ProgressBar) -> Self {
        self.progress = progress;
        self
    }

    pub async fn localize(&self, document: &mut HtmlDocument) -> LocalizationReport {
        let references = document.asset_references();
        let mut report = LocalizationReport::default();
        self.progress.set_length(references.len() as u64);

        let mut pending = Vec::with_capacity(references.len());
        for (position, reference) in references.iter().enumerate() {
            match self.resolver.resolve(&reference.value) {
                Ok(asset) => pending.push((position, asset)),
                Err(error) => {
                    self.record_failure(&mut report, position, reference, error);
                    self.progress.inc(1);
                }
            }
        }

        let mut downloads = stream::iter(pending)
            .map(|(position, asset)| async move { (position, self.download(&asset).await) })
            .buffer_unordered(self.max_concurrent);

        while let Some((position, outcome)) = downloads.next().await {
            let reference = &references[position];
            match outcome {
                Ok(local) => {
                    log::debug!("{} -> {}", reference.value, local);
                    document.rewrite(reference, &local);
                    report.localized.push(LocalizedAsset {
                        position,
                        kind: reference.kind,
                        original: reference.value.clone(),
                        local,
                    });
                }
                Err(error) => self.record_failure(&mut report, position, reference, error),
            }
            self.progress.inc(1);
        }

        report.localized.sort_by_key(|asset| asset.position);
        report.failed.sort_by_key(|failure| failure.position);
        report
    }

    async fn download(&self, asset: &ResolvedAsset) -> Result<String> {
        let bytes = self.fetcher.fetch_bytes(&asset.fetch_url).await?;
        self.store.persist(asset, &bytes)
    }

    fn record_failure(
        &self,
        report: &mut LocalizationReport,
        position: usize,
        reference: &AssetReference,
        error: MirrorError,
    ) {
        self.progress.suspend(|| {
            eprintln!(
                "{} Error downloading asset {}: {}",
                "⚠️ ".yellow(),
                reference.value,
                error
            );
        });
        report.failed.push(AssetFailure {
            position,
            kind: reference.kind,
            reference: reference.value.clone(),
            error,
        });
    }
}
