pub mod asset_store;
pub mod cli;
pub mod config;
pub mod downloader;
pub mod error;
pub mod html_parser;
pub mod localizer;
pub mod metadata;
pub mod mirror;
pub mod page;
pub mod url_resolver;

// Re-export main types for convenience
pub use asset_store::AssetStore;
pub use cli::FetchCommand;
pub use config::MirrorConfig;
pub use downloader::{Fetcher, HttpFetcher};
pub use error::{ErrorKind, MirrorError};
pub use html_parser::{AssetKind, AssetReference, HtmlDocument};
pub use localizer::{AssetLocalizer, LocalizationReport};
pub use metadata::PageMetadata;
pub use mirror::{Mirror, RunSummary};
pub use page::{PageFetcher, SavedPage};
pub use url_resolver::{ResolvedAsset, UrlResolver};
