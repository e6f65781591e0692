use clap::Parser;
use std::path::PathBuf;

use crate::config::MirrorConfig;
use crate::error::Result;

#[derive(Parser, Debug)]
#[command(
    name = "page-fetch",
    about = "Fetch web pages and save them to disk with assets",
    version,
    long_about = "Downloads each page together with its images, stylesheets and scripts into <output-dir>/<hostname>/ and rewrites the page so it uses the local copies."
)]
pub struct FetchCommand {
    /// URLs of the pages to fetch
    #[arg(required = true, num_args = 1..)]
    pub urls: Vec<String>,

    /// Display metadata for the fetched pages
    #[arg(short, long)]
    pub metadata: bool,

    /// Print metadata as JSON
    #[arg(long, requires = "metadata")]
    pub json: bool,

    /// Directory receiving one subdirectory per host [default: .]
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,

    /// Maximum concurrent asset downloads per page [default: 10]
    #[arg(short = 'c', long, value_parser = clap::value_parser!(u64).range(1..))]
    pub max_concurrent: Option<u64>,

    /// User agent string to use for requests
    #[arg(long)]
    pub user_agent: Option<String>,

    /// Timeout for requests in seconds [default: 30]
    #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
    pub timeout: Option<u64>,

    /// JSON file with default settings; flags take precedence
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Log debug details to stderr
    #[arg(short, long)]
    pub verbose: bool,
}

impl FetchCommand {
    /// Settings from `--config` (or the defaults) overridden by any flag
    /// given on the command line.
    pub fn mirror_config(&self) -> Result<MirrorConfig> {
        let mut config = match &self.config {
            Some(path) => MirrorConfig::from_file(path)?,
            None => MirrorConfig::default(),
        };

        if let Some(output_dir) = &self.output_dir {
            config.output_root = output_dir.clone();
        }
        if let Some(max_concurrent) = self.max_concurrent {
            config.max_concurrent = max_concurrent as usize;
        }
        if let Some(user_agent) = &self.user_agent {
            config.user_agent = user_agent.clone();
        }
        if let Some(timeout) = self.timeout {
            config.timeout_secs = timeout;
        }
        config.show_metadata |= self.metadata;
        config.json |= self.json;

        config.validate()?;
        Ok(config)
    }
}
