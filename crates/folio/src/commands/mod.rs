//! CLI command implementations.

pub(crate) mod build;
pub(crate) mod inspect;

use std::path::PathBuf;
use std::sync::Arc;

use clap::Args;
use folio_config::{CliSettings, Config};
use folio_content::{HttpContentApi, RetryPolicy};
use folio_site::{SiteMap, TreeAssembler};

pub(crate) use build::BuildArgs;
pub(crate) use inspect::InspectArgs;

use crate::error::CliError;
use crate::output::Output;

/// Arguments shared by every command that assembles the site.
#[derive(Args)]
pub(crate) struct SiteArgs {
    /// Path to configuration file (default: auto-discover folio.toml).
    #[arg(short, long)]
    pub(crate) config: Option<PathBuf>,

    /// Root page ID (overrides config).
    #[arg(long, env = "FOLIO_ROOT_PAGE_ID")]
    pub(crate) root_page_id: Option<String>,

    /// Maximum number of concurrent requests (overrides config).
    #[arg(long)]
    pub(crate) concurrency: Option<usize>,

    /// Enable verbose output.
    #[arg(short, long)]
    pub(crate) verbose: bool,
}

impl SiteArgs {
    /// Load configuration with these arguments applied on top.
    pub(crate) fn load_config(&self, output_dir: Option<PathBuf>) -> Result<Config, CliError> {
        let cli_settings = CliSettings {
            root_page_id: self.root_page_id.clone(),
            output_dir,
            concurrency: self.concurrency,
        };
        Ok(Config::load(self.config.as_deref(), Some(&cli_settings))?)
    }
}

/// Assemble the site described by `config` from the content API.
pub(crate) fn assemble(config: &Config, output: &Output) -> Result<SiteMap, CliError> {
    let content = config.require_content()?;
    let fetch = &config.fetch;

    output.info(&format!("Root page: {}", content.root_page_id));

    let api = HttpContentApi::new(
        &content.base_url,
        &content.api_token,
        &content.api_version,
        Some(fetch.timeout()),
    );
    let policy = RetryPolicy {
        max_attempts: fetch.max_attempts,
        initial_delay: fetch.initial_backoff(),
        max_delay: fetch.max_backoff(),
    };
    let site = TreeAssembler::new(Arc::new(api))
        .with_concurrency(fetch.concurrency)
        .with_page_size(fetch.page_size)
        .with_retry_policy(policy)
        .with_slug_property(&content.slug_property)
        .build_site_map(&content.root_page_id)?;

    output.build_warnings(site.warnings());
    Ok(site)
}
