//! `folio build` command implementation.

use std::path::{Path, PathBuf};

use clap::Args;
use folio_renderer::BlockRendererRegistry;
use folio_site::SiteMap;
use tracing::debug;

use super::{SiteArgs, assemble};
use crate::error::CliError;
use crate::output::Output;
use crate::template::render_page;

/// Name of the site map dump written next to the pages.
const SITE_JSON: &str = "site.json";

/// Arguments for the build command.
#[derive(Args)]
pub(crate) struct BuildArgs {
    #[command(flatten)]
    pub(crate) site: SiteArgs,

    /// Output directory for the generated site (overrides config).
    #[arg(short, long)]
    output_dir: Option<PathBuf>,
}

impl BuildArgs {
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let output = Output::new();
        let config = self.site.load_config(self.output_dir)?;
        let output_dir = config.output_resolved.dir.clone();

        output.info(&format!("Output: {}", output_dir.display()));
        let site = assemble(&config, &output)?;

        let written = write_site(&site, &output_dir)?;
        output.success(&format!(
            "Built {written} page(s) to {}",
            output_dir.display()
        ));
        Ok(())
    }
}

/// Write every page to `<out_dir>/<slug>/index.html`, the root page also to
/// `<out_dir>/index.html`, and the site map to `<out_dir>/site.json`.
///
/// Returns the number of pages written.
pub(crate) fn write_site(site: &SiteMap, out_dir: &Path) -> Result<usize, CliError> {
    let registry = BlockRendererRegistry::new();
    std::fs::create_dir_all(out_dir)?;

    for page in site.pages() {
        let page_dir = out_dir.join(&page.slug);
        std::fs::create_dir_all(&page_dir)?;
        let path = page_dir.join("index.html");
        debug!("Writing {}", path.display());
        std::fs::write(&path, render_page(page, &registry))?;
    }

    std::fs::write(
        out_dir.join("index.html"),
        render_page(site.root(), &registry),
    )?;
    std::fs::write(out_dir.join(SITE_JSON), serde_json::to_string_pretty(site)?)?;

    Ok(site.len())
}
