//! `folio inspect` command implementation.

use clap::Args;
use console::Term;
use folio_site::SiteMap;

use super::{SiteArgs, assemble};
use crate::error::CliError;
use crate::output::Output;

/// Arguments for the inspect command.
#[derive(Args)]
pub(crate) struct InspectArgs {
    #[command(flatten)]
    pub(crate) site: SiteArgs,

    /// Print the site map as JSON on stdout instead of a summary.
    #[arg(long)]
    json: bool,
}

impl InspectArgs {
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let output = Output::new();
        let config = self.site.load_config(None)?;
        let site = assemble(&config, &output)?;

        if self.json {
            Term::stdout().write_line(&serde_json::to_string_pretty(&site)?)?;
            return Ok(());
        }

        output.highlight(&format!("{} page(s)", site.len()));
        for line in summary(&site) {
            output.info(&line);
        }
        Ok(())
    }
}

/// One line per page, in registration order.
fn summary(site: &SiteMap) -> Vec<String> {
    site.pages()
        .map(|page| {
            let marker = if page.slug == site.root_slug() { "*" } else { " " };
            format!(
                "{marker} /{}  {}  \"{}\"  blocks={} subpages={}",
                page.slug,
                page.id,
                page.title,
                page.block_count(),
                page.child_pages.len()
            )
        })
        .collect()
}
