pub mod folio;

use anyhow::{Result, bail};
use log::info;

use crate::folio::config::SiteConfig;
use crate::folio::renderer::FolioEngine;

pub async fn run() -> Result<()> {
    let config = SiteConfig::load();
    info!(
        "Building {} into {} ({:?} mode)",
        config.content.root, config.build.output_dir, config.build.mode
    );

    let engine = FolioEngine::new(config)?;
    let report = engine.prebuild_all().await?;

    info!(
        "{} page(s) listed, {} in sitemap",
        report.listed.len(),
        report.sitemap.len()
    );
    if !report.is_clean() {
        bail!("{} document(s) failed to build", report.failures.len());
    }
    Ok(())
}
