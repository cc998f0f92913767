use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use log::{error, info, warn};
use walkdir::{DirEntry, WalkDir};

use crate::folio::config::SiteConfig;
use crate::folio::diagram::{DiagramRenderer, DiagramStore, KrokiRenderer};
use crate::folio::error::DocumentError;
use crate::folio::output;
use crate::folio::paths;
use crate::folio::plugins::mermaid::MermaidThemer;
use crate::folio::plugins::{DraftFilter, PluginRegistry};
use crate::folio::sitemap::SitemapFilter;
use crate::folio::types::{Page, RenderedPage};

/// Outcome of a full build.
#[derive(Debug, Default)]
pub struct BuildReport {
    /// URLs of every page written, drafts included.
    pub built: Vec<String>,
    pub failures: Vec<(PathBuf, String)>,
    pub sitemap: Vec<String>,
    /// URLs of pages that appear in listings.
    pub listed: Vec<String>,
}

impl BuildReport {
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

/// One build session: the pass pipeline plus the diagram store shared by
/// every document it renders.
pub struct FolioEngine<R = KrokiRenderer> {
    pub config: SiteConfig,
    registry: PluginRegistry<R>,
    content_root: PathBuf,
    output_root: PathBuf,
}

impl FolioEngine<KrokiRenderer> {
    pub fn new(config: SiteConfig) -> Result<Self> {
        let renderer = KrokiRenderer::from_config(&config.diagrams)
            .context("building diagram renderer client")?;
        Self::with_renderer(config, renderer)
    }
}

impl<R: DiagramRenderer> FolioEngine<R> {
    pub fn with_renderer(config: SiteConfig, renderer: R) -> Result<Self> {
        let content_root = config.content_root();
        let output_root = config.output_root();
        output::ensure_output_root(&output_root)
            .with_context(|| format!("creating output dir {}", output_root.display()))?;

        let store = Arc::new(DiagramStore::from_config(&config.diagrams));
        let themer = MermaidThemer::new(renderer, store);
        let registry = PluginRegistry::standard(&config, Some(themer))
            .with_filters(vec![Box::new(DraftFilter)]);

        Ok(Self {
            config,
            registry,
            content_root,
            output_root,
        })
    }

    fn load_page(&self, path: &Path) -> Result<Page, DocumentError> {
        let content = fs::read_to_string(path).map_err(|source| DocumentError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Page::new(path.to_path_buf(), content))
    }

    async fn render_source(&self, path: &Path) -> Result<Page> {
        let page = self.load_page(path)?;
        self.registry
            .render(page)
            .await
            .with_context(|| format!("rendering {}", path.display()))
    }

    fn finish(&self, page: Page) -> RenderedPage {
        let slug = page
            .frontmatter
            .page_slug
            .clone()
            .unwrap_or_else(|| paths::get_slug(&self.content_root, &page.source_path));
        let url = paths::page_url(page.frontmatter.content_type, &slug);
        RenderedPage::from_page(slug, url, page)
    }

    /// Run the whole pipeline for the markdown file at `path`.
    pub async fn render_page(&self, path: &Path) -> Result<RenderedPage> {
        let page = self.render_source(path).await?;
        Ok(self.finish(page))
    }

    fn is_ignored(&self, entry: &DirEntry) -> bool {
        let name = entry.file_name().to_string_lossy();
        self.config
            .build
            .ignore_patterns
            .iter()
            .any(|pattern| name == pattern.as_str())
    }

    fn markdown_files(&self) -> Vec<PathBuf> {
        WalkDir::new(&self.content_root)
            .into_iter()
            .filter_entry(|e| !self.is_ignored(e))
            .filter_map(Result::ok)
            .filter(|e| e.file_type().is_file())
            .filter(|e| e.path().extension().is_some_and(|ext| ext == "md"))
            .map(DirEntry::into_path)
            .collect()
    }

    /// Render every markdown file under the content root into the output
    /// directory. A document that fails is logged and skipped; the rest of
    /// the build carries on.
    pub async fn prebuild_all(&self) -> Result<BuildReport> {
        let mut report = BuildReport::default();
        let mut listed = Vec::new();

        for path in self.markdown_files() {
            let page = match self.render_source(&path).await {
                Ok(page) => page,
                Err(err) => {
                    error!("{err:#}");
                    report.failures.push((path, format!("{err:#}")));
                    continue;
                }
            };
            let is_listed = self.registry.allow(&page);
            let rendered = self.finish(page);

            output::write_page(&self.output_root, &rendered)
                .with_context(|| format!("writing output for {}", rendered.url))?;

            if is_listed {
                listed.push(rendered.url.clone());
            }
            report.built.push(rendered.url);
        }

        let sitemap = SitemapFilter::build(&self.config.sitemap, &self.content_root);
        report.sitemap = report
            .built
            .iter()
            .filter(|url| sitemap.includes(url))
            .cloned()
            .collect();
        report.listed = listed;

        if let Some(themer) = self.registry.themer() {
            info!("Wrote {} diagram(s)", themer.store().written_count());
        }
        if report.is_clean() {
            info!("Built {} page(s)", report.built.len());
        } else {
            warn!(
                "Built {} page(s), {} failed",
                report.built.len(),
                report.failures.len()
            );
        }
        Ok(report)
    }
}
