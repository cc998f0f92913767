pub mod code_title;
pub mod frontmatter;
pub mod images;
pub mod links;
pub mod markdown;
pub mod mermaid;
pub mod tables;
pub mod traits;

use anyhow::Result;
use log::debug;

use crate::folio::config::SiteConfig;
use crate::folio::diagram::DiagramRenderer;
use crate::folio::types::Page;

use self::code_title::CodeTitles;
use self::frontmatter::FrontMatter;
use self::images::ImageClassifier;
use self::links::LinkRewriter;
use self::mermaid::MermaidThemer;
use self::tables::TableWrapper;
use self::traits::{Filter, HtmlTransformer, Transformer};

pub use frontmatter::DraftFilter;

pub struct PluginRegistry<R> {
    transformers: Vec<Box<dyn Transformer>>,
    themer: Option<MermaidThemer<R>>,
    html_transformers: Vec<Box<dyn HtmlTransformer>>,
    filters: Vec<Box<dyn Filter>>,
}

impl<R: DiagramRenderer> PluginRegistry<R> {
    /// The full pass list. Order matters: frontmatter runs first so later
    /// passes and filters see derived metadata, and diagrams are themed
    /// before links and images are touched.
    pub fn standard(config: &SiteConfig, themer: Option<MermaidThemer<R>>) -> Self {
        Self {
            transformers: vec![Box::new(FrontMatter::from_config(config)), Box::new(CodeTitles)],
            themer,
            html_transformers: vec![
                Box::new(LinkRewriter::from_config(config)),
                Box::new(TableWrapper),
                Box::new(ImageClassifier),
            ],
            filters: vec![],
        }
    }

    pub fn with_filters(mut self, filters: Vec<Box<dyn Filter>>) -> Self {
        self.filters = filters;
        self
    }

    pub fn themer(&self) -> Option<&MermaidThemer<R>> {
        self.themer.as_ref()
    }

    /// Run every pass over `page` and fill in its HTML.
    pub async fn render(&self, mut page: Page) -> Result<Page> {
        let mut mdast = self::markdown::parse(&page)?;
        for transformer in &self.transformers {
            transformer.transform(&mut mdast, &mut page)?;
        }

        let mut tree = self::markdown::to_hast(&mdast);
        if let Some(themer) = &self.themer {
            let replaced = themer.theme(&mut tree, &page).await;
            if replaced > 0 {
                debug!("Themed {replaced} diagram(s) in {}", page.source_path.display());
            }
        }
        for transformer in &self.html_transformers {
            transformer.transform(&mut tree, &mut page)?;
        }

        page.html = Some(self::markdown::to_html(&tree));
        Ok(page)
    }

    /// Whether `page` belongs in listings.
    pub fn allow(&self, page: &Page) -> bool {
        self.filters.iter().all(|f| f.include(page))
    }
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::sync::Arc;

    use pretty_assertions::assert_eq;

    use super::*;
    use crate::folio::config::BuildMode;
    use crate::folio::diagram::{DiagramStore, RenderedDiagram, ThemeOptions};
    use crate::folio::error::RenderError;

    struct StaticRenderer;

    impl DiagramRenderer for StaticRenderer {
        async fn render(
            &self,
            sources: &[String],
            _options: &ThemeOptions,
        ) -> Vec<Result<RenderedDiagram, RenderError>> {
            sources
                .iter()
                .map(|_| {
                    Ok(RenderedDiagram {
                        svg: "<svg/>".into(),
                        description: None,
                        width: None,
                        height: None,
                    })
                })
                .collect()
        }
    }

    #[tokio::test]
    async fn test_full_pipeline_runs_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("content");
        let source = root.join("articles/sys/patterns/cdc/README.md");
        fs::create_dir_all(source.parent().unwrap()).unwrap();
        fs::create_dir_all(root.join("articles/sys/patterns/outbox")).unwrap();
        fs::write(root.join("articles/sys/patterns/outbox/README.md"), "# Outbox\n").unwrap();

        let mut config = SiteConfig::default();
        config.build.mode = BuildMode::Production;
        config.build.remove_title_heading = true;
        config.content.root = root.display().to_string();

        let store = Arc::new(DiagramStore::new(dir.path().join("diagrams"), "/diagrams"));
        let registry = PluginRegistry::standard(
            &config,
            Some(MermaidThemer::new(StaticRenderer, store)),
        )
        .with_filters(vec![Box::new(DraftFilter)]);

        let src = concat!(
            "# Draft: CDC\n\nSee [outbox](../outbox/README.md).\n\n",
            "| a |\n|---|\n| ![x](flow-invert.png) |\n\n",
            "```mermaid\ngraph LR; A-->B\n```\n"
        );
        let page = registry
            .render(Page::new(source, src.to_string()))
            .await
            .unwrap();
        let html = page.html.clone().unwrap();

        assert_eq!(page.frontmatter.title.as_deref(), Some("CDC"));
        assert!(!registry.allow(&page));
        assert!(!html.contains("<h1"));
        assert!(html.contains(r#"href="/articles/sys/patterns/outbox""#));
        assert!(html.contains(r#"<div class="table-wrapper"><table>"#));
        assert!(html.contains(r#"class="invert-on-dark""#));
        assert!(html.contains(r#"class="mermaid-diagram""#));
        assert!(!html.contains("language-mermaid"));
    }
}
