use std::collections::HashMap;
use std::sync::Arc;

use log::{debug, warn};

use crate::folio::diagram::{
    DiagramArtifact, DiagramRenderer, DiagramStore, RenderedDiagram, ThemeOptions,
};
use crate::folio::error::RenderError;
use crate::folio::hast::{Element, Node};
use crate::folio::types::Page;
use crate::folio::visit::{find_paths, node_at_path, node_at_path_mut};

pub const DIAGRAM_CLASS: &str = "mermaid-diagram";
const FALLBACK_ALT: &str = "Mermaid diagram";

/// `pre.mermaid`, or a `pre` holding `code.language-mermaid`.
fn is_mermaid_block(node: &Node) -> bool {
    let Some(pre) = node.as_element().filter(|el| el.is("pre")) else {
        return false;
    };
    pre.has_class("mermaid")
        || pre
            .first_element_child()
            .is_some_and(|code| code.is("code") && code.has_class("language-mermaid"))
}

/// Text of a Mermaid block, whitespace intact apart from the one newline
/// that closes the block's last line.
fn diagram_source(block: &Node) -> String {
    let mut text = block.text_content();
    if text.ends_with('\n') {
        text.pop();
    }
    text
}

/// Replaces Mermaid blocks with pre-rendered light/dark SVG images.
pub struct MermaidThemer<R> {
    renderer: R,
    store: Arc<DiagramStore>,
}

impl<R: DiagramRenderer> MermaidThemer<R> {
    pub fn new(renderer: R, store: Arc<DiagramStore>) -> Self {
        Self { renderer, store }
    }

    pub fn store(&self) -> &DiagramStore {
        &self.store
    }

    /// Render every Mermaid block in `tree` and swap it for an `img`.
    /// Blocks whose render or write fails stay as they are. Returns the
    /// number of blocks replaced.
    pub async fn theme(&self, tree: &mut Node, page: &Page) -> usize {
        let targets: Vec<(Vec<usize>, String)> = find_paths(tree, is_mermaid_block)
            .into_iter()
            .filter_map(|path| {
                let source = diagram_source(node_at_path(tree, &path)?);
                Some((path, source))
            })
            .collect();
        if targets.is_empty() {
            return 0;
        }

        let mut sources: Vec<String> = Vec::new();
        for (_, source) in &targets {
            if !sources.contains(source) {
                sources.push(source.clone());
            }
        }
        debug!(
            "Rendering {} diagram(s) for {}",
            sources.len(),
            page.source_path.display()
        );

        let light_options = ThemeOptions::light();
        let dark_options = ThemeOptions::dark();
        let (light, dark) = tokio::join!(
            self.renderer.render(&sources, &light_options),
            self.renderer.render(&sources, &dark_options),
        );
        if light.len() != sources.len() || dark.len() != sources.len() {
            let got = if light.len() != sources.len() { light.len() } else { dark.len() };
            warn!(
                "Skipping diagrams in {}: {}",
                page.source_path.display(),
                RenderError::Mismatch {
                    expected: sources.len(),
                    got
                }
            );
            return 0;
        }

        let mut images: HashMap<&str, Element> = HashMap::new();
        for ((source, light), dark) in sources.iter().zip(light).zip(dark) {
            match self.persist(source, light, dark) {
                Ok(img) => {
                    images.insert(source.as_str(), img);
                }
                Err(err) => warn!(
                    "Leaving diagram in {} unrendered: {err}",
                    page.source_path.display()
                ),
            }
        }

        let mut replaced = 0;
        for (path, source) in &targets {
            let (Some(img), Some(node)) = (images.get(source.as_str()), node_at_path_mut(tree, path))
            else {
                continue;
            };
            *node = img.clone().into();
            replaced += 1;
        }
        replaced
    }

    fn persist(
        &self,
        source: &str,
        light: Result<RenderedDiagram, RenderError>,
        dark: Result<RenderedDiagram, RenderError>,
    ) -> Result<Element, RenderError> {
        let light = light?;
        let dark = dark?;
        let artifact = self.store.persist(source, &light.svg, &dark.svg)?;
        Ok(image_for(&artifact, &light))
    }
}

fn image_for(artifact: &DiagramArtifact, light: &RenderedDiagram) -> Element {
    let alt = light.description.as_deref().unwrap_or(FALLBACK_ALT);
    let mut img = Element::new("img")
        .with_property("src", artifact.light_url.as_str())
        .with_property("data-src-dark", artifact.dark_url.as_str())
        .with_property("alt", alt)
        .with_property("class", DIAGRAM_CLASS);
    if let Some(width) = light.width {
        img.set_property("width", width);
    }
    if let Some(height) = light.height {
        img.set_property("height", height);
    }
    img
}
