use std::path::{Path, PathBuf};

use anyhow::Result;
use log::warn;
use markdown::mdast::{self, Node};

use crate::folio::config::{BuildMode, SiteConfig};
use crate::folio::error::{DocumentError, PathError};
use crate::folio::paths;
use crate::folio::text::{self, CodeBlocks};
use crate::folio::types::{Frontmatter, Page, fill};
use crate::folio::visit::visit;

use super::traits::{Filter, Transformer};

pub const PLACEHOLDER_TITLE: &str = "Draft: Add title";
pub const PLACEHOLDER_DESCRIPTION: &str = "Draft: Add description";
const DRAFT_PREFIX: &str = "draft:";

/// Whether a title marks its page as a draft.
pub fn is_draft_title(title: &str) -> bool {
    title.trim().to_lowercase().starts_with(DRAFT_PREFIX)
}

pub fn strip_draft_prefix(title: &str) -> String {
    let trimmed = title.trim();
    if !is_draft_title(trimmed) {
        return trimmed.to_string();
    }
    trimmed
        .get(DRAFT_PREFIX.len()..)
        .unwrap_or_default()
        .trim()
        .to_string()
}

/// Fills the page's frontmatter from its declared YAML block, its content
/// and its location. Values already present are never replaced.
pub struct FrontMatter {
    mode: BuildMode,
    content_root: PathBuf,
    default_layout: String,
    remove_title_heading: bool,
}

impl FrontMatter {
    pub fn new(mode: BuildMode, content_root: impl Into<PathBuf>) -> Self {
        Self {
            mode,
            content_root: content_root.into(),
            default_layout: "page".into(),
            remove_title_heading: false,
        }
    }

    pub fn from_config(config: &SiteConfig) -> Self {
        Self::new(config.mode(), config.content_root())
            .default_layout(config.build.default_layout.clone())
            .remove_title_heading(config.build.remove_title_heading)
    }

    pub fn default_layout(mut self, layout: impl Into<String>) -> Self {
        self.default_layout = layout.into();
        self
    }

    /// Drop the H1 from the body once it has been used as the title.
    pub fn remove_title_heading(mut self, remove: bool) -> Self {
        self.remove_title_heading = remove;
        self
    }

    pub fn derive(&self, tree: &mut Node, page: &mut Page) -> Result<(), DocumentError> {
        let path = page.source_path.clone();
        let declared = declared_frontmatter(tree, &path)?;
        let fm = &mut page.frontmatter;
        fm.merge_missing(declared);

        let words = text::word_count(tree);
        fill(&mut fm.word_count, || Some(words as u64));
        fill(&mut fm.minutes_read, || Some(text::minutes_read(words)));

        let mut heading = first_h1_text(tree);
        if heading.is_none() && fm.title.is_none() {
            if !self.mode.is_development() {
                return Err(DocumentError::MissingHeading { path });
            }
            warn!("{} has no title heading, using a placeholder", path.display());
            prepend_placeholder_heading(tree);
            heading = Some(PLACEHOLDER_TITLE.to_string());
        }

        fm.is_draft = Some(draft_verdict(fm, heading.as_deref()));
        fill(&mut fm.title, || heading.as_deref().map(strip_draft_prefix));

        if fm.description.is_none() {
            let description = description_text(tree);
            if !description.is_empty() {
                fm.description = Some(description);
            } else if self.mode.is_development() {
                warn!("{} has no description, using a placeholder", path.display());
                fm.description = Some(PLACEHOLDER_DESCRIPTION.to_string());
            } else {
                return Err(DocumentError::MissingDescription { path });
            }
        }

        self.derive_from_path(fm, &path)?;

        if self.remove_title_heading && heading.is_some() {
            remove_first_h1(tree);
        }
        Ok(())
    }

    fn derive_from_path(&self, fm: &mut Frontmatter, path: &Path) -> Result<(), DocumentError> {
        let root = self.content_root.as_path();
        if !paths::is_within(root, path) {
            fill(&mut fm.layout, || Some(self.default_layout.clone()));
            return Ok(());
        }

        let class = paths::classify(root, path);
        fill(&mut fm.content_type, || class.content_type);
        fill(&mut fm.category, || class.category);
        fill(&mut fm.topic, || class.topic);
        fill(&mut fm.post_id, || class.post_id);
        fill(&mut fm.page_slug, || Some(paths::get_slug(root, path)));

        if fm.published_on.is_none() {
            match paths::get_published_date(root, path) {
                Ok(date) => fm.published_on = Some(date),
                Err(PathError::NoDate { .. }) => {}
                Err(err) if self.mode.is_development() => warn!("{err}"),
                Err(err) => return Err(err.into()),
            }
        }
        Ok(())
    }
}

impl Transformer for FrontMatter {
    fn transform(&self, tree: &mut Node, page: &mut Page) -> Result<()> {
        self.derive(tree, page)?;
        Ok(())
    }
}

/// A set `is_draft` wins; otherwise the first H1 decides, then the title.
/// A page with neither gets the placeholder title, which is a draft.
fn draft_verdict(fm: &Frontmatter, heading: Option<&str>) -> bool {
    fm.is_draft
        .unwrap_or_else(|| heading.or(fm.title.as_deref()).is_none_or(is_draft_title))
}

/// Draft verdict for a freshly parsed file, reached exactly as
/// [`FrontMatter::derive`] reaches it. Also returns the declared
/// frontmatter so callers can honour a declared slug or content type.
pub fn draft_status(tree: &Node, path: &Path) -> Result<(bool, Frontmatter), DocumentError> {
    let declared = declared_frontmatter(tree, path)?;
    let heading = first_h1_text(tree);
    Ok((draft_verdict(&declared, heading.as_deref()), declared))
}

fn declared_frontmatter(tree: &Node, path: &Path) -> Result<Frontmatter, DocumentError> {
    let yaml = tree.children().and_then(|children| {
        children.iter().find_map(|child| match child {
            Node::Yaml(yaml) => Some(yaml.value.as_str()),
            _ => None,
        })
    });

    match yaml {
        Some(src) if !src.trim().is_empty() => {
            serde_yaml::from_str(src).map_err(|source| DocumentError::Frontmatter {
                path: path.to_path_buf(),
                source,
            })
        }
        _ => Ok(Frontmatter::default()),
    }
}

fn is_h1(node: &Node) -> bool {
    matches!(node, Node::Heading(h) if h.depth == 1)
}

fn first_h1_text(tree: &Node) -> Option<String> {
    let mut found = None;
    visit(tree, &mut |node: &Node, _| {
        if found.is_none() && is_h1(node) {
            found = Some(text::plain_text(node, CodeBlocks::Exclude));
        }
    });
    found.filter(|title| !title.is_empty())
}

fn contains_h1(node: &Node) -> bool {
    let mut found = false;
    visit(node, &mut |n: &Node, _| found |= is_h1(n));
    found
}

fn prepend_placeholder_heading(tree: &mut Node) {
    if let Some(children) = tree.children_mut() {
        children.insert(
            0,
            Node::Heading(mdast::Heading {
                children: vec![Node::Text(mdast::Text {
                    value: PLACEHOLDER_TITLE.to_string(),
                    position: None,
                })],
                position: None,
                depth: 1,
            }),
        );
    }
}

/// Text between the top-level block holding the H1 and the next H2, falling
/// back to the first paragraph after the H1.
fn description_text(tree: &Node) -> String {
    let Some(children) = tree.children() else {
        return String::new();
    };
    let start = children
        .iter()
        .position(contains_h1)
        .map(|i| i + 1)
        .unwrap_or(0);
    let rest = &children[start..];

    let span_end = rest
        .iter()
        .position(|n| matches!(n, Node::Heading(h) if h.depth == 2))
        .unwrap_or(rest.len());
    let span = text::plain_text_of(&rest[..span_end], CodeBlocks::Exclude);
    if !span.is_empty() {
        return span;
    }

    let mut paragraph = String::new();
    for node in rest {
        visit(node, &mut |n: &Node, _| {
            if paragraph.is_empty() && matches!(n, Node::Paragraph(_)) {
                paragraph = text::plain_text(n, CodeBlocks::Exclude);
            }
        });
        if !paragraph.is_empty() {
            break;
        }
    }
    paragraph
}

fn remove_first_h1(tree: &mut Node) -> bool {
    let Some(children) = tree.children_mut() else {
        return false;
    };
    if let Some(index) = children.iter().position(is_h1) {
        children.remove(index);
        return true;
    }
    children.iter_mut().any(remove_first_h1)
}

/// Keeps drafts out of listings. Drafts still build.
pub struct DraftFilter;

impl Filter for DraftFilter {
    fn include(&self, page: &Page) -> bool {
        !page.frontmatter.is_draft()
    }
}
