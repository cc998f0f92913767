use std::path::{Path, PathBuf};

use anyhow::Result;
use log::{debug, warn};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::folio::config::SiteConfig;
use crate::folio::hast::Node;
use crate::folio::paths::{self, ContentType};
use crate::folio::types::Page;
use crate::folio::visit::{Step, visit_mut};

use super::traits::HtmlTransformer;

static SCHEME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-zA-Z][a-zA-Z0-9+.-]*:").expect("scheme regex"));

/// Rewrites relative links between markdown files into site URLs.
pub struct LinkRewriter {
    content_root: PathBuf,
}

impl LinkRewriter {
    pub fn new(content_root: impl Into<PathBuf>) -> Self {
        Self {
            content_root: content_root.into(),
        }
    }

    pub fn from_config(config: &SiteConfig) -> Self {
        Self::new(config.content_root())
    }

    /// The site URL for `href` as seen from `source`, or `None` when the
    /// link should be left as written.
    pub fn resolve(&self, source: &Path, href: &str) -> Option<String> {
        if !is_relative_markdown_link(href) {
            return None;
        }
        let (target, fragment) = match href.split_once('#') {
            Some((target, fragment)) => (target, Some(fragment)),
            None => (href, None),
        };
        let target = target.split_once('?').map_or(target, |(path, _)| path);

        let base = source.parent().unwrap_or(Path::new(""));
        let resolved = paths::normalize(&base.join(target));
        if !resolved.exists() {
            warn!(
                "broken link in {}: {} does not exist",
                source.display(),
                resolved.display()
            );
            return None;
        }

        let content_type = paths::relative_segments(&self.content_root, &resolved)
            .and_then(|segs| segs.first().and_then(|s| ContentType::from_dir(s)));
        let Some(content_type) = content_type else {
            warn!(
                "link in {} points outside a content section: {}",
                source.display(),
                resolved.display()
            );
            return None;
        };

        let slug = paths::get_slug(&self.content_root, &resolved);
        let mut url = content_type.url_for(&slug);
        if let Some(fragment) = fragment.filter(|f| !f.is_empty()) {
            url.push('#');
            url.push_str(fragment);
        }
        debug!("rewrote {href} to {url} in {}", source.display());
        Some(url)
    }
}

fn is_relative_markdown_link(href: &str) -> bool {
    if href.is_empty() || href.starts_with('#') || href.starts_with("//") {
        return false;
    }
    if SCHEME_RE.is_match(href) {
        return false;
    }
    let path = href.split(['#', '?']).next().unwrap_or(href);
    path.ends_with(".md")
}

impl HtmlTransformer for LinkRewriter {
    fn transform(&self, tree: &mut Node, page: &mut Page) -> Result<()> {
        let source = page.source_path.as_path();
        visit_mut(tree, &mut |node: &mut Node, _| {
            if let Some(el) = node.as_element_mut().filter(|el| el.is("a")) {
                if let Some(url) = el.property("href").and_then(|href| self.resolve(source, href)) {
                    el.set_property("href", url);
                }
            }
            Ok::<_, anyhow::Error>(Step::Continue)
        })
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    use super::*;
    use crate::folio::hast::{Element, html::to_html};
    use crate::folio::test_log;

    fn site() -> TempDir {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        for file in [
            "articles/system-design/patterns/cdc/README.md",
            "articles/system-design/patterns/outbox/README.md",
            "posts/til/2023-08-10-some-file.md",
            "drafts/notes.md",
        ] {
            let path = root.join(file);
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(path, "# x\n").unwrap();
        }
        dir
    }

    fn rewrite(dir: &TempDir, source: &str, href: &str) -> String {
        let root = dir.path();
        let mut page = Page::new(root.join(source), String::new());
        let mut tree = Node::Root(vec![Element::new("a").with_property("href", href).into()]);
        LinkRewriter::new(root).transform(&mut tree, &mut page).unwrap();
        to_html(&tree)
    }

    const CDC: &str = "articles/system-design/patterns/cdc/README.md";

    #[test]
    fn test_rewrites_sibling_article_with_fragment() {
        let dir = site();
        assert_eq!(
            rewrite(&dir, CDC, "../outbox/README.md#relay"),
            r#"<a href="/articles/system-design/patterns/outbox#relay"></a>"#
        );
    }

    #[test]
    fn test_rewrites_cross_section_link() {
        let dir = site();
        assert_eq!(
            rewrite(&dir, CDC, "../../../../posts/til/2023-08-10-some-file.md"),
            r#"<a href="/posts/til/some-file"></a>"#
        );
    }

    #[test]
    fn test_query_is_dropped_before_resolving() {
        let dir = site();
        test_log::capture();
        assert_eq!(
            rewrite(&dir, CDC, "../outbox/README.md?v=2#relay"),
            r#"<a href="/articles/system-design/patterns/outbox#relay"></a>"#
        );
        assert!(test_log::warnings().is_empty());
    }

    #[test]
    fn test_missing_target_is_left_unchanged_with_a_warning() {
        let dir = site();
        test_log::capture();
        assert_eq!(
            rewrite(&dir, CDC, "../nope/README.md"),
            r#"<a href="../nope/README.md"></a>"#
        );

        let warnings = test_log::warnings();
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].starts_with("broken link in "));
        assert!(warnings[0].ends_with("nope/README.md does not exist"));
    }

    #[test]
    fn test_unknown_section_is_left_unchanged_with_a_warning() {
        let dir = site();
        test_log::capture();
        assert_eq!(
            rewrite(&dir, CDC, "../../../../drafts/notes.md"),
            r#"<a href="../../../../drafts/notes.md"></a>"#
        );

        let warnings = test_log::warnings();
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains("points outside a content section"));
    }

    #[test]
    fn test_non_markdown_and_absolute_links_are_ignored() {
        for href in [
            "https://example.com/a.md",
            "//cdn.example.com/a.md",
            "mailto:me@example.com",
            "#section",
            "../outbox/diagram.png",
        ] {
            assert!(!is_relative_markdown_link(href), "{href}");
        }
        assert!(is_relative_markdown_link("../outbox/README.md#x"));
    }
}
