//! Decides which URLs belong in the sitemap.
//!
//! Drafts are found by parsing each content file and applying the same
//! verdict the frontmatter pass uses, so both always agree on what a draft is.

use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

use log::{debug, info, warn};
use serde::Deserialize;
use walkdir::WalkDir;

use crate::folio::config::SitemapConfig;
use crate::folio::paths;
use crate::folio::plugins::frontmatter::draft_status;
use crate::folio::plugins::markdown::parse;
use crate::folio::types::{Frontmatter, Page};

/// One entry of the vanity redirect file.
#[derive(Debug, Deserialize, PartialEq, Eq)]
pub struct VanityRedirect {
    pub id: String,
    pub target: String,
}

#[derive(Debug, Default)]
pub struct SitemapFilter {
    excluded: BTreeSet<String>,
    excluded_prefixes: Vec<String>,
}

impl SitemapFilter {
    pub fn build(config: &SitemapConfig, content_root: &Path) -> Self {
        let mut excluded: BTreeSet<String> = config
            .static_excludes
            .iter()
            .map(|url| normalize_url(url))
            .collect();

        let redirects = load_vanity_redirects(Path::new(&config.vanity_file));
        excluded.extend(redirects.iter().map(|r| normalize_url(&format!("/{}", r.id))));

        let drafts = draft_urls(content_root);
        info!(
            "Sitemap excludes {} redirect(s) and {} draft(s)",
            redirects.len(),
            drafts.len()
        );
        excluded.extend(drafts);

        Self {
            excluded,
            excluded_prefixes: config
                .excluded_prefixes
                .iter()
                .map(|p| normalize_url(p))
                .collect(),
        }
    }

    pub fn includes(&self, url: &str) -> bool {
        let path = normalize_url(url);
        if self.excluded.contains(&path) {
            return false;
        }
        !self
            .excluded_prefixes
            .iter()
            .any(|prefix| path == *prefix || path.starts_with(&format!("{prefix}/")))
    }

    pub fn excluded(&self) -> impl Iterator<Item = &str> {
        self.excluded.iter().map(String::as_str)
    }
}

/// Path part of `url` without query, fragment or trailing slash.
pub fn normalize_url(url: &str) -> String {
    let without_origin = match url.split_once("://") {
        Some((_, rest)) => rest.find('/').map_or("/", |i| &rest[i..]),
        None => url,
    };
    let path = without_origin
        .split(['?', '#'])
        .next()
        .unwrap_or(without_origin);
    let trimmed = path.trim_end_matches('/');
    if trimmed.is_empty() {
        "/".to_string()
    } else if trimmed.starts_with('/') {
        trimmed.to_string()
    } else {
        format!("/{trimmed}")
    }
}

pub fn load_vanity_redirects(path: &Path) -> Vec<VanityRedirect> {
    let contents = match fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(err) => {
            debug!("No vanity redirects at {}: {err}", path.display());
            return Vec::new();
        }
    };
    if contents.trim().is_empty() {
        return Vec::new();
    }
    match serde_yaml::from_str::<Vec<VanityRedirect>>(&contents) {
        Ok(redirects) => redirects,
        Err(err) => {
            warn!("Ignoring malformed vanity file {}: {err}", path.display());
            Vec::new()
        }
    }
}

/// URLs of every draft under the content root. Each file is parsed and
/// judged by the frontmatter pass's own rule, and its URL is built the way
/// the engine builds it, declared slug and content type included.
pub fn draft_urls(content_root: &Path) -> BTreeSet<String> {
    let mut drafts = BTreeSet::new();
    for entry in WalkDir::new(content_root).into_iter().filter_map(Result::ok) {
        let path = entry.path();
        if !entry.file_type().is_file() || path.extension().is_none_or(|ext| ext != "md") {
            continue;
        }
        let Ok(contents) = fs::read_to_string(path) else {
            warn!("Could not read {} while scanning drafts", path.display());
            continue;
        };
        let page = Page::new(path.to_path_buf(), contents);
        let status = parse(&page).and_then(|tree| draft_status(&tree, path));
        let (is_draft, declared) = match status {
            Ok(status) => status,
            Err(err) => {
                warn!("Skipping {} while scanning drafts: {err}", path.display());
                continue;
            }
        };
        if is_draft {
            drafts.insert(draft_url(content_root, path, declared));
        }
    }
    drafts
}

fn draft_url(content_root: &Path, path: &Path, declared: Frontmatter) -> String {
    let content_type = declared
        .content_type
        .or_else(|| paths::classify(content_root, path).content_type);
    let slug = declared
        .page_slug
        .unwrap_or_else(|| paths::get_slug(content_root, path));
    paths::page_url(content_type, &slug)
}
