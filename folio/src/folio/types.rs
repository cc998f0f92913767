use std::path::PathBuf;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::folio::paths::ContentType;

/// Per-document metadata. Declared values come from the YAML block at the
/// top of the file; everything else is default-filled by the frontmatter
/// pass and never overwritten once set.
#[derive(Clone, Debug, Serialize, Deserialize, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Frontmatter {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", alias = "draft")]
    pub is_draft: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none", alias = "date")]
    pub published_on: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub minutes_read: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub word_count: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub topic: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub post_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_type: Option<ContentType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_slug: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub layout: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
}

/// Set `slot` to `value()` when it is still empty.
pub fn fill<T>(slot: &mut Option<T>, value: impl FnOnce() -> Option<T>) {
    if slot.is_none() {
        *slot = value();
    }
}

impl Frontmatter {
    pub fn is_draft(&self) -> bool {
        self.is_draft.unwrap_or(false)
    }

    /// Take every field from `other` that is still unset here.
    pub fn merge_missing(&mut self, other: Frontmatter) {
        fill(&mut self.title, || other.title);
        fill(&mut self.description, || other.description);
        fill(&mut self.is_draft, || other.is_draft);
        fill(&mut self.published_on, || other.published_on);
        fill(&mut self.minutes_read, || other.minutes_read);
        fill(&mut self.word_count, || other.word_count);
        fill(&mut self.category, || other.category);
        fill(&mut self.topic, || other.topic);
        fill(&mut self.post_id, || other.post_id);
        fill(&mut self.content_type, || other.content_type);
        fill(&mut self.page_slug, || other.page_slug);
        fill(&mut self.layout, || other.layout);
        fill(&mut self.tags, || other.tags);
    }
}

/// The file record threaded through every pass for one document.
#[derive(Clone, Debug, Serialize)]
pub struct Page {
    pub source_path: PathBuf,
    pub frontmatter: Frontmatter,
    #[serde(skip)]
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub html: Option<String>,
}

impl Page {
    pub fn new(source_path: PathBuf, content: String) -> Self {
        Self {
            source_path,
            frontmatter: Frontmatter::default(),
            content,
            html: None,
        }
    }

    /// Start from values a caller already knows; the frontmatter pass will
    /// not touch them.
    pub fn with_frontmatter(mut self, frontmatter: Frontmatter) -> Self {
        self.frontmatter = frontmatter;
        self
    }
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderedPage {
    pub slug: String,
    /// Site-absolute URL, e.g. `/posts/til/some-file`.
    pub url: String,
    pub source_path: PathBuf,
    #[serde(skip)]
    pub html: String,
    pub frontmatter: Frontmatter,
}

impl RenderedPage {
    pub fn from_page(slug: String, url: String, mut page: Page) -> Self {
        let html = page.html.take().unwrap_or_default();

        RenderedPage {
            slug,
            url,
            source_path: page.source_path,
            html,
            frontmatter: page.frontmatter,
        }
    }
}
