//! Path classification for the content repository.
//!
//! Every page's identity (section, category, slug, publish date) is a pure
//! function of where its file lives below the content root:
//!
//! ```text
//! content/articles/<category>/<topic>/<post-id>/README.md
//! content/posts/<post-type>/2023-08-10-<name>.md
//! content/in-research/<category>/<name>.md
//! ```

use std::path::{Component, Path, PathBuf};

use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::folio::error::PathError;

/// File stem meaning "this directory's own page".
pub const INDEX_FILE_STEM: &str = "README";

static DATE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\d{4}-\d{2}-\d{2}").expect("date regex"));
static DATE_PREFIX_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d{4}-\d{2}-\d{2})-").expect("date prefix regex"));
static LEADING_DATE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}").expect("leading date regex"));

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentType {
    Article,
    Post,
    Research,
}

impl ContentType {
    pub const ALL: [ContentType; 3] = [ContentType::Article, ContentType::Post, ContentType::Research];

    /// Directory directly below the content root holding this type.
    pub fn dir_name(self) -> &'static str {
        match self {
            ContentType::Article => "articles",
            ContentType::Post => "posts",
            ContentType::Research => "in-research",
        }
    }

    pub fn from_dir(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.dir_name() == name)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ContentType::Article => "article",
            ContentType::Post => "post",
            ContentType::Research => "research",
        }
    }

    pub fn url_prefix(self) -> &'static str {
        match self {
            ContentType::Article => "/articles",
            ContentType::Post => "/posts",
            ContentType::Research => "/in-research",
        }
    }

    /// Public URL of a page of this type. Post slugs already carry the
    /// post-type directory, so every section is a plain prefix join.
    pub fn url_for(self, slug: &str) -> String {
        if slug.is_empty() {
            self.url_prefix().to_string()
        } else {
            format!("{}/{}", self.url_prefix(), slug)
        }
    }
}

/// Public URL of a built page: under its section prefix when it has a
/// content type, else at the site root.
pub fn page_url(content_type: Option<ContentType>, slug: &str) -> String {
    match content_type {
        Some(content_type) => content_type.url_for(slug),
        None => format!("/{slug}"),
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Classification {
    pub content_type: Option<ContentType>,
    pub category: Option<String>,
    pub topic: Option<String>,
    pub post_id: Option<String>,
}

/// Segments of `path` below `content_root`, or `None` when the path is not
/// inside it.
pub fn relative_segments(content_root: &Path, path: &Path) -> Option<Vec<String>> {
    if path.as_os_str().is_empty() {
        return None;
    }
    let rel = path.strip_prefix(content_root).ok()?;
    Some(normal_segments(rel))
}

pub fn is_within(content_root: &Path, path: &Path) -> bool {
    relative_segments(content_root, path).is_some_and(|segs| !segs.is_empty())
}

fn normal_segments(path: &Path) -> Vec<String> {
    path.components()
        .filter_map(|c| match c {
            Component::Normal(s) => Some(s.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect()
}

fn file_stem(segment: &str) -> &str {
    segment.strip_suffix(".md").unwrap_or(segment)
}

/// Advisory classification: shapes that don't match a convention come back
/// with every field unset.
pub fn classify(content_root: &Path, path: &Path) -> Classification {
    let Some(segs) = relative_segments(content_root, path) else {
        return Classification::default();
    };
    let Some((first, rest)) = segs.split_first() else {
        return Classification::default();
    };
    let Some(content_type) = ContentType::from_dir(first) else {
        return Classification::default();
    };
    let Some((file, dirs)) = rest.split_last() else {
        return Classification::default();
    };

    match content_type {
        ContentType::Article => {
            if file_stem(file) != INDEX_FILE_STEM || dirs.is_empty() || dirs.len() > 3 {
                return Classification::default();
            }
            Classification {
                content_type: Some(content_type),
                category: dirs.first().cloned(),
                topic: dirs.get(1).cloned(),
                post_id: dirs.get(2).cloned(),
            }
        }
        ContentType::Post | ContentType::Research => match dirs.first() {
            Some(category) => Classification {
                content_type: Some(content_type),
                category: Some(category.clone()),
                topic: None,
                post_id: None,
            },
            None => Classification::default(),
        },
    }
}

/// URL slug for a content file: content root, type directory, `.md`
/// extension, per-segment date prefixes and index file names are removed.
pub fn get_slug(content_root: &Path, path: &Path) -> String {
    let rel = path.strip_prefix(content_root).unwrap_or(path);
    let mut segs = normal_segments(rel);

    if segs
        .first()
        .is_some_and(|first| ContentType::from_dir(first).is_some())
    {
        segs.remove(0);
    }

    segs.iter()
        .map(|seg| {
            let stem = file_stem(seg);
            DATE_PREFIX_RE.replace(stem, "").into_owned()
        })
        .filter(|seg| !seg.is_empty() && seg != INDEX_FILE_STEM)
        .collect::<Vec<_>>()
        .join("/")
}

/// Publish date encoded in the path: a `YYYY-MM-DD` in any directory after
/// the type directory, else a date prefix on the file name.
pub fn get_published_date(content_root: &Path, path: &Path) -> Result<NaiveDate, PathError> {
    let segs = relative_segments(content_root, path).ok_or_else(|| PathError::OutsideContentRoot {
        path: path.to_path_buf(),
        root: content_root.to_path_buf(),
    })?;

    let candidate = find_date_candidate(&segs).ok_or_else(|| PathError::NoDate {
        path: path.to_path_buf(),
    })?;

    parse_exact_date(candidate).ok_or_else(|| PathError::InvalidDate {
        date: candidate.to_string(),
        path: path.to_path_buf(),
    })
}

fn find_date_candidate(segs: &[String]) -> Option<&str> {
    let (file, dirs) = segs.split_last()?;

    let in_dirs = dirs
        .iter()
        .skip(1)
        .find_map(|seg| DATE_RE.find(seg).map(|m| m.as_str()));

    in_dirs.or_else(|| LEADING_DATE_RE.find(file).map(|m| m.as_str()))
}

/// Accepts `date` only if it survives a parse/format round trip, so
/// `2023-02-30` is refused instead of being normalised.
pub fn parse_exact_date(date: &str) -> Option<NaiveDate> {
    let parsed = NaiveDate::parse_from_str(date, "%Y-%m-%d").ok()?;
    (parsed.format("%Y-%m-%d").to_string() == date).then_some(parsed)
}

/// Lexically resolve `.` and `..` without touching the file system.
pub fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !out.pop() {
                    out.push("..");
                }
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn root() -> &'static Path {
        Path::new("content")
    }

    #[test]
    fn test_classify_article_readme() {
        let path = Path::new(
            "content/articles/system-design/core-distributed-patterns/change-data-capture/README.md",
        );
        let c = classify(root(), path);

        assert_eq!(c.content_type, Some(ContentType::Article));
        assert_eq!(c.category.as_deref(), Some("system-design"));
        assert_eq!(c.topic.as_deref(), Some("core-distributed-patterns"));
        assert_eq!(c.post_id.as_deref(), Some("change-data-capture"));
    }

    #[test]
    fn test_classify_article_category_index() {
        let c = classify(root(), Path::new("content/articles/system-design/README.md"));

        assert_eq!(c.category.as_deref(), Some("system-design"));
        assert_eq!(c.topic, None);
        assert_eq!(c.post_id, None);
    }

    #[test]
    fn test_classify_post_uses_post_type_as_category() {
        let c = classify(root(), Path::new("content/posts/til/2023-08-10-some-file.md"));

        assert_eq!(c.content_type, Some(ContentType::Post));
        assert_eq!(c.category.as_deref(), Some("til"));
    }

    #[test]
    fn test_classify_unrecognized_shapes_are_empty() {
        assert_eq!(classify(root(), Path::new("content/misc/a.md")), Classification::default());
        assert_eq!(classify(root(), Path::new("content/posts/a.md")), Classification::default());
        assert_eq!(
            classify(root(), Path::new("content/articles/a/b/c/d/README.md")),
            Classification::default()
        );
        assert_eq!(classify(root(), Path::new("elsewhere/a.md")), Classification::default());
    }

    #[test]
    fn test_get_slug_article() {
        let path = Path::new(
            "content/articles/system-design/core-distributed-patterns/change-data-capture/README.md",
        );
        assert_eq!(
            get_slug(root(), path),
            "system-design/core-distributed-patterns/change-data-capture"
        );
    }

    #[test]
    fn test_get_slug_strips_date_prefixes() {
        let path = Path::new("content/posts/til/2023-08-10-some-file.md");
        assert_eq!(get_slug(root(), path), "til/some-file");

        let path = Path::new("content/posts/2024-01-02-series/README.md");
        assert_eq!(get_slug(root(), path), "series");
    }

    #[test]
    fn test_get_slug_is_stable() {
        let path = Path::new("content/in-research/ml/2022-05-05-notes.md");
        let first = get_slug(root(), path);
        let second = get_slug(root(), path);

        assert_eq!(first, second);
        assert_eq!(get_slug(root(), Path::new(&first)), first);
    }

    #[test]
    fn test_published_date_from_file_name() {
        let path = Path::new("content/posts/til/2023-08-10-some-file.md");
        assert_eq!(
            get_published_date(root(), path),
            Ok(NaiveDate::from_ymd_opt(2023, 8, 10).unwrap())
        );
    }

    #[test]
    fn test_published_date_prefers_directory() {
        let path = Path::new("content/posts/2021-01-01-series/2023-08-10-part.md");
        assert_eq!(
            get_published_date(root(), path),
            Ok(NaiveDate::from_ymd_opt(2021, 1, 1).unwrap())
        );
    }

    #[test]
    fn test_published_date_validity() {
        let ok = Path::new("content/posts/til/2024-02-29-leap.md");
        assert!(get_published_date(root(), ok).is_ok());

        for bad in ["2023-02-29", "2023-02-30", "2023-13-45"] {
            let path = PathBuf::from(format!("content/posts/til/{bad}-x.md"));
            assert_eq!(
                get_published_date(root(), &path),
                Err(PathError::InvalidDate {
                    date: bad.to_string(),
                    path: path.clone(),
                })
            );
        }
    }

    #[test]
    fn test_published_date_outside_root() {
        for path in ["", "other/posts/2023-08-10-x.md", "/abs/2023-08-10-x.md"] {
            let err = get_published_date(root(), Path::new(path)).unwrap_err();
            assert!(matches!(err, PathError::OutsideContentRoot { .. }), "{path}");
            assert!(err.to_string().contains("not within content folder"));
        }
    }

    #[test]
    fn test_published_date_missing() {
        let path = Path::new("content/articles/a/b/c/README.md");
        assert!(matches!(
            get_published_date(root(), path),
            Err(PathError::NoDate { .. })
        ));
    }

    #[test]
    fn test_url_for_sections() {
        assert_eq!(ContentType::Article.url_for("a/b/c"), "/articles/a/b/c");
        assert_eq!(ContentType::Post.url_for("til/x"), "/posts/til/x");
        assert_eq!(ContentType::Research.url_for(""), "/in-research");
    }

    #[test]
    fn test_normalize() {
        assert_eq!(
            normalize(Path::new("content/posts/til/../other/./a.md")),
            PathBuf::from("content/posts/other/a.md")
        );
    }
}
