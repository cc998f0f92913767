use anyhow::Result;
use markdown::mdast::{Code, Node};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::folio::types::Page;
use crate::folio::visit::{Step, visit_mut};

use super::traits::Transformer;

static FILE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?:^|\s)file=(?:"([^"]+)"|(\S+))"#).expect("file meta regex")
});
static TITLE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?:^|\s)title=").expect("title meta regex"));
static RANGE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^L(\d+)(?:-L?(\d+))?$").expect("line range regex"));
static DATE_PREFIX_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}-").expect("date prefix regex"));

/// A `file=` reference in a fenced block's meta string.
#[derive(Debug, PartialEq, Eq)]
struct FileRef<'a> {
    path: &'a str,
    start_line: Option<u32>,
}

fn file_ref(meta: &str) -> Option<FileRef<'_>> {
    let caps = FILE_RE.captures(meta)?;
    let value = caps.get(1).or_else(|| caps.get(2))?.as_str();
    let (path, fragment) = match value.split_once('#') {
        Some((path, fragment)) => (path, Some(fragment)),
        None => (value, None),
    };
    let start_line = fragment
        .and_then(|f| RANGE_RE.captures(f))
        .and_then(|c| c[1].parse().ok());
    Some(FileRef { path, start_line })
}

fn file_name(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}

/// Turns `file=src/app.ts#L10-L20` in a fence's meta into a caption and
/// line numbers. Only ever adds to the meta string.
pub struct CodeTitles;

impl CodeTitles {
    fn annotate(code: &mut Code) {
        // A fence opened with "```file=..." has no language, so the parser
        // reads the annotation as one.
        if code.lang.as_deref().is_some_and(|l| l.starts_with("file=")) {
            let lang = code.lang.take().unwrap_or_default();
            code.meta = Some(match code.meta.take() {
                Some(meta) => format!("{lang} {meta}"),
                None => lang,
            });
        }

        let Some(meta) = code.meta.as_deref() else {
            return;
        };
        if TITLE_RE.is_match(meta) {
            return;
        }
        let Some(file) = file_ref(meta) else {
            return;
        };

        let name = file_name(file.path);
        let title = DATE_PREFIX_RE.replace(name, "");
        let mut extra = vec![format!("title=\"{title}\"")];
        if let Some(start) = file.start_line {
            if !meta.split_whitespace().any(|w| w == "showLineNumbers") {
                extra.push("showLineNumbers".into());
            }
            if !meta.contains("startLineNumber=") {
                extra.push(format!("startLineNumber={start}"));
            }
        }

        if code.lang.is_none() {
            code.lang = name
                .rsplit_once('.')
                .map(|(_, ext)| ext.to_lowercase())
                .filter(|ext| !ext.is_empty());
        }
        code.meta = Some(format!("{} {}", meta.trim_end(), extra.join(" ")));
    }
}

impl Transformer for CodeTitles {
    fn transform(&self, tree: &mut Node, _page: &mut Page) -> Result<()> {
        visit_mut(tree, &mut |node: &mut Node, _| {
            if let Node::Code(code) = node {
                Self::annotate(code);
            }
            Ok::<_, anyhow::Error>(Step::Continue)
        })
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use pretty_assertions::assert_eq;

    use super::*;
    use crate::folio::plugins::markdown::parse;

    fn first_code(src: &str) -> Code {
        let mut page = Page::new(PathBuf::from("content/posts/til/x.md"), src.to_string());
        let mut tree = parse(&page).unwrap();
        CodeTitles.transform(&mut tree, &mut page).unwrap();
        tree.children()
            .unwrap()
            .iter()
            .find_map(|n| match n {
                Node::Code(c) => Some(c.clone()),
                _ => None,
            })
            .unwrap()
    }

    #[test]
    fn test_file_with_line_range() {
        let code = first_code("```file=src/app.ts#L10-L20\nx\n```\n");

        assert_eq!(code.lang.as_deref(), Some("ts"));
        assert_eq!(
            code.meta.as_deref(),
            Some(r#"file=src/app.ts#L10-L20 title="app.ts" showLineNumbers startLineNumber=10"#)
        );
    }

    #[test]
    fn test_existing_lang_and_date_prefix() {
        let code = first_code("```rust file=notes/2024-01-05-setup.rs\nfn main() {}\n```\n");

        assert_eq!(code.lang.as_deref(), Some("rust"));
        assert_eq!(
            code.meta.as_deref(),
            Some(r#"file=notes/2024-01-05-setup.rs title="setup.rs""#)
        );
    }

    #[test]
    fn test_explicit_title_is_left_alone() {
        let code = first_code("```js file=a.js title=\"Custom\"\nx\n```\n");
        assert_eq!(code.meta.as_deref(), Some("file=a.js title=\"Custom\""));
    }

    #[test]
    fn test_existing_line_options_are_not_repeated() {
        let code = first_code("```py file=a.py#L3 showLineNumbers\nx\n```\n");
        assert_eq!(
            code.meta.as_deref(),
            Some(r#"file=a.py#L3 showLineNumbers title="a.py" startLineNumber=3"#)
        );
    }

    #[test]
    fn test_blocks_without_file_are_untouched() {
        let code = first_code("```sh\nls\n```\n");
        assert_eq!(code.meta, None);
        assert_eq!(code.lang.as_deref(), Some("sh"));
    }
}
