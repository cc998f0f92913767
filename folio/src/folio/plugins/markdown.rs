use markdown::mdast;
use markdown::{Constructs, ParseOptions};

use crate::folio::error::DocumentError;
use crate::folio::hast::{self, convert, html};
use crate::folio::types::Page;

/// GFM plus a leading YAML frontmatter block.
pub fn parse_options() -> ParseOptions {
    ParseOptions {
        constructs: Constructs {
            frontmatter: true,
            ..Constructs::gfm()
        },
        ..ParseOptions::gfm()
    }
}

pub fn parse(page: &Page) -> Result<mdast::Node, DocumentError> {
    markdown::to_mdast(&page.content, &parse_options()).map_err(|e| DocumentError::Parse {
        path: page.source_path.clone(),
        message: e.to_string(),
    })
}

pub fn to_hast(tree: &mdast::Node) -> hast::Node {
    convert::from_mdast(tree)
}

pub fn to_html(tree: &hast::Node) -> String {
    html::to_html(tree)
}
