use anyhow::Result;
use markdown::mdast;

use crate::folio::hast;
use crate::folio::types::Page;

/// A pass over the markdown-level tree, run before HTML conversion.
pub trait Transformer: Send + Sync {
    fn transform(&self, tree: &mut mdast::Node, page: &mut Page) -> Result<()>;
}

/// A pass over the HTML-level tree.
pub trait HtmlTransformer: Send + Sync {
    fn transform(&self, tree: &mut hast::Node, page: &mut Page) -> Result<()>;
}

pub trait Filter: Send + Sync {
    fn include(&self, page: &Page) -> bool;
}
