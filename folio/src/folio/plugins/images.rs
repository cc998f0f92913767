use anyhow::Result;

use crate::folio::hast::Node;
use crate::folio::types::Page;
use crate::folio::visit::{Step, visit_mut};

use super::traits::HtmlTransformer;

pub const INVERT_SUFFIX: &str = "-invert";
pub const INVERT_CLASS: &str = "invert-on-dark";

/// Marks images authored for light backgrounds so the stylesheet can
/// invert them in dark mode.
pub struct ImageClassifier;

/// `diagram-invert.png?v=2` → true.
pub fn wants_inversion(src: &str) -> bool {
    let path = src.split(['?', '#']).next().unwrap_or(src);
    let name = path.rsplit('/').next().unwrap_or(path);
    let stem = name.rsplit_once('.').map_or(name, |(stem, _)| stem);
    stem.ends_with(INVERT_SUFFIX)
}

impl HtmlTransformer for ImageClassifier {
    fn transform(&self, tree: &mut Node, _page: &mut Page) -> Result<()> {
        visit_mut(tree, &mut |node: &mut Node, _| {
            if let Some(img) = node.as_element_mut().filter(|el| el.is("img")) {
                if img.property("src").is_some_and(wants_inversion) {
                    img.add_class(INVERT_CLASS);
                }
            }
            Ok::<_, anyhow::Error>(Step::Continue)
        })
    }
}
