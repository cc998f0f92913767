use anyhow::Result;

use crate::folio::hast::{Element, Node};
use crate::folio::types::Page;
use crate::folio::visit::{Step, visit_mut};

use super::traits::HtmlTransformer;

pub const WRAPPER_CLASS: &str = "table-wrapper";

/// Wraps every table in a scroll container, keeping its position among
/// its siblings.
pub struct TableWrapper;

impl HtmlTransformer for TableWrapper {
    fn transform(&self, tree: &mut Node, _page: &mut Page) -> Result<()> {
        visit_mut(tree, &mut |node: &mut Node, _| {
            if !node.as_element().is_some_and(|el| el.is("table")) {
                return Ok::<_, anyhow::Error>(Step::Continue);
            }
            let table = std::mem::replace(node, Node::Root(Vec::new()));
            let wrapper = Element::new("div")
                .with_property("class", WRAPPER_CLASS)
                .with_children(vec![table]);
            Ok(Step::Replace(wrapper.into()))
        })
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use pretty_assertions::assert_eq;

    use super::*;
    use crate::folio::hast::html::to_html;

    fn run(mut tree: Node) -> Node {
        let mut page = Page::new(PathBuf::from("content/posts/til/x.md"), String::new());
        TableWrapper.transform(&mut tree, &mut page).unwrap();
        tree
    }

    #[test]
    fn test_table_is_wrapped_in_place() {
        let tree = run(Node::Root(vec![
            Element::new("p").with_children(vec![Node::text("before")]).into(),
            Element::new("table").into(),
            Element::new("p").with_children(vec![Node::text("after")]).into(),
        ]));

        assert_eq!(
            to_html(&tree),
            r#"<p>before</p><div class="table-wrapper"><table></table></div><p>after</p>"#
        );
    }

    #[test]
    fn test_nested_tables_are_each_wrapped_once() {
        let tree = run(Node::Root(vec![
            Element::new("section")
                .with_children(vec![Element::new("table").into(), Element::new("table").into()])
                .into(),
        ]));

        assert_eq!(
            to_html(&tree),
            concat!(
                r#"<section><div class="table-wrapper"><table></table></div>"#,
                r#"<div class="table-wrapper"><table></table></div></section>"#
            )
        );
    }
}
