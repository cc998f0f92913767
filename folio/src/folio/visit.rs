//! Pre-order traversal shared by every tree transform.
//!
//! Works over both the mdast produced by the `markdown` crate and the
//! HTML-level [`hast`](crate::folio::hast) tree.

use markdown::mdast;

use crate::folio::hast;

pub trait TreeNode: Sized {
    fn children(&self) -> Option<&Vec<Self>>;
    fn children_mut(&mut self) -> Option<&mut Vec<Self>>;
}

impl TreeNode for mdast::Node {
    fn children(&self) -> Option<&Vec<Self>> {
        mdast::Node::children(self)
    }

    fn children_mut(&mut self) -> Option<&mut Vec<Self>> {
        mdast::Node::children_mut(self)
    }
}

impl TreeNode for hast::Node {
    fn children(&self) -> Option<&Vec<Self>> {
        hast::Node::children(self)
    }

    fn children_mut(&mut self) -> Option<&mut Vec<Self>> {
        hast::Node::children_mut(self)
    }
}

/// Where a visited node sits. `index` is `None` for the root.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Cursor {
    pub depth: usize,
    pub index: Option<usize>,
}

impl Cursor {
    const ROOT: Cursor = Cursor {
        depth: 0,
        index: None,
    };

    fn child(self, index: usize) -> Cursor {
        Cursor {
            depth: self.depth + 1,
            index: Some(index),
        }
    }
}

/// What a mutating visitor wants done after seeing a node.
#[derive(Debug)]
pub enum Step<N> {
    Continue,
    /// Leave this node's children unvisited.
    Skip,
    /// Put a new node at this node's index in its parent. The replacement
    /// is not descended into.
    Replace(N),
}

pub fn visit<'a, N, F>(node: &'a N, f: &mut F)
where
    N: TreeNode,
    F: FnMut(&'a N, Cursor),
{
    walk(node, Cursor::ROOT, f);
}

fn walk<'a, N, F>(node: &'a N, cursor: Cursor, f: &mut F)
where
    N: TreeNode,
    F: FnMut(&'a N, Cursor),
{
    f(node, cursor);
    if let Some(children) = node.children() {
        for (index, child) in children.iter().enumerate() {
            walk(child, cursor.child(index), f);
        }
    }
}

/// Mutating pre-order walk. Errors from the callback stop the walk and are
/// returned as is.
pub fn visit_mut<N, E, F>(root: &mut N, f: &mut F) -> Result<(), E>
where
    N: TreeNode,
    F: FnMut(&mut N, Cursor) -> Result<Step<N>, E>,
{
    walk_mut(root, Cursor::ROOT, f)
}

fn walk_mut<N, E, F>(node: &mut N, cursor: Cursor, f: &mut F) -> Result<(), E>
where
    N: TreeNode,
    F: FnMut(&mut N, Cursor) -> Result<Step<N>, E>,
{
    match f(node, cursor)? {
        Step::Continue => {}
        Step::Skip => return Ok(()),
        Step::Replace(replacement) => {
            *node = replacement;
            return Ok(());
        }
    }

    if let Some(children) = node.children_mut() {
        for (index, child) in children.iter_mut().enumerate() {
            walk_mut(child, cursor.child(index), f)?;
        }
    }
    Ok(())
}

/// Index paths from the root to every node matching `pred`. Matches are not
/// searched for nested matches.
pub fn find_paths<N, F>(root: &N, mut pred: F) -> Vec<Vec<usize>>
where
    N: TreeNode,
    F: FnMut(&N) -> bool,
{
    let mut found = Vec::new();
    let mut trail = Vec::new();
    collect_paths(root, &mut pred, &mut trail, &mut found);
    found
}

fn collect_paths<N, F>(node: &N, pred: &mut F, trail: &mut Vec<usize>, found: &mut Vec<Vec<usize>>)
where
    N: TreeNode,
    F: FnMut(&N) -> bool,
{
    if pred(node) {
        found.push(trail.clone());
        return;
    }
    if let Some(children) = node.children() {
        for (index, child) in children.iter().enumerate() {
            trail.push(index);
            collect_paths(child, pred, trail, found);
            trail.pop();
        }
    }
}

pub fn node_at_path<'a, N: TreeNode>(root: &'a N, path: &[usize]) -> Option<&'a N> {
    let mut node = root;
    for &index in path {
        node = node.children()?.get(index)?;
    }
    Some(node)
}

pub fn node_at_path_mut<'a, N: TreeNode>(root: &'a mut N, path: &[usize]) -> Option<&'a mut N> {
    let mut node = root;
    for &index in path {
        node = node.children_mut()?.get_mut(index)?;
    }
    Some(node)
}

#[cfg(test)]
mod tests {
    use std::convert::Infallible;

    use super::*;
    use crate::folio::hast::{Element, Node};

    fn sample() -> Node {
        Node::Root(vec![
            Element::new("p")
                .with_children(vec![Node::text("a"), Element::new("em").into()])
                .into(),
            Element::new("div")
                .with_children(vec![Element::new("span").into()])
                .into(),
        ])
    }

    fn tag(node: &Node) -> &str {
        match node {
            Node::Root(_) => "#root",
            Node::Element(el) => &el.tag_name,
            Node::Text(_) => "#text",
            _ => "#other",
        }
    }

    #[test]
    fn test_visit_is_pre_order_and_total() {
        let tree = sample();
        let mut seen = Vec::new();
        visit(&tree, &mut |node: &Node, cursor| {
            seen.push((tag(node).to_string(), cursor.depth, cursor.index))
        });

        assert_eq!(
            seen,
            vec![
                ("#root".to_string(), 0, None),
                ("p".to_string(), 1, Some(0)),
                ("#text".to_string(), 2, Some(0)),
                ("em".to_string(), 2, Some(1)),
                ("div".to_string(), 1, Some(1)),
                ("span".to_string(), 2, Some(0)),
            ]
        );
    }

    #[test]
    fn test_replacement_is_not_revisited() {
        let mut tree = sample();
        let mut visits = 0;

        // Replacing a div with a div that contains the original would loop
        // forever if the replacement were descended into.
        visit_mut(&mut tree, &mut |node: &mut Node, _| {
            visits += 1;
            if node.as_element().is_some_and(|el| el.is("div")) {
                let wrapped = Element::new("div").with_children(vec![node.clone()]);
                return Ok::<_, Infallible>(Step::Replace(wrapped.into()));
            }
            Ok(Step::Continue)
        })
        .unwrap();

        assert_eq!(visits, 5);
        let outer = node_at_path(&tree, &[1]).and_then(Node::as_element).unwrap();
        assert!(outer.is("div"));
        assert!(outer.first_element_child().unwrap().is("div"));
    }

    #[test]
    fn test_callback_error_propagates() {
        let mut tree = sample();
        let result = visit_mut(&mut tree, &mut |node: &mut Node, _| match node {
            Node::Text(_) => Err("boom"),
            _ => Ok(Step::Continue),
        });

        assert_eq!(result, Err("boom"));
    }

    #[test]
    fn test_find_paths_and_lookup() {
        let mut tree = sample();
        let paths = find_paths(&tree, |node: &Node| {
            node.as_element().is_some_and(|el| el.is("em") || el.is("span"))
        });

        assert_eq!(paths, vec![vec![0, 1], vec![1, 0]]);

        let span = node_at_path_mut(&mut tree, &[1, 0]).unwrap();
        *span = Node::text("replaced");
        assert_eq!(node_at_path(&tree, &[1, 0]), Some(&Node::text("replaced")));
        assert_eq!(node_at_path(&tree, &[5]), None);
    }
}
