//! Plain-text extraction from mdast.
//!
//! Two policies exist on purpose: titles and descriptions leave fenced code
//! out, reading time counts every word on the page.

use markdown::mdast::Node;

pub const WORDS_PER_MINUTE: usize = 200;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CodeBlocks {
    Include,
    Exclude,
}

/// Text of `node` with whitespace collapsed to single spaces.
pub fn plain_text(node: &Node, code: CodeBlocks) -> String {
    let mut out = String::new();
    push_text(node, code, &mut out);
    out.split_whitespace().collect::<Vec<_>>().join(" ")
}

pub fn plain_text_of(nodes: &[Node], code: CodeBlocks) -> String {
    nodes
        .iter()
        .map(|n| plain_text(n, code))
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

fn push_text(node: &Node, code: CodeBlocks, out: &mut String) {
    match node {
        Node::Text(t) => out.push_str(&t.value),
        Node::InlineCode(c) => out.push_str(&c.value),
        Node::InlineMath(m) => out.push_str(&m.value),
        Node::Code(c) => {
            if code == CodeBlocks::Include {
                out.push(' ');
                out.push_str(&c.value);
                out.push(' ');
            }
        }
        Node::Math(m) => {
            out.push(' ');
            out.push_str(&m.value);
            out.push(' ');
        }
        Node::Break(_) => out.push(' '),
        Node::Yaml(_) | Node::Toml(_) | Node::Html(_) | Node::Definition(_) => {}
        other => {
            let block = is_block(other);
            if let Some(children) = other.children() {
                for child in children {
                    push_text(child, code, out);
                    if block {
                        out.push(' ');
                    }
                }
            }
        }
    }
}

fn is_block(node: &Node) -> bool {
    matches!(
        node,
        Node::Root(_)
            | Node::Blockquote(_)
            | Node::List(_)
            | Node::ListItem(_)
            | Node::Table(_)
            | Node::TableRow(_)
            | Node::TableCell(_)
            | Node::FootnoteDefinition(_)
    )
}

pub fn word_count(node: &Node) -> usize {
    plain_text(node, CodeBlocks::Include).split_whitespace().count()
}

/// Human reading estimate, e.g. `"4 min read"`. Never below one minute.
pub fn minutes_read(words: usize) -> String {
    let minutes = words.div_ceil(WORDS_PER_MINUTE).max(1);
    format!("{minutes} min read")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(src: &str) -> Node {
        markdown::to_mdast(src, &markdown::ParseOptions::gfm()).unwrap()
    }

    #[test]
    fn test_plain_text_joins_inline_and_separates_blocks() {
        let tree = parse("# Hello *big* `world`\n\n- one\n- two\n");
        assert_eq!(plain_text(&tree, CodeBlocks::Exclude), "Hello big world one two");
    }

    #[test]
    fn test_code_policy() {
        let tree = parse("Intro text.\n\n```rust\nfn main() {}\n```\n");

        assert_eq!(plain_text(&tree, CodeBlocks::Exclude), "Intro text.");
        assert_eq!(
            plain_text(&tree, CodeBlocks::Include),
            "Intro text. fn main() {}"
        );
        assert_eq!(word_count(&tree), 5);
    }

    #[test]
    fn test_minutes_read() {
        assert_eq!(minutes_read(0), "1 min read");
        assert_eq!(minutes_read(200), "1 min read");
        assert_eq!(minutes_read(201), "2 min read");
        assert_eq!(minutes_read(1000), "5 min read");
    }
}
