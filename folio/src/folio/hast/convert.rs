use std::collections::HashMap;

use markdown::mdast::{self, AlignKind, Node as Md};
use once_cell::sync::Lazy;
use regex::Regex;

use super::{Element, Node};
use crate::folio::text::{CodeBlocks, plain_text};
use crate::folio::visit::visit;

static META_TITLE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(?:^|\s)title="([^"]*)""#).expect("meta title regex"));
static META_START_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?:^|\s)startLineNumber=(\d+)").expect("meta start regex"));
static RAW_PRE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?s)^\s*<pre\s+class\s*=\s*["']([^"']*)["']\s*>(.*)</pre>\s*$"#)
        .expect("raw pre regex")
});

/// Convert a parsed markdown document into the HTML-level tree.
pub fn from_mdast(root: &Md) -> Node {
    let mut cx = Context::new(root);
    let mut children = cx.children(root);
    if let Some(section) = cx.footnote_section() {
        children.push(section);
    }
    Node::Root(children)
}

struct Context<'a> {
    definitions: HashMap<&'a str, &'a mdast::Definition>,
    footnote_defs: HashMap<&'a str, &'a mdast::FootnoteDefinition>,
    footnote_order: Vec<&'a str>,
    heading_ids: HashMap<String, usize>,
}

impl<'a> Context<'a> {
    fn new(root: &'a Md) -> Self {
        let mut definitions = HashMap::new();
        let mut footnote_defs = HashMap::new();
        visit(root, &mut |node: &'a Md, _| match node {
            Md::Definition(def) => {
                definitions.entry(def.identifier.as_str()).or_insert(def);
            }
            Md::FootnoteDefinition(def) => {
                footnote_defs.entry(def.identifier.as_str()).or_insert(def);
            }
            _ => {}
        });

        Self {
            definitions,
            footnote_defs,
            footnote_order: Vec::new(),
            heading_ids: HashMap::new(),
        }
    }

    fn children(&mut self, node: &'a Md) -> Vec<Node> {
        node.children()
            .map(|children| children.iter().flat_map(|c| self.node(c)).collect())
            .unwrap_or_default()
    }

    fn node(&mut self, node: &'a Md) -> Vec<Node> {
        match node {
            Md::Root(_) => self.children(node),
            Md::Paragraph(_) => self.wrap("p", node),
            Md::Heading(h) => {
                let id = self.heading_id(&plain_text(node, CodeBlocks::Exclude));
                let el = Element::new(format!("h{}", h.depth))
                    .with_property("id", id)
                    .with_children(self.children(node));
                vec![el.into()]
            }
            Md::Text(t) => vec![Node::text(t.value.clone())],
            Md::Emphasis(_) => self.wrap("em", node),
            Md::Strong(_) => self.wrap("strong", node),
            Md::Delete(_) => self.wrap("del", node),
            Md::Blockquote(_) => self.wrap("blockquote", node),
            Md::InlineCode(c) => vec![
                Element::new("code")
                    .with_children(vec![Node::text(c.value.clone())])
                    .into(),
            ],
            Md::Break(_) => vec![Element::new("br").into(), Node::text("\n")],
            Md::ThematicBreak(_) => vec![Element::new("hr").into()],
            Md::Html(h) => vec![raw_html(&h.value)],
            Md::List(list) => vec![self.list(list)],
            Md::ListItem(item) => vec![self.list_item(item, item.spread)],
            Md::Code(code) => vec![code_block(code)],
            Md::Math(math) => vec![
                Element::new("pre")
                    .with_children(vec![
                        Element::new("code")
                            .with_property("class", "language-math math-display")
                            .with_children(vec![Node::text(math.value.clone())])
                            .into(),
                    ])
                    .into(),
            ],
            Md::InlineMath(math) => vec![
                Element::new("code")
                    .with_property("class", "language-math math-inline")
                    .with_children(vec![Node::text(math.value.clone())])
                    .into(),
            ],
            Md::Link(link) => {
                let mut a = Element::new("a").with_property("href", link.url.clone());
                if let Some(title) = &link.title {
                    a.set_property("title", title.clone());
                }
                a.children = self.children(node);
                vec![a.into()]
            }
            Md::Image(img) => vec![image(&img.url, &img.alt, img.title.as_deref())],
            Md::LinkReference(link) => match self.definitions.get(link.identifier.as_str()) {
                Some(def) => {
                    let mut a = Element::new("a").with_property("href", def.url.clone());
                    if let Some(title) = &def.title {
                        a.set_property("title", title.clone());
                    }
                    a.children = self.children(node);
                    vec![a.into()]
                }
                None => {
                    let mut out = vec![Node::text("[")];
                    out.extend(self.children(node));
                    out.push(Node::text("]"));
                    out
                }
            },
            Md::ImageReference(img) => match self.definitions.get(img.identifier.as_str()) {
                Some(def) => vec![image(&def.url, &img.alt, def.title.as_deref())],
                None => vec![Node::text(format!("![{}]", img.alt))],
            },
            Md::Table(table) => vec![self.table(table)],
            Md::FootnoteReference(fref) => vec![self.footnote_reference(fref)],
            // Definitions are resolved through references; frontmatter and
            // MDX constructs have no HTML form.
            _ => Vec::new(),
        }
    }

    fn wrap(&mut self, tag_name: &str, node: &'a Md) -> Vec<Node> {
        vec![Element::new(tag_name).with_children(self.children(node)).into()]
    }

    fn heading_id(&mut self, text: &str) -> String {
        let base = slugify(text);
        let count = self.heading_ids.entry(base.clone()).or_insert(0);
        let id = if *count == 0 {
            base
        } else {
            format!("{base}-{count}")
        };
        *count += 1;
        id
    }

    fn list(&mut self, list: &'a mdast::List) -> Node {
        let tag_name = if list.ordered { "ol" } else { "ul" };
        let mut el = Element::new(tag_name);
        if let Some(start) = list.start.filter(|s| list.ordered && *s != 1) {
            el.set_property("start", start);
        }
        let tight = !list.spread;
        let mut items: Vec<Node> = Vec::new();
        for child in &list.children {
            match child {
                Md::ListItem(item) => items.push(self.list_item(item, !tight || item.spread)),
                other => items.extend(self.node(other)),
            }
        }
        if items.iter().any(is_task_item) {
            el.add_class("contains-task-list");
        }
        el.children = items;
        el.into()
    }

    fn list_item(&mut self, item: &'a mdast::ListItem, spread: bool) -> Node {
        let mut li = Element::new("li");
        let mut children: Vec<Node> = Vec::new();

        if let Some(checked) = item.checked {
            li.add_class("task-list-item");
            children.push(
                Element::new("input")
                    .with_property("type", "checkbox")
                    .with_property("disabled", true)
                    .with_property("checked", checked)
                    .into(),
            );
            children.push(Node::text(" "));
        }

        for child in &item.children {
            match child {
                Md::Paragraph(_) if !spread => children.extend(self.children(child)),
                other => children.extend(self.node(other)),
            }
        }
        li.children = children;
        li.into()
    }

    fn table(&mut self, table: &'a mdast::Table) -> Node {
        let mut rows = table.children.iter();
        let mut sections: Vec<Node> = Vec::new();

        if let Some(head) = rows.next() {
            let tr = self.table_row(head, "th", &table.align);
            sections.push(Element::new("thead").with_children(vec![tr]).into());
        }
        let body: Vec<Node> = rows.map(|row| self.table_row(row, "td", &table.align)).collect();
        if !body.is_empty() {
            sections.push(Element::new("tbody").with_children(body).into());
        }

        Element::new("table").with_children(sections).into()
    }

    fn table_row(&mut self, row: &'a Md, cell_tag: &str, align: &[AlignKind]) -> Node {
        let cells: Vec<Node> = row
            .children()
            .map(|cells| {
                cells
                    .iter()
                    .enumerate()
                    .map(|(i, cell)| {
                        let mut el = Element::new(cell_tag);
                        match align.get(i) {
                            Some(AlignKind::Left) => el.set_property("align", "left"),
                            Some(AlignKind::Right) => el.set_property("align", "right"),
                            Some(AlignKind::Center) => el.set_property("align", "center"),
                            _ => {}
                        }
                        el.children = self.children(cell);
                        Node::from(el)
                    })
                    .collect()
            })
            .unwrap_or_default();
        Element::new("tr").with_children(cells).into()
    }

    fn footnote_reference(&mut self, fref: &'a mdast::FootnoteReference) -> Node {
        let id = fref.identifier.as_str();
        let number = match self.footnote_order.iter().position(|known| *known == id) {
            Some(pos) => pos + 1,
            None => {
                self.footnote_order.push(id);
                self.footnote_order.len()
            }
        };
        let anchor = anchor_id(id);
        Element::new("sup")
            .with_children(vec![
                Element::new("a")
                    .with_property("href", format!("#fn-{anchor}"))
                    .with_property("id", format!("fnref-{anchor}"))
                    .with_property("data-footnote-ref", true)
                    .with_children(vec![Node::text(number.to_string())])
                    .into(),
            ])
            .into()
    }

    fn footnote_section(&mut self) -> Option<Node> {
        if self.footnote_order.is_empty() {
            return None;
        }
        let order = std::mem::take(&mut self.footnote_order);
        let mut items: Vec<Node> = Vec::new();
        for id in order {
            let Some(def) = self.footnote_defs.get(id).copied() else {
                continue;
            };
            let anchor = anchor_id(id);
            let mut children: Vec<Node> =
                def.children.iter().flat_map(|c| self.node(c)).collect();
            children.push(
                Element::new("a")
                    .with_property("href", format!("#fnref-{anchor}"))
                    .with_property("data-footnote-backref", true)
                    .with_children(vec![Node::text("↩")])
                    .into(),
            );
            items.push(
                Element::new("li")
                    .with_property("id", format!("fn-{anchor}"))
                    .with_children(children)
                    .into(),
            );
        }
        if items.is_empty() {
            return None;
        }
        Some(
            Element::new("section")
                .with_property("class", "footnotes")
                .with_property("data-footnotes", true)
                .with_children(vec![Element::new("ol").with_children(items).into()])
                .into(),
        )
    }
}

fn is_task_item(node: &Node) -> bool {
    node.as_element()
        .is_some_and(|el| el.has_class("task-list-item"))
}

fn image(url: &str, alt: &str, title: Option<&str>) -> Node {
    let mut img = Element::new("img")
        .with_property("src", url)
        .with_property("alt", alt);
    if let Some(title) = title {
        img.set_property("title", title);
    }
    img.into()
}

/// An authored `<pre class="mermaid">` block is lifted into a real `pre`
/// element holding its decoded text. Any other HTML stays raw.
fn raw_html(value: &str) -> Node {
    let Some(caps) = RAW_PRE_RE.captures(value) else {
        return Node::Raw(value.to_string());
    };
    let body = &caps[2];
    let is_mermaid = caps[1].split_whitespace().any(|class| class == "mermaid");
    if !is_mermaid || body.contains("</pre") {
        return Node::Raw(value.to_string());
    }

    let body = body.strip_prefix('\n').unwrap_or(body);
    Element::new("pre")
        .with_property("class", caps[1].to_string())
        .with_children(vec![Node::text(decode_entities(body))])
        .into()
}

fn decode_entities(text: &str) -> String {
    text.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&amp;", "&")
}

/// `pre > code` for a fenced block. Metadata written by the code-title pass
/// becomes a caption and line-number data attributes.
fn code_block(code: &mdast::Code) -> Node {
    let mut el = Element::new("code");
    if let Some(lang) = &code.lang {
        el.set_property("class", format!("language-{lang}"));
        el.set_property("data-language", lang.clone());
    }

    let mut title = None;
    if let Some(meta) = code.meta.as_deref().filter(|m| !m.trim().is_empty()) {
        el.set_property("data-meta", meta);
        title = META_TITLE_RE.captures(meta).map(|c| c[1].to_string());
        if meta.split_whitespace().any(|w| w == "showLineNumbers") {
            el.set_property("data-line-numbers", true);
        }
        if let Some(start) = META_START_RE.captures(meta) {
            el.set_property("data-line-start", start[1].to_string());
        }
    }

    let mut value = code.value.clone();
    if !value.is_empty() {
        value.push('\n');
    }
    el.children = vec![Node::text(value)];
    let pre: Node = Element::new("pre").with_children(vec![el.into()]).into();

    match title {
        Some(title) => Element::new("figure")
            .with_property("data-code-block", true)
            .with_children(vec![
                Element::new("figcaption")
                    .with_property("data-code-title", true)
                    .with_children(vec![Node::text(title)])
                    .into(),
                pre,
            ])
            .into(),
        None => pre,
    }
}

fn anchor_id(identifier: &str) -> String {
    identifier.split_whitespace().collect::<Vec<_>>().join("-")
}

/// GitHub-style heading anchor: lowercase, spaces to dashes, punctuation
/// dropped.
pub fn slugify(text: &str) -> String {
    text.trim()
        .to_lowercase()
        .chars()
        .filter_map(|c| {
            if c.is_alphanumeric() || c == '-' || c == '_' {
                Some(c)
            } else if c.is_whitespace() {
                Some('-')
            } else {
                None
            }
        })
        .collect()
}
