use super::{Element, Node, PropertyValue};

const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source", "track",
    "wbr",
];

pub fn to_html(node: &Node) -> String {
    let mut out = String::new();
    write_node(node, &mut out);
    out
}

fn write_node(node: &Node, out: &mut String) {
    match node {
        Node::Root(children) => children.iter().for_each(|c| write_node(c, out)),
        Node::Element(el) => write_element(el, out),
        Node::Text(value) => out.push_str(&escape_text(value)),
        Node::Comment(value) => {
            out.push_str("<!--");
            out.push_str(value);
            out.push_str("-->");
        }
        Node::Raw(value) => out.push_str(value),
    }
}

fn write_element(el: &Element, out: &mut String) {
    out.push('<');
    out.push_str(&el.tag_name);
    for (name, value) in &el.properties {
        match value {
            PropertyValue::Bool(false) => {}
            PropertyValue::Bool(true) => {
                out.push(' ');
                out.push_str(name);
            }
            PropertyValue::String(s) => push_attribute(out, name, s),
            PropertyValue::List(list) => push_attribute(out, name, &list.join(" ")),
        }
    }
    out.push('>');

    if VOID_ELEMENTS.contains(&el.tag_name.as_str()) {
        return;
    }

    el.children.iter().for_each(|c| write_node(c, out));
    out.push_str("</");
    out.push_str(&el.tag_name);
    out.push('>');
}

fn push_attribute(out: &mut String, name: &str, value: &str) {
    out.push(' ');
    out.push_str(name);
    out.push_str("=\"");
    out.push_str(&escape_attribute(value));
    out.push('"');
}

fn escape_text(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

fn escape_attribute(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_serializes_void_and_boolean_attributes() {
        let input = Element::new("input")
            .with_property("type", "checkbox")
            .with_property("checked", true)
            .with_property("disabled", false);

        assert_eq!(to_html(&input.into()), r#"<input checked type="checkbox">"#);
    }

    #[test]
    fn test_escapes_text_and_attributes() {
        let a = Element::new("a")
            .with_property("href", "/q?a=1&b=\"2\"")
            .with_children(vec![Node::text("<b> & co")]);

        assert_eq!(
            to_html(&a.into()),
            r#"<a href="/q?a=1&amp;b=&quot;2&quot;">&lt;b&gt; &amp; co</a>"#
        );
    }

    #[test]
    fn test_raw_passes_through() {
        let root = Node::Root(vec![Node::Raw("<div class=\"x\">".into()), Node::text("y")]);
        assert_eq!(to_html(&root), "<div class=\"x\">y");
    }
}
