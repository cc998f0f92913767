//! HTML-level document tree.
//!
//! Markdown is parsed to mdast by the `markdown` crate, converted to this
//! tree by [`convert::from_mdast`], rewritten by the HTML transformers and
//! finally serialized by [`html::to_html`].

pub mod convert;
pub mod html;

use std::collections::BTreeMap;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PropertyValue {
    String(String),
    List(Vec<String>),
    Bool(bool),
}

impl PropertyValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            PropertyValue::String(s) => Some(s),
            _ => None,
        }
    }
}

impl From<&str> for PropertyValue {
    fn from(value: &str) -> Self {
        PropertyValue::String(value.to_string())
    }
}

impl From<String> for PropertyValue {
    fn from(value: String) -> Self {
        PropertyValue::String(value)
    }
}

impl From<u32> for PropertyValue {
    fn from(value: u32) -> Self {
        PropertyValue::String(value.to_string())
    }
}

impl From<bool> for PropertyValue {
    fn from(value: bool) -> Self {
        PropertyValue::Bool(value)
    }
}

pub type Properties = BTreeMap<String, PropertyValue>;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Element {
    pub tag_name: String,
    pub properties: Properties,
    pub children: Vec<Node>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Node {
    Root(Vec<Node>),
    Element(Element),
    Text(String),
    Comment(String),
    /// Already-serialized HTML emitted verbatim.
    Raw(String),
}

impl Element {
    pub fn new(tag_name: impl Into<String>) -> Self {
        Self {
            tag_name: tag_name.into(),
            ..Default::default()
        }
    }

    pub fn with_property(mut self, name: &str, value: impl Into<PropertyValue>) -> Self {
        self.properties.insert(name.to_string(), value.into());
        self
    }

    pub fn with_children(mut self, children: Vec<Node>) -> Self {
        self.children = children;
        self
    }

    pub fn is(&self, tag_name: &str) -> bool {
        self.tag_name == tag_name
    }

    pub fn property(&self, name: &str) -> Option<&str> {
        self.properties.get(name).and_then(PropertyValue::as_str)
    }

    pub fn set_property(&mut self, name: &str, value: impl Into<PropertyValue>) {
        self.properties.insert(name.to_string(), value.into());
    }

    pub fn classes(&self) -> Vec<&str> {
        match self.properties.get("class") {
            Some(PropertyValue::List(list)) => list.iter().map(String::as_str).collect(),
            Some(PropertyValue::String(s)) => s.split_whitespace().collect(),
            _ => Vec::new(),
        }
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes().contains(&class)
    }

    /// Append `class` unless already present.
    pub fn add_class(&mut self, class: &str) {
        if self.has_class(class) {
            return;
        }
        let mut list: Vec<String> = self.classes().into_iter().map(str::to_string).collect();
        list.push(class.to_string());
        self.properties
            .insert("class".to_string(), PropertyValue::List(list));
    }

    /// First element child, ignoring text and comments.
    pub fn first_element_child(&self) -> Option<&Element> {
        self.children.iter().find_map(|child| match child {
            Node::Element(el) => Some(el),
            _ => None,
        })
    }
}

impl Node {
    pub fn element(tag_name: &str) -> Element {
        Element::new(tag_name)
    }

    pub fn text(value: impl Into<String>) -> Node {
        Node::Text(value.into())
    }

    pub fn as_element(&self) -> Option<&Element> {
        match self {
            Node::Element(el) => Some(el),
            _ => None,
        }
    }

    pub fn as_element_mut(&mut self) -> Option<&mut Element> {
        match self {
            Node::Element(el) => Some(el),
            _ => None,
        }
    }

    pub fn children(&self) -> Option<&Vec<Node>> {
        match self {
            Node::Root(children) => Some(children),
            Node::Element(el) => Some(&el.children),
            _ => None,
        }
    }

    pub fn children_mut(&mut self) -> Option<&mut Vec<Node>> {
        match self {
            Node::Root(children) => Some(children),
            Node::Element(el) => Some(&mut el.children),
            _ => None,
        }
    }

    /// Concatenated text of this subtree, whitespace preserved.
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        collect_text(self, &mut out);
        out
    }
}

impl From<Element> for Node {
    fn from(value: Element) -> Self {
        Node::Element(value)
    }
}

fn collect_text(node: &Node, out: &mut String) {
    match node {
        Node::Text(value) => out.push_str(value),
        Node::Root(children) => children.iter().for_each(|c| collect_text(c, out)),
        Node::Element(el) => el.children.iter().for_each(|c| collect_text(c, out)),
        Node::Comment(_) | Node::Raw(_) => {}
    }
}
