//! Owned XML element tree
//!
//! Office parts are small enough to hold in memory, and keeping them as a tree
//! lets extraction, validation and reinjection walk exactly the same structure.
//! Qualified names are kept verbatim (`w:p`, `w:tbl`), matching how the parts
//! are written by Word and Excel.

use quick_xml::Reader;
use quick_xml::escape::escape;
use quick_xml::events::{BytesStart, Event};

use crate::error::{Error, Result};

const XML_DECLARATION: &str = "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\r\n";

/// Characters allowed by XML 1.0.
pub(crate) fn is_xml_char(c: char) -> bool {
    matches!(c, '\t' | '\n' | '\r' | '\u{20}'..='\u{D7FF}' | '\u{E000}'..='\u{FFFD}' | '\u{10000}'..='\u{10FFFF}')
}

#[derive(Debug, Clone, PartialEq)]
pub enum XmlNode {
    Element(XmlElement),
    Text(String),
    Comment(String),
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct XmlElement {
    pub name: String,
    pub attributes: Vec<(String, String)>,
    pub children: Vec<XmlNode>,
}

/// A parsed XML part: its root element plus whether it carried a declaration.
#[derive(Debug, Clone, PartialEq)]
pub struct XmlDocument {
    pub has_declaration: bool,
    pub root: XmlElement,
}

impl XmlDocument {
    pub fn parse(xml: &str) -> Result<Self> {
        let mut reader = Reader::from_str(xml);
        reader.config_mut().trim_text(false);

        let mut has_declaration = false;
        let mut stack: Vec<XmlElement> = Vec::new();
        let mut root: Option<XmlElement> = None;

        loop {
            match reader.read_event()? {
                Event::Decl(_) => has_declaration = true,
                Event::Start(e) => stack.push(element_from_start(&e)?),
                Event::Empty(e) => {
                    let element = element_from_start(&e)?;
                    attach(&mut stack, &mut root, element);
                }
                Event::End(_) => {
                    let element = stack.pop().ok_or_else(|| {
                        Error::InvalidPackage("unbalanced closing tag in XML part".to_string())
                    })?;
                    attach(&mut stack, &mut root, element);
                }
                Event::Text(e) => {
                    if let Some(parent) = stack.last_mut() {
                        let text = e.unescape().map_err(quick_xml::Error::from)?;
                        parent.children.push(XmlNode::Text(text.into_owned()));
                    }
                }
                Event::CData(e) => {
                    if let Some(parent) = stack.last_mut() {
                        let raw = e.into_inner();
                        parent
                            .children
                            .push(XmlNode::Text(String::from_utf8_lossy(&raw).into_owned()));
                    }
                }
                Event::Comment(e) => {
                    if let Some(parent) = stack.last_mut() {
                        let raw = e.into_inner();
                        parent
                            .children
                            .push(XmlNode::Comment(String::from_utf8_lossy(&raw).into_owned()));
                    }
                }
                Event::Eof => break,
                _ => {}
            }
        }

        if !stack.is_empty() {
            return Err(Error::InvalidPackage(
                "unterminated element in XML part".to_string(),
            ));
        }

        let root = root
            .ok_or_else(|| Error::InvalidPackage("XML part has no root element".to_string()))?;

        Ok(Self {
            has_declaration,
            root,
        })
    }

    pub fn to_xml(&self) -> String {
        let mut out = String::new();
        if self.has_declaration {
            out.push_str(XML_DECLARATION);
        }
        write_element(&mut out, &self.root);
        out
    }
}

fn element_from_start(e: &BytesStart<'_>) -> Result<XmlElement> {
    let name = String::from_utf8_lossy(e.name().as_ref()).into_owned();
    let mut attributes = Vec::new();
    for attr in e.attributes() {
        let attr = attr.map_err(quick_xml::Error::from)?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        let value = attr.unescape_value().map_err(quick_xml::Error::from)?;
        attributes.push((key, value.into_owned()));
    }
    Ok(XmlElement {
        name,
        attributes,
        children: Vec::new(),
    })
}

fn attach(stack: &mut [XmlElement], root: &mut Option<XmlElement>, element: XmlElement) {
    match stack.last_mut() {
        Some(parent) => parent.children.push(XmlNode::Element(element)),
        None => {
            if root.is_none() {
                *root = Some(element);
            }
        }
    }
}

fn write_element(out: &mut String, element: &XmlElement) {
    out.push('<');
    out.push_str(&element.name);
    for (key, value) in &element.attributes {
        out.push(' ');
        out.push_str(key);
        out.push_str("=\"");
        out.push_str(&escape(value.as_str()));
        out.push('"');
    }

    if element.children.is_empty() {
        out.push_str("/>");
        return;
    }

    out.push('>');
    for child in &element.children {
        match child {
            XmlNode::Element(inner) => write_element(out, inner),
            XmlNode::Text(text) => out.push_str(&escape(text.as_str())),
            XmlNode::Comment(comment) => {
                out.push_str("<!--");
                out.push_str(comment);
                out.push_str("-->");
            }
        }
    }
    out.push_str("</");
    out.push_str(&element.name);
    out.push('>');
}

impl XmlElement {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    pub fn with_attr(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_attr(key, value);
        self
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.children.push(XmlNode::Text(text.into()));
        self
    }

    pub fn with_child(mut self, child: XmlElement) -> Self {
        self.children.push(XmlNode::Element(child));
        self
    }

    pub fn is(&self, name: &str) -> bool {
        self.name == name
    }

    pub fn attr(&self, key: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn set_attr(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.attributes.iter_mut().find(|(k, _)| *k == key) {
            Some(slot) => slot.1 = value,
            None => self.attributes.push((key, value)),
        }
    }

    /// Element children, skipping text and comments.
    pub fn elements(&self) -> impl Iterator<Item = &XmlElement> {
        self.children.iter().filter_map(|node| match node {
            XmlNode::Element(element) => Some(element),
            _ => None,
        })
    }

    pub fn elements_mut(&mut self) -> impl Iterator<Item = &mut XmlElement> {
        self.children.iter_mut().filter_map(|node| match node {
            XmlNode::Element(element) => Some(element),
            _ => None,
        })
    }

    pub fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a XmlElement> {
        self.elements().filter(move |element| element.name == name)
    }

    pub fn child(&self, name: &str) -> Option<&XmlElement> {
        self.elements().find(|element| element.name == name)
    }

    pub fn child_mut(&mut self, name: &str) -> Option<&mut XmlElement> {
        self.elements_mut().find(|element| element.name == name)
    }

    /// The `n`-th (0-based) element child called `name`.
    pub fn nth_child_named_mut(&mut self, name: &str, n: usize) -> Option<&mut XmlElement> {
        self.elements_mut()
            .filter(|element| element.name == name)
            .nth(n)
    }

    /// Follow a path of child names, taking the first match at each step.
    pub fn find_path(&self, path: &[&str]) -> Option<&XmlElement> {
        let mut current = self;
        for name in path {
            current = current.child(name)?;
        }
        Some(current)
    }

    /// `w:val`-style attribute of a named child, e.g. `<w:sz w:val="24"/>`.
    pub fn child_attr(&self, child: &str, key: &str) -> Option<&str> {
        self.child(child).and_then(|element| element.attr(key))
    }

    /// Concatenated text of all descendant text nodes.
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        collect_text(self, &mut out);
        out
    }

    pub fn push(&mut self, child: XmlElement) {
        self.children.push(XmlNode::Element(child));
    }

    /// Index in `children` right after every leading element called `name`
    /// (used to insert content after property blocks such as `w:pPr`).
    pub fn position_after(&self, name: &str) -> usize {
        self.children
            .iter()
            .position(|node| !matches!(node, XmlNode::Element(e) if e.name == name))
            .unwrap_or(self.children.len())
    }
}

fn collect_text(element: &XmlElement, out: &mut String) {
    for child in &element.children {
        match child {
            XmlNode::Element(inner) => collect_text(inner, out),
            XmlNode::Text(text) => out.push_str(text),
            XmlNode::Comment(_) => {}
        }
    }
}
