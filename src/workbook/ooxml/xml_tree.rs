/*!
 * Owned XML tree for package parts.
 *
 * Parts are small enough to hold in memory, and editing a tree is far simpler
 * than patching an event stream. Attribute order, namespace declarations,
 * comments and processing instructions are kept so an edited part differs
 * from the original only where it was changed.
 */

use quick_xml::events::{BytesCData, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};

use crate::errors::WorkbookError;

#[derive(Debug, Clone)]
pub enum Node {
    Element(Element),
    Text(String),
    CData(String),
    /// Declaration, comment, processing instruction or doctype, kept verbatim
    Other(Event<'static>),
}

#[derive(Debug, Clone, Default)]
pub struct Element {
    /// Qualified name, prefix included
    pub name: String,
    pub attributes: Vec<(String, String)>,
    pub children: Vec<Node>,
}

/// Local part of a qualified name
pub fn local_name(name: &str) -> &str {
    name.rsplit(':').next().unwrap_or(name)
}

/// Prefix of a qualified name including the colon, or ""
pub fn prefix_of(name: &str) -> &str {
    match name.rfind(':') {
        Some(pos) => &name[..=pos],
        None => "",
    }
}

impl Element {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_attr(mut self, key: &str, value: &str) -> Self {
        self.set_attr(key, value);
        self
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.children.push(Node::Text(text.into()));
        self
    }

    pub fn with_child(mut self, child: Element) -> Self {
        self.children.push(Node::Element(child));
        self
    }

    fn from_start(start: &BytesStart<'_>) -> Result<Self, WorkbookError> {
        let name = String::from_utf8_lossy(start.name().as_ref()).into_owned();
        let mut attributes = Vec::new();
        for attr in start.attributes() {
            let attr = attr?;
            let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
            let value = attr.unescape_value()?.into_owned();
            attributes.push((key, value));
        }
        Ok(Self { name, attributes, children: Vec::new() })
    }

    pub fn local_name(&self) -> &str {
        local_name(&self.name)
    }

    pub fn prefix(&self) -> &str {
        prefix_of(&self.name)
    }

    /// Attribute by exact qualified name
    pub fn attr(&self, key: &str) -> Option<&str> {
        self.attributes.iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Attribute whose name has a namespace prefix and the given local part,
    /// e.g. `r:id` for `prefixed_attr("id")`
    pub fn prefixed_attr(&self, local: &str) -> Option<&str> {
        self.attributes.iter()
            .find(|(k, _)| k.contains(':') && local_name(k) == local)
            .map(|(_, v)| v.as_str())
    }

    pub fn set_attr(&mut self, key: &str, value: &str) {
        match self.attributes.iter_mut().find(|(k, _)| k == key) {
            Some(entry) => entry.1 = value.to_string(),
            None => self.attributes.push((key.to_string(), value.to_string())),
        }
    }

    /// Child elements in document order
    pub fn elements(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(|n| match n {
            Node::Element(e) => Some(e),
            _ => None,
        })
    }

    pub fn elements_mut(&mut self) -> impl Iterator<Item = &mut Element> {
        self.children.iter_mut().filter_map(|n| match n {
            Node::Element(e) => Some(e),
            _ => None,
        })
    }

    /// First child element with the given local name
    pub fn child(&self, local: &str) -> Option<&Element> {
        self.elements().find(|e| e.local_name() == local)
    }

    pub fn child_mut(&mut self, local: &str) -> Option<&mut Element> {
        self.elements_mut().find(|e| e.local_name() == local)
    }

    /// Element reached by following child indexes (into `children`)
    pub fn descendant(&self, path: &[usize]) -> Option<&Element> {
        match path.split_first() {
            None => Some(self),
            Some((first, rest)) => match self.children.get(*first) {
                Some(Node::Element(child)) => child.descendant(rest),
                _ => None,
            },
        }
    }

    pub fn descendant_mut(&mut self, path: &[usize]) -> Option<&mut Element> {
        match path.split_first() {
            None => Some(self),
            Some((first, rest)) => match self.children.get_mut(*first) {
                Some(Node::Element(child)) => child.descendant_mut(rest),
                _ => None,
            },
        }
    }

    /// Concatenated text of direct text and CDATA children
    pub fn text(&self) -> String {
        let mut out = String::new();
        for node in &self.children {
            match node {
                Node::Text(t) | Node::CData(t) => out.push_str(t),
                _ => {}
            }
        }
        out
    }

    /// Replace all children with a single text node
    pub fn set_text(&mut self, text: &str) {
        self.children = vec![Node::Text(text.to_string())];
    }

    fn write_to<W: std::io::Write>(&self, writer: &mut Writer<W>) -> Result<(), WorkbookError> {
        let mut start = BytesStart::new(self.name.as_str());
        for (k, v) in &self.attributes {
            start.push_attribute((k.as_str(), v.as_str()));
        }
        if self.children.is_empty() {
            writer.write_event(Event::Empty(start))?;
            return Ok(());
        }
        writer.write_event(Event::Start(start))?;
        for child in &self.children {
            write_node(writer, child)?;
        }
        writer.write_event(Event::End(BytesEnd::new(self.name.as_str())))?;
        Ok(())
    }
}

fn write_node<W: std::io::Write>(writer: &mut Writer<W>, node: &Node) -> Result<(), WorkbookError> {
    match node {
        Node::Element(e) => e.write_to(writer)?,
        Node::Text(t) => writer.write_event(Event::Text(BytesText::new(t)))?,
        Node::CData(t) => writer.write_event(Event::CData(BytesCData::new(t.as_str())))?,
        Node::Other(event) => writer.write_event(event.clone())?,
    }
    Ok(())
}

/// A parsed part: prolog nodes followed by the root element
#[derive(Debug, Clone)]
pub struct XmlDocument {
    pub prolog: Vec<Node>,
    pub root: Element,
}

impl XmlDocument {
    pub fn parse(bytes: &[u8]) -> Result<Self, WorkbookError> {
        let mut reader = Reader::from_reader(bytes);
        reader.trim_text(false);

        let mut buf = Vec::new();
        let mut stack: Vec<Element> = Vec::new();
        let mut prolog = Vec::new();
        let mut root: Option<Element> = None;

        loop {
            let node = match reader.read_event_into(&mut buf)? {
                Event::Start(e) => {
                    stack.push(Element::from_start(&e)?);
                    None
                }
                Event::Empty(e) => Some(Node::Element(Element::from_start(&e)?)),
                Event::End(_) => {
                    let element = stack.pop()
                        .ok_or_else(|| WorkbookError::Package("unbalanced end tag".to_string()))?;
                    Some(Node::Element(element))
                }
                Event::Text(t) => Some(Node::Text(t.unescape()?.into_owned())),
                Event::CData(c) => Some(Node::CData(String::from_utf8_lossy(&c.into_inner()).into_owned())),
                Event::Eof => break,
                other => Some(Node::Other(other.into_owned())),
            };
            buf.clear();

            let Some(node) = node else { continue };
            if let Some(parent) = stack.last_mut() {
                parent.children.push(node);
            } else if root.is_none() {
                match node {
                    Node::Element(element) => root = Some(element),
                    other => prolog.push(other),
                }
            }
            // Anything after the root element is dropped
        }

        if !stack.is_empty() {
            return Err(WorkbookError::Package("unclosed element at end of part".to_string()));
        }
        let root = root.ok_or_else(|| WorkbookError::Package("part has no root element".to_string()))?;
        Ok(Self { prolog, root })
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>, WorkbookError> {
        let mut writer = Writer::new(Vec::new());
        for node in &self.prolog {
            write_node(&mut writer, node)?;
        }
        self.root.write_to(&mut writer)?;
        Ok(writer.into_inner())
    }
}
