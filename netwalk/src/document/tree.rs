//! A small owned element tree built from quick-xml events.

use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};

use crate::error::InputError;

/// One XML element with its attributes, text and child elements.
#[derive(Debug, Clone, Default)]
pub struct Node {
    pub tag: String,
    pub attrs: Vec<(String, String)>,

    /// Concatenated text content, `None` when the element has no
    /// non-whitespace text.
    pub text: Option<String>,

    pub children: Vec<Node>,
}

impl Node {
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs.iter().find(|(k, _)| k == name).map(|(_, v)| v.as_str())
    }

    /// First child with `tag`.
    pub fn child(&self, tag: &str) -> Option<&Node> {
        self.children.iter().find(|c| c.tag == tag)
    }

    /// Children with `tag`, in document order.
    pub fn children_named<'a>(&'a self, tag: &'a str) -> impl Iterator<Item = &'a Node> + 'a {
        self.children.iter().filter(move |c| c.tag == tag)
    }

    /// Text of the first child with `tag`, or an empty string.
    pub fn child_text(&self, tag: &str) -> String {
        self.child(tag).and_then(|c| c.text.clone()).unwrap_or_default()
    }

    /// Every descendant with `tag`, depth first.
    pub fn descendants<'a>(&'a self, tag: &str, found: &mut Vec<&'a Node>) {
        for child in &self.children {
            if child.tag == tag {
                found.push(child);
            }
            child.descendants(tag, found);
        }
    }
}

fn malformed(e: impl std::fmt::Display) -> InputError {
    InputError::Malformed {
        message: e.to_string(),
    }
}

fn open(start: &BytesStart<'_>) -> Result<Node, InputError> {
    let mut node = Node {
        tag: String::from_utf8_lossy(start.name().as_ref()).into_owned(),
        ..Default::default()
    };
    for attr in start.attributes() {
        let attr = attr.map_err(malformed)?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        let value = attr.unescape_value().map_err(malformed)?.into_owned();
        node.attrs.push((key, value));
    }
    Ok(node)
}

fn attach(stack: &mut Vec<Node>, root: &mut Option<Node>, node: Node) -> Result<(), InputError> {
    match stack.last_mut() {
        Some(parent) => parent.children.push(node),
        None if root.is_none() => *root = Some(node),
        None => return Err(malformed("more than one root element")),
    }
    Ok(())
}

/// Parse `xml` into its root element.
pub fn parse(xml: &str) -> Result<Node, InputError> {
    let mut reader = Reader::from_str(xml);
    let mut stack: Vec<Node> = Vec::new();
    let mut root: Option<Node> = None;

    loop {
        match reader.read_event().map_err(malformed)? {
            Event::Start(start) => stack.push(open(&start)?),
            Event::Empty(start) => {
                let node = open(&start)?;
                attach(&mut stack, &mut root, node)?;
            }
            Event::End(_) => {
                let node = stack.pop().ok_or_else(|| malformed("unbalanced end tag"))?;
                attach(&mut stack, &mut root, node)?;
            }
            Event::Text(text) => {
                let text = text.unescape().map_err(malformed)?;
                if let Some(node) = stack.last_mut() {
                    if !text.trim().is_empty() || node.text.is_some() {
                        node.text.get_or_insert_with(String::new).push_str(&text);
                    }
                }
            }
            Event::CData(data) => {
                if let Some(node) = stack.last_mut() {
                    let data = String::from_utf8_lossy(&data).into_owned();
                    node.text.get_or_insert_with(String::new).push_str(&data);
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if !stack.is_empty() {
        return Err(malformed(format!("unclosed element <{}>", stack[stack.len() - 1].tag)));
    }
    root.ok_or_else(|| malformed("document has no root element"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_tree() {
        let root = parse(
            r#"<?xml version="1.0"?>
            <targets>
              <target id="1">
                <entrypoint id="e1"><a><ipaddr>10.0.0.1	 </ipaddr></a></entrypoint>
                <custom tag="metrocell"/>
              </target>
            </targets>"#,
        )
        .unwrap();

        assert_eq!(root.tag, "targets");
        let target = root.child("target").unwrap();
        assert_eq!(target.attr("id"), Some("1"));
        assert_eq!(target.children.len(), 2);
        let entry = target.child("entrypoint").unwrap();
        assert_eq!(entry.children[0].child_text("ipaddr"), "10.0.0.1\t ");
        assert_eq!(target.child("custom").unwrap().attr("tag"), Some("metrocell"));
        assert_eq!(target.text, None);
    }

    #[test]
    fn test_escaped_text() {
        let root = parse("<a><b>x &amp; y</b></a>").unwrap();
        assert_eq!(root.child_text("b"), "x & y");
    }

    #[test]
    fn test_malformed() {
        assert!(matches!(parse("<a><b></a>"), Err(InputError::Malformed { .. })));
        assert!(matches!(parse("<a>"), Err(InputError::Malformed { .. })));
        assert!(matches!(parse(""), Err(InputError::Malformed { .. })));
    }
}
