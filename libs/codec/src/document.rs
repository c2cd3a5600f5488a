//! # Typed Document Tree
//!
//! ## Purpose
//!
//! Thin layer over `xmltree` giving the binding engine the three operations it
//! needs: parse a document, select nodes by a slash-separated path from the
//! root, and serialize a subtree as a standalone document.
//!
//! ## Path Syntax
//!
//! ```text
//! ThreeDSecure/Message/VERes/CH/enrolled     every `enrolled` under that chain
//! ThreeDSecure/Message/PARes/@id             `id` attribute of the PARes element
//! ```
//!
//! The first segment must equal the root tag. Each further segment selects all
//! child elements with that name, so a path can match several nodes; the
//! `complex`, `profile`, `extension`, `profileRequest` and `cr` strategies use
//! every match, the others use the first.

use mpi_types::{MessagingError, MessagingResult};
use std::fmt;
use std::str::FromStr;
use xmltree::{Element, EmitterConfig, XMLNode};

/// Parsed XML document
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    root: Element,
}

impl Document {
    /// Parse a document; malformed XML is an unexpected conversion error
    pub fn parse_str(xml: &str) -> MessagingResult<Self> {
        let root = Element::parse(xml.as_bytes())
            .map_err(|e| MessagingError::conversion("", format!("malformed XML: {}", e)))?;
        Ok(Self { root })
    }

    pub fn from_element(root: Element) -> Self {
        Self { root }
    }

    pub fn root(&self) -> &Element {
        &self.root
    }

    pub fn into_root(self) -> Element {
        self.root
    }

    /// Serialize with an XML declaration
    pub fn to_xml_string(&self) -> MessagingResult<String> {
        self.root.to_standalone_string()
    }

    /// Serialize with indentation, for operator output
    pub fn to_pretty_string(&self) -> MessagingResult<String> {
        let config = EmitterConfig::new().perform_indent(true);
        let mut buffer = Vec::new();
        self.root
            .write_with_config(&mut buffer, config)
            .map_err(|e| MessagingError::conversion("", format!("cannot write XML: {}", e)))?;
        String::from_utf8(buffer).map_err(|e| MessagingError::conversion("", e.to_string()))
    }
}

/// Element navigation helpers
pub trait ElementExt {
    fn child_elements(&self) -> Box<dyn Iterator<Item = &Element> + '_>;

    fn children_named<'a>(&'a self, name: &'a str) -> Box<dyn Iterator<Item = &'a Element> + 'a>;

    fn attribute(&self, name: &str) -> Option<&str>;

    /// Trimmed text content; an element without text yields an empty string
    fn text_value(&self) -> String;

    /// Text of the first child with the given name
    fn child_text(&self, name: &str) -> Option<String>;

    /// Depth-first search below this element
    fn first_descendant(&self, name: &str) -> Option<&Element>;

    /// Serialize this element as its own document, declaration included
    fn to_standalone_string(&self) -> MessagingResult<String>;
}

impl ElementExt for Element {
    fn child_elements(&self) -> Box<dyn Iterator<Item = &Element> + '_> {
        Box::new(self.children.iter().filter_map(XMLNode::as_element))
    }

    fn children_named<'a>(&'a self, name: &'a str) -> Box<dyn Iterator<Item = &'a Element> + 'a> {
        Box::new(self.child_elements().filter(move |child| child.name == name))
    }

    fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    fn text_value(&self) -> String {
        self.get_text()
            .map(|text| text.trim().to_string())
            .unwrap_or_default()
    }

    fn child_text(&self, name: &str) -> Option<String> {
        self.children_named(name).next().map(ElementExt::text_value)
    }

    fn first_descendant(&self, name: &str) -> Option<&Element> {
        for child in self.child_elements() {
            if child.name == name {
                return Some(child);
            }
            if let Some(found) = child.first_descendant(name) {
                return Some(found);
            }
        }
        None
    }

    fn to_standalone_string(&self) -> MessagingResult<String> {
        let mut buffer = Vec::new();
        self.write(&mut buffer)
            .map_err(|e| MessagingError::conversion("", format!("cannot write XML: {}", e)))?;
        String::from_utf8(buffer).map_err(|e| MessagingError::conversion("", e.to_string()))
    }
}

/// Root-anchored element path with an optional trailing `@attribute`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DocPath {
    segments: Vec<String>,
    attribute: Option<String>,
}

impl DocPath {
    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    pub fn attribute(&self) -> Option<&str> {
        self.attribute.as_deref()
    }

    pub fn is_attribute(&self) -> bool {
        self.attribute.is_some()
    }

    /// Every element matched by the element segments
    pub fn select_all<'a>(&self, root: &'a Element) -> Vec<&'a Element> {
        let Some((first, rest)) = self.segments.split_first() else {
            return Vec::new();
        };
        if root.name != *first {
            return Vec::new();
        }

        let mut current = vec![root];
        for segment in rest {
            current = current
                .into_iter()
                .flat_map(|element| {
                    element
                        .children
                        .iter()
                        .filter_map(XMLNode::as_element)
                        .filter(|child| child.name == *segment)
                })
                .collect();
            if current.is_empty() {
                break;
            }
        }
        current
    }

    pub fn select_first<'a>(&self, root: &'a Element) -> Option<&'a Element> {
        self.select_all(root).into_iter().next()
    }

    /// Attribute value on the first matched element that carries it
    pub fn select_attribute<'a>(&self, root: &'a Element) -> Option<&'a str> {
        let name = self.attribute.as_deref()?;
        self.select_all(root)
            .into_iter()
            .find_map(|element| element.attribute(name))
    }
}

impl FromStr for DocPath {
    type Err = String;

    fn from_str(path: &str) -> Result<Self, Self::Err> {
        let trimmed = path.trim().trim_start_matches('/');
        if trimmed.is_empty() {
            return Err("empty path".to_string());
        }

        let mut segments = Vec::new();
        let mut attribute = None;
        let parts: Vec<&str> = trimmed.split('/').collect();
        for (index, part) in parts.iter().enumerate() {
            if part.is_empty() {
                return Err(format!("empty segment in path '{}'", path));
            }
            if let Some(name) = part.strip_prefix('@') {
                if index != parts.len() - 1 || name.is_empty() {
                    return Err(format!("attribute must be the last segment in path '{}'", path));
                }
                attribute = Some(name.to_string());
            } else {
                segments.push(part.to_string());
            }
        }

        if segments.is_empty() {
            return Err(format!("path '{}' selects no element", path));
        }
        Ok(Self { segments, attribute })
    }
}

impl fmt::Display for DocPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.segments.join("/"))?;
        if let Some(attribute) = &self.attribute {
            write!(f, "/@{}", attribute)?;
        }
        Ok(())
    }
}
