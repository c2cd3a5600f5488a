//! Element builders used by message `write_fields` implementations
//!
//! Optional values are skipped rather than written empty, and groups with no
//! populated children are not emitted at all.

use crate::common::values::{CardRange, Extension, Profile, ProfileRequest};
use xmltree::{Element, XMLNode};

/// `<name>text</name>`
pub fn text_element(name: &str, text: &str) -> Element {
    let mut element = Element::new(name);
    element.children.push(XMLNode::Text(text.to_string()));
    element
}

/// Append `<name>text</name>` when a value is present
pub fn append_text(parent: &mut Element, name: &str, value: Option<&str>) {
    if let Some(text) = value {
        parent.children.push(XMLNode::Element(text_element(name, text)));
    }
}

/// Append one `<name>` element per value
pub fn append_repeated(parent: &mut Element, name: &str, values: &[String]) {
    for value in values {
        parent.children.push(XMLNode::Element(text_element(name, value)));
    }
}

/// Build a child group and append it only if it received children
pub fn append_group<F>(parent: &mut Element, name: &str, build: F)
where
    F: FnOnce(&mut Element),
{
    let mut group = Element::new(name);
    build(&mut group);
    if !group.children.is_empty() || !group.attributes.is_empty() {
        parent.children.push(XMLNode::Element(group));
    }
}

pub fn append_element(parent: &mut Element, child: Element) {
    parent.children.push(XMLNode::Element(child));
}

/// `<Extension id=".." critical="..">value</Extension>` per extension
pub fn append_extensions(parent: &mut Element, extensions: &[Extension]) {
    for extension in extensions {
        let mut element = Element::new("Extension");
        element.attributes.insert("id".to_string(), extension.id.clone());
        element
            .attributes
            .insert("critical".to_string(), extension.critical_str().to_string());
        if let Some(value) = &extension.value {
            element.children.push(XMLNode::Text(value.clone()));
        }
        append_element(parent, element);
    }
}

pub fn append_profiles(parent: &mut Element, profiles: &[Profile]) {
    for profile in profiles {
        let mut element = Element::new("Profile");
        element.attributes.insert("name".to_string(), profile.name.clone());
        for scope in &profile.scopes {
            let mut scope_element = Element::new("Scope");
            scope_element.attributes.insert("id".to_string(), scope.id.clone());
            for item in &scope.items {
                let mut item_element = text_element("Item", &item.value);
                item_element.attributes.insert("id".to_string(), item.id.clone());
                append_element(&mut scope_element, item_element);
            }
            append_element(&mut element, scope_element);
        }
        append_element(parent, element);
    }
}

pub fn append_profile_requests(parent: &mut Element, requests: &[ProfileRequest]) {
    for request in requests {
        let mut element = Element::new("ProfileRequest");
        element
            .attributes
            .insert("scopeID".to_string(), request.scope_id.clone());
        append_repeated(&mut element, "itemID", &request.item_ids);
        append_element(parent, element);
    }
}

/// `<CR><begin/><end/><action/></CR>` per range
pub fn append_card_ranges(parent: &mut Element, ranges: &[CardRange]) {
    for range in ranges {
        let mut element = Element::new("CR");
        append_text(&mut element, "begin", Some(&range.begin));
        append_text(&mut element, "end", Some(&range.end));
        append_text(&mut element, "action", Some(range.action.as_str()));
        append_element(parent, element);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_group_is_skipped() {
        let mut parent = Element::new("VEReq");
        append_group(&mut parent, "Browser", |browser| {
            append_text(browser, "accept", None);
        });
        assert!(parent.children.is_empty());

        append_group(&mut parent, "Browser", |browser| {
            append_text(browser, "accept", Some("*/*"));
        });
        let browser = parent.get_child("Browser").unwrap();
        assert_eq!(browser.get_child("accept").unwrap().get_text().unwrap(), "*/*");
    }

    #[test]
    fn test_extension_attributes() {
        let mut parent = Element::new("VEReq");
        append_extensions(&mut parent, &[Extension::new("visa.com:pc", true, Some("1".into()))]);
        let extension = parent.get_child("Extension").unwrap();
        assert_eq!(extension.attributes.get("critical").map(String::as_str), Some("true"));
        assert_eq!(extension.get_text().unwrap(), "1");
    }
}
