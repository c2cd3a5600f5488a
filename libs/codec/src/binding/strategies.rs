//! Value extraction strategies
//!
//! Each [`BindingKind`] maps to one extraction function. Absent nodes yield an
//! empty value and leave presence checks to the setter; malformed structure
//! inside a present node (an `Extension` without `id`, a `CR` without `begin`)
//! is a structural error right here.

use super::BindingKind;
use crate::document::{DocPath, ElementExt};
use mpi_types::{
    BoundValue, CardRange, Extension, MessagingError, MessagingResult, Profile, ProfileItem,
    ProfileRequest, ProfileScope, SignatureDocument,
};
use xmltree::Element;

/// Extract the value a rule binds from the document rooted at `root`
pub fn extract(kind: BindingKind, path: &DocPath, root: &Element, msg_id: &str) -> MessagingResult<BoundValue> {
    match kind {
        BindingKind::Simple => Ok(BoundValue::Text(
            path.select_first(root).map(ElementExt::text_value),
        )),
        BindingKind::Complex => {
            let values: Vec<String> = path
                .select_all(root)
                .into_iter()
                .map(ElementExt::text_value)
                .collect();
            Ok(BoundValue::TextList((!values.is_empty()).then_some(values)))
        }
        BindingKind::Attr => Ok(BoundValue::Text(
            path.select_attribute(root).map(str::to_string),
        )),
        BindingKind::Profile => path
            .select_all(root)
            .into_iter()
            .map(|element| read_profile(element, path, msg_id))
            .collect::<MessagingResult<Vec<_>>>()
            .map(BoundValue::Profiles),
        BindingKind::Extension => path
            .select_all(root)
            .into_iter()
            .map(|element| read_extension(element, path, msg_id))
            .collect::<MessagingResult<Vec<_>>>()
            .map(BoundValue::Extensions),
        BindingKind::ProfileRequest => path
            .select_all(root)
            .into_iter()
            .map(|element| read_profile_request(element, path, msg_id))
            .collect::<MessagingResult<Vec<_>>>()
            .map(BoundValue::ProfileRequests),
        BindingKind::Signature => read_signature(path, root, msg_id).map(BoundValue::Signature),
        BindingKind::CardRange => path
            .select_all(root)
            .into_iter()
            .map(|element| read_card_range(element, path, msg_id))
            .collect::<MessagingResult<Vec<_>>>()
            .map(BoundValue::CardRanges),
    }
}

fn required_attribute<'a>(element: &'a Element, path: &DocPath, name: &str, msg_id: &str) -> MessagingResult<&'a str> {
    element
        .attribute(name)
        .ok_or_else(|| MessagingError::missing_element(msg_id, format!("{}/@{}", path, name)))
}

fn required_child(element: &Element, path: &DocPath, name: &str, msg_id: &str) -> MessagingResult<String> {
    element
        .child_text(name)
        .ok_or_else(|| MessagingError::missing_element(msg_id, format!("{}/{}", path, name)))
}

fn read_extension(element: &Element, path: &DocPath, msg_id: &str) -> MessagingResult<Extension> {
    let id = required_attribute(element, path, "id", msg_id)?;
    let critical = element.attribute("critical").unwrap_or("false");
    let value = Some(element.text_value()).filter(|text| !text.is_empty());
    Extension::parse(msg_id, id, critical, value)
}

fn read_card_range(element: &Element, path: &DocPath, msg_id: &str) -> MessagingResult<CardRange> {
    let begin = required_child(element, path, "begin", msg_id)?;
    let end = required_child(element, path, "end", msg_id)?;
    let action = required_child(element, path, "action", msg_id)?;
    CardRange::parse(msg_id, &begin, &end, &action)
}

fn read_profile(element: &Element, path: &DocPath, msg_id: &str) -> MessagingResult<Profile> {
    let mut profile = Profile::new(required_attribute(element, path, "name", msg_id)?);
    for scope in element.children_named("Scope") {
        let mut items = Vec::new();
        for item in scope.children_named("Item") {
            items.push(ProfileItem {
                id: required_attribute(item, path, "id", msg_id)?.to_string(),
                value: item.text_value(),
            });
        }
        profile.scopes.push(ProfileScope {
            id: required_attribute(scope, path, "id", msg_id)?.to_string(),
            items,
        });
    }
    Ok(profile)
}

fn read_profile_request(element: &Element, path: &DocPath, msg_id: &str) -> MessagingResult<ProfileRequest> {
    Ok(ProfileRequest {
        scope_id: required_attribute(element, path, "scopeID", msg_id)?.to_string(),
        item_ids: element
            .children_named("itemID")
            .map(ElementExt::text_value)
            .collect(),
    })
}

fn read_signature(path: &DocPath, root: &Element, msg_id: &str) -> MessagingResult<Option<SignatureDocument>> {
    let Some(anchor) = path.select_first(root) else {
        return Ok(None);
    };
    let signature = if anchor.name == "Signature" {
        Some(anchor)
    } else {
        anchor.first_descendant("Signature")
    };
    signature
        .map(|element| {
            element
                .to_standalone_string()
                .map(SignatureDocument)
                .map_err(|mut e| {
                    e.id = msg_id.to_string();
                    e
                })
        })
        .transpose()
}
