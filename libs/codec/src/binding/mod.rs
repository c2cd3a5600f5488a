//! # Binding Descriptors
//!
//! ## Purpose
//!
//! A message definition describes how to populate a message from a document
//! as four parallel lists. Entry *i* of each list forms one binding rule:
//!
//! ```text
//! paths[i]        ThreeDSecure/Message/VERes/CH/enrolled
//! attributes[i]   enrolled          → setter table key
//! types[i]        simple            → extraction strategy
//! value_types[i]  String            → setter argument type
//! ```
//!
//! Descriptors are kept as declared and only parsed into [`BindingRule`]s when
//! a message type is first converted; a malformed descriptor is a binding
//! error for that type, never a panic.

pub mod cache;
pub mod strategies;

pub use cache::{BindingCache, ResolvedBinding};

use crate::document::DocPath;
use mpi_types::ValueType;
use serde::Deserialize;
use std::fmt;
use std::str::FromStr;

/// Closed set of value extraction strategies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BindingKind {
    /// Text of the first matching element
    Simple,
    /// Text of every matching element
    Complex,
    /// Nested `Profile/Scope/Item` structures
    Profile,
    /// `Extension` blocks with `id` / `critical` attributes
    Extension,
    /// Attribute value (`.../@name`)
    Attr,
    /// `ProfileRequest` scopes with their item ids
    ProfileRequest,
    /// First `Signature` below the path, as a standalone document
    Signature,
    /// Card-range delta entries
    CardRange,
}

impl BindingKind {
    pub const ALL: [BindingKind; 8] = [
        BindingKind::Simple,
        BindingKind::Complex,
        BindingKind::Profile,
        BindingKind::Extension,
        BindingKind::Attr,
        BindingKind::ProfileRequest,
        BindingKind::Signature,
        BindingKind::CardRange,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            BindingKind::Simple => "simple",
            BindingKind::Complex => "complex",
            BindingKind::Profile => "profile",
            BindingKind::Extension => "extension",
            BindingKind::Attr => "attr",
            BindingKind::ProfileRequest => "profileRequest",
            BindingKind::Signature => "signature",
            BindingKind::CardRange => "cr",
        }
    }

    /// Value type this strategy yields
    pub fn produces(self) -> ValueType {
        match self {
            BindingKind::Simple | BindingKind::Attr => ValueType::Text,
            BindingKind::Complex => ValueType::TextList,
            BindingKind::Profile => ValueType::Profiles,
            BindingKind::Extension => ValueType::Extensions,
            BindingKind::ProfileRequest => ValueType::ProfileRequests,
            BindingKind::Signature => ValueType::Signature,
            BindingKind::CardRange => ValueType::CardRanges,
        }
    }
}

impl FromStr for BindingKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        BindingKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| format!("unknown binding type '{}'", s))
    }
}

impl fmt::Display for BindingKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Binding descriptors of one message, as declared
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct BindingMetaInfo {
    #[serde(default)]
    pub paths: Vec<String>,
    #[serde(default)]
    pub attributes: Vec<String>,
    #[serde(default)]
    pub types: Vec<String>,
    #[serde(default)]
    pub value_types: Vec<String>,
}

/// One parsed binding rule
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BindingRule {
    pub path: DocPath,
    pub attribute: String,
    pub kind: BindingKind,
    pub value_type: ValueType,
}

impl BindingMetaInfo {
    /// Number of rules, if the four lists are consistent
    pub fn rule_count(&self) -> Result<usize, String> {
        let lengths = [
            self.paths.len(),
            self.attributes.len(),
            self.types.len(),
            self.value_types.len(),
        ];
        if lengths[0] == 0 {
            return Err("binding declares no rules".to_string());
        }
        if lengths.iter().any(|len| *len != lengths[0]) {
            return Err(format!(
                "binding lists differ in length (paths {}, attributes {}, types {}, value_types {})",
                lengths[0], lengths[1], lengths[2], lengths[3]
            ));
        }
        Ok(lengths[0])
    }

    /// Parse every rule, checking each strategy against its declared value type
    pub fn rules(&self) -> Result<Vec<BindingRule>, String> {
        let count = self.rule_count()?;
        let mut rules = Vec::with_capacity(count);

        for index in 0..count {
            let attribute = self.attributes[index].trim().to_string();
            let context = |reason: String| format!("rule {} ('{}'): {}", index, attribute, reason);

            let path: DocPath = self.paths[index].parse().map_err(context)?;
            let kind: BindingKind = self.types[index].parse().map_err(context)?;
            let value_type: ValueType = self.value_types[index].parse().map_err(context)?;

            if kind.produces() != value_type {
                return Err(context(format!(
                    "strategy '{}' yields {}, declared {}",
                    kind,
                    kind.produces(),
                    value_type
                )));
            }
            if (kind == BindingKind::Attr) != path.is_attribute() {
                return Err(context(format!(
                    "path '{}' must {}end with an @attribute for strategy '{}'",
                    path,
                    if kind == BindingKind::Attr { "" } else { "not " },
                    kind
                )));
            }

            rules.push(BindingRule {
                path,
                attribute,
                kind,
                value_type,
            });
        }
        Ok(rules)
    }
}
