//! Structured field values shared by several messages
//!
//! These records are produced by the non-trivial binding strategies
//! (extension, cr, profile, profileRequest, signature) and carried verbatim by
//! the messages that declare them.

use super::errors::{MessagingError, MessagingResult};
use super::validation::is_digits;
use std::fmt;
use std::str::FromStr;

/// Protocol extension block
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Extension {
    pub id: String,
    pub critical: bool,
    pub value: Option<String>,
}

impl Extension {
    pub fn new(id: impl Into<String>, critical: bool, value: Option<String>) -> Self {
        Self {
            id: id.into(),
            critical,
            value,
        }
    }

    /// Build from the raw `id` / `critical` attribute texts
    ///
    /// `critical` must be exactly `true` or `false`.
    pub fn parse(msg_id: &str, id: &str, critical: &str, value: Option<String>) -> MessagingResult<Self> {
        if id.is_empty() {
            return Err(MessagingError::invalid_value(msg_id, "Extension@id", id, "expected non-empty id"));
        }
        let critical = match critical {
            "true" => true,
            "false" => false,
            other => {
                return Err(MessagingError::invalid_value(
                    msg_id,
                    "Extension@critical",
                    other,
                    "expected 'true' or 'false'",
                ))
            }
        };
        Ok(Self::new(id, critical, value))
    }

    pub fn critical_str(&self) -> &'static str {
        if self.critical {
            "true"
        } else {
            "false"
        }
    }
}

/// Card-range delta operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CardRangeAction {
    Add,
    Delete,
}

impl CardRangeAction {
    pub fn as_str(self) -> &'static str {
        match self {
            CardRangeAction::Add => "A",
            CardRangeAction::Delete => "D",
        }
    }
}

impl FromStr for CardRangeAction {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("A") {
            Ok(CardRangeAction::Add)
        } else if s.eq_ignore_ascii_case("D") {
            Ok(CardRangeAction::Delete)
        } else {
            Err(())
        }
    }
}

impl fmt::Display for CardRangeAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One entry of a card-range delta (`CRRes/CR`)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardRange {
    pub begin: String,
    pub end: String,
    pub action: CardRangeAction,
}

impl CardRange {
    pub const MIN_PAN_DIGITS: usize = 13;
    pub const MAX_PAN_DIGITS: usize = 19;

    /// Validate and build a range entry
    ///
    /// `begin` and `end` must be 13-19 digit numbers of equal length, `action`
    /// is `A` or `D` in either case.
    pub fn parse(msg_id: &str, begin: &str, end: &str, action: &str) -> MessagingResult<Self> {
        Self::check_bound(msg_id, "CR/begin", begin)?;
        Self::check_bound(msg_id, "CR/end", end)?;
        if begin.len() != end.len() {
            return Err(MessagingError::invalid_value(
                msg_id,
                "CR/end",
                end,
                format!("expected same length as begin ({} digits)", begin.len()),
            ));
        }
        let action = action.parse::<CardRangeAction>().map_err(|_| {
            MessagingError::invalid_value(msg_id, "CR/action", action, "expected 'A' or 'D'")
        })?;

        Ok(Self {
            begin: begin.to_string(),
            end: end.to_string(),
            action,
        })
    }

    fn check_bound(msg_id: &str, field: &str, value: &str) -> MessagingResult<()> {
        let len = value.len();
        if !is_digits(value) || !(Self::MIN_PAN_DIGITS..=Self::MAX_PAN_DIGITS).contains(&len) {
            return Err(MessagingError::invalid_value(
                msg_id,
                field,
                value,
                format!(
                    "expected {} to {} digits",
                    Self::MIN_PAN_DIGITS,
                    Self::MAX_PAN_DIGITS
                ),
            ));
        }
        Ok(())
    }
}

/// Single named value inside a profile scope
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileItem {
    pub id: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ProfileScope {
    pub id: String,
    pub items: Vec<ProfileItem>,
}

/// Named set of scoped key/value items returned to merchants
///
/// XML shape: `<Profile name=".."><Scope id=".."><Item id="..">v</Item></Scope></Profile>`
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Profile {
    pub name: String,
    pub scopes: Vec<ProfileScope>,
}

impl Profile {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            scopes: Vec::new(),
        }
    }

    /// Add an item, creating the scope on first use
    pub fn insert(&mut self, scope: &str, item: &str, value: impl Into<String>) {
        let item = ProfileItem {
            id: item.to_string(),
            value: value.into(),
        };
        match self.scopes.iter_mut().find(|s| s.id == scope) {
            Some(existing) => existing.items.push(item),
            None => self.scopes.push(ProfileScope {
                id: scope.to_string(),
                items: vec![item],
            }),
        }
    }

    pub fn get(&self, scope: &str, item: &str) -> Option<&str> {
        self.scopes
            .iter()
            .find(|s| s.id == scope)?
            .items
            .iter()
            .find(|i| i.id == item)
            .map(|i| i.value.as_str())
    }
}

/// Merchant request for the items of one profile scope
///
/// XML shape: `<ProfileRequest scopeID=".."><itemID>x</itemID></ProfileRequest>`
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ProfileRequest {
    pub scope_id: String,
    pub item_ids: Vec<String>,
}

/// Standalone XML document holding an embedded signature block
///
/// Signature processing is external; the engine only carries the text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignatureDocument(pub String);

impl SignatureDocument {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::errors::ErrorCode;

    #[test]
    fn test_extension_critical_flag_is_strict() {
        assert!(Extension::parse("m", "visa.com:ext", "true", None).unwrap().critical);
        assert!(!Extension::parse("m", "visa.com:ext", "false", None).unwrap().critical);
        let err = Extension::parse("m", "visa.com:ext", "TRUE", None).unwrap_err();
        assert_eq!(err.error_code, ErrorCode::InvalidFormat);
        assert!(Extension::parse("m", "", "false", None).is_err());
    }

    #[test]
    fn test_card_range_bounds() {
        let twelve = "411111111111";
        let thirteen = "4111111111111";
        assert!(CardRange::parse("m", twelve, twelve, "A").is_err());

        let range = CardRange::parse("m", thirteen, "4111111111119", "A").unwrap();
        assert_eq!(range.action, CardRangeAction::Add);

        let err = CardRange::parse("m", thirteen, "4111111111119", "X").unwrap_err();
        assert!(err.error_detail.contains("CR/action"));
        assert!(err.error_detail.contains('X'));
    }

    #[test]
    fn test_card_range_action_case_insensitive_and_equal_length() {
        let range = CardRange::parse("m", "4000000000000", "4999999999999", "d").unwrap();
        assert_eq!(range.action, CardRangeAction::Delete);
        assert!(CardRange::parse("m", "4000000000000", "49999999999999", "A").is_err());
        assert!(CardRange::parse("m", "40000000000ab", "4999999999999", "A").is_err());
    }

    #[test]
    fn test_profile_lookup() {
        let mut profile = Profile::new("cardholder");
        profile.insert("billing", "country", "840");
        profile.insert("billing", "zip", "10001");
        profile.insert("device", "ip", "10.0.0.1");

        assert_eq!(profile.scopes.len(), 2);
        assert_eq!(profile.get("billing", "zip"), Some("10001"));
        assert_eq!(profile.get("device", "zip"), None);
    }
}
