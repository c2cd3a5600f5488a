//! Message identity
//!
//! Every message carries the same three identity fields regardless of dialect:
//! the correlation `id`, the message `type` (family element name) and the
//! dotted protocol `version`. [`MessageUID`] is the `(type, version)` key used
//! by the registry and the binding cache.

use std::cmp::Ordering;
use std::fmt;
use uuid::Uuid;

/// Identity shared by all messages
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MessageHeader {
    /// Correlation id, supplied by the peer or generated
    pub id: String,
    /// Message family name, e.g. `PAReq`
    pub message_type: String,
    /// Dotted protocol version
    pub version: String,
}

impl MessageHeader {
    pub fn new(message_type: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            id: String::new(),
            message_type: message_type.into(),
            version: version.into(),
        }
    }

    /// Fresh correlation id for locally originated messages
    pub fn generate_id() -> String {
        Uuid::new_v4().simple().to_string()
    }

    pub fn uid(&self) -> MessageUID {
        MessageUID::new(self.message_type.as_str(), self.version.as_str())
    }
}

/// Registry and cache key: message name plus version
///
/// Ordered by name, then by version compared component-wise.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MessageUID {
    pub name: String,
    pub version: String,
}

impl MessageUID {
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
        }
    }
}

impl Ord for MessageUID {
    fn cmp(&self, other: &Self) -> Ordering {
        self.name
            .cmp(&other.name)
            .then_with(|| compare_versions(&self.version, &other.version))
    }
}

impl PartialOrd for MessageUID {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for MessageUID {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.name, self.version)
    }
}

/// Compare dotted versions numerically per component, falling back to text
///
/// `1.0.10 > 1.0.2`, and `1.0 < 1.0.1`.
pub fn compare_versions(a: &str, b: &str) -> Ordering {
    let mut left = a.split('.');
    let mut right = b.split('.');
    loop {
        match (left.next(), right.next()) {
            (None, None) => return a.cmp(b),
            (None, Some(_)) => return Ordering::Less,
            (Some(_), None) => return Ordering::Greater,
            (Some(l), Some(r)) => {
                let ordering = match (l.parse::<u64>(), r.parse::<u64>()) {
                    (Ok(l), Ok(r)) => l.cmp(&r),
                    _ => l.cmp(r),
                };
                if ordering != Ordering::Equal {
                    return ordering;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uid_ordering_name_then_version() {
        let mut uids = vec![
            MessageUID::new("VERes", "1.0.2"),
            MessageUID::new("PAReq", "1.0.2"),
            MessageUID::new("VERes", "1.0.10"),
            MessageUID::new("VERes", "1.0.1"),
        ];
        uids.sort();
        let rendered: Vec<String> = uids.iter().map(ToString::to_string).collect();
        assert_eq!(
            rendered,
            vec!["PAReq/1.0.2", "VERes/1.0.1", "VERes/1.0.2", "VERes/1.0.10"]
        );
    }

    #[test]
    fn test_version_comparison() {
        assert_eq!(compare_versions("1.0.2", "1.0.2"), Ordering::Equal);
        assert_eq!(compare_versions("1.0", "1.0.1"), Ordering::Less);
        assert_eq!(compare_versions("2.0", "1.9.9"), Ordering::Greater);
    }

    #[test]
    fn test_generated_ids_are_unique() {
        assert_ne!(MessageHeader::generate_id(), MessageHeader::generate_id());
    }
}
