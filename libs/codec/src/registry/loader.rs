//! Declarative message definition source
//!
//! ```toml
//! [[message]]
//! name = "VERes"
//! versions = "1.0.2, 1.0.1"
//! family = "3DSecure"
//! implementation = "threeds.VERes"
//! processor = "enrollment-response"
//!
//! [message.binding]
//! paths = ["ThreeDSecure/Message/VERes/CH/enrolled"]
//! attributes = ["enrolled"]
//! types = ["simple"]
//! value_types = ["String"]
//!
//! [[message.transformer]]
//! to = "PaymentVerifRes"
//! versions = "1.0"
//! implementation = "VEResToPaymentVerifRes"
//!
//! [[message.extension]]
//! id = "visa.3ds.mpi"
//! ```

use crate::binding::BindingMetaInfo;
use crate::error::DefinitionResult;
use serde::Deserialize;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DefinitionFile {
    #[serde(default, rename = "message")]
    pub messages: Vec<MessageDefinition>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MessageDefinition {
    pub name: String,
    /// Comma and/or whitespace separated
    pub versions: String,
    pub family: String,
    pub implementation: String,
    #[serde(default)]
    pub processor: Option<String>,
    #[serde(default)]
    pub binding: BindingMetaInfo,
    #[serde(default, rename = "transformer")]
    pub transformers: Vec<TransformerDefinition>,
    #[serde(default, rename = "extension")]
    pub extensions: Vec<ExtensionDefinition>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TransformerDefinition {
    /// Destination message name
    pub to: String,
    /// Destination versions the transformer is registered for
    pub versions: String,
    pub implementation: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ExtensionDefinition {
    pub id: String,
    #[serde(default)]
    pub value: Option<String>,
}

impl DefinitionFile {
    pub fn from_toml(source: &str) -> DefinitionResult<Self> {
        Ok(toml::from_str(source)?)
    }
}

/// Split a version declaration, keeping declaration order and dropping repeats
pub fn parse_versions(raw: &str) -> Vec<String> {
    let mut versions: Vec<String> = Vec::new();
    for version in raw.split(|c: char| c == ',' || c.is_whitespace()) {
        if !version.is_empty() && !versions.iter().any(|known| known == version) {
            versions.push(version.to_string());
        }
    }
    versions
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_declarations() {
        assert_eq!(parse_versions("1.0.2, 1.0.1"), vec!["1.0.2", "1.0.1"]);
        assert_eq!(parse_versions("1.0.2 1.0.1,1.0.2"), vec!["1.0.2", "1.0.1"]);
        assert!(parse_versions(" , ").is_empty());
    }

    #[test]
    fn test_definition_schema() {
        let file = DefinitionFile::from_toml(
            r#"
            [[message]]
            name = "Error"
            versions = "1.0.2"
            family = "3DSecure"
            implementation = "threeds.Error"

            [message.binding]
            paths = ["ThreeDSecure/Message/Error/errorCode"]
            attributes = ["errorCode"]
            types = ["simple"]
            value_types = ["String"]

            [[message.transformer]]
            to = "MPIError"
            versions = "1.0"
            implementation = "ErrorToMpiError"
            "#,
        )
        .unwrap();
        let message = &file.messages[0];
        assert_eq!(message.processor, None);
        assert_eq!(message.binding.attributes, vec!["errorCode"]);
        assert_eq!(message.transformers[0].to, "MPIError");
        assert!(message.extensions.is_empty());
    }

    #[test]
    fn test_schema_violation() {
        assert!(DefinitionFile::from_toml("[[message]]\nname = 3").is_err());
    }
}
