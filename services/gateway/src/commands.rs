//! Gateway subcommands
//!
//! Each command returns the text to print so it can be exercised without a
//! terminal.

use anyhow::{Context, Result};
use mpi_codec::{
    to_document, transform_to, Converter, MessageGenerator, RegistryHandle, VersionOverride,
};
use mpi_config::MpiConfig;
use mpi_types::Message;
use serde::Serialize;
use std::fs;
use std::path::Path;
use tracing::{info, warn};

/// Shared protocol state built once from configuration
#[derive(Debug, Clone)]
pub struct Gateway {
    registry: RegistryHandle,
    converter: Converter,
    generator: MessageGenerator,
}

#[derive(Debug, Serialize, PartialEq)]
pub struct RegistryEntry {
    pub name: String,
    pub version: String,
    pub family: String,
    pub processor: Option<String>,
    pub transformers: Vec<String>,
}

impl Gateway {
    pub fn from_config(config: &MpiConfig) -> Result<Self> {
        let registry = match &config.engine.definitions {
            Some(path) => RegistryHandle::from_file(path)
                .with_context(|| format!("Failed to load message definitions from {:?}", path))?,
            None => RegistryHandle::builtin().context("Failed to load built-in definitions")?,
        };

        if config.engine.warm_up_bindings {
            let failed = registry.snapshot().warm_up();
            if !failed.is_empty() {
                warn!(count = failed.len(), "Some binding descriptors do not resolve");
            }
        }

        let version_override = VersionOverride::with_initial(config.negotiation.wire_version.clone());
        if let Some(version) = version_override.get() {
            info!(version = %version, "Starting with wire version override");
        }

        Ok(Self {
            converter: Converter::new(registry.clone()),
            generator: MessageGenerator::new(registry.clone(), version_override),
            registry,
        })
    }

    /// Registered (name, version) pairs for a family, or `ALL`
    pub fn registry_entries(&self, family: &str) -> Result<Vec<RegistryEntry>> {
        let registry = self.registry.snapshot();
        let uids = registry.all_message_info(Some(family))?;

        let mut entries = Vec::with_capacity(uids.len());
        for uid in uids {
            let Some(meta) = registry.lookup(&uid) else {
                continue;
            };
            entries.push(RegistryEntry {
                name: uid.name.clone(),
                version: uid.version.clone(),
                family: meta.family.as_str().to_string(),
                processor: meta.processor.clone(),
                transformers: meta.transformers.keys().map(|to| to.to_string()).collect(),
            });
        }
        Ok(entries)
    }

    pub fn registry_listing(&self, family: &str, json: bool) -> Result<String> {
        let entries = self.registry_entries(family)?;
        if json {
            return serde_json::to_string_pretty(&entries).context("Failed to render registry");
        }

        let mut out = String::new();
        for entry in &entries {
            out.push_str(&format!(
                "{:<16} {:<6} {:<14} {}\n",
                entry.name,
                entry.version,
                entry.family,
                entry.processor.as_deref().unwrap_or("-")
            ));
        }
        Ok(out)
    }

    /// Convert and validate a document, answering with its canonical form
    pub fn convert_file(&self, path: &Path) -> Result<String> {
        let message = self.load_message(path)?;
        message
            .validate()
            .with_context(|| format!("{} failed validation", message.uid()))?;
        render(message.as_ref())
    }

    pub fn transform_file(&self, path: &Path, to: &str, version: &str) -> Result<String> {
        let message = self.load_message(path)?;
        let transformed = transform_to(&self.generator, message.as_ref(), to, version)
            .with_context(|| format!("Cannot transform {} into {} {}", message.uid(), to, version))?;
        render(transformed.as_ref())
    }

    fn load_message(&self, path: &Path) -> Result<Box<dyn Message>> {
        let xml = fs::read_to_string(path).with_context(|| format!("Failed to read {:?}", path))?;
        self.converter
            .convert_str(&xml)
            .with_context(|| format!("Failed to convert {:?}", path))
    }
}

fn render(message: &dyn Message) -> Result<String> {
    to_document(message)
        .and_then(|document| document.to_pretty_string())
        .context("Failed to render message")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn gateway() -> Gateway {
        Gateway::from_config(&MpiConfig::default()).unwrap()
    }

    fn xml_file(xml: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(xml.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_registry_listing() {
        let gateway = gateway();
        let entries = gateway.registry_entries("MPI_Interface").unwrap();
        assert_eq!(entries.len(), 5);
        assert!(entries.iter().all(|e| e.family == "MPI_Interface"));

        let request = entries.iter().find(|e| e.name == "PaymentVerifReq").unwrap();
        assert_eq!(request.processor.as_deref(), Some("payment-verification"));
        assert!(request.transformers.contains(&"VEReq/1.0.2".to_string()));

        let json = gateway.registry_listing("ALL", true).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert!(parsed.as_array().unwrap().len() > entries.len());
    }

    #[test]
    fn test_convert_file() {
        let gateway = gateway();
        let file = xml_file(
            r#"<ThreeDSecure><Message id="g-1"><VERes><version>1.0.2</version><CH><enrolled>N</enrolled></CH></VERes></Message></ThreeDSecure>"#,
        );
        let rendered = gateway.convert_file(file.path()).unwrap();
        assert!(rendered.contains("<enrolled>N</enrolled>"));

        let broken = xml_file(r#"<ThreeDSecure><Message id="g-2"><VERes><version>1.0.2</version></VERes></Message></ThreeDSecure>"#);
        let err = gateway.convert_file(broken.path()).unwrap_err();
        assert!(format!("{:#}", err).contains("CH/enrolled"));
    }

    #[test]
    fn test_transform_file_uses_configured_override() {
        let mut config = MpiConfig::default();
        config.negotiation.wire_version = Some("1.0.1".to_string());
        let gateway = Gateway::from_config(&config).unwrap();

        let file = xml_file(concat!(
            r#"<MPI_Interface><PaymentVerifReq id="g-3"><version>1.0</version>"#,
            "<merchantID>shop-1</merchantID><acqBIN>411111</acqBIN><pan>4111111111111111</pan>",
            "<panExpiry>2812</panExpiry><purchAmount>1999</purchAmount><currency>840</currency>",
            "<deviceCategory>1</deviceCategory></PaymentVerifReq></MPI_Interface>"
        ));
        let rendered = gateway.transform_file(file.path(), "VEReq", "1.0.2").unwrap();
        assert!(rendered.contains("<version>1.0.1</version>"));
        assert!(!rendered.contains("deviceCategory"));
    }
}
