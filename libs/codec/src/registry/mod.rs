//! # Message Type Registry
//!
//! ## Purpose
//!
//! Maps `(type, version)` to everything needed to handle a message: the
//! implementation factory, the processor name, the protocol family, binding
//! descriptors, transformer table and extension support. Built once from the
//! declarative definitions; one [`MessageMetaInfo`] per message name is
//! registered under every version it supports.
//!
//! ## Architecture
//!
//! ```text
//! messages.toml ──► DefinitionFile ──► MessageRegistry ──► RegistryHandle
//!                        │                  │                  (Arc swap)
//!        ImplementationCatalog ─┘      BindingCache
//!        TransformerCatalog ────┘      (per registry)
//! ```
//!
//! The registry is immutable after load. A reload builds a complete new
//! registry and swaps it in through [`RegistryHandle`].

pub mod handle;
pub mod loader;

pub use handle::RegistryHandle;
pub use loader::{parse_versions, DefinitionFile, MessageDefinition};

use crate::binding::{BindingCache, BindingMetaInfo, ResolvedBinding};
use crate::error::{DefinitionError, DefinitionResult};
use crate::transform::{MessageTransformer, TransformerCatalog};
use mpi_types::{
    builtin_factories, Extension, MessageFactory, MessageUID, MessagingError, MessagingResult,
    ProtocolFamily, ALL_FAMILIES,
};
use once_cell::sync::OnceCell;
use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use std::sync::Arc;
use std::time::SystemTime;
use tracing::{debug, info, warn};

/// Message definitions compiled into the crate
pub const DEFAULT_DEFINITIONS: &str = include_str!("../../definitions/messages.toml");

/// Extension declared as supported by a message definition
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SupportedExtension {
    pub id: String,
    /// When set, only this value is supported
    pub value: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtensionInfo {
    pub supported: Vec<SupportedExtension>,
}

impl ExtensionInfo {
    pub fn supports(&self, extension: &Extension) -> bool {
        self.supported.iter().any(|supported| {
            supported.id == extension.id
                && supported
                    .value
                    .as_ref()
                    .map_or(true, |value| extension.value.as_ref() == Some(value))
        })
    }

    /// Unsupported critical extensions reject the message; others are ignored
    pub fn check(&self, msg_id: &str, extensions: &[Extension]) -> MessagingResult<()> {
        for extension in extensions {
            if self.supports(extension) {
                continue;
            }
            if extension.critical {
                return Err(MessagingError::critical_extension(msg_id, &extension.id));
            }
            debug!(id = msg_id, extension = %extension.id, "Ignoring unsupported non-critical extension");
        }
        Ok(())
    }
}

/// Everything the engine knows about one message name
#[derive(Debug, Clone)]
pub struct MessageMetaInfo {
    pub name: String,
    /// In declaration order
    pub supported_versions: Vec<String>,
    pub implementation: MessageFactory,
    pub processor: Option<String>,
    pub family: ProtocolFamily,
    pub binding: BindingMetaInfo,
    /// Destination UID → transformer
    pub transformers: BTreeMap<MessageUID, Arc<dyn MessageTransformer>>,
    pub extensions: ExtensionInfo,
}

impl MessageMetaInfo {
    pub fn supports_version(&self, version: &str) -> bool {
        self.supported_versions.iter().any(|known| known == version)
    }

    pub fn transformer_for(&self, destination: &MessageUID) -> Option<&Arc<dyn MessageTransformer>> {
        self.transformers.get(destination)
    }
}

/// Implementation name → message factory
#[derive(Debug, Clone, Default)]
pub struct ImplementationCatalog {
    factories: HashMap<String, MessageFactory>,
}

impl ImplementationCatalog {
    pub fn builtin() -> Self {
        let mut catalog = Self::default();
        for factory in builtin_factories() {
            catalog.register(factory);
        }
        catalog
    }

    pub fn register(&mut self, factory: MessageFactory) {
        self.factories.insert(factory.implementation.to_string(), factory);
    }

    pub fn get(&self, implementation: &str) -> Option<MessageFactory> {
        self.factories.get(implementation).copied()
    }

    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.factories.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

/// Load bookkeeping
#[derive(Debug, Clone)]
pub struct RegistryMetadata {
    pub loaded_at: SystemTime,
    pub message_count: usize,
    pub source: String,
}

#[derive(Debug)]
pub struct MessageRegistry {
    entries: BTreeMap<MessageUID, Arc<MessageMetaInfo>>,
    by_name: HashMap<String, Arc<MessageMetaInfo>>,
    binding_cache: BindingCache,
    metadata: RegistryMetadata,
}

impl MessageRegistry {
    /// Build from a definition source using the built-in catalogs
    pub fn from_toml_str(source: &str) -> DefinitionResult<Self> {
        Self::load(
            source,
            &ImplementationCatalog::builtin(),
            &TransformerCatalog::builtin(),
            "<inline>",
        )
    }

    pub fn from_file(path: impl AsRef<Path>) -> DefinitionResult<Self> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|e| DefinitionError::Io {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        Self::load(
            &source,
            &ImplementationCatalog::builtin(),
            &TransformerCatalog::builtin(),
            &path.display().to_string(),
        )
    }

    /// Registry of the compiled-in definitions, parsed once per process
    pub fn builtin() -> DefinitionResult<Arc<Self>> {
        static BUILTIN: OnceCell<Arc<MessageRegistry>> = OnceCell::new();
        BUILTIN
            .get_or_try_init(|| {
                Self::load(
                    DEFAULT_DEFINITIONS,
                    &ImplementationCatalog::builtin(),
                    &TransformerCatalog::builtin(),
                    "<builtin>",
                )
                .map(Arc::new)
            })
            .cloned()
    }

    /// Build from a definition source with explicit catalogs
    pub fn load(
        source: &str,
        implementations: &ImplementationCatalog,
        transformers: &TransformerCatalog,
        source_name: &str,
    ) -> DefinitionResult<Self> {
        let file = DefinitionFile::from_toml(source)?;

        let mut entries = BTreeMap::new();
        let mut by_name = HashMap::new();
        for definition in file.messages {
            let meta = Arc::new(build_meta(definition, implementations, transformers)?);
            if by_name.contains_key(&meta.name) {
                return Err(DefinitionError::DuplicateMessage {
                    message: meta.name.clone(),
                });
            }
            for version in &meta.supported_versions {
                entries.insert(MessageUID::new(meta.name.as_str(), version.as_str()), Arc::clone(&meta));
            }
            by_name.insert(meta.name.clone(), meta);
        }

        info!(
            source = source_name,
            messages = by_name.len(),
            uids = entries.len(),
            "Message registry loaded"
        );

        Ok(Self {
            metadata: RegistryMetadata {
                loaded_at: SystemTime::now(),
                message_count: by_name.len(),
                source: source_name.to_string(),
            },
            entries,
            by_name,
            binding_cache: BindingCache::new(),
        })
    }

    pub fn lookup(&self, uid: &MessageUID) -> Option<&Arc<MessageMetaInfo>> {
        self.entries.get(uid)
    }

    pub fn lookup_name(&self, name: &str) -> Option<&Arc<MessageMetaInfo>> {
        self.by_name.get(name)
    }

    pub fn is_version_supported(&self, uid: &MessageUID) -> bool {
        self.entries.contains_key(uid)
    }

    /// UIDs of a protocol family, `ALL` for every family
    ///
    /// Family names match case-insensitively; an unknown family yields an
    /// empty list, a missing one is an error.
    pub fn all_message_info(&self, family: Option<&str>) -> MessagingResult<Vec<MessageUID>> {
        let family = family.ok_or_else(|| {
            MessagingError::missing_element("", "protocolFamily")
        })?;

        if family.eq_ignore_ascii_case(ALL_FAMILIES) {
            return Ok(self.entries.keys().cloned().collect());
        }
        Ok(self
            .entries
            .iter()
            .filter(|(_, meta)| meta.family.as_str().eq_ignore_ascii_case(family))
            .map(|(uid, _)| uid.clone())
            .collect())
    }

    /// Resolved setter bindings for a registered UID
    pub fn bindings_for(&self, uid: &MessageUID) -> MessagingResult<Arc<[ResolvedBinding]>> {
        let meta = self
            .lookup(uid)
            .ok_or_else(|| MessagingError::binding("", format!("{} is not registered", uid)))?;
        self.binding_cache.get_or_resolve(uid, meta)
    }

    /// Resolve every binding table up front
    ///
    /// Returns the UIDs whose descriptors are unusable; those keep failing at
    /// conversion time.
    pub fn warm_up(&self) -> Vec<MessageUID> {
        self.entries
            .keys()
            .filter(|uid| self.bindings_for(uid).is_err())
            .cloned()
            .collect()
    }

    pub fn binding_cache(&self) -> &BindingCache {
        &self.binding_cache
    }

    pub fn metadata(&self) -> &RegistryMetadata {
        &self.metadata
    }

    pub fn messages(&self) -> impl Iterator<Item = &Arc<MessageMetaInfo>> {
        self.by_name.values()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn build_meta(
    definition: MessageDefinition,
    implementations: &ImplementationCatalog,
    transformers: &TransformerCatalog,
) -> DefinitionResult<MessageMetaInfo> {
    let name = definition.name.trim().to_string();

    let supported_versions = parse_versions(&definition.versions);
    if supported_versions.is_empty() {
        return Err(DefinitionError::EmptyVersions { message: name });
    }

    let family: ProtocolFamily = definition
        .family
        .parse()
        .map_err(|_| DefinitionError::UnknownFamily {
            message: name.clone(),
            family: definition.family.clone(),
        })?;

    let implementation = implementations
        .get(definition.implementation.trim())
        .ok_or_else(|| DefinitionError::UnknownImplementation {
            message: name.clone(),
            implementation: definition.implementation.clone(),
            available: implementations.names().join(", "),
        })?;

    let mut transformer_table = BTreeMap::new();
    for entry in &definition.transformers {
        let transformer = transformers
            .get(entry.implementation.trim())
            .ok_or_else(|| DefinitionError::UnknownTransformer {
                message: name.clone(),
                destination: entry.to.clone(),
                transformer: entry.implementation.clone(),
            })?;
        for version in parse_versions(&entry.versions) {
            transformer_table.insert(
                MessageUID::new(entry.to.trim(), version),
                Arc::clone(&transformer),
            );
        }
    }

    if let Err(reason) = definition.binding.rule_count() {
        warn!(message = %name, %reason, "Inconsistent binding descriptors");
    }

    Ok(MessageMetaInfo {
        supported_versions,
        implementation,
        processor: definition.processor.filter(|p| !p.trim().is_empty()),
        family,
        binding: definition.binding,
        transformers: transformer_table,
        extensions: ExtensionInfo {
            supported: definition
                .extensions
                .into_iter()
                .map(|ext| SupportedExtension {
                    id: ext.id,
                    value: ext.value,
                })
                .collect(),
        },
        name,
    })
}
