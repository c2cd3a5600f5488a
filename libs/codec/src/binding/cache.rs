//! Binding resolution cache
//!
//! Resolving a message's descriptors means parsing every rule and finding the
//! matching entry in the implementation's setter table. The result is stored
//! per [`MessageUID`] the first time the type is converted and shared by all
//! later conversions.
//!
//! The cache is append-only: entries are inserted if absent and never
//! replaced. Two threads resolving the same type concurrently both compute
//! the same table and the first insert wins. A registry reload builds a new
//! registry with a fresh cache, so stale setters are never served.

use super::{BindingKind, BindingRule};
use crate::document::DocPath;
use crate::registry::MessageMetaInfo;
use dashmap::DashMap;
use mpi_types::{FieldSetter, MessageUID, MessagingError, MessagingResult};
use std::sync::Arc;
use tracing::{debug, error};

/// A rule bound to its setter
#[derive(Debug, Clone)]
pub struct ResolvedBinding {
    pub path: DocPath,
    pub attribute: String,
    pub kind: BindingKind,
    pub setter: FieldSetter,
}

#[derive(Debug, Default)]
pub struct BindingCache {
    entries: DashMap<MessageUID, Arc<[ResolvedBinding]>>,
}

impl BindingCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached bindings for `uid`, resolving them from `meta` on first use
    pub fn get_or_resolve(&self, uid: &MessageUID, meta: &MessageMetaInfo) -> MessagingResult<Arc<[ResolvedBinding]>> {
        if let Some(hit) = self.entries.get(uid) {
            return Ok(Arc::clone(hit.value()));
        }

        let resolved: Arc<[ResolvedBinding]> = resolve(meta)
            .map_err(|e| {
                error!(message = %uid, error = %e.error_detail, "Binding descriptors unusable");
                e
            })?
            .into();
        let entry = self.entries.entry(uid.clone()).or_insert(resolved);
        debug!(message = %uid, rules = entry.value().len(), "Binding table cached");
        Ok(Arc::clone(entry.value()))
    }

    pub fn contains(&self, uid: &MessageUID) -> bool {
        self.entries.contains_key(uid)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Parse the descriptors of `meta` and bind every rule to a setter
pub fn resolve(meta: &MessageMetaInfo) -> MessagingResult<Vec<ResolvedBinding>> {
    let rules = meta
        .binding
        .rules()
        .map_err(|reason| MessagingError::binding("", format!("{}: {}", meta.name, reason)))?;

    let setters = meta.implementation.setters();
    rules
        .into_iter()
        .map(|rule| bind_rule(meta, &setters, rule))
        .collect()
}

fn bind_rule(meta: &MessageMetaInfo, setters: &[FieldSetter], rule: BindingRule) -> MessagingResult<ResolvedBinding> {
    let setter = setters
        .iter()
        .find(|setter| setter.matches(&rule.attribute, rule.value_type))
        .copied()
        .ok_or_else(|| {
            MessagingError::binding(
                "",
                format!(
                    "{}: no setter for attribute '{}' taking {} on {}",
                    meta.name, rule.attribute, rule.value_type, meta.implementation.implementation
                ),
            )
        })?;

    Ok(ResolvedBinding {
        path: rule.path,
        attribute: rule.attribute,
        kind: rule.kind,
        setter,
    })
}
