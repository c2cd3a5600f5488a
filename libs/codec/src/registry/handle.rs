//! Shared, reloadable access to the registry

use super::{ImplementationCatalog, MessageRegistry};
use crate::error::DefinitionResult;
use crate::transform::TransformerCatalog;
use parking_lot::RwLock;
use std::path::Path;
use std::sync::Arc;
use tracing::info;

/// Cloneable handle; readers take an `Arc` snapshot and never block a reload
#[derive(Debug, Clone)]
pub struct RegistryHandle {
    current: Arc<RwLock<Arc<MessageRegistry>>>,
}

impl RegistryHandle {
    pub fn new(registry: Arc<MessageRegistry>) -> Self {
        Self {
            current: Arc::new(RwLock::new(registry)),
        }
    }

    /// Handle over the compiled-in definitions
    pub fn builtin() -> DefinitionResult<Self> {
        MessageRegistry::builtin().map(Self::new)
    }

    pub fn from_file(path: impl AsRef<Path>) -> DefinitionResult<Self> {
        MessageRegistry::from_file(path).map(|registry| Self::new(Arc::new(registry)))
    }

    pub fn snapshot(&self) -> Arc<MessageRegistry> {
        self.current.read().clone()
    }

    /// Swap in `registry`, returning the one it replaces
    pub fn replace(&self, registry: Arc<MessageRegistry>) -> Arc<MessageRegistry> {
        std::mem::replace(&mut *self.current.write(), registry)
    }

    /// Build a registry from `source` and swap it in
    ///
    /// On a load failure the current registry stays in place.
    pub fn reload(&self, source: &str) -> DefinitionResult<()> {
        let registry = MessageRegistry::load(
            source,
            &ImplementationCatalog::builtin(),
            &TransformerCatalog::builtin(),
            "<reload>",
        )?;
        let previous = self.replace(Arc::new(registry));
        info!(
            previous_uids = previous.len(),
            uids = self.snapshot().len(),
            "Message registry reloaded"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mpi_types::MessageUID;

    #[test]
    fn test_reload_swaps_atomically() {
        let handle = RegistryHandle::builtin().unwrap();
        let before = handle.snapshot();
        assert!(before.lookup(&MessageUID::new("VERes", "1.0.2")).is_some());

        let reduced = r#"
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
        "#;
        handle.reload(reduced).unwrap();

        let after = handle.snapshot();
        assert_eq!(after.len(), 1);
        assert!(after.lookup(&MessageUID::new("VERes", "1.0.2")).is_none());
        // Snapshots taken earlier are unaffected
        assert!(before.lookup(&MessageUID::new("VERes", "1.0.2")).is_some());
    }

    #[test]
    fn test_failed_reload_keeps_current() {
        let handle = RegistryHandle::builtin().unwrap();
        let count = handle.snapshot().len();
        assert!(handle.reload("[[message]]\nname = \"X\"").is_err());
        assert_eq!(handle.snapshot().len(), count);
    }
}
