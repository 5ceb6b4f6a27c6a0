//! Binding registry: maps service types and namespaces to bindings.
//!
//! Two levels of [`DashMap`]: service `TypeId` → namespace → binding. Both
//! levels are safe for concurrent reads and writes without external
//! locking, and bindings are cloned out before they run so no shard guard
//! is held while a resolution recurses.

use std::any::TypeId;
use std::sync::Arc;

use dashmap::DashMap;
use tracing::trace;

use crate::binding::Binding;
use crate::key::ServiceKey;
use crate::lifetime::Lifetime;

/// A stored binding together with the key it was registered under.
#[derive(Clone)]
pub(crate) struct Registration {
    pub key: ServiceKey,
    pub binding: Arc<dyn Binding>,
}

impl std::fmt::Debug for Registration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registration")
            .field("key", &self.key)
            .field("lifetime", &self.binding.lifetime())
            .finish()
    }
}

type Namespaces = DashMap<String, Registration>;

/// Stores all bindings of a container.
#[derive(Debug, Default)]
pub(crate) struct Registry {
    services: DashMap<TypeId, Arc<Namespaces>>,
}

impl Registry {
    /// Namespace map of a service type, created on first write.
    ///
    /// `entry().or_default()` holds the shard lock, so concurrent first
    /// writers end up sharing one map.
    fn namespaces(&self, type_id: TypeId) -> Arc<Namespaces> {
        if let Some(namespaces) = self.services.get(&type_id) {
            return namespaces.value().clone();
        }
        self.services.entry(type_id).or_default().value().clone()
    }

    /// Stores `binding` under `key`, returning the binding it replaced.
    pub fn store(&self, key: ServiceKey, binding: Arc<dyn Binding>) -> Option<Arc<dyn Binding>> {
        let namespaces = self.namespaces(key.type_id());
        let namespace = key.namespace().to_string();
        namespaces
            .insert(namespace, Registration { key, binding })
            .map(|previous| previous.binding)
    }

    /// Looks up the binding for `key`.
    pub fn load(&self, key: &ServiceKey) -> Option<Arc<dyn Binding>> {
        let namespaces = self.services.get(&key.type_id())?.value().clone();
        let binding = namespaces
            .get(key.namespace())
            .map(|entry| entry.value().binding.clone());
        trace!(key = %key, found = binding.is_some(), "Loaded binding");
        binding
    }

    /// Namespaces registered for a service type.
    pub fn namespaces_of(&self, type_id: TypeId) -> Vec<String> {
        let Some(namespaces) = self.services.get(&type_id).map(|entry| entry.value().clone()) else {
            return Vec::new();
        };
        let mut names: Vec<String> = namespaces.iter().map(|entry| entry.key().clone()).collect();
        names.sort();
        names
    }

    /// Snapshot of every registration.
    pub fn registrations(&self) -> Vec<(ServiceKey, Lifetime)> {
        let maps: Vec<Arc<Namespaces>> = self.services.iter().map(|entry| entry.value().clone()).collect();
        maps.iter()
            .flat_map(|namespaces| {
                namespaces
                    .iter()
                    .map(|entry| {
                        let registration = entry.value();
                        (registration.key.clone(), registration.binding.lifetime())
                    })
                    .collect::<Vec<_>>()
            })
            .collect()
    }

    /// Returns the number of stored bindings.
    pub fn len(&self) -> usize {
        let maps: Vec<Arc<Namespaces>> = self.services.iter().map(|entry| entry.value().clone()).collect();
        maps.iter().map(|namespaces| namespaces.len()).sum()
    }

    /// Returns true if no bindings are stored.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
