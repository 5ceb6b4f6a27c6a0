//! # Container
//!
//! Registers bindings and resolves fully wired object graphs.
//!
//! # Architecture
//! ```text
//!  add / add_transient / add_instance ──validate──> Registry
//!                                                    │
//!  get / get_named ──> resolve_in ──load──> Binding::provide
//!                         ▲                          │
//!                         └──── Injector <── field injection
//! ```
//!
//! # Examples
//! ```rust
//! use std::any::TypeId;
//! use std::sync::Arc;
//!
//! use wasil_container::capability;
//! use wasil_container::prelude::*;
//!
//! pub trait Logger: Send + Sync {
//!     fn log(&self, msg: &str) -> String;
//! }
//!
//! capability!(Logger);
//!
//! #[derive(Default)]
//! struct ConsoleLogger;
//!
//! impl Logger for ConsoleLogger {
//!     fn log(&self, msg: &str) -> String {
//!         format!("[LOG] {msg}")
//!     }
//! }
//!
//! // What `#[derive(Injectable)]` generates for `#[inject(provides(Logger))]`.
//! impl Injectable for ConsoleLogger {
//!     fn inject_fields(&mut self, _injector: &mut Injector<'_>) -> Result<()> {
//!         Ok(())
//!     }
//!
//!     fn provides(capability: TypeId) -> bool {
//!         capability == TypeId::of::<Arc<dyn Logger>>()
//!     }
//!
//!     fn upcast(this: Arc<Self>, capability: TypeId) -> Option<Provided> {
//!         Self::provides(capability).then(|| Provided::new(this as Arc<dyn Logger>))
//!     }
//! }
//!
//! impl Reflect for ConsoleLogger {
//!     fn type_info() -> TypeInfo {
//!         TypeInfo::structure::<Self>()
//!     }
//! }
//!
//! let container = Container::new();
//! container.add::<Arc<dyn Logger>, ConsoleLogger>().expect("valid registration");
//!
//! let logger: Arc<dyn Logger> = container.get().expect("registered");
//! assert_eq!(logger.log("hi"), "[LOG] hi");
//! ```

use std::any::type_name;
use std::fmt;
use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, trace};
use wasil_support::rendering::suggest_similar;

use crate::binding::{Binding, SingletonBinding, TransientBinding};
use crate::builds::Builds;
use crate::chain::{Chain, DepLink};
use crate::error::{
    BindingMissingError, InvalidTypeError, NotReferenceOrCapabilityError, Result,
    TargetNotStructError, WasilError,
};
use crate::inject::Injector;
use crate::key::ServiceKey;
use crate::lifetime::Lifetime;
use crate::provider::Provider;
use crate::reflect::{Provided, Reflect, Shape};
use crate::registry::Registry;
use crate::validate;

const MAX_SUGGESTIONS: usize = 3;

/// Describes one stored binding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RegistrationInfo {
    pub service: String,
    pub namespace: String,
    pub lifetime: Lifetime,
}

/// Thread-safe dependency injection container.
///
/// Registration and resolution both take `&self`; share the container
/// between threads by reference or through an `Arc`.
#[derive(Default)]
pub struct Container {
    registry: Registry,
    builds: Builds,
}

impl Container {
    /// Creates an empty container.
    pub fn new() -> Self {
        Self::default()
    }

    // ── Singleton ──

    /// Registers `TImpl` as the singleton implementation of `T` in the
    /// global namespace.
    ///
    /// The instance is allocated and injected on first resolve and shared
    /// afterwards.
    pub fn add<T: Reflect, TImpl: Reflect>(&self) -> Result<()> {
        self.add_named::<T, TImpl>("")
    }

    /// Registers `TImpl` as the singleton implementation of `T` under
    /// `name`.
    pub fn add_named<T: Reflect, TImpl: Reflect>(&self, name: impl Into<String>) -> Result<()> {
        let constructor = validate::constructor::<T, TImpl>()?;
        self.store(ServiceKey::named::<T>(name), Arc::new(SingletonBinding::new(constructor)));
        Ok(())
    }

    // ── Transient ──

    /// Registers `TImpl` as the transient implementation of `T` in the
    /// global namespace. Every resolve builds a new instance.
    pub fn add_transient<T: Reflect, TImpl: Reflect>(&self) -> Result<()> {
        self.add_transient_named::<T, TImpl>("")
    }

    /// Registers `TImpl` as the transient implementation of `T` under
    /// `name`.
    pub fn add_transient_named<T: Reflect, TImpl: Reflect>(&self, name: impl Into<String>) -> Result<()> {
        let constructor = validate::constructor::<T, TImpl>()?;
        self.store(ServiceKey::named::<T>(name), Arc::new(TransientBinding::new(constructor)));
        Ok(())
    }

    // ── Instance ──

    /// Registers a pre-built value as `T` in the global namespace.
    ///
    /// `Arc` handles are shared with every resolver; plain struct values
    /// are cloned on every resolve.
    pub fn add_instance<T, I>(&self, instance: I) -> Result<()>
    where
        T: Reflect,
        I: Reflect + Clone + Send + Sync,
    {
        self.add_instance_named::<T, I>("", instance)
    }

    /// Registers a pre-built value as `T` under `name`.
    pub fn add_instance_named<T, I>(&self, name: impl Into<String>, instance: I) -> Result<()>
    where
        T: Reflect,
        I: Reflect + Clone + Send + Sync,
    {
        let binding = validate::instance::<T, I>(instance)?;
        self.store(ServiceKey::named::<T>(name), Arc::new(binding));
        Ok(())
    }

    // ── Providers ──

    /// Applies a [`Provider`] module of registrations.
    pub fn add_provider(&self, provider: &dyn Provider) -> Result<()> {
        debug!(provider = provider.name(), "Adding provider");
        provider.register(self)
    }

    // ── Resolution ──

    /// Creates, retrieves or injects the service `T` of the global
    /// namespace.
    ///
    /// ```rust,ignore
    /// let db: Arc<Database> = container.get()?;
    /// ```
    pub fn get<T: Reflect>(&self) -> Result<T> {
        self.get_named::<T>("")
    }

    /// Creates, retrieves or injects the service `T` registered under
    /// `name`.
    pub fn get_named<T: Reflect>(&self, name: &str) -> Result<T> {
        let key = ServiceKey::named::<T>(name);
        trace!(key = %key, "Resolving");

        let mut chain = Chain::new();
        let provided = self.resolve_in(&key, &mut chain)?;
        Self::downcast(provided, &key)
    }

    /// Fills the empty dependency fields of an existing struct.
    ///
    /// Accepts a struct value, or an `Arc<Struct>` with no other clones.
    ///
    /// # Errors
    /// - [`WasilError::TargetNotStruct`] for an `Arc` that is shared with
    ///   other clones or points at a trait object
    /// - [`WasilError::NotReferenceOrCapability`] for anything that is not
    ///   an injectable struct or a handle
    /// - any resolution error other than a missing binding
    pub fn inject<V: Reflect>(&self, target: &mut V) -> Result<()> {
        let info = V::type_info();
        let mut chain = Chain::new();
        match info.shape() {
            Shape::Struct(structure) => {
                structure.inject(target, &mut Injector::new(self, &mut chain))
            }
            Shape::Shared(inner) => match inner.as_struct() {
                Some(structure) => {
                    structure.inject_unique(target, &mut Injector::new(self, &mut chain))
                }
                None => Err(WasilError::TargetNotStruct(TargetNotStructError {
                    type_name: info.name(),
                })),
            },
            Shape::Capability => Err(WasilError::TargetNotStruct(TargetNotStructError {
                type_name: info.name(),
            })),
            Shape::Primitive => Err(WasilError::NotReferenceOrCapability(
                NotReferenceOrCapabilityError {
                    type_name: info.name(),
                },
            )),
        }
    }

    // ── Introspection ──

    /// Returns `true` if a binding exists for `(T, name)`.
    pub fn contains<T: ?Sized + 'static>(&self, name: &str) -> bool {
        self.registry.load(&ServiceKey::named::<T>(name)).is_some()
    }

    /// Snapshot of every registration, sorted by service and namespace.
    pub fn registrations(&self) -> Vec<RegistrationInfo> {
        let mut registrations: Vec<RegistrationInfo> = self
            .registry
            .registrations()
            .into_iter()
            .map(|(key, lifetime)| RegistrationInfo {
                service: key.type_name().to_string(),
                namespace: key.namespace().to_string(),
                lifetime,
            })
            .collect();
        registrations.sort_by(|a, b| {
            a.service
                .cmp(&b.service)
                .then_with(|| a.namespace.cmp(&b.namespace))
        });
        registrations
    }

    /// Returns the number of stored bindings.
    pub fn len(&self) -> usize {
        self.registry.len()
    }

    pub fn is_empty(&self) -> bool {
        self.registry.is_empty()
    }

    // ── Internal ──

    /// Singleton builds in progress on any thread.
    pub(crate) fn builds(&self) -> &Builds {
        &self.builds
    }

    /// Stores a binding, replacing whatever was registered under `key`.
    pub(crate) fn store(&self, key: ServiceKey, binding: Arc<dyn Binding>) {
        let lifetime = binding.lifetime();
        match self.registry.store(key.clone(), binding) {
            Some(previous) => debug!(
                key = %key,
                lifetime = %lifetime,
                replaced = %previous.lifetime(),
                "Replaced binding"
            ),
            None => debug!(key = %key, lifetime = %lifetime, "Registered binding"),
        }
    }

    /// Resolves `key` as a frame of `chain`.
    ///
    /// The link for the binding is pushed before it provides and popped
    /// afterwards, whatever the outcome.
    pub(crate) fn resolve_in(&self, key: &ServiceKey, chain: &mut Chain) -> Result<Provided> {
        let binding = self.registry.load(key).ok_or_else(|| self.binding_missing(key))?;

        chain.push(DepLink::new(key.clone(), binding.clone()));
        trace!(key = %key, lifetime = %binding.lifetime(), depth = chain.len(), "Providing");

        let provided = {
            let mut injector = Injector::new(self, chain);
            binding.provide(&mut injector)
        };

        chain.pop();
        provided
    }

    /// Checks that a produced value really is the requested `T`.
    pub(crate) fn downcast<T: 'static>(provided: Provided, key: &ServiceKey) -> Result<T> {
        provided.downcast::<T>().map_err(|provided| {
            WasilError::InvalidType(InvalidTypeError {
                namespace: key.namespace().to_string(),
                expected: type_name::<T>(),
                actual: provided.type_name(),
            })
        })
    }

    fn binding_missing(&self, key: &ServiceKey) -> WasilError {
        let registered = self.registry.namespaces_of(key.type_id());
        let suggestions = suggest_similar(
            key.namespace(),
            registered.iter().map(String::as_str),
            MAX_SUGGESTIONS,
        );
        WasilError::BindingMissing(BindingMissingError {
            key: key.clone(),
            suggestions,
        })
    }
}

impl fmt::Debug for Container {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Container")
            .field("registered", &self.registry.len())
            .finish()
    }
}

// ═══════════════════════════════════════════
// Prelude
// ═══════════════════════════════════════════

pub mod prelude {
    pub use super::{Container, RegistrationInfo};
    pub use crate::error::{Result, WasilError};
    pub use crate::inject::{Injectable, Injector};
    pub use crate::key::ServiceKey;
    pub use crate::lifetime::Lifetime;
    pub use crate::provider::Provider;
    pub use crate::reflect::{Provided, Reflect, TypeInfo};
}

// ═══════════════════════════════════════════
// Tests
// ═══════════════════════════════════════════
