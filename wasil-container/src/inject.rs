//! Field injection.
//!
//! After a singleton or transient binding allocates a struct, the
//! [`Injector`] fills every empty dependency field by resolving it from the
//! container. Injection is depth-first: resolving one field may build and
//! inject a whole subtree before the next field is visited.
//!
//! Structs opt in with `#[derive(Injectable)]`. The derive visits fields of
//! type `Option<Arc<X>>` in declaration order and calls
//! [`Injector::resolve_field`] for each one that is still `None`.

use std::any::TypeId;
use std::sync::Arc;

use tracing::trace;

use crate::chain::Chain;
use crate::container::Container;
use crate::error::{Result, WasilError};
use crate::key::ServiceKey;
use crate::reflect::{Provided, Reflect};

/// A struct whose dependencies the container can inject.
///
/// Normally derived:
///
/// ```rust,ignore
/// #[derive(Default, Injectable)]
/// #[inject(provides(Greeter))]
/// struct Politician {
///     #[inject(named = "formal")]
///     speech: Option<Arc<dyn Speech>>,
///     audience: Option<Arc<Crowd>>,
/// }
/// ```
pub trait Injectable: Default + Send + Sync + 'static {
    /// Resolves every empty dependency field.
    fn inject_fields(&mut self, injector: &mut Injector<'_>) -> Result<()>;

    /// Whether `Self` can be up-cast to the capability handle whose
    /// [`TypeId`] is `capability` (the id of `Arc<dyn Trait>`).
    fn provides(capability: TypeId) -> bool {
        let _ = capability;
        false
    }

    /// Up-casts a shared instance to the capability handle `capability`.
    fn upcast(this: Arc<Self>, capability: TypeId) -> Option<Provided> {
        let _ = (this, capability);
        None
    }
}

/// Resolution context handed to bindings and to [`Injectable::inject_fields`].
///
/// Pairs the container with the chain of the resolution in progress.
pub struct Injector<'a> {
    container: &'a Container,
    chain: &'a mut Chain,
}

impl<'a> Injector<'a> {
    pub(crate) fn new(container: &'a Container, chain: &'a mut Chain) -> Self {
        Self { container, chain }
    }

    pub fn container(&self) -> &'a Container {
        self.container
    }

    /// The chain of the resolution in progress; its last link is the
    /// binding currently providing.
    pub fn chain(&self) -> &Chain {
        self.chain
    }

    /// Resolves `key` as a dependency of the current frame.
    pub fn resolve(&mut self, key: &ServiceKey) -> Result<Provided> {
        self.container.resolve_in(key, self.chain)
    }

    /// Resolves the value for a dependency field of type `Option<F>`.
    ///
    /// Returns `Ok(None)` when `F` is not a service handle or when nothing
    /// is registered for `(F, namespace)`: missing dependencies are
    /// optional. Any other failure aborts the injection.
    pub fn resolve_field<F: Reflect>(&mut self, field: &'static str, namespace: &str) -> Result<Option<F>> {
        if !F::type_info().is_service_type() {
            trace!(field, ty = std::any::type_name::<F>(), "Skipping non-service field");
            return Ok(None);
        }

        let key = ServiceKey::named::<F>(namespace);
        match self.resolve(&key) {
            Ok(provided) => Container::downcast::<F>(provided, &key).map(Some),
            Err(WasilError::BindingMissing(missing)) => {
                trace!(field, key = %missing.key, "Optional dependency left unset");
                Ok(None)
            }
            Err(err) => Err(err),
        }
    }
}
