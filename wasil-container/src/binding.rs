//! Bindings: strategies for producing a service value.
//!
//! Three implementations exist:
//! - [`SingletonBinding`] builds its struct once and shares it,
//! - [`TransientBinding`] builds a fresh struct on every resolve,
//! - [`InstanceBinding`] hands out a value supplied at registration.
//!
//! Bindings are stored as `Arc<dyn Binding>`; the address of that
//! allocation is the binding's identity for cycle detection.

use std::any::TypeId;

use once_cell::sync::OnceCell;
use tracing::{trace, warn};

use crate::builds::{BuildId, Claim, Deadlock};
use crate::error::{CyclicDependencyError, InvalidTypeError, Result, WasilError};
use crate::inject::Injector;
use crate::lifetime::Lifetime;
use crate::reflect::{Built, Provided, SharedAny, StructInfo, TypeInfo};

/// A stored strategy for producing the value of one service key.
pub trait Binding: Send + Sync {
    fn lifetime(&self) -> Lifetime;

    /// Produces the service value.
    ///
    /// The injector's chain already ends with the link for this binding.
    fn provide(&self, injector: &mut Injector<'_>) -> Result<Provided>;
}

/// How singleton and transient bindings build and hand out their struct.
#[derive(Clone, Copy)]
pub(crate) struct Constructor {
    implementation: &'static str,
    info: StructInfo,
    service: TypeId,
    service_name: &'static str,
}

impl Constructor {
    /// Returns `None` when `implementation` is not a struct.
    ///
    /// No compatibility check happens here; registrations go through
    /// the validator first.
    pub(crate) fn new(service: &TypeInfo, implementation: &TypeInfo) -> Option<Self> {
        let info = *implementation.as_struct()?;
        Some(Self {
            implementation: implementation.name(),
            info,
            service: service.id(),
            service_name: service.name(),
        })
    }

    fn build(&self, injector: &mut Injector<'_>) -> Built {
        trace!(implementation = self.implementation, "Allocating instance");
        self.info.build(injector)
    }

    fn cast(&self, instance: SharedAny, injector: &Injector<'_>) -> Result<Provided> {
        self.info
            .cast(instance, self.service)
            .ok_or_else(|| invalid_type(injector, self.service_name, self.implementation))
    }
}

fn invalid_type(injector: &Injector<'_>, expected: &'static str, actual: &'static str) -> WasilError {
    let namespace = injector
        .chain()
        .current()
        .map(|link| link.key().namespace().to_string())
        .unwrap_or_default();
    WasilError::InvalidType(InvalidTypeError {
        namespace,
        expected,
        actual,
    })
}

/// Builds its struct on first resolve and returns the same instance forever.
///
/// One thread builds; concurrent first resolvers wait for it. A resolver
/// that would wait on a build which is itself waiting on that resolver
/// fails with [`WasilError::CyclicDependency`] instead. If injection fails
/// during the build, the partially injected instance is kept and returned
/// by later resolves; only the builder sees the error.
pub struct SingletonBinding {
    constructor: Constructor,
    instance: OnceCell<SharedAny>,
}

impl SingletonBinding {
    pub(crate) fn new(constructor: Constructor) -> Self {
        Self {
            constructor,
            instance: OnceCell::new(),
        }
    }

    pub fn is_built(&self) -> bool {
        self.instance.get().is_some()
    }

    fn build_id(&self) -> BuildId {
        self as *const Self as BuildId
    }

    fn build(&self, injector: &mut Injector<'_>) -> Result<Provided> {
        let mut failure = None;
        let instance = self
            .instance
            .get_or_init(|| {
                let built = self.constructor.build(injector);
                failure = built.outcome.err();
                built.instance
            })
            .clone();

        if let Some(err) = failure {
            return Err(err);
        }

        self.constructor.cast(instance, injector)
    }
}

impl Binding for SingletonBinding {
    fn lifetime(&self) -> Lifetime {
        Lifetime::Singleton
    }

    fn provide(&self, injector: &mut Injector<'_>) -> Result<Provided> {
        let builds = injector.container().builds();

        loop {
            if let Some(instance) = self.instance.get() {
                return self.constructor.cast(instance.clone(), injector);
            }

            // An unbuilt singleton reached again from its own build would
            // re-enter the cell.
            injector.chain().ensure_acyclic()?;

            match builds.claim(self.build_id()) {
                Ok(Claim::Build(_ticket)) => return self.build(injector),
                Ok(Claim::Waited) => continue,
                Err(Deadlock) => {
                    let chain = injector.chain().clone();
                    warn!(chain = %chain.render(true), "Singleton build cycle across threads");
                    return Err(WasilError::CyclicDependency(CyclicDependencyError { chain }));
                }
            }
        }
    }
}

/// Builds a fresh struct on every resolve.
pub struct TransientBinding {
    constructor: Constructor,
}

impl TransientBinding {
    pub(crate) fn new(constructor: Constructor) -> Self {
        Self { constructor }
    }
}

impl Binding for TransientBinding {
    fn lifetime(&self) -> Lifetime {
        Lifetime::Transient
    }

    fn provide(&self, injector: &mut Injector<'_>) -> Result<Provided> {
        injector.chain().ensure_acyclic()?;

        let Built { instance, outcome } = self.constructor.build(injector);
        outcome?;

        self.constructor.cast(instance, injector)
    }
}

type Producer = Box<dyn Fn() -> Option<Provided> + Send + Sync>;

/// Returns a value supplied at registration. Never builds, never recurses.
pub struct InstanceBinding {
    implementation: &'static str,
    service_name: &'static str,
    produce: Producer,
}

impl InstanceBinding {
    pub(crate) fn new(
        service: &TypeInfo,
        implementation: &TypeInfo,
        produce: impl Fn() -> Option<Provided> + Send + Sync + 'static,
    ) -> Self {
        Self {
            implementation: implementation.name(),
            service_name: service.name(),
            produce: Box::new(produce),
        }
    }
}

impl Binding for InstanceBinding {
    fn lifetime(&self) -> Lifetime {
        Lifetime::Instance
    }

    fn provide(&self, injector: &mut Injector<'_>) -> Result<Provided> {
        (self.produce)().ok_or_else(|| invalid_type(injector, self.service_name, self.implementation))
    }
}

#[cfg(test)]
impl SingletonBinding {
    pub(crate) fn for_test<S: crate::inject::Injectable + crate::reflect::Reflect>() -> Self {
        let constructor = Constructor::new(&<std::sync::Arc<S> as crate::reflect::Reflect>::type_info(), &S::type_info())
            .expect("test implementation must be a struct");
        Self::new(constructor)
    }
}

#[cfg(test)]
impl TransientBinding {
    pub(crate) fn for_test<S: crate::inject::Injectable + crate::reflect::Reflect>() -> Self {
        let constructor = Constructor::new(&<std::sync::Arc<S> as crate::reflect::Reflect>::type_info(), &S::type_info())
            .expect("test implementation must be a struct");
        Self::new(constructor)
    }
}
