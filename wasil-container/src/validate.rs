//! Registration-time compatibility checks.
//!
//! A service type is a handle, `Arc<dyn Trait>` or `Arc<Struct>`. Before a
//! binding is stored the validator checks that the implementation can
//! actually stand behind that handle.

use std::sync::Arc;

use crate::binding::{Constructor, InstanceBinding};
use crate::error::{
    BadPointerError, ImplNotStructError, InvalidServiceTypeError, NotImplementsError, Result,
    WasilError,
};
use crate::reflect::{Provided, Reflect, Shape, SharedAny, TypeInfo};

/// Validates `(T, TImpl)` for a binding the container constructs.
///
/// # Errors
/// - [`WasilError::ImplNotStruct`]: `TImpl` is not an injectable struct
/// - [`WasilError::NotImplements`]: `T` is `Arc<dyn Trait>` and `TImpl`
///   does not provide it
/// - [`WasilError::BadPointer`]: `T` is `Arc<S>` and `S` is not `TImpl`
/// - [`WasilError::InvalidServiceType`]: `T` is not a service handle
pub(crate) fn constructor<T: Reflect, TImpl: Reflect>() -> Result<Constructor> {
    let service = T::type_info();
    let implementation = TImpl::type_info();

    let Some(info) = implementation.as_struct() else {
        return Err(WasilError::ImplNotStruct(ImplNotStructError {
            implementation: implementation.name(),
        }));
    };

    match service.pointee().map(TypeInfo::shape) {
        Some(Shape::Capability) => {
            if !info.provides(service.id()) {
                return Err(not_implements(&service, &implementation));
            }
        }
        Some(Shape::Struct(_)) => {
            if !points_at(&service, &implementation) {
                return Err(bad_pointer(&service, &implementation));
            }
        }
        _ => return Err(invalid_service_type(&service)),
    }

    Constructor::new(&service, &implementation).ok_or_else(|| {
        WasilError::ImplNotStruct(ImplNotStructError {
            implementation: implementation.name(),
        })
    })
}

/// Validates a pre-supplied instance for `T` and wraps it in a binding.
///
/// Accepted instances:
/// - the service handle itself (`I == T`), handed out as a clone,
/// - a struct value behind `T`, cloned into a fresh `Arc` per resolve,
/// - an `Arc<S>` whose struct provides the capability `T`, shared.
pub(crate) fn instance<T, I>(instance: I) -> Result<InstanceBinding>
where
    T: Reflect,
    I: Reflect + Clone + Send + Sync,
{
    let service = T::type_info();
    let implementation = I::type_info();
    let target = service.id();

    let capability = match service.pointee().map(TypeInfo::shape) {
        Some(Shape::Capability) => true,
        Some(Shape::Struct(_)) => false,
        _ => return Err(invalid_service_type(&service)),
    };

    if implementation.id() == target {
        return Ok(InstanceBinding::new(&service, &implementation, move || {
            Some(Provided::new(instance.clone()))
        }));
    }

    if let Some(info) = implementation.as_struct().copied() {
        let accepted = if capability {
            info.provides(target)
        } else {
            points_at(&service, &implementation)
        };
        if accepted {
            return Ok(InstanceBinding::new(&service, &implementation, move || {
                let shared: SharedAny = Arc::new(instance.clone());
                info.cast(shared, target)
            }));
        }
    }

    if let Some(info) = implementation.pointee().and_then(TypeInfo::as_struct).copied() {
        if capability && info.provides(target) {
            return Ok(InstanceBinding::new(&service, &implementation, move || {
                let shared = info.share(Box::new(instance.clone()))?;
                info.cast(shared, target)
            }));
        }
    }

    if capability {
        Err(not_implements(&service, &implementation))
    } else {
        Err(bad_pointer(&service, &implementation))
    }
}

fn points_at(service: &TypeInfo, implementation: &TypeInfo) -> bool {
    service
        .pointee()
        .is_some_and(|pointee| pointee.id() == implementation.id())
}

fn invalid_service_type(service: &TypeInfo) -> WasilError {
    WasilError::InvalidServiceType(InvalidServiceTypeError {
        service: service.name(),
    })
}

fn not_implements(service: &TypeInfo, implementation: &TypeInfo) -> WasilError {
    WasilError::NotImplements(NotImplementsError {
        capability: service.name(),
        implementation: implementation.name(),
    })
}

fn bad_pointer(service: &TypeInfo, implementation: &TypeInfo) -> WasilError {
    WasilError::BadPointer(BadPointerError {
        pointee: service.pointee().map_or(service.name(), TypeInfo::name),
        implementation: implementation.name(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::any::TypeId;

    use crate::inject::{Injectable, Injector};

    pub trait Method: Send + Sync {
        fn method(&self) -> i32;
    }

    crate::capability!(Method);

    #[derive(Default, Clone)]
    struct Implementor {
        foo: i32,
    }

    #[derive(Default, Clone)]
    struct Bystander;

    impl Method for Implementor {
        fn method(&self) -> i32 {
            self.foo
        }
    }

    impl Injectable for Implementor {
        fn inject_fields(&mut self, _injector: &mut Injector<'_>) -> Result<()> {
            Ok(())
        }

        fn provides(capability: TypeId) -> bool {
            capability == TypeId::of::<Arc<dyn Method>>()
        }

        fn upcast(this: Arc<Self>, capability: TypeId) -> Option<Provided> {
            (capability == TypeId::of::<Arc<dyn Method>>())
                .then(|| Provided::new(this as Arc<dyn Method>))
        }
    }

    impl Injectable for Bystander {
        fn inject_fields(&mut self, _injector: &mut Injector<'_>) -> Result<()> {
            Ok(())
        }
    }

    impl Reflect for Implementor {
        fn type_info() -> TypeInfo {
            TypeInfo::structure::<Self>()
        }
    }

    impl Reflect for Bystander {
        fn type_info() -> TypeInfo {
            TypeInfo::structure::<Self>()
        }
    }

    #[test]
    fn constructor_rejects_invalid_service_types() {
        for result in [
            constructor::<Implementor, Implementor>().map(|_| ()),
            constructor::<i32, Implementor>().map(|_| ()),
            constructor::<String, Implementor>().map(|_| ()),
            constructor::<Arc<i32>, Implementor>().map(|_| ()),
        ] {
            assert!(matches!(result, Err(WasilError::InvalidServiceType(_))));
        }

        let err = constructor::<Arc<Arc<dyn Method>>, Implementor>().err().unwrap();
        assert!(matches!(err, WasilError::InvalidServiceType(_)));
        assert!(err.to_string().contains("Arc<alloc::sync::Arc<dyn"));
    }

    #[test]
    fn constructor_rejects_missing_capability() {
        let err = constructor::<Arc<dyn Method>, Bystander>().err().unwrap();
        assert!(matches!(err, WasilError::NotImplements(_)));
        let message = err.to_string();
        let capability = message.find("Method").unwrap();
        let implementation = message.find("Bystander").unwrap();
        assert!(capability < implementation);
    }

    #[test]
    fn constructor_rejects_non_struct_impl() {
        let err = constructor::<Arc<Implementor>, Arc<Implementor>>().err().unwrap();
        assert!(matches!(err, WasilError::ImplNotStruct(_)));
        assert!(err.to_string().contains("Arc<"));

        assert!(matches!(
            constructor::<Arc<dyn Method>, i32>(),
            Err(WasilError::ImplNotStruct(_))
        ));
    }

    #[test]
    fn constructor_rejects_bad_pointer() {
        let err = constructor::<Arc<Implementor>, Bystander>().err().unwrap();
        assert!(matches!(err, WasilError::BadPointer(_)));
        assert!(err.to_string().contains("Implementor"));
    }

    #[test]
    fn constructor_accepts_valid_pairs() {
        assert!(constructor::<Arc<dyn Method>, Implementor>().is_ok());
        assert!(constructor::<Arc<Implementor>, Implementor>().is_ok());
    }

    #[test]
    fn instance_accepts_handles_and_values() {
        assert!(instance::<Arc<dyn Method>, _>(Implementor::default()).is_ok());
        assert!(instance::<Arc<dyn Method>, _>(Arc::new(Implementor::default())).is_ok());
        let handle: Arc<dyn Method> = Arc::new(Implementor::default());
        assert!(instance::<Arc<dyn Method>, _>(handle).is_ok());
        assert!(instance::<Arc<Implementor>, _>(Implementor::default()).is_ok());
        assert!(instance::<Arc<Implementor>, _>(Arc::new(Implementor::default())).is_ok());
    }

    #[test]
    fn instance_rejects_incompatible_values() {
        assert!(matches!(
            instance::<Arc<dyn Method>, _>(Bystander),
            Err(WasilError::NotImplements(_))
        ));
        assert!(matches!(
            instance::<Arc<dyn Method>, _>(7_i32),
            Err(WasilError::NotImplements(_))
        ));
        assert!(matches!(
            instance::<Arc<Implementor>, _>(Arc::new(Bystander)),
            Err(WasilError::BadPointer(_))
        ));
        assert!(matches!(
            instance::<Arc<Arc<Implementor>>, _>(Arc::new(Implementor::default())),
            Err(WasilError::InvalidServiceType(_))
        ));
        assert!(matches!(
            instance::<Implementor, _>(Implementor::default()),
            Err(WasilError::InvalidServiceType(_))
        ));
    }
}
