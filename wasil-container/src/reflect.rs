//! Runtime type descriptors.
//!
//! The container validates registrations and builds services through
//! [`TypeInfo`] descriptors instead of compile-time bounds, so a bad
//! registration surfaces as a [`WasilError`](crate::error::WasilError)
//! kind the caller can branch on.
//!
//! Descriptors come from three places:
//! - `#[derive(Injectable)]` for structs ([`Shape::Struct`]),
//! - [`capability!`](crate::capability) for trait objects ([`Shape::Capability`]),
//! - blanket impls in this module for `Arc<T>` ([`Shape::Shared`]) and
//!   primitives ([`Shape::Primitive`]).
//!
//! A service type is always a handle: `Arc<dyn Trait>` or `Arc<Struct>`.

use std::any::{Any, TypeId, type_name};
use std::fmt;
use std::sync::Arc;

use crate::error::{Result, TargetNotStructError, WasilError};
use crate::inject::{Injectable, Injector};

/// Type-erased shared instance, as cached by singleton bindings.
pub type SharedAny = Arc<dyn Any + Send + Sync>;

/// Describes a type at run time.
///
/// Implemented by the derive macro for structs, by [`capability!`](crate::capability)
/// for `dyn Trait`, and by this crate for `Arc<T>` and primitives.
pub trait Reflect: 'static {
    fn type_info() -> TypeInfo;
}

/// Structural classification of a [`TypeInfo`].
#[derive(Clone)]
pub enum Shape {
    /// A trait object, `dyn Trait`.
    Capability,
    /// A struct the container knows how to build and inject.
    Struct(StructInfo),
    /// A shared handle, `Arc<T>`, with the descriptor of `T`.
    Shared(Box<TypeInfo>),
    /// Scalars, strings and the unit type.
    Primitive,
}

/// Runtime descriptor of a type.
#[derive(Clone)]
pub struct TypeInfo {
    id: TypeId,
    name: &'static str,
    shape: Shape,
}

impl TypeInfo {
    pub fn new<T: ?Sized + 'static>(shape: Shape) -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: type_name::<T>(),
            shape,
        }
    }

    /// Descriptor of a trait object type.
    pub fn capability<T: ?Sized + 'static>() -> Self {
        Self::new::<T>(Shape::Capability)
    }

    /// Descriptor of an injectable struct.
    pub fn structure<S: Injectable>() -> Self {
        Self::new::<S>(Shape::Struct(StructInfo::of::<S>()))
    }

    pub fn primitive<T: 'static>() -> Self {
        Self::new::<T>(Shape::Primitive)
    }

    #[inline]
    pub fn id(&self) -> TypeId {
        self.id
    }

    #[inline]
    pub fn name(&self) -> &'static str {
        self.name
    }

    #[inline]
    pub fn shape(&self) -> &Shape {
        &self.shape
    }

    pub fn as_struct(&self) -> Option<&StructInfo> {
        match &self.shape {
            Shape::Struct(info) => Some(info),
            _ => None,
        }
    }

    /// The descriptor behind an `Arc`, if this is a shared handle.
    pub fn pointee(&self) -> Option<&TypeInfo> {
        match &self.shape {
            Shape::Shared(inner) => Some(inner),
            _ => None,
        }
    }

    /// `Arc<dyn Trait>`.
    pub fn is_capability_handle(&self) -> bool {
        self.pointee()
            .is_some_and(|inner| matches!(inner.shape, Shape::Capability))
    }

    /// `Arc<Struct>`.
    pub fn is_struct_handle(&self) -> bool {
        self.pointee()
            .is_some_and(|inner| matches!(inner.shape, Shape::Struct(_)))
    }

    /// True for the two shapes a service may be registered and injected as.
    pub fn is_service_type(&self) -> bool {
        self.is_capability_handle() || self.is_struct_handle()
    }
}

impl fmt::Debug for TypeInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeInfo")
            .field("name", &self.name)
            .field("shape", &self.shape)
            .finish()
    }
}

impl fmt::Debug for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Shape::Capability => write!(f, "Capability"),
            Shape::Struct(_) => write!(f, "Struct"),
            Shape::Shared(inner) => f.debug_tuple("Shared").field(inner).finish(),
            Shape::Primitive => write!(f, "Primitive"),
        }
    }
}

/// Result of allocating and injecting a fresh struct instance.
///
/// The instance is returned even when injection failed, so a singleton can
/// keep its partially injected value.
pub struct Built {
    pub instance: SharedAny,
    pub outcome: Result<()>,
}

/// Monomorphised operations on an injectable struct.
#[derive(Clone, Copy)]
pub struct StructInfo {
    build: fn(&mut Injector<'_>) -> Built,
    inject: fn(&mut dyn Any, &mut Injector<'_>) -> Result<()>,
    inject_unique: fn(&mut dyn Any, &mut Injector<'_>) -> Result<()>,
    cast: fn(SharedAny, TypeId) -> Option<Provided>,
    share: fn(Box<dyn Any + Send + Sync>) -> Option<SharedAny>,
    provides: fn(TypeId) -> bool,
}

impl StructInfo {
    pub fn of<S: Injectable>() -> Self {
        Self {
            build: build::<S>,
            inject: inject_in_place::<S>,
            inject_unique: inject_unique::<S>,
            cast: cast::<S>,
            share: share::<S>,
            provides: S::provides,
        }
    }

    /// Allocates a `Default` instance and injects its fields.
    pub fn build(&self, injector: &mut Injector<'_>) -> Built {
        (self.build)(injector)
    }

    /// Injects the fields of an existing instance.
    pub fn inject(&self, target: &mut dyn Any, injector: &mut Injector<'_>) -> Result<()> {
        (self.inject)(target, injector)
    }

    /// Injects the fields behind an `Arc<S>` that has no other clones.
    pub fn inject_unique(&self, target: &mut dyn Any, injector: &mut Injector<'_>) -> Result<()> {
        (self.inject_unique)(target, injector)
    }

    /// Converts a shared instance into the handle identified by `target`:
    /// either `Arc<S>` itself or one of the capabilities `S` provides.
    pub fn cast(&self, instance: SharedAny, target: TypeId) -> Option<Provided> {
        (self.cast)(instance, target)
    }

    /// Erases a boxed `Arc<S>` into a [`SharedAny`] holding `S`.
    pub fn share(&self, handle: Box<dyn Any + Send + Sync>) -> Option<SharedAny> {
        (self.share)(handle)
    }

    /// Whether `S` can be up-cast to the capability handle `target`.
    pub fn provides(&self, target: TypeId) -> bool {
        (self.provides)(target)
    }
}

fn build<S: Injectable>(injector: &mut Injector<'_>) -> Built {
    let mut instance = S::default();
    let outcome = instance.inject_fields(injector);
    Built {
        instance: Arc::new(instance),
        outcome,
    }
}

fn inject_in_place<S: Injectable>(target: &mut dyn Any, injector: &mut Injector<'_>) -> Result<()> {
    match target.downcast_mut::<S>() {
        Some(instance) => instance.inject_fields(injector),
        None => Err(WasilError::TargetNotStruct(TargetNotStructError {
            type_name: type_name::<S>(),
        })),
    }
}

fn inject_unique<S: Injectable>(target: &mut dyn Any, injector: &mut Injector<'_>) -> Result<()> {
    let not_unique = || {
        WasilError::TargetNotStruct(TargetNotStructError {
            type_name: type_name::<Arc<S>>(),
        })
    };
    let handle = target.downcast_mut::<Arc<S>>().ok_or_else(not_unique)?;
    Arc::get_mut(handle).ok_or_else(not_unique)?.inject_fields(injector)
}

fn cast<S: Injectable>(instance: SharedAny, target: TypeId) -> Option<Provided> {
    let this = instance.downcast::<S>().ok()?;
    if target == TypeId::of::<Arc<S>>() {
        return Some(Provided::new(this));
    }
    S::upcast(this, target)
}

fn share<S: Injectable>(handle: Box<dyn Any + Send + Sync>) -> Option<SharedAny> {
    let handle = handle.downcast::<Arc<S>>().ok()?;
    let shared: SharedAny = *handle;
    Some(shared)
}

/// A value produced by a binding, tagged with its concrete type name.
pub struct Provided {
    value: Box<dyn Any + Send + Sync>,
    type_name: &'static str,
}

impl Provided {
    pub fn new<V: Any + Send + Sync>(value: V) -> Self {
        Self {
            value: Box::new(value),
            type_name: type_name::<V>(),
        }
    }

    #[inline]
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    pub fn is<T: 'static>(&self) -> bool {
        self.value.is::<T>()
    }

    /// Recovers the concrete value, or returns `self` on a type mismatch.
    pub fn downcast<T: 'static>(self) -> std::result::Result<T, Self> {
        let type_name = self.type_name;
        match self.value.downcast::<T>() {
            Ok(value) => Ok(*value),
            Err(value) => Err(Self { value, type_name }),
        }
    }
}

impl fmt::Debug for Provided {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Provided").field(&self.type_name).finish()
    }
}

impl<T: ?Sized + Reflect> Reflect for Arc<T> {
    fn type_info() -> TypeInfo {
        TypeInfo::new::<Arc<T>>(Shape::Shared(Box::new(T::type_info())))
    }
}

macro_rules! primitive {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl Reflect for $ty {
                fn type_info() -> TypeInfo {
                    TypeInfo::primitive::<$ty>()
                }
            }
        )+
    };
}

primitive!(
    (), bool, char, i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize, f32, f64,
    String, &'static str,
);

/// Declares trait objects as capabilities the container can register and
/// inject.
///
/// The traits must be `Send + Sync` so their handles can be shared.
///
/// ```
/// use wasil_container::capability;
///
/// pub trait Logger: Send + Sync {
///     fn log(&self, message: &str);
/// }
///
/// capability!(Logger);
/// ```
#[macro_export]
macro_rules! capability {
    ($($capability:path),+ $(,)?) => {
        $(
            impl $crate::reflect::Reflect for dyn $capability {
                fn type_info() -> $crate::reflect::TypeInfo {
                    $crate::reflect::TypeInfo::capability::<dyn $capability>()
                }
            }
        )+
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    pub trait Speaker: Send + Sync {
        fn speak(&self) -> &'static str;
    }

    crate::capability!(Speaker);

    #[derive(Default)]
    struct Parrot;

    impl Speaker for Parrot {
        fn speak(&self) -> &'static str {
            "hello"
        }
    }

    impl Injectable for Parrot {
        fn inject_fields(&mut self, _injector: &mut Injector<'_>) -> Result<()> {
            Ok(())
        }

        fn provides(capability: TypeId) -> bool {
            capability == TypeId::of::<Arc<dyn Speaker>>()
        }

        fn upcast(this: Arc<Self>, capability: TypeId) -> Option<Provided> {
            (capability == TypeId::of::<Arc<dyn Speaker>>())
                .then(|| Provided::new(this as Arc<dyn Speaker>))
        }
    }

    impl Reflect for Parrot {
        fn type_info() -> TypeInfo {
            TypeInfo::structure::<Self>()
        }
    }

    #[test]
    fn service_shapes() {
        assert!(<Arc<dyn Speaker>>::type_info().is_capability_handle());
        assert!(<Arc<Parrot>>::type_info().is_struct_handle());
        assert!(!<Arc<i32>>::type_info().is_service_type());
        assert!(!<Arc<Arc<Parrot>>>::type_info().is_service_type());
        assert!(!Parrot::type_info().is_service_type());
        assert!(!String::type_info().is_service_type());
    }

    #[test]
    fn pointee_describes_inner_type() {
        let info = <Arc<Parrot>>::type_info();
        let inner = info.pointee().unwrap();
        assert_eq!(inner.id(), TypeId::of::<Parrot>());
        assert!(inner.as_struct().is_some());
    }

    #[test]
    fn cast_to_own_handle_and_capability() {
        let info = Parrot::type_info();
        let parrot = info.as_struct().unwrap();
        let shared: SharedAny = Arc::new(Parrot);

        let own = parrot.cast(shared.clone(), TypeId::of::<Arc<Parrot>>()).unwrap();
        assert!(own.is::<Arc<Parrot>>());

        let speaker = parrot
            .cast(shared.clone(), TypeId::of::<Arc<dyn Speaker>>())
            .unwrap()
            .downcast::<Arc<dyn Speaker>>()
            .unwrap();
        assert_eq!(speaker.speak(), "hello");

        assert!(parrot.cast(shared, TypeId::of::<Arc<String>>()).is_none());
    }

    #[test]
    fn share_erases_handle() {
        let info = Parrot::type_info();
        let parrot = info.as_struct().unwrap();
        let handle = Arc::new(Parrot);

        let shared = parrot.share(Box::new(handle.clone())).unwrap();
        assert!(shared.downcast::<Parrot>().is_ok());
        assert!(parrot.share(Box::new(5_i32)).is_none());
    }

    #[test]
    fn provided_downcast_mismatch_keeps_value() {
        let provided = Provided::new(7_u8);
        let provided = provided.downcast::<String>().unwrap_err();
        assert_eq!(provided.type_name(), "u8");
        assert_eq!(provided.downcast::<u8>().unwrap(), 7);
    }
}
