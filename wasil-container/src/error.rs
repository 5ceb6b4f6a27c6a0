//! Error types for Wasil container operations.
//!
//! Every failure is a distinct [`WasilError`] variant, so callers can
//! branch on "missing" vs "cyclic" vs "type mismatch" by matching instead
//! of reading messages.

use std::fmt;

use wasil_support::rendering::shorten_type_name;

use crate::chain::Chain;
use crate::key::ServiceKey;

/// Main error type for all Wasil operations.
#[derive(Debug, thiserror::Error)]
pub enum WasilError {
    /// The service type is neither `Arc<dyn Trait>` nor `Arc<Struct>`.
    #[error("{}", .0)]
    InvalidServiceType(InvalidServiceTypeError),

    /// The implementation does not provide the requested capability.
    #[error("{}", .0)]
    NotImplements(NotImplementsError),

    /// `Arc<S>` was registered with an implementation other than `S`.
    #[error("{}", .0)]
    BadPointer(BadPointerError),

    /// The container was asked to construct something that is not a struct.
    #[error("{}", .0)]
    ImplNotStruct(ImplNotStructError),

    /// Nothing is registered for the requested type and namespace.
    #[error("{}", .0)]
    BindingMissing(BindingMissingError),

    /// A binding produced a value of an unexpected type.
    #[error("{}", .0)]
    InvalidType(InvalidTypeError),

    /// A binding depends, directly or transitively, on itself.
    #[error("{}", .0)]
    CyclicDependency(CyclicDependencyError),

    /// Injection target is neither a struct nor a handle.
    #[error("{}", .0)]
    NotReferenceOrCapability(NotReferenceOrCapabilityError),

    /// Injection target gives no mutable access to a struct: an `Arc`
    /// shared with other clones, or a handle to a trait object.
    #[error("{}", .0)]
    TargetNotStruct(TargetNotStructError),
}

impl WasilError {
    /// Returns `true` for [`WasilError::BindingMissing`].
    pub fn is_binding_missing(&self) -> bool {
        matches!(self, WasilError::BindingMissing(_))
    }

    /// Returns `true` for [`WasilError::CyclicDependency`].
    pub fn is_cyclic(&self) -> bool {
        matches!(self, WasilError::CyclicDependency(_))
    }

    /// Returns `true` for the errors raised while registering.
    pub fn is_registration_error(&self) -> bool {
        matches!(
            self,
            WasilError::InvalidServiceType(_)
                | WasilError::NotImplements(_)
                | WasilError::BadPointer(_)
                | WasilError::ImplNotStruct(_)
        )
    }
}

#[derive(Debug)]
pub struct InvalidServiceTypeError {
    pub service: &'static str,
}

impl fmt::Display for InvalidServiceTypeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "type {} is not a valid service type (must be Arc<dyn Trait> or Arc<Struct>)",
            self.service
        )
    }
}

#[derive(Debug)]
pub struct NotImplementsError {
    /// The capability handle, `Arc<dyn Trait>`.
    pub capability: &'static str,
    pub implementation: &'static str,
}

impl fmt::Display for NotImplementsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "capability {} is not provided by type {}",
            self.capability, self.implementation
        )?;
        write!(
            f,
            "\n  Hint: list the trait in #[inject(provides(...))] on {}",
            shorten_type_name(self.implementation)
        )
    }
}

#[derive(Debug)]
pub struct BadPointerError {
    /// The struct the service handle points at.
    pub pointee: &'static str,
    pub implementation: &'static str,
}

impl fmt::Display for BadPointerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "service handle type {} does not match impl type {}",
            self.pointee, self.implementation
        )
    }
}

#[derive(Debug)]
pub struct ImplNotStructError {
    pub implementation: &'static str,
}

impl fmt::Display for ImplNotStructError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "implementation type {} is not an injectable struct",
            self.implementation
        )?;
        write!(f, "\n  Hint: derive Default and Injectable on the implementation")
    }
}

/// Error when nothing is registered for a key.
#[derive(Debug)]
pub struct BindingMissingError {
    pub key: ServiceKey,
    /// Registered namespaces of the same type with a similar name.
    pub suggestions: Vec<String>,
}

impl fmt::Display for BindingMissingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "container did not have any info about type {}", self.key)?;

        if !self.suggestions.is_empty() {
            write!(f, "\n  Did you mean one of:")?;
            for suggestion in &self.suggestions {
                write!(f, "\n    - {suggestion:?}")?;
            }
        }

        Ok(())
    }
}

/// Error when a binding's value cannot be handed out as the requested type.
#[derive(Debug)]
pub struct InvalidTypeError {
    pub namespace: String,
    pub expected: &'static str,
    pub actual: &'static str,
}

impl fmt::Display for InvalidTypeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "container had stored a binding for type {} and name {:?}, but it provided an object of type {}",
            self.expected, self.namespace, self.actual
        )
    }
}

/// Error when a binding recurs within its own resolution.
///
/// Carries the full chain, ending with the repeated link.
#[derive(Debug)]
pub struct CyclicDependencyError {
    pub chain: Chain,
}

impl fmt::Display for CyclicDependencyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Cannot satisfy cyclic dependency: {}",
            self.chain.render(true)
        )?;
        write!(
            f,
            "\n  Hint: break the cycle by supplying one of the fields before resolving, or register it as an instance"
        )
    }
}

#[derive(Debug)]
pub struct NotReferenceOrCapabilityError {
    pub type_name: &'static str,
}

impl fmt::Display for NotReferenceOrCapabilityError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "value of type {} provided for injection is neither a struct nor a handle",
            self.type_name
        )
    }
}

#[derive(Debug)]
pub struct TargetNotStructError {
    pub type_name: &'static str,
}

impl fmt::Display for TargetNotStructError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "value of type {} provided for injection does not give mutable access to a struct",
            self.type_name
        )
    }
}

/// Convenient Result type for Wasil operations.
pub type Result<T> = std::result::Result<T, WasilError>;
