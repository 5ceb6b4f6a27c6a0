//! Binding lifetimes.
//!
//! A lifetime determines how a binding produces its value:
//! - [`Lifetime::Singleton`]: built once on first resolve, then shared
//! - [`Lifetime::Transient`]: built fresh on every resolve
//! - [`Lifetime::Instance`]: supplied at registration, never built

use std::fmt;

use serde::Serialize;

/// How a binding produces values.
///
/// # Examples
/// ```
/// use wasil_container::lifetime::Lifetime;
///
/// assert!(Lifetime::Singleton.is_cached());
/// assert!(Lifetime::Transient.is_constructed());
/// assert_eq!(Lifetime::Instance.to_string(), "instance");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Lifetime {
    /// One instance shared by every resolver of the key.
    ///
    /// Created and injected on first resolve, lives as long as the container.
    Singleton,

    /// New instance created and injected on every resolve.
    Transient,

    /// A value supplied at registration time.
    ///
    /// Shared handles (`Arc<_>`) are returned as the same handle, plain
    /// values are cloned on every resolve.
    Instance,
}

impl Lifetime {
    /// Returns `true` if values of this lifetime are kept by the container.
    #[inline]
    pub fn is_cached(&self) -> bool {
        matches!(self, Lifetime::Singleton | Lifetime::Instance)
    }

    /// Returns `true` if the container allocates and injects the value.
    #[inline]
    pub fn is_constructed(&self) -> bool {
        matches!(self, Lifetime::Singleton | Lifetime::Transient)
    }
}

impl fmt::Display for Lifetime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Lifetime::Singleton => write!(f, "singleton"),
            Lifetime::Transient => write!(f, "transient"),
            Lifetime::Instance => write!(f, "instance"),
        }
    }
}
