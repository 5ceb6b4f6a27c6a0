//! Service identification keys.
//!
//! [`ServiceKey`] identifies a registration slot within the container.
//! It combines a [`TypeId`] with a namespace, the empty string being the
//! default namespace.

use std::any::{TypeId, type_name};
use std::fmt;
use std::hash::{Hash, Hasher};

use wasil_support::rendering::shorten_type_name;

/// Uniquely identifies a registration slot in the container.
///
/// # Examples
/// ```
/// use std::sync::Arc;
/// use wasil_container::key::ServiceKey;
///
/// let key = ServiceKey::of::<Arc<String>>();
/// assert!(key.is_default_namespace());
///
/// let key = ServiceKey::named::<Arc<String>>("replica");
/// assert_eq!(key.namespace(), "replica");
/// ```
#[derive(Clone)]
pub struct ServiceKey {
    type_id: TypeId,
    type_name: &'static str,
    namespace: String,
}

impl ServiceKey {
    /// Creates a key for `T` in the default namespace.
    #[inline]
    pub fn of<T: ?Sized + 'static>() -> Self {
        Self::named::<T>("")
    }

    /// Creates a key for `T` in `namespace`.
    #[inline]
    pub fn named<T: ?Sized + 'static>(namespace: impl Into<String>) -> Self {
        Self {
            type_id: TypeId::of::<T>(),
            type_name: type_name::<T>(),
            namespace: namespace.into(),
        }
    }

    #[inline]
    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    /// Returns the fully qualified type name.
    #[inline]
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    #[inline]
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    #[inline]
    pub fn is_default_namespace(&self) -> bool {
        self.namespace.is_empty()
    }

    /// Compact label used when rendering resolution chains:
    /// `Arc<dyn Logger>` or `Arc<dyn Logger>["replica"]`.
    pub fn label(&self) -> String {
        let short = shorten_type_name(self.type_name);
        if self.is_default_namespace() {
            short
        } else {
            format!("{short}[{:?}]", self.namespace)
        }
    }
}

impl PartialEq for ServiceKey {
    fn eq(&self, other: &Self) -> bool {
        self.type_id == other.type_id && self.namespace == other.namespace
    }
}

impl Eq for ServiceKey {}

impl Hash for ServiceKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.type_id.hash(state);
        self.namespace.hash(state);
    }
}

impl fmt::Debug for ServiceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ServiceKey({}, namespace={:?})", self.type_name, self.namespace)
    }
}

impl fmt::Display for ServiceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_default_namespace() {
            write!(f, "{} in global namespace", self.type_name)
        } else {
            write!(f, "{} in namespace {:?}", self.type_name, self.namespace)
        }
    }
}
