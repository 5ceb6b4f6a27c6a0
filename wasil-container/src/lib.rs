//! Core container implementation for Wasil.

pub mod binding;
pub(crate) mod builds;
pub mod chain;
pub mod container;
pub mod error;
pub mod inject;
pub mod key;
pub mod lifetime;
pub mod provider;
pub mod reflect;
pub(crate) mod registry;
pub(crate) mod validate;

pub use container::{Container, RegistrationInfo, prelude};
pub use error::{Result, WasilError};
pub use inject::{Injectable, Injector};
pub use key::ServiceKey;
pub use lifetime::Lifetime;
pub use provider::Provider;
pub use reflect::{Provided, Reflect, Shape, StructInfo, TypeInfo};
