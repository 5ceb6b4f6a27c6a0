//! # Wasil: field-injecting IoC container for Rust
//!
//! Register implementations for service handles, then resolve fully wired
//! object graphs. Structs declare their dependencies as `Option<Arc<_>>`
//! fields and the container fills them after construction.
//!
//! ```rust
//! use std::sync::Arc;
//!
//! use wasil::{Container, Injectable, Must, capability};
//!
//! pub trait Clock: Send + Sync {
//!     fn now(&self) -> u64;
//! }
//!
//! capability!(Clock);
//!
//! #[derive(Default, Injectable)]
//! #[inject(provides(Clock))]
//! struct FixedClock;
//!
//! impl Clock for FixedClock {
//!     fn now(&self) -> u64 {
//!         42
//!     }
//! }
//!
//! #[derive(Default, Injectable)]
//! struct Scheduler {
//!     clock: Option<Arc<dyn Clock>>,
//! }
//!
//! let container = Container::new();
//! container.must_add::<Arc<dyn Clock>, FixedClock>();
//! container.must_add_transient::<Arc<Scheduler>, Scheduler>();
//!
//! let scheduler: Arc<Scheduler> = container.must_get();
//! assert_eq!(scheduler.clock.as_ref().map(|clock| clock.now()), Some(42));
//! ```

extern crate self as wasil;

mod must;

pub use must::Must;
pub use wasil_container::*;
pub use wasil_derive::*;
pub use wasil_support::*;
