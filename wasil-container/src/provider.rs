//! Provider trait: a module of related registrations.
//!
//! # Examples
//! ```rust,ignore
//! struct StorageProvider;
//!
//! impl Provider for StorageProvider {
//!     fn register(&self, container: &Container) -> Result<()> {
//!         container.add::<Arc<dyn Store>, DiskStore>()?;
//!         container.add_transient_named::<Arc<Session>, Session>("fresh")?;
//!         Ok(())
//!     }
//! }
//!
//! container.add_provider(&StorageProvider)?;
//! ```

use crate::container::Container;
use crate::error::Result;

/// A module that registers related bindings into a container.
///
/// Split registrations by domain instead of one long block:
///
/// ```rust,ignore
/// container.add_provider(&StorageProvider)?;
/// container.add_provider(&AuthProvider)?;
/// ```
pub trait Provider: Send + Sync {
    /// Registers bindings. The first failing registration aborts the
    /// provider; earlier ones stay registered.
    fn register(&self, container: &Container) -> Result<()>;

    /// Human-readable name for logs.
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }
}
