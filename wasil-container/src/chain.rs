//! Resolution chains.
//!
//! Every top-level `get` owns a fresh [`Chain`]. Each binding that starts
//! providing pushes a [`DepLink`] and pops it when done, so the chain always
//! mirrors the call path of the resolution in progress. Bindings use it to
//! detect cycles, errors use it for diagnostics.

use std::fmt;
use std::sync::Arc;

use tracing::warn;
use wasil_support::rendering::{ChainEntry, render_chain};

use crate::binding::Binding;
use crate::error::{CyclicDependencyError, Result, WasilError};
use crate::key::ServiceKey;

/// One frame of an in-progress resolution: the requested key and the
/// binding serving it.
#[derive(Clone)]
pub struct DepLink {
    key: ServiceKey,
    binding: Arc<dyn Binding>,
}

impl DepLink {
    pub fn new(key: ServiceKey, binding: Arc<dyn Binding>) -> Self {
        Self { key, binding }
    }

    pub fn key(&self) -> &ServiceKey {
        &self.key
    }

    pub fn binding(&self) -> &Arc<dyn Binding> {
        &self.binding
    }

    /// Identity comparison of the bindings, ignoring keys.
    pub fn same_binding(&self, other: &DepLink) -> bool {
        std::ptr::addr_eq(Arc::as_ptr(&self.binding), Arc::as_ptr(&other.binding))
    }
}

impl PartialEq for DepLink {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key && self.same_binding(other)
    }
}

impl fmt::Debug for DepLink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.key.label(), self.binding.lifetime())
    }
}

/// Ordered frames of a resolution, outermost first.
#[derive(Clone, Default)]
pub struct Chain {
    links: Vec<DepLink>,
}

impl Chain {
    pub fn new() -> Self {
        Self {
            links: Vec::with_capacity(4),
        }
    }

    pub fn push(&mut self, link: DepLink) {
        self.links.push(link);
    }

    pub fn pop(&mut self) -> Option<DepLink> {
        self.links.pop()
    }

    pub fn links(&self) -> &[DepLink] {
        &self.links
    }

    /// The frame currently providing.
    pub fn current(&self) -> Option<&DepLink> {
        self.links.last()
    }

    pub fn len(&self) -> usize {
        self.links.len()
    }

    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }

    /// Fails with [`WasilError::CyclicDependency`] when the binding of the
    /// last frame already appears in an earlier frame.
    pub fn ensure_acyclic(&self) -> Result<()> {
        let Some((last, earlier)) = self.links.split_last() else {
            return Ok(());
        };

        if earlier.iter().any(|link| link.same_binding(last)) {
            warn!(chain = %self.render(true), "Cyclic dependency detected");
            return Err(WasilError::CyclicDependency(CyclicDependencyError {
                chain: self.clone(),
            }));
        }

        Ok(())
    }

    /// Renders the chain as `A (transient) → B (singleton)`.
    ///
    /// With `highlight_last`, every link equal to the last one is
    /// uppercased.
    pub fn render(&self, highlight_last: bool) -> String {
        let last = self.links.last().filter(|_| highlight_last);
        let entries: Vec<ChainEntry> = self
            .links
            .iter()
            .map(|link| ChainEntry {
                service: link.key.label(),
                lifetime: link.binding.lifetime().to_string(),
                highlight: last.is_some_and(|last| last == link),
            })
            .collect();
        render_chain(&entries)
    }
}

impl fmt::Debug for Chain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(&self.links).finish()
    }
}

impl fmt::Display for Chain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render(false))
    }
}
