//! In-flight singleton builds.
//!
//! A singleton is built by exactly one thread; other resolvers of the same
//! binding wait for that build. Before waiting, a resolver follows the
//! wait-for edges (thread → binding it waits on → thread building it) and
//! refuses to wait when they lead back to itself. Such a wait would never
//! end: two threads each building one half of a singleton cycle.

use std::collections::HashMap;
use std::thread::{self, ThreadId};

use parking_lot::{Condvar, Mutex};
use tracing::trace;

/// Identity of a singleton binding, its address.
pub(crate) type BuildId = usize;

#[derive(Debug, Default)]
struct BuildState {
    /// Binding → thread currently building it.
    builders: HashMap<BuildId, ThreadId>,
    /// Thread → binding it is waiting on.
    waiting: HashMap<ThreadId, BuildId>,
}

impl BuildState {
    /// Whether `me` waiting on a build owned by `owner` closes a wait cycle.
    fn would_deadlock(&self, me: ThreadId, owner: ThreadId) -> bool {
        let mut thread = owner;
        for _ in 0..=self.waiting.len() {
            if thread == me {
                return true;
            }
            let Some(build) = self.waiting.get(&thread) else {
                return false;
            };
            let Some(next) = self.builders.get(build) else {
                return false;
            };
            thread = *next;
        }
        false
    }
}

/// Outcome of [`Builds::claim`].
pub(crate) enum Claim<'a> {
    /// The caller builds; the build is released when the ticket drops.
    Build(BuildTicket<'a>),
    /// Another thread finished (or abandoned) the build; check again.
    Waited,
}

/// Waiting would never end.
#[derive(Debug)]
pub(crate) struct Deadlock;

/// Coordinates singleton builds across the threads of one container.
#[derive(Debug, Default)]
pub(crate) struct Builds {
    state: Mutex<BuildState>,
    finished: Condvar,
}

impl Builds {
    /// Claims the build of `id` for the current thread, or waits for the
    /// thread already building it.
    pub fn claim(&self, id: BuildId) -> Result<Claim<'_>, Deadlock> {
        let me = thread::current().id();
        let mut state = self.state.lock();

        let Some(owner) = state.builders.get(&id).copied() else {
            state.builders.insert(id, me);
            return Ok(Claim::Build(BuildTicket { builds: self, id }));
        };

        if state.would_deadlock(me, owner) {
            return Err(Deadlock);
        }

        trace!(?owner, "Waiting for singleton build on another thread");
        state.waiting.insert(me, id);
        while state.builders.get(&id) == Some(&owner) {
            self.finished.wait(&mut state);
        }
        state.waiting.remove(&me);

        Ok(Claim::Waited)
    }

    #[cfg(test)]
    fn waiting(&self) -> usize {
        self.state.lock().waiting.len()
    }
}

/// Held by the thread building a singleton.
pub(crate) struct BuildTicket<'a> {
    builds: &'a Builds,
    id: BuildId,
}

impl Drop for BuildTicket<'_> {
    fn drop(&mut self) {
        self.builds.state.lock().builders.remove(&self.id);
        self.builds.finished.notify_all();
    }
}
