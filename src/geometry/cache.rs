//! Compiled toolpath cache
//!
//! Holds the latest compiled node sequence behind one mutex. Readers get an
//! `Arc` to a finished sequence; a rebuild happens entirely under the guard,
//! so a sequence is never visible while it is being built or cleared.
//!
//! The cache is keyed only on the document: changing settings is not noticed
//! until someone calls [`NodeCache::invalidate`].

use std::sync::{Arc, Mutex, MutexGuard, PoisonError, TryLockError};

use crate::geometry::{GeometryCompiler, Node};
use crate::settings::MachineSettings;

#[derive(Debug)]
struct Slot {
    nodes: Option<Arc<[Node]>>,
    dirty: bool,
}

/// Lazily compiled, shareable node sequence
#[derive(Debug)]
pub struct NodeCache {
    slot: Mutex<Slot>,
}

impl Default for NodeCache {
    fn default() -> Self {
        Self::new()
    }
}

impl NodeCache {
    pub fn new() -> Self {
        Self {
            slot: Mutex::new(Slot {
                nodes: None,
                dirty: true,
            }),
        }
    }

    /// Return the cached sequence, compiling `lines` first if needed
    ///
    /// Blocks while another thread holds the guard.
    pub fn get<S: AsRef<str>>(&self, lines: &[S], settings: &MachineSettings) -> Arc<[Node]> {
        let mut slot = self.lock();
        Self::fill(&mut slot, lines, settings)
    }

    /// Like [`get`](Self::get) but gives up instead of waiting
    ///
    /// Returns `None` when the guard is busy, e.g. during a concurrent
    /// rebuild. Render loops use this and keep their previous frame.
    pub fn try_get<S: AsRef<str>>(
        &self,
        lines: &[S],
        settings: &MachineSettings,
    ) -> Option<Arc<[Node]>> {
        let mut slot = match self.slot.try_lock() {
            Ok(guard) => guard,
            Err(TryLockError::Poisoned(poisoned)) => poisoned.into_inner(),
            Err(TryLockError::WouldBlock) => return None,
        };

        Some(Self::fill(&mut slot, lines, settings))
    }

    /// Drop the cached sequence; waits for any in-flight rebuild
    pub fn invalidate(&self) {
        let mut slot = self.lock();
        slot.nodes = None;
        slot.dirty = true;
    }

    pub fn is_dirty(&self) -> bool {
        self.lock().dirty
    }

    fn lock(&self) -> MutexGuard<'_, Slot> {
        // the slot is only ever replaced whole, so a poisoned one is still consistent
        self.slot.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn fill<S: AsRef<str>>(slot: &mut Slot, lines: &[S], settings: &MachineSettings) -> Arc<[Node]> {
        if !slot.dirty {
            if let Some(nodes) = &slot.nodes {
                return Arc::clone(nodes);
            }
        }

        log::debug!("Rebuilding node cache from {} lines", lines.len());
        let nodes: Arc<[Node]> = GeometryCompiler::new(settings).compile(lines).into();
        slot.nodes = Some(Arc::clone(&nodes));
        slot.dirty = false;
        nodes
    }
}
