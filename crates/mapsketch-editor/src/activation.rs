//! Single-active-editor registry.
//!
//! Every editor registers with an [`ActivationRegistry`] handed to it at
//! construction. At most one registered editor holds the active slot; only
//! that editor reacts to pointer events. Taking the slot force-exits the
//! previous holder.

use std::collections::HashMap;
use std::fmt;
use std::rc::Weak;

use mapsketch_core::types::{shared, Shared};

/// Identifies an editor within one registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EditorId(u64);

impl fmt::Display for EditorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "editor#{}", self.0)
    }
}

/// What the registry needs from an editor.
pub trait Activatable {
    /// Leave editing immediately: drop handles, notify Idle, restore the
    /// map's interactions. Called after the slot has been taken away.
    fn force_exit(&self);

    /// True while a new shape is being drawn.
    fn is_drawing(&self) -> bool;

    fn is_visible(&self) -> bool;
}

#[derive(Default)]
struct Slots {
    next_id: u64,
    editors: HashMap<EditorId, Weak<dyn Activatable>>,
    active: Option<EditorId>,
}

/// Cheaply clonable handle; clones share the same slot.
#[derive(Clone, Default)]
pub struct ActivationRegistry {
    inner: Shared<Slots>,
}

impl ActivationRegistry {
    pub fn new() -> Self {
        Self {
            inner: shared(Slots::default()),
        }
    }

    pub fn register(&self, editor: Weak<dyn Activatable>) -> EditorId {
        let mut slots = self.inner.borrow_mut();
        slots.next_id += 1;
        let id = EditorId(slots.next_id);
        slots.editors.insert(id, editor);
        id
    }

    /// Forget an editor; it loses the slot without being force-exited.
    pub fn unregister(&self, id: EditorId) {
        let mut slots = self.inner.borrow_mut();
        slots.editors.remove(&id);
        if slots.active == Some(id) {
            slots.active = None;
        }
    }

    /// Give `id` the active slot, force-exiting the previous holder.
    ///
    /// Returns false when `id` is unknown or already active.
    pub fn activate(&self, id: EditorId) -> bool {
        let previous = {
            let mut slots = self.inner.borrow_mut();
            if !slots.editors.contains_key(&id) || slots.active == Some(id) {
                return false;
            }
            let previous = slots.active.replace(id);
            previous.and_then(|prev| slots.editors.get(&prev).and_then(Weak::upgrade).map(|e| (prev, e)))
        };

        // the borrow is released so the previous editor may query the registry
        if let Some((prev, editor)) = previous {
            tracing::debug!("{} takes the active slot from {}", id, prev);
            editor.force_exit();
        } else {
            tracing::debug!("{} is now active", id);
        }
        true
    }

    /// Release the slot if `id` holds it.
    pub fn deactivate(&self, id: EditorId) -> bool {
        let mut slots = self.inner.borrow_mut();
        if slots.active == Some(id) {
            slots.active = None;
            tracing::debug!("{} released the active slot", id);
            true
        } else {
            false
        }
    }

    /// True when `id` holds the slot.
    pub fn is_active(&self, id: EditorId) -> bool {
        self.inner.borrow().active == Some(id)
    }

    pub fn active_id(&self) -> Option<EditorId> {
        self.inner.borrow().active
    }

    /// True when the slot is free, held by `id`, or held by an editor that
    /// is not mid-draw.
    pub fn can_claim(&self, id: EditorId) -> bool {
        let holder = {
            let slots = self.inner.borrow();
            match slots.active {
                None => return true,
                Some(active) if active == id => return true,
                Some(active) => slots.editors.get(&active).and_then(Weak::upgrade),
            }
        };
        holder.is_none_or(|editor| !editor.is_drawing())
    }

    /// Number of live registered editors.
    pub fn len(&self) -> usize {
        self.inner
            .borrow()
            .editors
            .values()
            .filter(|e| e.strong_count() > 0)
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl fmt::Debug for ActivationRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let slots = self.inner.borrow();
        f.debug_struct("ActivationRegistry")
            .field("editors", &slots.editors.len())
            .field("active", &slots.active)
            .finish()
    }
}
