//! Interaction mode manager.
//!
//! Holds the current [`InteractionMode`] and broadcasts every change to
//! synchronous handlers and to async receivers.

use parking_lot::RwLock;
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, OnceLock};
use tokio::sync::broadcast;
use uuid::Uuid;

use super::interaction::InteractionMode;
use crate::types::{thread_safe_rw, DataCallback, ThreadSafeRwMap};

/// Token returned by [`ModeManager::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(Uuid);

impl fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "mode-listener-{}", self.0.simple())
    }
}

const CHANNEL_CAPACITY: usize = 64;

/// Broadcasts the current interaction mode
///
/// `set_mode` is idempotent: setting the mode that is already current does
/// nothing. Otherwise every registered handler is invoked synchronously on
/// the calling thread, in no particular order, with the new mode.
pub struct ModeManager {
    mode: RwLock<InteractionMode>,
    handlers: ThreadSafeRwMap<SubscriptionId, DataCallback<InteractionMode>>,
    sender: broadcast::Sender<InteractionMode>,
}

impl ModeManager {
    /// Create a manager in [`InteractionMode::Idle`]
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self {
            mode: RwLock::new(InteractionMode::Idle),
            handlers: thread_safe_rw(HashMap::new()),
            sender,
        }
    }

    /// The current mode
    pub fn mode(&self) -> InteractionMode {
        *self.mode.read()
    }

    /// Switch to `mode`, notifying listeners.
    ///
    /// Returns false when `mode` was already current.
    pub fn set_mode(&self, mode: InteractionMode) -> bool {
        {
            let mut current = self.mode.write();
            if *current == mode {
                return false;
            }
            tracing::debug!("Interaction mode {} -> {}", *current, mode);
            *current = mode;
        }

        for notify in self.handlers.read().values() {
            notify(mode);
        }

        // Async receivers are optional; a send without receivers is fine.
        let _ = self.sender.send(mode);
        true
    }

    /// Return to [`InteractionMode::Idle`]
    pub fn reset(&self) -> bool {
        self.set_mode(InteractionMode::Idle)
    }

    /// Subscribe with a synchronous handler
    ///
    /// The handler runs on the thread that changes the mode, so it should
    /// return quickly.
    pub fn subscribe<F>(&self, handler: F) -> SubscriptionId
    where
        F: Fn(InteractionMode) + Send + Sync + 'static,
    {
        let id = SubscriptionId(Uuid::new_v4());
        self.handlers.write().insert(id, Box::new(handler));
        tracing::debug!("Mode subscription {} added", id);
        id
    }

    /// Drop a handler; false when `id` was not registered.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let removed = self.handlers.write().remove(&id).is_some();
        if removed {
            tracing::debug!("Mode subscription {} removed", id);
        }
        removed
    }

    /// Get a receiver for async consumers
    pub fn receiver(&self) -> broadcast::Receiver<InteractionMode> {
        self.sender.subscribe()
    }

    pub fn listener_count(&self) -> usize {
        self.handlers.read().len()
    }
}

impl Default for ModeManager {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ModeManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModeManager")
            .field("mode", &self.mode())
            .field("listeners", &self.listener_count())
            .finish()
    }
}

static MODE_MANAGER: OnceLock<Arc<ModeManager>> = OnceLock::new();

/// Get or initialize the process-wide mode manager
pub fn mode_manager() -> Arc<ModeManager> {
    Arc::clone(MODE_MANAGER.get_or_init(|| Arc::new(ModeManager::new())))
}
