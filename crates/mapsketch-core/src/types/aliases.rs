//! Shared-ownership aliases.
//!
//! Editors, the activation registry and the session live on the host's event
//! thread and share state through `Rc<RefCell<T>>`. The interaction mode bus
//! is reachable from any thread and keeps its handlers behind a `parking_lot`
//! lock.
//!
//! ```rust
//! use mapsketch_core::types::{shared, Shared};
//!
//! let counter: Shared<u32> = shared(0);
//! *counter.borrow_mut() += 1;
//! assert_eq!(*counter.borrow(), 1);
//! ```

use parking_lot::RwLock;
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::{Rc, Weak};
use std::sync::Arc;

/// Event-thread state with several owners, e.g. the map surface shared by
/// every editor of a session.
pub type Shared<T> = Rc<RefCell<T>>;

pub type WeakShared<T> = Weak<RefCell<T>>;

/// Lock-protected state reachable from any thread.
pub type ThreadSafeRw<T> = Arc<RwLock<T>>;

/// Lock-protected map, used for handler tables.
pub type ThreadSafeRwMap<K, V> = ThreadSafeRw<HashMap<K, V>>;

/// Handler that may be called from any thread.
pub type DataCallback<T> = Box<dyn Fn(T) + Send + Sync>;

/// Event-thread listener that may mutate what it captured.
pub type LocalCallback<T> = Box<dyn FnMut(T)>;

pub fn shared<T>(value: T) -> Shared<T> {
    Rc::new(RefCell::new(value))
}

pub fn thread_safe_rw<T>(value: T) -> ThreadSafeRw<T> {
    Arc::new(RwLock::new(value))
}
