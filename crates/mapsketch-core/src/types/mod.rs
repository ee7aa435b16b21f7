//! Type system utilities and aliases.
//!
//! - [`aliases`]: Type aliases for `Rc<RefCell<T>>`, `Arc<RwLock<T>>`, callbacks, etc.

pub mod aliases;

pub use aliases::*;
