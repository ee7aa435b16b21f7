//! # Interaction Mode Module
//!
//! Process-wide interaction mode broadcast to external collaborators
//! (toolbars, status bars) so they can render contextual UI. The manager is
//! a pure notification bus: it makes no decisions.
//!
//! ## Usage
//!
//! ```rust
//! use mapsketch_core::mode::{InteractionMode, ModeManager};
//! use std::sync::atomic::{AtomicUsize, Ordering};
//! use std::sync::Arc;
//!
//! let manager = ModeManager::new();
//! let seen = Arc::new(AtomicUsize::new(0));
//! let seen_clone = seen.clone();
//! manager.subscribe(move |_mode| {
//!     seen_clone.fetch_add(1, Ordering::SeqCst);
//! });
//!
//! assert!(manager.set_mode(InteractionMode::Draw));
//! assert!(!manager.set_mode(InteractionMode::Draw));
//! assert_eq!(seen.load(Ordering::SeqCst), 1);
//! ```

mod interaction;
mod manager;

pub use interaction::InteractionMode;
pub use manager::{mode_manager, ModeManager, SubscriptionId};
