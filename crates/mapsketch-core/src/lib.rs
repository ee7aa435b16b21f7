//! # MapSketch Core
//!
//! Core types, errors, and utilities for MapSketch.
//! Provides the error taxonomy shared by the editors and the topology
//! engine, shared-ownership aliases, and the process-wide interaction mode
//! bus.

pub mod constants;
pub mod error;
pub mod mode;
pub mod types;

pub use error::{EditorError, EditorResult, Error, Result, TopologyError, TopologyResult};

pub use mode::{mode_manager, InteractionMode, ModeManager, SubscriptionId};

pub use types::{
    shared, thread_safe_rw, DataCallback, LocalCallback, Shared, ThreadSafeRw, ThreadSafeRwMap,
    WeakShared,
};
