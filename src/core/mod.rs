//! Core logic of the file manager.
//!
//! This module provides:
//! - [`build_file_tree`] snapshots of the engine's virtual filesystem
//! - [`classify`] file categories and [`dispatch`] uploads to their mounts
//! - [`cheats`] list parsing and serialization
//! - [`SaveStateManager`] slot-indexed save states
//! - [`archive`] whole-filesystem backup export and import
//!
//! Everything talks to the engine through the ports in [`engine`].

pub mod archive;
pub mod cheats;
pub mod classifier;
mod dispatcher;
pub mod engine;
pub mod error;
#[cfg(any(test, feature = "mock"))]
pub mod memory;
pub mod save_states;
mod tree;

pub use classifier::{accept_list, classify, matches_category, rules_for, ExtensionRule};
pub use dispatcher::{dispatch, dispatch_all};
pub use save_states::{current_slot, set_current_slot, SaveStateManager};
pub use tree::{build_file_tree, build_tree};
