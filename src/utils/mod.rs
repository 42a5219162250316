//! Small helpers shared across modules.
//!
//! Provides:
//! - [`path`] - String path manipulation for the engine's virtual filesystem
//! - [`log`] - Console logging that works in the browser and on native targets

pub mod log;
pub mod path;
