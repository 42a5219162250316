//! File management for a browser-hosted GBA emulator.
//!
//! Sits between the emulator engine's virtual filesystem and the user:
//! categorizes and routes uploads, edits cheat lists, manages save-state
//! slots and moves whole-filesystem backups in and out as zip archives.
//! The browser bindings live in `web` and are only built for `wasm32`.

pub mod config;
pub mod core;
pub mod models;
pub mod utils;

#[cfg(target_arch = "wasm32")]
pub mod web;
