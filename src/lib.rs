//! Markshelf — the core of a bookmark organizer popup.
//!
//! Browses a bookmark tree as a grid or a list, searches it, and turns
//! drag-and-drop gestures into single absolute-position moves against the
//! tree store. This library crate exposes all modules for the binaries and
//! integration tests.

pub mod app;
pub mod database;
pub mod managers;
pub mod platform;
pub mod rpc_handler;
pub mod services;
pub mod types;
