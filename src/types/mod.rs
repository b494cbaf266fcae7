// Markshelf shared type definitions
// Each submodule defines types used across the crate.

pub mod bookmark;
pub mod drag;
pub mod errors;
pub mod settings;
