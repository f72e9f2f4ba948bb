// filemarks shared type definitions
// Each submodule defines types used across the crate.

pub mod bookmark;
pub mod config;
pub mod document;
pub mod errors;
pub mod group;
pub mod locator;
