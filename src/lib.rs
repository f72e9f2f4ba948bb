//! filemarks: named, described bookmarks on files, organized into nested groups.
//!
//! This library crate exposes all modules for use by hosts and integration tests.

pub mod app;
pub mod database;
pub mod managers;
pub mod platform;
pub mod services;
pub mod types;
