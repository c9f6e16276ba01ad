//! Veil - hides status bar icons behind a movable separator.
//!
//! The library holds the hiding engine ([`menubar`]), the seams to the host
//! window system ([`platform`]) and the CLI built on top of them.

pub mod cli;
pub mod config;
pub mod constants;
pub mod error;
pub mod events;
pub mod menubar;
pub mod platform;
pub mod schema;
