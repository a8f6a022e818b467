//! Glossa core crate - shared types, errors, configuration, and domain events.
//!
//! Every other Glossa crate depends on this one. It carries no platform
//! code: the hotkey listener, clipboard mediator, and translation backends
//! live in their own crates and convert their errors into [`GlossaError`].

pub mod config;
pub mod error;
pub mod events;
pub mod types;

pub use config::GlossaConfig;
pub use error::{GlossaError, Result};
pub use events::GlossaEvent;
pub use types::*;
