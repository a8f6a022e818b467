//! Glossa translate crate - the Translation Service boundary.
//!
//! Defines the [`Translator`] trait the engine orchestrates against, its
//! typed failure set, the [`CredentialStore`] boundary, and the HTTP
//! implementation used in production.

pub mod credential;
pub mod http;
pub mod service;

pub use credential::{CredentialStore, EnvCredentialStore};
pub use http::HttpTranslator;
pub use service::{TranslateError, Translator};
