//! Resource resolution
//!
//! This module decides what a request-target actually refers to on disk:
//! confining it to the document root, classifying the result, and looking
//! up content types.

pub mod classify;
pub mod mime;
pub mod sandbox;

pub use classify::{Resource, classify};
pub use mime::MimeTable;
pub use sandbox::{PathSandbox, ResolveError};
