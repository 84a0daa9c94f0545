//! Domain types for the Quill blog backend: comments and their threads,
//! posts and their engagement analytics, newsletter subscribers and the
//! visitor counter, plus the [`store::BlogStore`] contract every backend
//! implements.
//!
//! Nothing here touches HTTP or a database.

pub mod analytics;
pub mod comment;
pub mod error;
pub mod post;
pub mod stats;
pub mod store;
pub mod subscriber;
pub mod thread;

pub use error::{Error, ErrorKind, Result};
