//! Jobboard - typed client-side state store for the job board API
//!
//! This library keeps the session and the cached server collections of a job
//! board client in one explicitly owned store, and exposes every remote
//! operation as an async action that updates that store.

pub mod actions;
pub mod api;
pub mod catalog;
pub mod config;
pub mod error;
pub mod logging;
pub mod storage;
pub mod store;
pub mod transport;
pub mod types;

// Re-export commonly used types
pub use actions::JobBoard;
pub use catalog::{Catalog, CatalogState};
pub use config::Config;
pub use error::{ActionError, JobBoardError, Result};
pub use storage::{StorageBackend, TokenStorage};
pub use store::{ClientState, Field, Mutation, Store};
pub use types::{Application, Feedback, FeedbackLevel, JobOffer, User};
