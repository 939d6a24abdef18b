//! Access to the remote work-order sheets and the document-understanding
//! model.
//!
//! Neither collaborator is allowed to fail loudly: fetches degrade to empty
//! snapshots and extractions degrade to empty field guesses, each logged.

pub mod assignment;
pub mod config;
pub mod extractor;
pub mod generative;
pub mod sheet;
pub mod snapshot;
pub mod store;
