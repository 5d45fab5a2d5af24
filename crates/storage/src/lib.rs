//! Item sources for the level-up estimator.
//!
//! This crate provides the fetch-collaborator interface the estimator reads
//! snapshots through, with a JSON file implementation and an in-memory one.

#![warn(missing_docs)]

pub mod trait_;
pub mod json_source;
pub mod memory;

pub use trait_::{ItemSource, StorageError, Result};
pub use json_source::JsonFileSource;
pub use memory::MemorySource;
