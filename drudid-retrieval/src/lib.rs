//! # drudid-retrieval
//!
//! Duplicate Scorer and Retrieval Engine. The engine orchestrates one
//! strictly ordered pipeline per request — encode, query, score — and
//! owns the index update path (`register` / `deregister`) plus snapshot
//! passthrough for the storage collaborator.

pub mod engine;
pub mod scoring;
pub mod stage;

pub use engine::RetrievalEngine;
pub use scoring::{Calibration, DuplicateScorer};
pub use stage::RequestStage;
