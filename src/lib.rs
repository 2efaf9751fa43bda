// src/lib.rs

pub mod config;
pub mod core;
pub mod dataset;
pub mod error;
pub mod heuristics;
pub mod learning;
pub mod persistence;

pub use crate::config::TriageConfig;
pub use crate::core::engine::{Provenance, TriageEngine};
pub use crate::core::model::TrainedModel;
pub use crate::core::types::{Category, InferenceResult, Level, TicketQuery};
pub use crate::error::{Result, TriageError};
