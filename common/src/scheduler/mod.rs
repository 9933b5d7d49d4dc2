// Scheduler module for the background recommendation pipeline

pub mod engine;

pub use engine::{Pipeline, PipelineEngine, RefreshSummary};
