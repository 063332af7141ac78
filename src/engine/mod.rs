// Mon Jan 19 2026 - Alex

pub mod pipeline;

pub use pipeline::{Pipeline, PipelineOptions, PipelineReport, Recovery, SilentObserver, StageObserver};
