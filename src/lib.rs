pub mod alerts;
pub mod cache;
pub mod error;
pub mod export;
pub mod filter;
pub mod loader;
pub mod models;
pub mod pipeline;
pub mod recommendations;
pub mod summary;
pub mod thresholds;

#[cfg(test)]
mod testutil;

pub use error::{PipelineError, Result};
