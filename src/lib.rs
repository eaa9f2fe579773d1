pub mod config;
pub mod error;
pub mod explore;
pub mod loader;
pub mod output;
pub mod pipeline;
pub mod stages;
pub mod table;

pub use config::PipelineConfig;
pub use error::{PipelineError, Result};
pub use pipeline::run;
