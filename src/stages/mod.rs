//! Cleaning, transformation and aggregation stages.
//!
//! Every stage is a function from input tables to a new table or summary, so
//! the pipeline is a straight composition of them.

pub mod aggregator;
pub mod cleaner;
pub mod transformer;
pub mod types;
pub mod utility;
