//! Data layer of the thrust bench pipeline.
//!
//! Discovers and reads bench CSV files, locates their header rows, extracts
//! measurements, aggregates and indexes them by setup, and derives the
//! interchange file, filtered groups and plot series from the result.

pub mod aggregator;
pub mod analysis;
pub mod export;
pub mod extractor;
pub mod filter;
pub mod header;
pub mod indexer;
pub mod reader;
pub mod series;

pub use thrust_core as core;
