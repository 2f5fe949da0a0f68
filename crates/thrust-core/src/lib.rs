//! Shared types for the thrust plotter: the setup/measurement model, the
//! error type, command-line settings and the presentation helpers used to
//! label and style plotted groups.

pub mod error;
pub mod fit;
pub mod formatting;
pub mod models;
pub mod settings;
pub mod style;

pub use error::{Result, ThrustError};
