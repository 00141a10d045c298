//! ConvFade CLI Library
//!
//! Command-line front end for the convolution crossfader: argument parsing,
//! layered configuration, and the decode → crossfade → encode pipeline.
//!
//! This library exposes the components for testing purposes.

pub mod cli;
pub mod config;
pub mod error;
pub mod pipeline;

pub use cli::Cli;
pub use config::{ConfigOverrides, CrossfadeConfig, TransitionMode};
pub use error::{CliError, Result};
pub use pipeline::{run, Job, RunSummary};
