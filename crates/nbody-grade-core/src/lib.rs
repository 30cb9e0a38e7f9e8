//! nbody-grade core library
//!
//! Benchmark catalog, output validation, performance scoring and the grading
//! session that ties them together around an external N-body simulator.

pub mod catalog;
pub mod config;
pub mod error;
pub mod logging;
pub mod report;
pub mod runner;
pub mod score;
pub mod session;
pub mod validate;
