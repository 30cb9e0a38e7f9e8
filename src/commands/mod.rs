//! CLI commands for nbody-grade

pub mod dispatch;
pub mod run;
pub mod scenes;
pub mod score;
pub mod validate;
