//! CLI command implementations.

pub mod check;
pub mod common;
pub mod controls;
pub mod devices;
pub mod play;
pub mod render;
