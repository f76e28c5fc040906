//! Small helpers shared by the arcitect crates.

pub mod error;
