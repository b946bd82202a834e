// src/lib.rs
pub mod cli;
pub mod coverage;
pub mod resolve;
pub mod types;
pub mod utils;

pub use types::*;
