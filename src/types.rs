// src/types.rs
pub mod errors;
pub mod models;

pub use errors::Error;
pub use models::*;
