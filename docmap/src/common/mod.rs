//! Common types, constants, and utilities shared across the crate.

mod constants;
mod lock;
mod value;

pub use constants::*;
pub use lock::{atomic, Atomic, ReadExecutor};
pub use value::Value;
