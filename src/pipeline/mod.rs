//! Table transformation stages.
//!
//! Each stage takes a `MovieTable` by value and returns a new one, so the
//! load → clean → derive order is explicit at the call site.

pub mod cleaner;
pub mod derive;

pub use cleaner::{clean, CleanOptions};
pub use derive::derive_profits;
