//! Utility functions and helpers.
//!
//! This module contains the size inversion used by the console report
//! normalizer and lexical path helpers used by the snapshot file normalizer.

pub mod path;
pub mod size;

pub use path::{normalize, relative_to};
pub use size::{invert_bytes, invert_size};
