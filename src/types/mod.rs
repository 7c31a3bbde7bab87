//! Common data types

pub mod battery;

pub use battery::*;
