//! Bin aggregation.
//!
//! Responsibilities:
//!
//! - reduce the soundings of one bin to means and counts (`aggregate`)
//! - apply the uncertainty/depth sentinel and clamping rules (`cap`)
//! - fold the observed depth range (`range`)
//! - drive the whole grid, row by row (`pass`)

pub mod aggregate;
pub mod cap;
pub mod pass;
pub mod range;

pub use aggregate::*;
pub use cap::*;
pub use pass::*;
pub use range::*;
