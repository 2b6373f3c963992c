//! Domain types used throughout the conversion.
//!
//! This module defines:
//!
//! - bin database records (`BinCell`, `Sounding`, `SoundingFlags`)
//! - output grid records and header (`GridCell`, `NullCell`, `GridHeader`)
//! - the sentinel constants and the run configuration (`ConvertConfig`)

pub mod types;

pub use types::*;
