//! `bin2grid` library crate.
//!
//! Converts a binned sounding database into a single-valued depth grid and
//! fills the gaps with an interpolated surface.
//!
//! The binary (`bin2grid`) is a thin wrapper around this library so that:
//!
//! - core logic is testable without spawning processes
//! - the bin database, grid store and surface engine can be swapped behind traits

pub mod app;
pub mod cli;
pub mod coords;
pub mod data;
pub mod domain;
pub mod error;
pub mod fill;
pub mod io;
pub mod math;
pub mod reduce;
pub mod report;
