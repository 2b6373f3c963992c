//! Gap filling.
//!
//! - engine interface and parameters (`engine`)
//! - reference engine (`plane`)
//! - the fill pass itself (`orchestrator`)

pub mod engine;
pub mod orchestrator;
pub mod plane;

pub use engine::*;
pub use orchestrator::*;
pub use plane::PlaneEngine;
