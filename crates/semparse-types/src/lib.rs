//! Shared types for the Semparse clustering workflow.

mod cluster;
mod params;
mod session;
mod working_set;

pub use cluster::*;
pub use params::*;
pub use session::*;
pub use working_set::*;
