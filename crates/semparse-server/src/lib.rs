//! Semparse server library - local HTTP bridge between the desktop front end
//! and the clustering session controller.
//!
//! Separated from main.rs to enable integration testing.

pub mod config;
pub mod logging;
pub mod routes;
pub mod state;
