//! Ground vehicle performance & penetration profiler — library entry point.
//!
//! `blk` and `model` turn parsed datamine records into performance profiles
//! without touching the filesystem; `datamine`, `store` and `report` do the
//! I/O for the CLI and tests.

pub mod blk;
pub mod config;
pub mod datamine;
pub mod error;
pub mod keys;
pub mod model;
pub mod report;
pub mod store;
pub mod util;

pub use error::{Error, Result};
