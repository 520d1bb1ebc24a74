//! devrace-core: the simulation engine behind DevRace.
//!
//! Three delivery methodologies race through the same feature build as
//! independent "tracks", each an ordered sequence of timed tasks advancing
//! under one shared virtual clock. The engine is pure and tick-driven: a
//! host feeds it control commands and fixed-delta ticks; it never reads a
//! wall clock and performs no I/O of its own.

pub mod command;
pub mod config;
pub mod engine;
pub mod error;
pub mod execution_log;
pub mod scaler;
pub mod task;
pub mod track;
pub mod types;
