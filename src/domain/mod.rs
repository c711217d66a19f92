//! Domain layer - Port definitions
//!
//! This module defines the traits (ports) through which the operator reads
//! its environment and its own running pod.

pub mod ports;

pub use ports::*;
