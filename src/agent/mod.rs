//! Agent Module
//!
//! Desired state of the vg-manager agent: image resolution, host mounts, the
//! DaemonSet that runs the agent on every storage node and offline rendering.

pub mod daemonset;
pub mod image;
pub mod render;
pub mod volumes;

#[cfg(test)]
pub(crate) mod fakes;

pub use daemonset::*;
pub use image::*;
pub use render::*;
pub use volumes::*;
