//! shader-art engine crate.
//!
//! This crate owns the graphics-side contracts (program reflection, uniform
//! locations, upload targets) and the `<shader-art>` host that drives plugins.

pub mod gfx;
pub mod host;
pub mod logging;
