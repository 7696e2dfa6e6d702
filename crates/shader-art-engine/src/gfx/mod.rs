//! Graphics-side uniform plumbing.
//!
//! This module is responsible for:
//! - reflecting the uniforms a program declares ([`Program`])
//! - the upload contract plugins talk to ([`GraphicsContext`])
//! - CPU staging of uniform values in std140 layout ([`UniformBlock`])
//! - pushing staged values into a wgpu uniform buffer ([`GpuUniforms`])

mod block;
mod context;
mod gpu;
mod program;

pub use block::UniformBlock;
pub use context::GraphicsContext;
pub use gpu::{Gpu, GpuInit, GpuUniforms};
pub use program::{Program, ProgramId, UniformInfo, UniformKind, UniformLocation};
