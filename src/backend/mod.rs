// Backend module - GPU driver abstraction layer
//
// Design: trait seam between the rendering core and the platform plumbing.
// The core only talks to `GpuDriver`; the glutin/glow driver and the test
// fake plug in underneath.

pub mod driver;
pub mod gl;

#[cfg(test)]
pub mod fake;

pub use driver::{Dimensions, DriverError, GpuDriver, ShaderStage};
pub use gl::GlDriver;
