// GPU driver seam
//
// Minimal set of display/surface/context and GL primitives the rendering
// core needs. The core owns the lifecycle logic; implementations only wrap
// the platform calls. Real implementation lives in `gl.rs`, the test fake
// in `fake.rs`.

use std::fmt;

use thiserror::Error;

/// Surface size in device pixels, queried after surface creation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Dimensions {
    pub width: i32,
    pub height: i32,
}

/// Shader pipeline stage, used for compile diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShaderStage {
    Vertex,
    Fragment,
}

impl fmt::Display for ShaderStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShaderStage::Vertex => f.write_str("vertex"),
            ShaderStage::Fragment => f.write_str("fragment"),
        }
    }
}

/// Errors reported by a [`GpuDriver`] implementation.
///
/// Compile and link errors carry the driver's info log verbatim.
#[derive(Debug, Error)]
pub enum DriverError {
    #[error("display connection failed: {0}")]
    Display(String),
    #[error("no compatible surface config")]
    NoConfig,
    #[error("surface creation failed: {0}")]
    Surface(String),
    #[error("context creation failed: {0}")]
    Context(String),
    #[error("context binding failed: {0}")]
    MakeCurrent(String),
    #[error("buffer swap failed: {0}")]
    Present(String),
    #[error("no current context")]
    NoContext,
    #[error("gpu object allocation failed: {0}")]
    Allocation(String),
    #[error("{stage} shader compilation failed: {log}")]
    Compile { stage: ShaderStage, log: String },
    #[error("program link failed: {log}")]
    Link { log: String },
}

/// Platform driver primitives behind the rendering core.
///
/// The handle types are opaque to the core; it only stores them, threads
/// them back into calls, and hands them over for destruction. Drivers must
/// not destroy a handle the core still owns.
///
/// Failure contract for `compile_shader` and `link_program`: on error the
/// partially built shader/program object is deleted inside the driver
/// before returning, so the caller never sees a half-built handle.
pub trait GpuDriver {
    /// Borrowed native window handle. Valid only between the host's
    /// window-available and window-destroyed signals.
    type Window;
    type Display;
    type Config;
    type Surface;
    type Context;
    type Shader;
    type Program;
    type Buffer;
    type VertexArray;

    // ─── Display / surface / context ────────────────────────────────────

    fn connect_display(&mut self, window: &Self::Window) -> Result<Self::Display, DriverError>;

    fn choose_config(&mut self, display: &Self::Display) -> Result<Self::Config, DriverError>;

    fn create_surface(
        &mut self,
        display: &Self::Display,
        config: &Self::Config,
        window: &Self::Window,
    ) -> Result<Self::Surface, DriverError>;

    fn create_context(
        &mut self,
        display: &Self::Display,
        config: &Self::Config,
    ) -> Result<Self::Context, DriverError>;

    fn make_current(
        &mut self,
        display: &Self::Display,
        surface: &Self::Surface,
        context: &Self::Context,
    ) -> Result<(), DriverError>;

    fn surface_size(&self, surface: &Self::Surface) -> Dimensions;

    fn swap_buffers(
        &mut self,
        surface: &Self::Surface,
        context: &Self::Context,
    ) -> Result<(), DriverError>;

    fn destroy_surface(&mut self, display: &Self::Display, surface: Self::Surface);

    /// Unbinds the context first; GL object handles die with it.
    fn destroy_context(&mut self, display: &Self::Display, context: Self::Context);

    fn disconnect_display(&mut self, display: Self::Display);

    // ─── Programs and geometry ──────────────────────────────────────────

    fn compile_shader(
        &mut self,
        stage: ShaderStage,
        source: &str,
    ) -> Result<Self::Shader, DriverError>;

    fn delete_shader(&mut self, shader: Self::Shader);

    fn link_program(
        &mut self,
        vertex: &Self::Shader,
        fragment: &Self::Shader,
    ) -> Result<Self::Program, DriverError>;

    fn delete_program(&mut self, program: Self::Program);

    fn attrib_location(&self, program: &Self::Program, name: &str) -> Option<u32>;

    fn create_vertex_array(&mut self) -> Result<Self::VertexArray, DriverError>;

    fn delete_vertex_array(&mut self, vertex_array: Self::VertexArray);

    /// Creates an array buffer and uploads `data` as STATIC_DRAW.
    fn create_buffer(&mut self, data: &[f32]) -> Result<Self::Buffer, DriverError>;

    fn delete_buffer(&mut self, buffer: Self::Buffer);

    /// Points `location` at `buffer` (tightly packed f32 components) within
    /// `vertex_array` and enables it.
    fn bind_attribute(
        &mut self,
        vertex_array: &Self::VertexArray,
        buffer: &Self::Buffer,
        location: u32,
        components: i32,
    );

    // ─── Per-frame calls ────────────────────────────────────────────────

    fn clear(&mut self, color: [f32; 4]);

    fn draw_triangles(
        &mut self,
        program: &Self::Program,
        vertex_array: &Self::VertexArray,
        vertices: i32,
    );
}
