// Render resource manager
//
// Compiles and links the fixed triangle program and uploads the static
// vertex attributes. Resources are all-or-nothing: any failure on the way
// releases what was built and leaves the geometry uninitialized. Failures
// never escape as errors; callers observe `is_geometry_ready`.

use crate::backend::{GpuDriver, ShaderStage};

use super::Graphics;

const VERTEX_SHADER_SRC: &str = "#version 300 es\n\
    in vec4 vPosition;\n\
    in vec4 vColor;\n\
    out vec4 fColor;\n\
    void main()\n\
    {\n\
        gl_Position = vPosition;\n\
        fColor = vColor;\n\
    }\n";

const FRAGMENT_SHADER_SRC: &str = "#version 300 es\n\
    precision mediump float;\n\
    in vec4 fColor;\n\
    out vec4 FragColor;\n\
    void main()\n\
    {\n\
        FragColor = fColor;\n\
    }\n";

#[rustfmt::skip]
const TRIANGLE_POSITIONS: [f32; 9] = [
    -0.5, -0.5, 0.0,
     0.5, -0.5, 0.0,
     0.0,  0.5, 0.0,
];

#[rustfmt::skip]
const TRIANGLE_COLORS: [f32; 9] = [
    1.0, 0.0, 0.0,
    0.0, 1.0, 0.0,
    0.0, 0.0, 1.0,
];

pub(crate) const TRIANGLE_VERTEX_COUNT: i32 = 3;

/// Linked program plus the GPU buffers holding the static vertex data.
/// Either all handles are live or the struct does not exist.
pub(crate) struct GeometryResources<D: GpuDriver> {
    pub program: D::Program,
    pub vertex_array: D::VertexArray,
    pub position_buffer: D::Buffer,
    pub color_buffer: D::Buffer,
}

impl<D: GpuDriver> Graphics<D> {
    /// Builds the triangle program and buffers if they do not exist yet.
    ///
    /// No-op when already built or when no context is bound. Compile and
    /// link diagnostics are logged; on failure nothing stays allocated.
    pub fn ensure_geometry(&mut self) {
        if self.geometry.is_some() {
            return;
        }
        // Geometry handles are only valid inside a bound context.
        if !self.is_ready() {
            return;
        }

        let Some(program) = self.build_program() else {
            return;
        };

        let (loc_position, loc_color) = match (
            self.driver.attrib_location(&program, "vPosition"),
            self.driver.attrib_location(&program, "vColor"),
        ) {
            (Some(position), Some(color)) => (position, color),
            _ => {
                log::error!("Triangle program is missing vPosition/vColor attributes");
                self.driver.delete_program(program);
                return;
            }
        };

        let vertex_array = match self.driver.create_vertex_array() {
            Ok(vertex_array) => vertex_array,
            Err(e) => {
                log::error!("Vertex array allocation failed: {e}");
                self.driver.delete_program(program);
                return;
            }
        };

        let position_buffer = match self.driver.create_buffer(&TRIANGLE_POSITIONS) {
            Ok(buffer) => buffer,
            Err(e) => {
                log::error!("Position buffer upload failed: {e}");
                self.driver.delete_vertex_array(vertex_array);
                self.driver.delete_program(program);
                return;
            }
        };

        let color_buffer = match self.driver.create_buffer(&TRIANGLE_COLORS) {
            Ok(buffer) => buffer,
            Err(e) => {
                log::error!("Color buffer upload failed: {e}");
                self.driver.delete_buffer(position_buffer);
                self.driver.delete_vertex_array(vertex_array);
                self.driver.delete_program(program);
                return;
            }
        };

        self.driver
            .bind_attribute(&vertex_array, &position_buffer, loc_position, 3);
        self.driver
            .bind_attribute(&vertex_array, &color_buffer, loc_color, 3);

        self.geometry = Some(GeometryResources {
            program,
            vertex_array,
            position_buffer,
            color_buffer,
        });
    }

    /// Destroys the geometry handles. Must run while the owning context is
    /// still alive; the surface manager tears down geometry before the
    /// context for that reason.
    pub fn release_geometry(&mut self) {
        let Some(GeometryResources {
            program,
            vertex_array,
            position_buffer,
            color_buffer,
        }) = self.geometry.take()
        else {
            return;
        };
        self.driver.delete_vertex_array(vertex_array);
        self.driver.delete_buffer(position_buffer);
        self.driver.delete_buffer(color_buffer);
        self.driver.delete_program(program);
    }

    pub fn is_geometry_ready(&self) -> bool {
        self.geometry.is_some()
    }

    /// Compiles both shader stages and links them. The shader units are
    /// deleted once the link attempt is over, success or not.
    fn build_program(&mut self) -> Option<D::Program> {
        let vertex = match self.driver.compile_shader(ShaderStage::Vertex, VERTEX_SHADER_SRC) {
            Ok(shader) => shader,
            Err(e) => {
                log::error!("{e}");
                return None;
            }
        };

        let fragment = match self
            .driver
            .compile_shader(ShaderStage::Fragment, FRAGMENT_SHADER_SRC)
        {
            Ok(shader) => shader,
            Err(e) => {
                log::error!("{e}");
                self.driver.delete_shader(vertex);
                return None;
            }
        };

        let linked = self.driver.link_program(&vertex, &fragment);
        self.driver.delete_shader(vertex);
        self.driver.delete_shader(fragment);

        match linked {
            Ok(program) => Some(program),
            Err(e) => {
                log::error!("{e}");
                None
            }
        }
    }
}
