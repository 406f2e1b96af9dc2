// Real GPU driver - glutin + glow
//
// glutin provides the EGL-style display/config/surface/context objects,
// glow provides the GLES 3.0 function table. The glow context is created
// lazily on the first successful make-current and dropped together with
// the render context.

use std::num::NonZeroU32;

use glow::HasContext;
use glutin::config::{Api, ColorBufferType, Config, ConfigSurfaceTypes, ConfigTemplateBuilder};
use glutin::context::{ContextApi, ContextAttributesBuilder, PossiblyCurrentContext, Version};
use glutin::display::{Display, DisplayApiPreference};
use glutin::prelude::*;
use glutin::surface::{Surface, SurfaceAttributesBuilder, WindowSurface};
use raw_window_handle::{HasDisplayHandle, HasWindowHandle};
use winit::window::Window;

use super::driver::{Dimensions, DriverError, GpuDriver, ShaderStage};

#[derive(Default)]
pub struct GlDriver {
    gl: Option<glow::Context>,
}

impl GlDriver {
    pub fn new() -> Self {
        Self::default()
    }

    fn gl(&self) -> Result<&glow::Context, DriverError> {
        self.gl.as_ref().ok_or(DriverError::NoContext)
    }
}

impl GpuDriver for GlDriver {
    type Window = Window;
    type Display = Display;
    type Config = Config;
    type Surface = Surface<WindowSurface>;
    type Context = PossiblyCurrentContext;
    type Shader = glow::NativeShader;
    type Program = glow::NativeProgram;
    type Buffer = glow::NativeBuffer;
    type VertexArray = glow::NativeVertexArray;

    fn connect_display(&mut self, window: &Window) -> Result<Display, DriverError> {
        let handle = window
            .display_handle()
            .map_err(|e| DriverError::Display(e.to_string()))?
            .as_raw();

        #[cfg(not(target_os = "macos"))]
        let preference = DisplayApiPreference::Egl;
        #[cfg(target_os = "macos")]
        let preference = DisplayApiPreference::Cgl;

        unsafe { Display::new(handle, preference) }
            .map_err(|e| DriverError::Display(e.to_string()))
    }

    fn choose_config(&mut self, display: &Display) -> Result<Config, DriverError> {
        let template = ConfigTemplateBuilder::new()
            .with_api(Api::GLES3)
            .with_surface_type(ConfigSurfaceTypes::WINDOW)
            .with_buffer_type(ColorBufferType::Rgb {
                r_size: 8,
                g_size: 8,
                b_size: 8,
            })
            .build();

        unsafe { display.find_configs(template) }
            .map_err(|e| DriverError::Display(e.to_string()))?
            .next()
            .ok_or(DriverError::NoConfig)
    }

    fn create_surface(
        &mut self,
        display: &Display,
        config: &Config,
        window: &Window,
    ) -> Result<Surface<WindowSurface>, DriverError> {
        let handle = window
            .window_handle()
            .map_err(|e| DriverError::Surface(e.to_string()))?
            .as_raw();
        let size = window.inner_size();

        let attributes = SurfaceAttributesBuilder::<WindowSurface>::new().build(
            handle,
            NonZeroU32::new(size.width).unwrap_or(NonZeroU32::MIN),
            NonZeroU32::new(size.height).unwrap_or(NonZeroU32::MIN),
        );

        unsafe { display.create_window_surface(config, &attributes) }
            .map_err(|e| DriverError::Surface(e.to_string()))
    }

    fn create_context(
        &mut self,
        display: &Display,
        config: &Config,
    ) -> Result<PossiblyCurrentContext, DriverError> {
        let attributes = ContextAttributesBuilder::new()
            .with_context_api(ContextApi::Gles(Some(Version::new(3, 0))))
            .build(None);

        let context = unsafe { display.create_context(config, &attributes) }
            .map_err(|e| DriverError::Context(e.to_string()))?;

        Ok(context.treat_as_possibly_current())
    }

    fn make_current(
        &mut self,
        display: &Display,
        surface: &Surface<WindowSurface>,
        context: &PossiblyCurrentContext,
    ) -> Result<(), DriverError> {
        context
            .make_current(surface)
            .map_err(|e| DriverError::MakeCurrent(e.to_string()))?;

        if self.gl.is_none() {
            let gl = unsafe {
                glow::Context::from_loader_function_cstr(|name| display.get_proc_address(name))
            };
            // Base pipeline state: depth test plus standard alpha blending.
            unsafe {
                gl.enable(glow::DEPTH_TEST);
                gl.enable(glow::BLEND);
                gl.blend_func(glow::SRC_ALPHA, glow::ONE_MINUS_SRC_ALPHA);
            }
            log::info!("GLES context bound");
            self.gl = Some(gl);
        }

        Ok(())
    }

    fn surface_size(&self, surface: &Surface<WindowSurface>) -> Dimensions {
        Dimensions {
            width: surface.width().unwrap_or(0) as i32,
            height: surface.height().unwrap_or(0) as i32,
        }
    }

    fn swap_buffers(
        &mut self,
        surface: &Surface<WindowSurface>,
        context: &PossiblyCurrentContext,
    ) -> Result<(), DriverError> {
        surface
            .swap_buffers(context)
            .map_err(|e| DriverError::Present(e.to_string()))
    }

    fn destroy_surface(&mut self, _display: &Display, surface: Surface<WindowSurface>) {
        drop(surface);
    }

    fn destroy_context(&mut self, _display: &Display, context: PossiblyCurrentContext) {
        // The function table is tied to this context.
        self.gl = None;
        match context.make_not_current() {
            Ok(not_current) => drop(not_current),
            Err(e) => log::warn!("Failed to unbind context before destroy: {e}"),
        }
    }

    fn disconnect_display(&mut self, display: Display) {
        drop(display);
    }

    fn compile_shader(
        &mut self,
        stage: ShaderStage,
        source: &str,
    ) -> Result<glow::NativeShader, DriverError> {
        let gl = self.gl()?;
        let kind = match stage {
            ShaderStage::Vertex => glow::VERTEX_SHADER,
            ShaderStage::Fragment => glow::FRAGMENT_SHADER,
        };

        unsafe {
            let shader = gl.create_shader(kind).map_err(DriverError::Allocation)?;
            gl.shader_source(shader, source);
            gl.compile_shader(shader);

            if !gl.get_shader_compile_status(shader) {
                let log = gl.get_shader_info_log(shader);
                gl.delete_shader(shader);
                return Err(DriverError::Compile { stage, log });
            }

            Ok(shader)
        }
    }

    fn delete_shader(&mut self, shader: glow::NativeShader) {
        if let Ok(gl) = self.gl() {
            unsafe { gl.delete_shader(shader) };
        }
    }

    fn link_program(
        &mut self,
        vertex: &glow::NativeShader,
        fragment: &glow::NativeShader,
    ) -> Result<glow::NativeProgram, DriverError> {
        let gl = self.gl()?;

        unsafe {
            let program = gl.create_program().map_err(DriverError::Allocation)?;
            gl.attach_shader(program, *vertex);
            gl.attach_shader(program, *fragment);
            gl.link_program(program);

            if !gl.get_program_link_status(program) {
                let log = gl.get_program_info_log(program);
                gl.delete_program(program);
                return Err(DriverError::Link { log });
            }

            gl.detach_shader(program, *vertex);
            gl.detach_shader(program, *fragment);
            Ok(program)
        }
    }

    fn delete_program(&mut self, program: glow::NativeProgram) {
        if let Ok(gl) = self.gl() {
            unsafe { gl.delete_program(program) };
        }
    }

    fn attrib_location(&self, program: &glow::NativeProgram, name: &str) -> Option<u32> {
        let gl = self.gl().ok()?;
        unsafe { gl.get_attrib_location(*program, name) }
    }

    fn create_vertex_array(&mut self) -> Result<glow::NativeVertexArray, DriverError> {
        let gl = self.gl()?;
        unsafe { gl.create_vertex_array().map_err(DriverError::Allocation) }
    }

    fn delete_vertex_array(&mut self, vertex_array: glow::NativeVertexArray) {
        if let Ok(gl) = self.gl() {
            unsafe { gl.delete_vertex_array(vertex_array) };
        }
    }

    fn create_buffer(&mut self, data: &[f32]) -> Result<glow::NativeBuffer, DriverError> {
        let gl = self.gl()?;
        unsafe {
            let buffer = gl.create_buffer().map_err(DriverError::Allocation)?;
            gl.bind_buffer(glow::ARRAY_BUFFER, Some(buffer));
            gl.buffer_data_u8_slice(glow::ARRAY_BUFFER, bytemuck::cast_slice(data), glow::STATIC_DRAW);
            gl.bind_buffer(glow::ARRAY_BUFFER, None);
            Ok(buffer)
        }
    }

    fn delete_buffer(&mut self, buffer: glow::NativeBuffer) {
        if let Ok(gl) = self.gl() {
            unsafe { gl.delete_buffer(buffer) };
        }
    }

    fn bind_attribute(
        &mut self,
        vertex_array: &glow::NativeVertexArray,
        buffer: &glow::NativeBuffer,
        location: u32,
        components: i32,
    ) {
        let Ok(gl) = self.gl() else { return };
        unsafe {
            gl.bind_vertex_array(Some(*vertex_array));
            gl.bind_buffer(glow::ARRAY_BUFFER, Some(*buffer));
            gl.vertex_attrib_pointer_f32(location, components, glow::FLOAT, false, 0, 0);
            gl.enable_vertex_attrib_array(location);
            gl.bind_buffer(glow::ARRAY_BUFFER, None);
            gl.bind_vertex_array(None);
        }
    }

    fn clear(&mut self, color: [f32; 4]) {
        let Ok(gl) = self.gl() else { return };
        unsafe {
            gl.clear_color(color[0], color[1], color[2], color[3]);
            gl.clear(glow::COLOR_BUFFER_BIT | glow::DEPTH_BUFFER_BIT);
        }
    }

    fn draw_triangles(
        &mut self,
        program: &glow::NativeProgram,
        vertex_array: &glow::NativeVertexArray,
        vertices: i32,
    ) {
        let Ok(gl) = self.gl() else { return };
        unsafe {
            gl.use_program(Some(*program));
            gl.bind_vertex_array(Some(*vertex_array));
            gl.draw_arrays(glow::TRIANGLES, 0, vertices);
        }
    }
}
