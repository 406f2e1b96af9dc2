// Test driver - in-memory handle accounting
//
// Stands in for the glutin/glow driver in unit tests. Every created handle
// is tracked in a live set, every frame call is recorded, and individual
// driver calls can be forced to fail. Tests hold a probe (shared pointer to
// the state) so they can inspect counts after the graphics object is gone.

use std::cell::RefCell;
use std::rc::Rc;

use super::driver::{Dimensions, DriverError, GpuDriver, ShaderStage};

/// Per-frame driver calls, in issue order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameCall {
    Clear,
    Draw,
    Swap,
}

#[derive(Default)]
pub struct FakeState {
    next_handle: u32,

    // Live handle sets, one per object kind.
    pub displays: Vec<u32>,
    pub surfaces: Vec<u32>,
    pub contexts: Vec<u32>,
    pub shaders: Vec<u32>,
    pub programs: Vec<u32>,
    pub buffers: Vec<u32>,
    pub vertex_arrays: Vec<u32>,

    /// Window each live surface was created for.
    pub surface_windows: Vec<(u32, u64)>,
    pub calls: Vec<FrameCall>,
    /// Total handles ever created, live or not.
    pub allocations: u32,
    /// Destroy calls for handles that were not live.
    pub double_frees: u32,

    pub fail_display: bool,
    pub fail_config: bool,
    pub fail_surface: bool,
    pub fail_context: bool,
    pub fail_make_current: bool,
    pub fail_swap: bool,
    pub fail_compile: Option<ShaderStage>,
    pub fail_link: bool,
}

impl FakeState {
    fn alloc(&mut self) -> u32 {
        self.next_handle += 1;
        self.allocations += 1;
        self.next_handle
    }

    fn release(&mut self, kind: fn(&mut Self) -> &mut Vec<u32>, handle: u32) {
        let list = kind(self);
        match list.iter().position(|&h| h == handle) {
            Some(index) => {
                list.swap_remove(index);
            }
            None => self.double_frees += 1,
        }
    }

    /// Every live handle of every kind.
    pub fn live_handles(&self) -> usize {
        self.displays.len()
            + self.surfaces.len()
            + self.contexts.len()
            + self.shaders.len()
            + self.programs.len()
            + self.buffers.len()
            + self.vertex_arrays.len()
    }
}

pub struct FakeDriver {
    state: Rc<RefCell<FakeState>>,
}

impl FakeDriver {
    pub fn new() -> Self {
        Self {
            state: Rc::new(RefCell::new(FakeState::default())),
        }
    }

    /// Shared view of the driver state, usable after the driver is consumed.
    pub fn probe(&self) -> Rc<RefCell<FakeState>> {
        Rc::clone(&self.state)
    }
}

impl GpuDriver for FakeDriver {
    type Window = u64;
    type Display = u32;
    type Config = ();
    type Surface = u32;
    type Context = u32;
    type Shader = u32;
    type Program = u32;
    type Buffer = u32;
    type VertexArray = u32;

    fn connect_display(&mut self, _window: &u64) -> Result<u32, DriverError> {
        let mut state = self.state.borrow_mut();
        if state.fail_display {
            return Err(DriverError::Display("forced display failure".into()));
        }
        let handle = state.alloc();
        state.displays.push(handle);
        Ok(handle)
    }

    fn choose_config(&mut self, _display: &u32) -> Result<(), DriverError> {
        if self.state.borrow().fail_config {
            return Err(DriverError::NoConfig);
        }
        Ok(())
    }

    fn create_surface(
        &mut self,
        _display: &u32,
        _config: &(),
        window: &u64,
    ) -> Result<u32, DriverError> {
        let mut state = self.state.borrow_mut();
        if state.fail_surface {
            return Err(DriverError::Surface("forced surface failure".into()));
        }
        let handle = state.alloc();
        state.surfaces.push(handle);
        state.surface_windows.push((handle, *window));
        Ok(handle)
    }

    fn create_context(&mut self, _display: &u32, _config: &()) -> Result<u32, DriverError> {
        let mut state = self.state.borrow_mut();
        if state.fail_context {
            return Err(DriverError::Context("forced context failure".into()));
        }
        let handle = state.alloc();
        state.contexts.push(handle);
        Ok(handle)
    }

    fn make_current(
        &mut self,
        _display: &u32,
        _surface: &u32,
        _context: &u32,
    ) -> Result<(), DriverError> {
        if self.state.borrow().fail_make_current {
            return Err(DriverError::MakeCurrent("forced bind failure".into()));
        }
        Ok(())
    }

    fn surface_size(&self, _surface: &u32) -> Dimensions {
        Dimensions {
            width: 1080,
            height: 1920,
        }
    }

    fn swap_buffers(&mut self, _surface: &u32, _context: &u32) -> Result<(), DriverError> {
        let mut state = self.state.borrow_mut();
        state.calls.push(FrameCall::Swap);
        if state.fail_swap {
            return Err(DriverError::Present("forced swap failure".into()));
        }
        Ok(())
    }

    fn destroy_surface(&mut self, _display: &u32, surface: u32) {
        let mut state = self.state.borrow_mut();
        state.release(|s| &mut s.surfaces, surface);
        state.surface_windows.retain(|&(handle, _)| handle != surface);
    }

    fn destroy_context(&mut self, _display: &u32, context: u32) {
        self.state.borrow_mut().release(|s| &mut s.contexts, context);
    }

    fn disconnect_display(&mut self, display: u32) {
        self.state.borrow_mut().release(|s| &mut s.displays, display);
    }

    fn compile_shader(&mut self, stage: ShaderStage, _source: &str) -> Result<u32, DriverError> {
        let mut state = self.state.borrow_mut();
        if state.fail_compile == Some(stage) {
            // Model the driver creating and discarding the shader object.
            state.alloc();
            return Err(DriverError::Compile {
                stage,
                log: "forced compile failure".into(),
            });
        }
        let handle = state.alloc();
        state.shaders.push(handle);
        Ok(handle)
    }

    fn delete_shader(&mut self, shader: u32) {
        self.state.borrow_mut().release(|s| &mut s.shaders, shader);
    }

    fn link_program(&mut self, _vertex: &u32, _fragment: &u32) -> Result<u32, DriverError> {
        let mut state = self.state.borrow_mut();
        if state.fail_link {
            state.alloc();
            return Err(DriverError::Link {
                log: "forced link failure".into(),
            });
        }
        let handle = state.alloc();
        state.programs.push(handle);
        Ok(handle)
    }

    fn delete_program(&mut self, program: u32) {
        self.state.borrow_mut().release(|s| &mut s.programs, program);
    }

    fn attrib_location(&self, _program: &u32, name: &str) -> Option<u32> {
        match name {
            "vPosition" => Some(0),
            "vColor" => Some(1),
            _ => None,
        }
    }

    fn create_vertex_array(&mut self) -> Result<u32, DriverError> {
        let mut state = self.state.borrow_mut();
        let handle = state.alloc();
        state.vertex_arrays.push(handle);
        Ok(handle)
    }

    fn delete_vertex_array(&mut self, vertex_array: u32) {
        self.state
            .borrow_mut()
            .release(|s| &mut s.vertex_arrays, vertex_array);
    }

    fn create_buffer(&mut self, _data: &[f32]) -> Result<u32, DriverError> {
        let mut state = self.state.borrow_mut();
        let handle = state.alloc();
        state.buffers.push(handle);
        Ok(handle)
    }

    fn delete_buffer(&mut self, buffer: u32) {
        self.state.borrow_mut().release(|s| &mut s.buffers, buffer);
    }

    fn bind_attribute(&mut self, _vertex_array: &u32, _buffer: &u32, _location: u32, _components: i32) {}

    fn clear(&mut self, _color: [f32; 4]) {
        self.state.borrow_mut().calls.push(FrameCall::Clear);
    }

    fn draw_triangles(&mut self, _program: &u32, _vertex_array: &u32, _vertices: i32) {
        self.state.borrow_mut().calls.push(FrameCall::Draw);
    }
}
