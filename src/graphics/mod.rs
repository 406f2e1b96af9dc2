// Graphics core
//
// One object, three responsibilities: the surface/context manager
// (surface.rs), the render resource manager (geometry.rs), and the frame
// renderer below. Owned explicitly by the host's event handler and passed
// by reference into lifecycle callbacks; there is no global state.

mod geometry;
mod surface;

use crate::backend::{Dimensions, GpuDriver};
use geometry::{GeometryResources, TRIANGLE_VERTEX_COUNT};
use surface::SurfaceState;

/// Rendering core bound to at most one native window at a time.
///
/// All operations run on the host's event thread; nothing here blocks,
/// spawns, or retries. Driver failures become states (`Failed`, geometry
/// not ready) rather than panics or fatal errors.
pub struct Graphics<D: GpuDriver> {
    driver: D,
    state: SurfaceState<D>,
    geometry: Option<GeometryResources<D>>,
    dimensions: Dimensions,
    clear_color: [f32; 4],
}

impl<D: GpuDriver> Graphics<D> {
    pub fn new(driver: D, clear_color: [f32; 4]) -> Self {
        Self {
            driver,
            state: SurfaceState::Uninitialized,
            geometry: None,
            dimensions: Dimensions::default(),
            clear_color,
        }
    }

    /// Renders one frame: clear, draw the triangle if geometry is live,
    /// swap. No-op unless a surface is attached and bound.
    ///
    /// A failed swap is logged and dropped; presentation is best effort
    /// and the next frame swaps again.
    pub fn render_frame(&mut self) {
        let SurfaceState::Ready(session) = &self.state else {
            return;
        };

        self.driver.clear(self.clear_color);

        if let Some(geometry) = &self.geometry {
            self.driver.draw_triangles(
                &geometry.program,
                &geometry.vertex_array,
                TRIANGLE_VERTEX_COUNT,
            );
        }

        if let Err(e) = self.driver.swap_buffers(&session.surface, &session.context) {
            log::warn!("Buffer swap failed: {e}");
        }
    }
}

impl<D: GpuDriver> Drop for Graphics<D> {
    fn drop(&mut self) {
        self.detach_window();
    }
}
