// Surface/context manager
//
// State machine over the driver handles. The display connection survives
// window churn (SurfaceLost); the surface and context are torn down with
// the window that owns them. Each state carries exactly the handles it is
// allowed to hold, so Ready cannot exist without a live surface + context.

use crate::backend::{Dimensions, DriverError, GpuDriver};

use super::Graphics;

/// Display-level state: survives window loss, torn down only on full detach.
pub(crate) struct Connection<D: GpuDriver> {
    pub display: D::Display,
    pub config: D::Config,
}

/// Window-level state: one surface and one context per native window.
pub(crate) struct Session<D: GpuDriver> {
    pub connection: Connection<D>,
    pub surface: D::Surface,
    pub context: D::Context,
}

pub(crate) enum SurfaceState<D: GpuDriver> {
    Uninitialized,
    Ready(Session<D>),
    SurfaceLost(Connection<D>),
    Failed,
}

impl<D: GpuDriver> Graphics<D> {
    /// Binds the renderer to a native window.
    ///
    /// Reuses the display connection when one is live (`Ready`/`SurfaceLost`);
    /// otherwise establishes it first. The surface and context are created
    /// fresh for every window, since window handles are single-use. On any
    /// mid-attach failure the partially created handles are rolled back and
    /// the state is `Failed`; the next call retries from scratch.
    pub fn attach_window(&mut self, window: &D::Window) -> Result<(), DriverError> {
        let connection = match std::mem::replace(&mut self.state, SurfaceState::Uninitialized) {
            SurfaceState::Ready(session) => {
                // The previous window is gone or being replaced; its surface
                // and context must not outlive it.
                self.release_geometry();
                Some(self.teardown_session(session))
            }
            SurfaceState::SurfaceLost(connection) => Some(connection),
            SurfaceState::Uninitialized | SurfaceState::Failed => None,
        };

        let connection = match connection {
            Some(connection) => connection,
            None => match self.establish_connection(window) {
                Ok(connection) => connection,
                Err(e) => {
                    self.state = SurfaceState::Failed;
                    return Err(e);
                }
            },
        };

        match self.bind_session(connection, window) {
            Ok(session) => {
                self.dimensions = self.driver.surface_size(&session.surface);
                self.state = SurfaceState::Ready(session);
                Ok(())
            }
            Err(e) => {
                self.state = SurfaceState::Failed;
                Err(e)
            }
        }
    }

    /// Transient window-destroyed signal.
    ///
    /// Releases geometry, context, and surface but keeps the display
    /// connection for the next `attach_window`. No-op in any other state.
    pub fn surface_lost(&mut self) {
        match std::mem::replace(&mut self.state, SurfaceState::Uninitialized) {
            SurfaceState::Ready(session) => {
                self.release_geometry();
                let connection = self.teardown_session(session);
                self.dimensions = Dimensions::default();
                self.state = SurfaceState::SurfaceLost(connection);
            }
            other => self.state = other,
        }
    }

    /// Full teardown: geometry, context, surface, and the display connection.
    ///
    /// Idempotent; always ends in `Uninitialized`. The host may later present
    /// an entirely new window requiring ground-up re-creation.
    pub fn detach_window(&mut self) {
        self.release_geometry();
        match std::mem::replace(&mut self.state, SurfaceState::Uninitialized) {
            SurfaceState::Ready(session) => {
                let connection = self.teardown_session(session);
                self.driver.disconnect_display(connection.display);
            }
            SurfaceState::SurfaceLost(connection) => {
                self.driver.disconnect_display(connection.display);
            }
            SurfaceState::Uninitialized | SurfaceState::Failed => {}
        }
        self.dimensions = Dimensions::default();
    }

    /// True only while a surface and context are live and bound.
    pub fn is_ready(&self) -> bool {
        matches!(self.state, SurfaceState::Ready(_))
    }

    /// Surface size queried at attach time; zero when no surface is live.
    pub fn dimensions(&self) -> Dimensions {
        self.dimensions
    }

    fn establish_connection(&mut self, window: &D::Window) -> Result<Connection<D>, DriverError> {
        let display = self.driver.connect_display(window)?;
        match self.driver.choose_config(&display) {
            Ok(config) => Ok(Connection { display, config }),
            Err(e) => {
                self.driver.disconnect_display(display);
                Err(e)
            }
        }
    }

    /// Creates and binds a surface + context on `connection`. On failure
    /// everything created so far is destroyed, the connection included.
    fn bind_session(
        &mut self,
        connection: Connection<D>,
        window: &D::Window,
    ) -> Result<Session<D>, DriverError> {
        let surface = match self
            .driver
            .create_surface(&connection.display, &connection.config, window)
        {
            Ok(surface) => surface,
            Err(e) => {
                self.driver.disconnect_display(connection.display);
                return Err(e);
            }
        };

        let context = match self
            .driver
            .create_context(&connection.display, &connection.config)
        {
            Ok(context) => context,
            Err(e) => {
                self.driver.destroy_surface(&connection.display, surface);
                self.driver.disconnect_display(connection.display);
                return Err(e);
            }
        };

        if let Err(e) = self
            .driver
            .make_current(&connection.display, &surface, &context)
        {
            self.driver.destroy_context(&connection.display, context);
            self.driver.destroy_surface(&connection.display, surface);
            self.driver.disconnect_display(connection.display);
            return Err(e);
        }

        Ok(Session {
            connection,
            surface,
            context,
        })
    }

    /// Destroys the window-level handles, context first, keeping the
    /// connection. Geometry must already be released.
    fn teardown_session(&mut self, session: Session<D>) -> Connection<D> {
        let Session {
            connection,
            surface,
            context,
        } = session;
        self.driver.destroy_context(&connection.display, context);
        self.driver.destroy_surface(&connection.display, surface);
        connection
    }
}
