//! Wayland protocol runtime interface.

use bitflags::bitflags;
use smithay::backend::input::{ButtonState, KeyState};
use smithay::input::keyboard::ModifiersState;
use smithay::reexports::wayland_protocols::xdg::shell::server::xdg_toplevel::ResizeEdge;
use smithay::reexports::wayland_server::protocol::wl_seat::Capability;
use smithay::utils::{Logical, Point, Rectangle, Size};

use crate::input::{AxisEvent, DeviceId};

/// Opaque handle of a client surface.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
pub struct SurfaceId(pub u64);

/// Opaque handle of a Wayland client.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
pub struct ClientId(pub u64);

/// Opaque handle of a toplevel decoration object.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
pub struct DecorationId(pub u64);

/// Opaque handle of a client data source.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
pub struct DataSourceId(pub u64);

bitflags! {
    /// Window edges affected by an interactive resize.
    #[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, Default)]
    pub struct Edges: u32 {
        const TOP = 1;
        const BOTTOM = 2;
        const LEFT = 4;
        const RIGHT = 8;
    }
}

impl From<ResizeEdge> for Edges {
    fn from(edge: ResizeEdge) -> Self {
        Self::from_bits_truncate(u32::from(edge))
    }
}

/// Decoration mode negotiated with a client.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum DecorationMode {
    ClientSide,
    ServerSide,
}

/// Size constraints advertised by a toplevel.
///
/// A zero dimension means the client does not constrain it.
#[derive(Copy, Clone, Default, PartialEq, Eq, Debug)]
pub struct ToplevelState {
    pub min_size: Size<i32, Logical>,
    pub max_size: Size<i32, Logical>,
}

/// Client cursor image request.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub struct CursorRequest {
    pub client: ClientId,
    pub surface: Option<SurfaceId>,
    pub hotspot: Point<i32, Logical>,
}

/// Lifecycle callbacks emitted by the protocol runtime.
#[derive(Copy, Clone, PartialEq, Debug)]
pub enum ShellEvent {
    NewToplevel { surface: SurfaceId },
    NewPopup { surface: SurfaceId, parent: SurfaceId },
    PopupDestroyed { surface: SurfaceId },
    Map { surface: SurfaceId },
    Unmap { surface: SurfaceId },
    Destroy { surface: SurfaceId },
    RequestMove { surface: SurfaceId },
    RequestResize { surface: SurfaceId, edges: Edges },
    RequestMaximize { surface: SurfaceId, maximize: bool },
    RequestMinimize { surface: SurfaceId, minimize: bool },
    RequestFullscreen { surface: SurfaceId, fullscreen: bool },
    NewDecoration { decoration: DecorationId, toplevel: SurfaceId },
    SetCursor(CursorRequest),
    /// Clipboard selection request, `None` clears the selection.
    SetSelection { source: Option<DataSourceId>, serial: u32 },
}

/// Wayland protocol runtime.
///
/// This owns the client-facing protocol objects, including the seat's
/// keyboard and pointer focus.
pub trait Protocol {
    /// Update a toplevel's activated state.
    fn set_activated(&mut self, surface: SurfaceId, activated: bool);

    /// Request a new size from a toplevel.
    fn set_size(&mut self, surface: SurfaceId, size: Size<i32, Logical>);

    /// Update a toplevel's maximized state.
    fn set_maximized(&mut self, surface: SurfaceId, maximized: bool);

    /// Send a configure with the pending toplevel state.
    fn schedule_configure(&mut self, surface: SurfaceId);

    /// Window geometry of a toplevel, relative to its surface.
    fn geometry(&self, surface: SurfaceId) -> Rectangle<i32, Logical>;

    /// Current toplevel state.
    fn toplevel_state(&self, surface: SurfaceId) -> ToplevelState;

    /// Topmost parent surface in a subsurface tree.
    fn root_surface(&self, surface: SurfaceId) -> SurfaceId;

    /// Answer a decoration negotiation.
    fn set_decoration_mode(&mut self, decoration: DecorationId, mode: DecorationMode);

    /// Surface with keyboard focus.
    fn keyboard_focus(&self) -> Option<SurfaceId>;

    /// Surface with pointer focus.
    fn pointer_focus(&self) -> Option<SurfaceId>;

    /// Client owning the surface with pointer focus.
    fn pointer_focus_client(&self) -> Option<ClientId>;

    /// Make a keyboard the seat's active keyboard.
    fn set_keyboard(&mut self, device: DeviceId);

    /// Move keyboard focus to a surface.
    fn keyboard_enter(&mut self, surface: SurfaceId, keys: &[u32], modifiers: &ModifiersState);

    /// Forward a key to the focused client.
    fn keyboard_key(&mut self, time: u32, keycode: u32, state: KeyState);

    /// Forward modifier changes to the focused client.
    fn keyboard_modifiers(&mut self, modifiers: &ModifiersState);

    /// Move pointer focus to a surface.
    fn pointer_enter(&mut self, surface: SurfaceId, location: Point<f64, Logical>);

    /// Forward pointer motion to the focused client.
    fn pointer_motion(&mut self, time: u32, location: Point<f64, Logical>);

    /// Remove pointer focus from all surfaces.
    fn pointer_clear_focus(&mut self);

    /// Forward a button press or release to the focused client.
    fn pointer_button(&mut self, time: u32, button: u32, state: ButtonState);

    /// Forward scroll input to the focused client.
    fn pointer_axis(&mut self, event: AxisEvent);

    /// Group preceding pointer events into a frame.
    fn pointer_frame(&mut self);

    /// Replace the seat's clipboard selection.
    fn set_selection(&mut self, source: Option<DataSourceId>, serial: u32);

    /// Advertise the seat's input capabilities.
    fn set_capabilities(&mut self, capabilities: Capability);

    /// Stop accepting clients and shut down the display.
    fn terminate(&mut self);
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn resize_edge_bits() {
        assert_eq!(Edges::from(ResizeEdge::BottomRight), Edges::BOTTOM | Edges::RIGHT);
        assert_eq!(Edges::from(ResizeEdge::TopLeft), Edges::TOP | Edges::LEFT);
        assert_eq!(Edges::from(ResizeEdge::None), Edges::empty());
    }
}
