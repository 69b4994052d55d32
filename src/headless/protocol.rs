//! In-memory protocol runtime.

use std::collections::HashMap;

use smithay::backend::input::{ButtonState, KeyState};
use smithay::input::keyboard::ModifiersState;
use smithay::reexports::wayland_server::protocol::wl_seat::Capability;
use smithay::utils::{Logical, Point, Rectangle, Size};
use tracing::debug;

use crate::input::{AxisEvent, DeviceId};
use crate::protocol::{
    ClientId, DataSourceId, DecorationId, DecorationMode, Protocol, SurfaceId, ToplevelState,
};

/// Protocol request sent to a client.
#[derive(Clone, PartialEq, Debug)]
pub enum Command {
    Activated { surface: SurfaceId, activated: bool },
    Size { surface: SurfaceId, size: Size<i32, Logical> },
    Maximized { surface: SurfaceId, maximized: bool },
    Configure { surface: SurfaceId },
    DecorationMode { decoration: DecorationId, mode: DecorationMode },
    KeyboardEnter { surface: SurfaceId, keys: Vec<u32>, modifiers: ModifiersState },
    Key { keycode: u32, state: KeyState },
    Modifiers(ModifiersState),
    PointerEnter { surface: SurfaceId, location: Point<f64, Logical> },
    PointerMotion { location: Point<f64, Logical> },
    PointerClearFocus,
    Button { button: u32, state: ButtonState },
    Axis(AxisEvent),
    Frame,
    Capabilities(Capability),
    Selection(Option<DataSourceId>),
    Terminate,
}

/// Client-side toplevel state.
#[derive(Copy, Clone, Default, Debug)]
struct Toplevel {
    geometry: Rectangle<i32, Logical>,
    state: ToplevelState,
    pending_size: Option<Size<i32, Logical>>,
    activated: bool,
    maximized: bool,
}

/// Protocol runtime without any connected clients.
///
/// Every request the compositor sends is recorded as a [`Command`], so the
/// binary can log it and tests can inspect it.
#[derive(Debug)]
pub struct HeadlessProtocol {
    toplevels: HashMap<SurfaceId, Toplevel>,
    parents: HashMap<SurfaceId, SurfaceId>,
    clients: HashMap<SurfaceId, ClientId>,

    keyboard_focus: Option<SurfaceId>,
    pointer_focus: Option<SurfaceId>,
    keyboard: Option<DeviceId>,
    capabilities: Capability,
    selection: Option<DataSourceId>,

    commands: Vec<Command>,
    terminated: bool,
}

impl Default for HeadlessProtocol {
    fn default() -> Self {
        Self {
            capabilities: Capability::empty(),
            keyboard_focus: Default::default(),
            pointer_focus: Default::default(),
            terminated: Default::default(),
            selection: Default::default(),
            toplevels: Default::default(),
            keyboard: Default::default(),
            commands: Default::default(),
            parents: Default::default(),
            clients: Default::default(),
        }
    }
}

impl HeadlessProtocol {
    /// Register a toplevel with its initial window geometry.
    pub fn add_toplevel(&mut self, surface: SurfaceId, client: ClientId, size: Size<i32, Logical>) {
        let toplevel = Toplevel { geometry: Rectangle::from_size(size), ..Default::default() };
        self.toplevels.insert(surface, toplevel);
        self.clients.insert(surface, client);
    }

    /// Register a subsurface owned by the same client as its parent.
    pub fn add_subsurface(&mut self, surface: SurfaceId, parent: SurfaceId) {
        if let Some(client) = self.clients.get(&parent).copied() {
            self.clients.insert(surface, client);
        }
        self.parents.insert(surface, parent);
    }

    /// Update the size limits advertised by a toplevel.
    pub fn set_size_limits(
        &mut self,
        surface: SurfaceId,
        min_size: Size<i32, Logical>,
        max_size: Size<i32, Logical>,
    ) {
        if let Some(toplevel) = self.toplevels.get_mut(&surface) {
            toplevel.state = ToplevelState { min_size, max_size };
        }
    }

    /// Apply the last requested size, like a client committing a new buffer.
    pub fn ack_configure(&mut self, surface: SurfaceId) {
        if let Some(toplevel) = self.toplevels.get_mut(&surface) {
            if let Some(size) = toplevel.pending_size.take() {
                toplevel.geometry.size = size;
            }
        }
    }

    pub fn is_activated(&self, surface: SurfaceId) -> bool {
        self.toplevels.get(&surface).map_or(false, |toplevel| toplevel.activated)
    }

    pub fn is_maximized(&self, surface: SurfaceId) -> bool {
        self.toplevels.get(&surface).map_or(false, |toplevel| toplevel.maximized)
    }

    /// Currently advertised seat capabilities.
    pub fn capabilities(&self) -> Capability {
        self.capabilities
    }

    /// Keyboard whose keymap is sent to clients.
    pub fn active_keyboard(&self) -> Option<DeviceId> {
        self.keyboard
    }

    /// Data source offered as clipboard selection.
    pub fn selection(&self) -> Option<DataSourceId> {
        self.selection
    }

    pub fn is_terminated(&self) -> bool {
        self.terminated
    }

    /// Remove all recorded commands.
    pub fn take_commands(&mut self) -> Vec<Command> {
        std::mem::take(&mut self.commands)
    }

    fn record(&mut self, command: Command) {
        debug!("protocol command: {command:?}");
        self.commands.push(command);
    }
}

impl Protocol for HeadlessProtocol {
    fn set_activated(&mut self, surface: SurfaceId, activated: bool) {
        if let Some(toplevel) = self.toplevels.get_mut(&surface) {
            toplevel.activated = activated;
        }
        self.record(Command::Activated { surface, activated });
    }

    fn set_size(&mut self, surface: SurfaceId, size: Size<i32, Logical>) {
        if let Some(toplevel) = self.toplevels.get_mut(&surface) {
            toplevel.pending_size = Some(size);
        }
        self.record(Command::Size { surface, size });
    }

    fn set_maximized(&mut self, surface: SurfaceId, maximized: bool) {
        if let Some(toplevel) = self.toplevels.get_mut(&surface) {
            toplevel.maximized = maximized;
        }
        self.record(Command::Maximized { surface, maximized });
    }

    fn schedule_configure(&mut self, surface: SurfaceId) {
        self.record(Command::Configure { surface });
    }

    fn geometry(&self, surface: SurfaceId) -> Rectangle<i32, Logical> {
        self.toplevels.get(&surface).map(|toplevel| toplevel.geometry).unwrap_or_default()
    }

    fn toplevel_state(&self, surface: SurfaceId) -> ToplevelState {
        self.toplevels.get(&surface).map(|toplevel| toplevel.state).unwrap_or_default()
    }

    fn root_surface(&self, mut surface: SurfaceId) -> SurfaceId {
        while let Some(parent) = self.parents.get(&surface) {
            surface = *parent;
        }
        surface
    }

    fn set_decoration_mode(&mut self, decoration: DecorationId, mode: DecorationMode) {
        self.record(Command::DecorationMode { decoration, mode });
    }

    fn keyboard_focus(&self) -> Option<SurfaceId> {
        self.keyboard_focus
    }

    fn pointer_focus(&self) -> Option<SurfaceId> {
        self.pointer_focus
    }

    fn pointer_focus_client(&self) -> Option<ClientId> {
        self.pointer_focus.and_then(|surface| self.clients.get(&surface).copied())
    }

    fn set_keyboard(&mut self, device: DeviceId) {
        self.keyboard = Some(device);
    }

    fn keyboard_enter(&mut self, surface: SurfaceId, keys: &[u32], modifiers: &ModifiersState) {
        self.keyboard_focus = Some(surface);
        self.record(Command::KeyboardEnter { surface, keys: keys.to_vec(), modifiers: *modifiers });
    }

    fn keyboard_key(&mut self, _time: u32, keycode: u32, state: KeyState) {
        self.record(Command::Key { keycode, state });
    }

    fn keyboard_modifiers(&mut self, modifiers: &ModifiersState) {
        self.record(Command::Modifiers(*modifiers));
    }

    fn pointer_enter(&mut self, surface: SurfaceId, location: Point<f64, Logical>) {
        if self.pointer_focus != Some(surface) {
            self.pointer_focus = Some(surface);
            self.record(Command::PointerEnter { surface, location });
        }
    }

    fn pointer_motion(&mut self, _time: u32, location: Point<f64, Logical>) {
        self.record(Command::PointerMotion { location });
    }

    fn pointer_clear_focus(&mut self) {
        if self.pointer_focus.take().is_some() {
            self.record(Command::PointerClearFocus);
        }
    }

    fn pointer_button(&mut self, _time: u32, button: u32, state: ButtonState) {
        self.record(Command::Button { button, state });
    }

    fn pointer_axis(&mut self, event: AxisEvent) {
        self.record(Command::Axis(event));
    }

    fn pointer_frame(&mut self) {
        self.record(Command::Frame);
    }

    fn set_capabilities(&mut self, capabilities: Capability) {
        self.capabilities = capabilities;
        self.record(Command::Capabilities(capabilities));
    }

    fn set_selection(&mut self, source: Option<DataSourceId>, serial: u32) {
        debug!("selection {source:?} set with serial {serial}");
        self.selection = source;
        self.record(Command::Selection(source));
    }

    fn terminate(&mut self) {
        self.terminated = true;
        self.record(Command::Terminate);
    }
}
