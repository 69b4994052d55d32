//! Input event handling.

use std::fmt::Debug;

use smithay::backend::input::{Axis, AxisSource, ButtonState, KeyState};
use smithay::input::keyboard::{Keysym, ModifiersState};
use smithay::utils::{Logical, Point};
use tracing::{debug, warn};

use crate::config::{KeyAction, DEFAULT_CURSOR, KEY_BINDINGS, XKB_KEYCODE_OFFSET};
use crate::protocol::Protocol;
use crate::scene::SceneGraph;
use crate::wlbox::Wlbox;

/// Opaque input device handle.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
pub struct DeviceId(pub u64);

/// Keyboard device provided by the backend.
pub trait KeyboardDevice: Debug {
    /// Assign the default XKB keymap.
    fn set_default_keymap(&mut self);

    /// Configure key repeat, with `rate` in Hz and `delay` in milliseconds.
    fn set_repeat_info(&mut self, rate: i32, delay: i32);

    /// Keysyms produced by an XKB keycode in the current keyboard state.
    fn keysyms(&self, keycode: u32) -> Vec<Keysym>;

    /// Current modifier state.
    fn modifiers(&self) -> ModifiersState;

    /// Keycodes of all currently pressed keys.
    fn pressed_keys(&self) -> Vec<u32>;
}

/// Kind of a newly attached input device.
#[derive(Debug)]
pub enum DeviceKind {
    Keyboard(Box<dyn KeyboardDevice>),
    Pointer,
}

/// Scroll event.
#[derive(Copy, Clone, PartialEq, Debug)]
pub struct AxisEvent {
    pub time: u32,
    pub axis: Axis,
    pub delta: f64,
    pub discrete: i32,
    pub source: AxisSource,
}

/// Raw input events emitted by the backend.
#[derive(Debug)]
pub enum InputEvent {
    DeviceAdded {
        device: DeviceId,
        kind: DeviceKind,
    },
    DeviceRemoved {
        device: DeviceId,
    },
    KeyboardKey {
        device: DeviceId,
        time: u32,
        keycode: u32,
        state: KeyState,
    },
    KeyboardModifiers {
        device: DeviceId,
    },
    /// Relative pointer motion.
    PointerMotion {
        time: u32,
        delta: Point<f64, Logical>,
    },
    /// Absolute pointer motion, normalized to the range `0..=1`.
    PointerMotionAbsolute {
        time: u32,
        position: Point<f64, Logical>,
    },
    PointerButton {
        time: u32,
        button: u32,
        state: ButtonState,
    },
    PointerAxis(AxisEvent),
    PointerFrame,
}

impl<S: SceneGraph, P: Protocol> Wlbox<S, P> {
    /// Process new input events.
    pub fn handle_input(&mut self, event: InputEvent) {
        match event {
            InputEvent::DeviceAdded { device, kind: DeviceKind::Keyboard(keyboard) } => {
                self.seat.add_keyboard(device, keyboard);
                self.protocol.set_keyboard(device);
                self.update_capabilities();
            },
            InputEvent::DeviceAdded { device, kind: DeviceKind::Pointer } => {
                self.seat.add_pointer(device);
                self.update_capabilities();
            },
            InputEvent::DeviceRemoved { device } => self.remove_device(device),
            InputEvent::KeyboardKey { device, time, keycode, state } => {
                self.on_keyboard_key(device, time, keycode, state)
            },
            InputEvent::KeyboardModifiers { device } => self.on_keyboard_modifiers(device),
            InputEvent::PointerMotion { time, delta } => {
                let position = self.seat.cursor + delta;
                self.seat.cursor = self.outputs.clamp(position);
                self.process_cursor_motion(time);
            },
            InputEvent::PointerMotionAbsolute { time, position } => {
                let layout = self.outputs.layout_box().to_f64();
                let x = layout.loc.x + position.x * layout.size.w;
                let y = layout.loc.y + position.y * layout.size.h;
                self.seat.cursor = (x, y).into();
                self.process_cursor_motion(time);
            },
            InputEvent::PointerButton { time, button, state } => {
                self.on_pointer_button(time, button, state)
            },
            InputEvent::PointerAxis(event) => self.protocol.pointer_axis(event),
            InputEvent::PointerFrame => self.protocol.pointer_frame(),
        }
    }

    /// Handle keyboard key events.
    fn on_keyboard_key(&mut self, device: DeviceId, time: u32, keycode: u32, state: KeyState) {
        let keyboard = match self.seat.keyboard(device) {
            Some(keyboard) => keyboard,
            None => {
                warn!("ignoring key from unknown keyboard {device:?}");
                return;
            },
        };

        let modifiers = keyboard.modifiers();
        let keysyms = keyboard.keysyms(keycode + XKB_KEYCODE_OFFSET);

        // Compositor bindings are only checked on press with Alt or Ctrl held.
        let mut handled = false;
        if (modifiers.alt || modifiers.ctrl) && state == KeyState::Pressed {
            for keysym in keysyms {
                handled |= self.handle_keybinding(keysym);
            }
        }

        if !handled {
            self.seat.set_active_keyboard(device);
            self.protocol.set_keyboard(device);
            self.protocol.keyboard_key(time, keycode, state);
        }
    }

    /// Forward modifier changes, making the keyboard the active one.
    fn on_keyboard_modifiers(&mut self, device: DeviceId) {
        let modifiers = match self.seat.keyboard(device) {
            Some(keyboard) => keyboard.modifiers(),
            None => {
                warn!("ignoring modifiers from unknown keyboard {device:?}");
                return;
            },
        };

        self.seat.set_active_keyboard(device);
        self.protocol.set_keyboard(device);
        self.protocol.keyboard_modifiers(&modifiers);
    }

    /// Run the action bound to a keysym.
    ///
    /// Returns `true` if the keysym had a binding.
    fn handle_keybinding(&mut self, keysym: Keysym) -> bool {
        let binding = match KEY_BINDINGS.iter().find(|binding| binding.key == keysym) {
            Some(binding) => binding,
            None => return false,
        };

        debug!("running keybinding {binding:?}");

        match binding.action {
            KeyAction::Quit => self.quit(),
            KeyAction::CycleFocus => self.cycle_focus(),
        }

        true
    }

    /// Handle pointer button presses and releases.
    fn on_pointer_button(&mut self, time: u32, button: u32, state: ButtonState) {
        self.protocol.pointer_button(time, button, state);

        match state {
            ButtonState::Released => self.grab.reset(),
            ButtonState::Pressed => {
                if let Some((view, surface, _)) = self.views.view_at(&self.scene, self.seat.cursor)
                {
                    self.focus_view(view, surface);
                }
            },
        }
    }

    /// Update grabs and pointer focus after the cursor was moved.
    fn process_cursor_motion(&mut self, time: u32) {
        if self.grab.is_active() {
            self.update_grab();
            return;
        }

        let under = self.views.surface_at(&self.scene, self.seat.cursor);

        if under.map_or(true, |under| under.view.is_none()) {
            self.scene.set_cursor_image(DEFAULT_CURSOR);
        }

        match under {
            Some(under) => {
                self.protocol.pointer_enter(under.surface, under.location);
                self.protocol.pointer_motion(time, under.location);
            },
            None => self.protocol.pointer_clear_focus(),
        }
    }

    /// Detach an input device.
    fn remove_device(&mut self, device: DeviceId) {
        let was_active = self.seat.active_keyboard_id() == Some(device);

        if !self.seat.remove_device(device) {
            warn!("ignoring removal of unknown device {device:?}");
            return;
        }

        if let Some(active) = self.seat.active_keyboard_id().filter(|_| was_active) {
            self.protocol.set_keyboard(active);
        }

        self.update_capabilities();
    }

    /// Advertise the currently attached device classes.
    fn update_capabilities(&mut self) {
        self.protocol.set_capabilities(self.seat.capabilities());
    }
}
