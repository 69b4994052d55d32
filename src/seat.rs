//! Input device tracking.

use indexmap::IndexMap;
use smithay::reexports::wayland_server::protocol::wl_seat::Capability;
use smithay::utils::{Logical, Point};
use tracing::info;

use crate::config::{REPEAT_DELAY, REPEAT_RATE};
use crate::input::{DeviceId, KeyboardDevice};

/// Logical seat combining all attached input devices.
#[derive(Default, Debug)]
pub struct Seat {
    /// Cursor position in layout space.
    pub cursor: Point<f64, Logical>,

    keyboards: IndexMap<DeviceId, Box<dyn KeyboardDevice>>,
    active_keyboard: Option<DeviceId>,
    pointers: Vec<DeviceId>,
}

impl Seat {
    /// Attach a keyboard, making it the active keyboard.
    pub fn add_keyboard(&mut self, device: DeviceId, mut keyboard: Box<dyn KeyboardDevice>) {
        keyboard.set_default_keymap();
        keyboard.set_repeat_info(REPEAT_RATE, REPEAT_DELAY);

        info!("keyboard {device:?} attached");

        self.keyboards.insert(device, keyboard);
        self.active_keyboard = Some(device);
    }

    /// Attach a pointer device.
    pub fn add_pointer(&mut self, device: DeviceId) {
        info!("pointer {device:?} attached");

        if !self.pointers.contains(&device) {
            self.pointers.push(device);
        }
    }

    /// Detach a keyboard or pointer.
    ///
    /// When the active keyboard is removed, the most recently attached
    /// remaining keyboard takes its place.
    pub fn remove_device(&mut self, device: DeviceId) -> bool {
        if self.keyboards.shift_remove(&device).is_some() {
            info!("keyboard {device:?} detached");

            if self.active_keyboard == Some(device) {
                self.active_keyboard = self.keyboards.last().map(|(id, _)| *id);
            }

            return true;
        }

        let len = self.pointers.len();
        self.pointers.retain(|pointer| *pointer != device);
        self.pointers.len() != len
    }

    pub fn keyboard(&self, device: DeviceId) -> Option<&dyn KeyboardDevice> {
        self.keyboards.get(&device).map(|keyboard| &**keyboard)
    }

    /// Keyboard which last sent input.
    pub fn active_keyboard(&self) -> Option<&dyn KeyboardDevice> {
        self.active_keyboard.and_then(|device| self.keyboard(device))
    }

    pub fn active_keyboard_id(&self) -> Option<DeviceId> {
        self.active_keyboard
    }

    pub fn set_active_keyboard(&mut self, device: DeviceId) {
        if self.keyboards.contains_key(&device) {
            self.active_keyboard = Some(device);
        }
    }

    /// Input capabilities of all attached devices.
    pub fn capabilities(&self) -> Capability {
        let mut capabilities = Capability::empty();
        if !self.pointers.is_empty() {
            capabilities |= Capability::Pointer;
        }
        if !self.keyboards.is_empty() {
            capabilities |= Capability::Keyboard;
        }
        capabilities
    }
}
