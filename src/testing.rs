//! Test helpers.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use smithay::backend::input::{ButtonState, KeyState};
use smithay::input::keyboard::{Keysym, ModifiersState};
use smithay::utils::{Logical, Rectangle, Transform};

use crate::config::{Config, XKB_KEYCODE_OFFSET};
use crate::headless::{CursorImage, HeadlessProtocol, HeadlessScene, HeadlessWlbox};
use crate::input::{DeviceId, DeviceKind, InputEvent, KeyboardDevice};
use crate::output::{OutputEvent, OutputId};
use crate::protocol::{ClientId, ShellEvent, SurfaceId};
use crate::windows::ViewId;
use crate::wlbox::Wlbox;

/// Shared state of a [`FakeKeyboard`].
#[derive(Default, Debug)]
pub struct FakeKeyboardState {
    pub default_keymap: bool,
    pub repeat_info: Option<(i32, i32)>,
    pub modifiers: ModifiersState,
    pub pressed: Vec<u32>,
    keysyms: HashMap<u32, Vec<Keysym>>,
}

/// Keyboard with a scripted keymap.
///
/// Its state stays accessible through [`FakeKeyboard::state`] after the
/// keyboard was handed to the compositor.
#[derive(Default, Debug)]
pub struct FakeKeyboard {
    state: Rc<RefCell<FakeKeyboardState>>,
}

impl FakeKeyboard {
    /// Map an evdev keycode to a keysym.
    pub fn with_keysym(self, keycode: u32, keysym: Keysym) -> Self {
        let keycode = keycode + XKB_KEYCODE_OFFSET;
        self.state.borrow_mut().keysyms.entry(keycode).or_default().push(keysym);
        self
    }

    pub fn state(&self) -> Rc<RefCell<FakeKeyboardState>> {
        self.state.clone()
    }
}

impl KeyboardDevice for FakeKeyboard {
    fn set_default_keymap(&mut self) {
        self.state.borrow_mut().default_keymap = true;
    }

    fn set_repeat_info(&mut self, rate: i32, delay: i32) {
        self.state.borrow_mut().repeat_info = Some((rate, delay));
    }

    fn keysyms(&self, keycode: u32) -> Vec<Keysym> {
        self.state.borrow().keysyms.get(&keycode).cloned().unwrap_or_default()
    }

    fn modifiers(&self) -> ModifiersState {
        self.state.borrow().modifiers
    }

    fn pressed_keys(&self) -> Vec<u32> {
        self.state.borrow().pressed.clone()
    }
}

/// Compositor without outputs or devices.
pub fn wlbox() -> HeadlessWlbox {
    Wlbox::new(HeadlessScene::default(), HeadlessProtocol::default(), Config::default())
}

/// Compositor with a single output.
pub fn wlbox_with_output(width: i32, height: i32) -> HeadlessWlbox {
    let mut wlbox = wlbox();
    add_output(&mut wlbox, 0, width, height);
    wlbox
}

pub fn add_output(wlbox: &mut HeadlessWlbox, id: u64, width: i32, height: i32) {
    wlbox.dispatch(
        OutputEvent::Added {
            id: OutputId(id),
            name: format!("HEADLESS-{id}"),
            mode: (width, height).into(),
            scale: 1.,
            transform: Transform::Normal,
        }
        .into(),
    );
}

pub fn add_keyboard(wlbox: &mut HeadlessWlbox, device: DeviceId, keyboard: FakeKeyboard) {
    let kind = DeviceKind::Keyboard(Box::new(keyboard));
    wlbox.dispatch(InputEvent::DeviceAdded { device, kind }.into());
}

/// Create and map a toplevel with its natural size.
///
/// The surface is owned by a client with the same ID as the surface.
pub fn map_toplevel(wlbox: &mut HeadlessWlbox, surface: SurfaceId, size: (i32, i32)) -> ViewId {
    wlbox.protocol.add_toplevel(surface, ClientId(surface.0), size.into());
    wlbox.scene.set_surface_size(surface, size.into());

    wlbox.dispatch(ShellEvent::NewToplevel { surface }.into());
    wlbox.dispatch(ShellEvent::Map { surface }.into());

    wlbox.views.find(surface).unwrap()
}

pub fn key(wlbox: &mut HeadlessWlbox, device: DeviceId, keycode: u32, state: KeyState) {
    wlbox.dispatch(InputEvent::KeyboardKey { device, time: 0, keycode, state }.into());
}

/// Move the cursor relative to its current position.
pub fn motion(wlbox: &mut HeadlessWlbox, delta: (f64, f64)) {
    wlbox.dispatch(InputEvent::PointerMotion { time: 0, delta: delta.into() }.into());
}

/// Press or release the left mouse button.
pub fn button(wlbox: &mut HeadlessWlbox, state: ButtonState) {
    wlbox.dispatch(InputEvent::PointerButton { time: 0, button: BTN_LEFT, state }.into());
}

pub fn rect(x: i32, y: i32, width: i32, height: i32) -> Rectangle<i32, Logical> {
    Rectangle { loc: (x, y).into(), size: (width, height).into() }
}

pub fn named_cursor(name: &str) -> CursorImage {
    CursorImage::Named(name.into())
}

/// Evdev code of the left mouse button.
const BTN_LEFT: u32 = 0x110;
