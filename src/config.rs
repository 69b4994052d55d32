//! Compositor configuration.

use std::env;

use smithay::input::keyboard::Keysym;
use tracing::warn;

/// Smallest window dimension reachable through interactive resize.
pub const MIN_WINDOW_SIZE: i32 = 10;

/// Maximum size substituted for clients without a size limit.
pub const UNBOUNDED_SIZE: i32 = 99999;

/// Keyboard repeat rate in Hz.
pub const REPEAT_RATE: i32 = 25;

/// Keyboard repeat delay in milliseconds.
pub const REPEAT_DELAY: i32 = 600;

/// Offset between evdev and XKB keycodes.
pub const XKB_KEYCODE_OFFSET: u32 = 8;

/// Cursor image shown while the pointer is not above any window.
pub const DEFAULT_CURSOR: &str = "left_ptr";

/// Cursor theme used when `XCURSOR_THEME` is unset.
pub const DEFAULT_CURSOR_THEME: &str = "default";

/// Cursor size used when `XCURSOR_SIZE` is unset.
pub const DEFAULT_CURSOR_SIZE: u32 = 24;

/// Compositor keybindings.
///
/// These are only checked while Alt or Ctrl is held.
pub const KEY_BINDINGS: &[KeyBinding] = &[
    KeyBinding { key: Keysym::Escape, action: KeyAction::Quit },
    KeyBinding { key: Keysym::F1, action: KeyAction::CycleFocus },
];

/// Compositor keybinding.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub struct KeyBinding {
    pub key: Keysym,
    pub action: KeyAction,
}

/// Action triggered by a keybinding.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum KeyAction {
    /// Terminate the compositor.
    Quit,
    /// Focus the second most recently focused window.
    CycleFocus,
}

/// Runtime configuration.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Config {
    pub cursor_theme: String,
    pub cursor_size: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self { cursor_theme: DEFAULT_CURSOR_THEME.into(), cursor_size: DEFAULT_CURSOR_SIZE }
    }
}

impl Config {
    /// Load configuration from the environment.
    pub fn from_env() -> Self {
        Self::from_vars(env::var("XCURSOR_THEME").ok(), env::var("XCURSOR_SIZE").ok())
    }

    fn from_vars(theme: Option<String>, size: Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(theme) = theme.filter(|theme| !theme.is_empty()) {
            config.cursor_theme = theme;
        }

        match size.map(|size| size.parse::<u32>()) {
            Some(Ok(size)) if size > 0 => config.cursor_size = size,
            Some(_) => warn!("ignoring invalid XCURSOR_SIZE, using {DEFAULT_CURSOR_SIZE}"),
            None => (),
        }

        config
    }
}
