//! Wlbox compositor core.
//!
//! This library contains the window management policy of Wlbox. Rendering
//! and the Wayland protocol runtime are consumed through the [`SceneGraph`]
//! and [`Protocol`] traits, the [`headless`] module provides in-memory
//! implementations of both.
//!
//! [`SceneGraph`]: crate::scene::SceneGraph
//! [`Protocol`]: crate::protocol::Protocol

use std::fmt::Display;

use tracing::error;

pub mod config;
mod daemon;
mod focus;
mod geometry;
pub mod grab;
pub mod headless;
pub mod input;
mod ipc_server;
pub mod output;
pub mod protocol;
pub mod scene;
pub mod seat;
mod shell;
#[cfg(test)]
mod testing;
pub mod windows;
pub mod wlbox;

/// Log an error, ignoring success.
pub fn trace_error<T, E: Display>(result: Result<T, E>) {
    if let Err(err) = &result {
        error!("{err}");
    }
}
